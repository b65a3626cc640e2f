//! Renderers turning an [`AutomatonTable`] into an output artifact.

use crate::automaton::AutomatonTable;
use crate::config::{Config, EmitFormat};
use crate::error::Result;

pub mod java;

pub use java::JavaEmitter;

/// Renders a compiled table into bytes ready to be written out.
pub trait Emitter {
    fn render(&self, table: &AutomatonTable) -> Result<Vec<u8>>;
}

/// Pretty-printed JSON of the table, readable by `inspect_automaton`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEmitter;

impl Emitter for JsonEmitter {
    fn render(&self, table: &AutomatonTable) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(table)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Compact binary form of the table.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeEmitter;

impl Emitter for BincodeEmitter {
    fn render(&self, table: &AutomatonTable) -> Result<Vec<u8>> {
        Ok(bincode::serialize(table)?)
    }
}

/// The emitter selected by `config.format`.
pub fn emitter_for(config: &Config) -> Box<dyn Emitter> {
    match config.format {
        EmitFormat::Java => Box::new(JavaEmitter::from_config(config)),
        EmitFormat::Json => Box::new(JsonEmitter),
        EmitFormat::Bincode => Box::new(BincodeEmitter),
    }
}
