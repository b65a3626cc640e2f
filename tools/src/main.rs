mod logging;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use compose_core::{compile_paths, emitter_for, Config, EmitFormat};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;

/// Compile compose sequence files and bundles into a transition table.
#[derive(Parser)]
#[command(name = "compile_compose", version)]
struct Args {
    /// Sequence files (.pre, .compose, .json) or directory bundles. Each one
    /// becomes a sequence set named after its basename.
    #[arg(required_unless_present = "print_config")]
    inputs: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base keysymdef.h applied to every input
    #[arg(long)]
    keysyms: Option<PathBuf>,

    /// Output format: java, json or bincode
    #[arg(long)]
    format: Option<EmitFormat>,

    /// Write the artifact here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Set checked by the case-consistency linter
    #[arg(long)]
    primary_set: Option<String>,

    /// Lint every set, not only the primary one
    #[arg(long)]
    lint_all: bool,

    /// Skip walking every sequence through the compiled table
    #[arg(long)]
    no_verify: bool,

    /// Java package of the generated class
    #[arg(long)]
    package: Option<String>,

    /// Java class name
    #[arg(long)]
    class_name: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log warnings
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    /// Configuration file first, then command-line overrides.
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_toml(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(keysyms) = &self.keysyms {
            config.keysyms = Some(keysyms.clone());
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(primary) = &self.primary_set {
            config.primary_set = primary.clone();
        }
        if self.lint_all {
            config.lint_all_sets = true;
        }
        if self.no_verify {
            config.verify = false;
        }
        if let Some(package) = &self.package {
            config.java.package = Some(package.clone());
        }
        if let Some(class_name) = &self.class_name {
            config.java.class_name = class_name.clone();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose, args.quiet);

    let config = args.config()?;
    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }
    if config.format == EmitFormat::Bincode && args.output.is_none() && std::io::stdout().is_terminal() {
        bail!("refusing to write bincode to a terminal, use --output");
    }

    let compilation = compile_paths(config.clone(), &args.inputs)?;
    let bytes = compilation.render(&*emitter_for(&config))?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("wrote {} ({} bytes)", path.display(), bytes.len());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }

    eprintln!("{}", compilation.report);
    Ok(())
}
