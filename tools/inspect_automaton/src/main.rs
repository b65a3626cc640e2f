use anyhow::{bail, Context, Result};
use clap::Parser;
use compose_core::automaton::{BRANCH_HEADER, STRING_HEADER};
use compose_core::{AutomatonTable, Step};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Print statistics of a compiled table and walk key sequences through it.
#[derive(Parser)]
#[command(name = "inspect_automaton")]
struct Args {
    /// Table written by compile_compose with --format json or bincode
    table: PathBuf,

    /// Sequence set used by --seq
    #[arg(long, default_value = "compose")]
    set: String,

    /// Keys to feed to the set, one character per key
    #[arg(long)]
    seq: Option<String>,
}

#[derive(Debug, Default)]
struct Stats {
    branches: usize,
    edges: usize,
    char_leaves: usize,
    string_leaves: usize,
    units: usize,
}

fn load(path: &Path) -> Result<AutomatonTable> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let table = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_slice(&bytes).context("parsing JSON table")?,
        _ => bincode::deserialize(&bytes).context("parsing bincode table")?,
    };
    Ok(table)
}

/// Count the states reachable from any entry point.
fn reachable_stats(table: &AutomatonTable) -> Result<Stats> {
    let mut stats = Stats::default();
    let mut seen = HashSet::new();
    let mut stack: Vec<u16> = table.entry_points.values().copied().collect();

    while let Some(state) = stack.pop() {
        if !seen.insert(state) {
            continue;
        }
        let s = usize::from(state);
        let (Some(&symbol), Some(&link)) = (table.symbols.get(s), table.links.get(s)) else {
            bail!("state {state} is out of bounds");
        };
        match symbol {
            BRANCH_HEADER => {
                stats.branches += 1;
                let children = usize::from(link).saturating_sub(1);
                stats.edges += children;
                for i in 1..=children {
                    match table.links.get(s + i) {
                        Some(&target) => stack.push(target),
                        None => bail!("branch at {state} runs past the end of the table"),
                    }
                }
            }
            STRING_HEADER => {
                stats.string_leaves += 1;
                stats.units += usize::from(link).saturating_sub(1);
            }
            _ => stats.char_leaves += 1,
        }
    }
    Ok(stats)
}

fn walk(table: &AutomatonTable, set: &str, keys: &str) -> Result<()> {
    let Some(&entry) = table.entry_points.get(set) else {
        bail!("no sequence set named '{set}'");
    };
    println!("\nWalking {keys:?} from '{set}' (state {entry}):");

    let keys: Vec<char> = keys.chars().collect();
    let mut state = entry;
    for (i, &c) in keys.iter().enumerate() {
        match table.step(state, c) {
            Some(Step::Pending(next)) => {
                println!("  {c:?} -> state {next}");
                state = next;
            }
            Some(Step::Output(output)) => {
                println!("  {c:?} -> output {output:?}");
                if i + 1 < keys.len() {
                    println!("  ({} trailing keys ignored)", keys.len() - i - 1);
                }
                return Ok(());
            }
            None => {
                println!("  {c:?} -> no transition");
                return Ok(());
            }
        }
    }
    println!("  sequence is incomplete");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let table = load(&args.table)?;

    println!("=== {} ===", args.table.display());
    println!("Cells: {}", table.len());
    println!("Entry points:");
    for (name, index) in &table.entry_points {
        println!("  {name:<24} {index}");
    }

    let stats = reachable_stats(&table)?;
    println!("Reachable states:");
    println!("  - branches: {} ({} edges)", stats.branches, stats.edges);
    println!("  - character leaves: {}", stats.char_leaves);
    println!("  - string leaves: {} ({} code units)", stats.string_leaves, stats.units);

    if let Some(keys) = &args.seq {
        walk(&table, &args.set, keys)?;
    }
    Ok(())
}
