//! Command-line interface for compiling and evaluating asset definitions.

use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use ruleforge_builder::{CompiledAsset, Registry, build_asset, register_builtins};
use ruleforge_core::Event;
use serde::Serialize;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "ruleforge")]
#[command(about = "Compile and evaluate security-event asset definitions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a single asset definition and report its shape
    Build {
        /// Path to a JSON asset definition
        path: PathBuf,

        /// Print the compiled expression tree
        #[arg(short, long)]
        tree: bool,
    },

    /// Compile every definition under a path and report failures
    Validate {
        /// A definition file, or a directory scanned recursively for *.json
        path: PathBuf,
    },

    /// Evaluate events against compiled assets
    Eval {
        /// A definition file or a directory of definitions
        #[arg(short, long)]
        assets: PathBuf,

        /// One event as inline JSON; omit to read NDJSON from stdin
        #[arg(short, long)]
        event: Option<String>,

        /// Pretty-print results
        #[arg(short, long)]
        pretty: bool,

        /// Write per-term trace lines to stderr
        #[arg(short, long)]
        trace: bool,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { path, tree } => cmd_build(path, tree),
        Commands::Validate { path } => cmd_validate(path),
        Commands::Eval {
            assets,
            event,
            pretty,
            trace,
        } => cmd_eval(assets, event, pretty, trace),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn bootstrap_registry() -> Registry {
    let mut registry = Registry::new();
    register_builtins(&mut registry);
    registry
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_build(path: PathBuf, tree: bool) {
    let registry = bootstrap_registry();
    let asset = load_asset(&path, &registry);
    println!("{} ({}): compiled", asset.name, asset.kind);
    if tree {
        print!("{}", asset.expression.render_tree());
    }
}

fn cmd_validate(path: PathBuf) {
    let registry = bootstrap_registry();
    let files = collect_definition_files(&path);
    if files.is_empty() {
        eprintln!("Error: no definition files under {}", path.display());
        process::exit(1);
    }

    let mut failed = 0usize;
    for file in &files {
        match try_load_asset(file, &registry) {
            Ok(asset) => println!("ok   {} ({})", file.display(), asset.name),
            Err(message) => {
                failed += 1;
                println!("FAIL {message}");
            }
        }
    }
    eprintln!("{} definition(s) checked, {failed} failed.", files.len());
    if failed > 0 {
        process::exit(1);
    }
}

fn cmd_eval(assets_path: PathBuf, event_json: Option<String>, pretty: bool, trace: bool) {
    let registry = bootstrap_registry();
    let files = collect_definition_files(&assets_path);
    if files.is_empty() {
        eprintln!("Error: no definition files under {}", assets_path.display());
        process::exit(1);
    }
    let mut assets: Vec<CompiledAsset> =
        files.iter().map(|file| load_asset(file, &registry)).collect();
    assets.sort_by(|a, b| a.name.cmp(&b.name));
    eprintln!("Loaded {} asset(s) from {}", assets.len(), assets_path.display());

    if let Some(json_text) = event_json {
        let body: Value = match serde_json::from_str(&json_text) {
            Ok(value) => value,
            Err(e) => {
                eprintln!("Invalid JSON event: {e}");
                process::exit(1);
            }
        };
        process_event(body, &assets, pretty, trace);
    } else {
        let stdin = io::stdin();
        let mut line_num = 0u64;
        let mut match_count = 0u64;

        for line in stdin.lock().lines() {
            line_num += 1;
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("Error reading line {line_num}: {e}");
                    continue;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            let body: Value = match serde_json::from_str(&line) {
                Ok(value) => value,
                Err(e) => {
                    eprintln!("Invalid JSON on line {line_num}: {e}");
                    continue;
                }
            };

            if process_event(body, &assets, pretty, trace) {
                match_count += 1;
            }
        }

        eprintln!("Processed {line_num} events, {match_count} with matches.");
    }
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct EvalRecord<'a> {
    event: &'a Value,
    matches: Vec<&'a str>,
}

/// Runs one event through every asset in name order and prints the
/// transformed event with the list of matching assets. Returns whether
/// anything matched.
fn process_event(body: Value, assets: &[CompiledAsset], pretty: bool, trace: bool) -> bool {
    let mut event = Event::from_value(body);
    let mut matches: Vec<&str> = Vec::new();
    for asset in assets {
        let matched = if trace {
            asset
                .expression
                .evaluate_traced(&mut event, &mut |line| eprintln!("{line}"))
        } else {
            asset.expression.evaluate(&mut event)
        };
        if matched {
            matches.push(asset.name.as_str());
        }
    }

    let output = event.into_document().into_value();
    let record = EvalRecord {
        event: &output,
        matches,
    };
    let rendered = if pretty {
        serde_json::to_string_pretty(&record)
    } else {
        serde_json::to_string(&record)
    };
    match rendered {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("Error serializing result: {e}"),
    }
    !record.matches.is_empty()
}

fn load_asset(path: &Path, registry: &Registry) -> CompiledAsset {
    match try_load_asset(path, registry) {
        Ok(asset) => asset,
        Err(message) => {
            eprintln!("Error: {message}");
            process::exit(1);
        }
    }
}

fn try_load_asset(path: &Path, registry: &Registry) -> Result<CompiledAsset, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let definition: Value = serde_json::from_str(&text)
        .map_err(|e| format!("{}: invalid JSON: {e}", path.display()))?;
    build_asset(&definition, registry).map_err(|e| format!("{}: {e}", path.display()))
}

fn collect_definition_files(path: &Path) -> Vec<PathBuf> {
    if !path.is_dir() {
        return vec![path.to_path_buf()];
    }
    let mut files = Vec::new();
    if let Err(e) = walk_json_files(path, &mut files) {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    }
    files.sort();
    files
}

fn walk_json_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_json_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(())
}
