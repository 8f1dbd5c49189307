//! jmm backend driver
//!
//! Reads a decoded-tree document, runs the optimizer and IR generator, and
//! prints the IR or the diagnostics.

mod input;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use input::InputDocument;
use jmm_compiler::diagnostic::{create_files, Diagnostic};
use jmm_compiler::{BranchLayout, CompileOutput, Compiler, CompilerOptions, Diagnostics, PrettyPrint};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "jmmc")]
#[command(about = "jmm compiler backend: typed tree to IR", long_about = None)]
#[command(version)]
struct Cli {
    /// Input document (`{ "tree": ..., "symbols": ... }`)
    input: PathBuf,

    /// Compiler options file (jmm.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip constant folding and propagation
    #[arg(long)]
    no_opt: bool,

    /// Branch layout for `if` statements (else-first, then-first)
    #[arg(long, value_parser = parse_layout)]
    layout: Option<BranchLayout>,

    /// Output format
    #[arg(long, value_enum, default_value = "ir")]
    emit: Emit,

    /// Source file the tree was parsed from, used to render diagnostics
    #[arg(long)]
    source: Option<PathBuf>,

    /// Write the output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Textual IR
    Ir,
    /// IR module and diagnostics as JSON
    Json,
}

fn parse_layout(value: &str) -> Result<BranchLayout, String> {
    BranchLayout::from_str(value).map_err(|e| e.to_string())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env().filter_level(level).init();
}

fn load_options(cli: &Cli) -> anyhow::Result<CompilerOptions> {
    let mut options = match &cli.config {
        Some(path) => CompilerOptions::from_file(path).with_context(|| format!("Failed to load {}", path.display()))?,
        None => CompilerOptions::default(),
    };
    if cli.no_opt {
        options = options.without_optimizations();
    }
    if let Some(layout) = cli.layout {
        options = options.with_branch_layout(layout);
    }
    Ok(options)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = load_options(&cli)?;
    let unit = InputDocument::from_file(&cli.input, options.limits.max_depth)?.decode();

    let mut diagnostics = Diagnostics::new();
    diagnostics.extend(unit.decode_errors.iter().map(Diagnostic::from_decode_error));

    let output = Compiler::new(options).compile(&unit.program, &unit.symbols)?;
    log::debug!(
        "{} optimizer rounds, {} folded, {} propagated",
        output.stats.iterations,
        output.stats.constants_folded,
        output.stats.constants_propagated
    );
    diagnostics.extend(output.diagnostics.iter().cloned());

    match cli.emit {
        Emit::Ir => {
            report(&diagnostics, cli.source.as_deref())?;
            if let Some(module) = &output.module {
                write_output(cli.output.as_deref(), &module.pretty_print())?;
            }
        }
        Emit::Json => write_output(cli.output.as_deref(), &to_json(&output, &diagnostics)?)?,
    }

    if diagnostics.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

/// Print diagnostics to stderr, with source context when the source is known
fn report(diagnostics: &Diagnostics, source: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = source else {
        for diagnostic in diagnostics.iter() {
            eprintln!("{}", diagnostic);
        }
        return Ok(());
    };

    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let (files, file_id) = create_files(path, text);
    for diagnostic in diagnostics.iter() {
        diagnostic.emit(&files, file_id)?;
    }
    Ok(())
}

fn to_json(output: &CompileOutput, diagnostics: &Diagnostics) -> anyhow::Result<String> {
    let diagnostics: serde_json::Value = serde_json::from_str(&diagnostics.to_json()?)?;
    let document = serde_json::json!({
        "module": output.module,
        "diagnostics": diagnostics,
    });
    Ok(serde_json::to_string_pretty(&document)?)
}

fn write_output(path: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}
