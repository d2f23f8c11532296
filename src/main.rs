// cregistry: reflection-code generator for registered C structs

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cregistry::codegen;
use cregistry::errors::Result;
use cregistry::workspace::{discover_sources, Workspace};

#[derive(Parser, Debug)]
#[command(name = "cregistry", version)]
#[command(about = "Scans C/C++ sources for REGISTER_STRUCT markers and regenerates the struct registration code")]
struct Cli {
    /// Workspace root to scan for sources
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Additional include directories to scan
    #[arg(short = 'I', value_name = "PATH")]
    include: Vec<PathBuf>,

    /// Output file containing the generated region
    #[arg(short = 'o', long = "output", default_value = "structs.cpp")]
    output: PathBuf,
}

fn run(cli: &Cli) -> Result<()> {
    let output = if cli.output.is_relative() {
        cli.root.join(&cli.output)
    } else {
        cli.output.clone()
    };

    let files = discover_sources(&cli.root, &cli.include, &output)?;
    info!(files = files.len(), "scanning sources");

    let mut workspace = Workspace::new();
    for file in &files {
        debug!(file = %file.display(), "scanning");
        workspace.scan_file(file)?;
    }
    info!(
        definitions = workspace.definitions.len(),
        registrations = workspace.registrations.len(),
        "scan complete"
    );

    codegen::write_output(&workspace, &output)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
