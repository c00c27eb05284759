use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use log::{debug, info};
use minipack_core::{BundleOptions, build_to_file, dirname};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "minipack")]
#[command(about = "Bundle a JavaScript module graph into a single script", long_about = None)]
struct Cli {
    /// Entry file of the module graph
    #[arg(default_value = "./example/entry.js")]
    entry: PathBuf,

    /// Where to write the bundle
    #[arg(default_value = "./bundle.js")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();

    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli);

    let start = Instant::now();

    let options = BundleOptions::load(dirname(&cli.entry))
        .with_context(|| format!("Failed to load options for {}", cli.entry.display()))?;
    info!("Bundling {} with {:?}", cli.entry.display(), options);

    let result = build_to_file(&cli.entry, &cli.output, &options)
        .with_context(|| format!("Failed to bundle {}", cli.entry.display()))?;

    let elapsed_ms = start.elapsed().as_millis();
    writeln!(
        stdout,
        "{} Wrote {} in {}ms ({} modules).",
        "●".bright_blue(),
        cli.output.display().to_string().cyan(),
        elapsed_ms.to_string().cyan(),
        result.graph.len().to_string().cyan()
    )?;
    stdout.flush()?;

    Ok(())
}
