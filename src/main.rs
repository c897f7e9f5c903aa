//! Assembler regression test driver
//!
//! Usage: asm-rtest <tree> <out-dir> <primary-exe> <secondary-exe>
//!
//! Exits 0 when every fixture passes, 1 when any fails, 2 on usage errors.

use std::path::PathBuf;

use asm_rtest::common::logging;
use asm_rtest::{run_suite, Result, Settings, SuiteConfig};
use clap::Parser;

#[derive(Parser)]
#[command(name = "asm-rtest", about = "Assembler regression test driver")]
#[command(version, long_about = None)]
struct Cli {
    /// Path to the regression tree
    tree: PathBuf,

    /// Path to the output directory
    out_dir: PathBuf,

    /// Path to the primary assembler executable
    primary: PathBuf,

    /// Path to the secondary (gas-compatible) executable
    secondary: PathBuf,

    /// Settings file (default: <config dir>/asm-rtest/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    logging::init_cli();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let settings = Settings::load(cli.config.as_deref())?;
    let config = SuiteConfig::new(cli.tree, cli.out_dir, cli.primary, cli.secondary, settings);
    let summary = run_suite(&config).await?;
    Ok(summary.success())
}
