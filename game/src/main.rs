use anyhow::Result;
use clap::Parser;

use common::io::format_result_line;
use game::{Args, init_tracing, run_game};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let result = run_game(&args).await?;
    println!("{}", format_result_line(&result)?);

    Ok(())
}
