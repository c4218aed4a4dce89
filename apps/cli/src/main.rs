//! # quill
//!
//! Entry point of the `quill` binary.

use clap::Parser;
use quill_cli::args::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    quill_cli::init_tracing(cli.verbose);

    if let Err(e) = quill_cli::run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
