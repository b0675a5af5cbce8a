use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use workbench_cli::Cli;

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so `cat` output stays clean (respects RUST_LOG)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    if let Err(e) = workbench_cli::run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
