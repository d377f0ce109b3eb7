use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod cli;

fn main() -> ExitCode {
    // fallback to warn when RUST_LOG is unset or invalid
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries command output
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    info!("logging setup");
    cli::start()
}
