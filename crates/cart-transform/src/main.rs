//! Cart transform entry point.
//!
//! Reads a transform input document from stdin and writes the operations to
//! stdout. Logs go to stderr so they never mix with the output.

use std::io::{Read, Write};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        tracing::error!(error = %e, "failed to read input");
        return ExitCode::FAILURE;
    }

    let output = match cart_transform::run_json(&input) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{output}") {
        tracing::error!(error = %e, "failed to write output");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
