//! taxakey CLI entry point
//!
//! This is a minimal entrypoint that:
//! 1. Parses CLI arguments (via cli::run)
//! 2. Dispatches to CLI commands (via cli::run)
//! 3. Exits with non-zero on failure
//!
//! The error itself is already on stdout as a JSON response, and a copy
//! goes to stderr for humans.

use taxakey::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
