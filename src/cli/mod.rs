//! CLI module for taxakey
//!
//! Provides command-line interface for:
//! - load: Open a session for a raw key
//! - answer: Apply answers to a session
//! - dismiss / filter: Exclude taxa by hand
//! - state: Report progress
//! - reset: Drop a stored session

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{answer, dismiss, filter, load, parse_answer_value, reset, run, run_command, state};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_key_file, write_error, write_response};
