//! CLI argument definitions using clap
//!
//! Commands:
//! - taxakey load --key <raw.json> [--force]
//! - taxakey answer --session <id> --alternative <id> --value <v> [...]
//! - taxakey dismiss --session <id> --taxon <id>
//! - taxakey filter --session <id> (--ids a,b | --names a,b [--keep-common])
//! - taxakey state --session <id>
//! - taxakey reset --session <id>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// taxakey - a deterministic identification-key inference engine
#[derive(Parser, Debug)]
#[command(name = "taxakey")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./taxakey.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a session for a raw key, restoring saved progress
    Load {
        /// Path to the raw key JSON
        #[arg(long)]
        key: PathBuf,

        /// Discard any saved progress and load afresh
        #[arg(long)]
        force: bool,
    },

    /// Answer (or retract) alternatives
    Answer {
        /// Session (key) id
        #[arg(long)]
        session: String,

        /// Alternative id; repeat together with --value
        #[arg(long = "alternative", required = true)]
        alternatives: Vec<String>,

        /// true, false, none (retract) or min,max
        #[arg(long = "value", required = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },

    /// Dismiss a taxon, or restore a dismissed one
    Dismiss {
        #[arg(long)]
        session: String,

        #[arg(long)]
        taxon: String,
    },

    /// Dismiss taxa missing from an allow-list
    Filter {
        #[arg(long)]
        session: String,

        /// External taxonomy ids, comma-separated
        #[arg(long, value_delimiter = ',', conflicts_with = "names")]
        ids: Vec<String>,

        /// Scientific names, comma-separated
        #[arg(long, value_delimiter = ',')]
        names: Vec<String>,

        /// Keep whole top-level branches containing a listed name
        #[arg(long, requires = "names")]
        keep_common: bool,
    },

    /// Print progress and the characters left to ask
    State {
        #[arg(long)]
        session: String,
    },

    /// Delete a stored session
    Reset {
        #[arg(long)]
        session: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
