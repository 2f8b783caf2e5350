use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cisp-portal",
    version,
    about = "Terminal client for the CISP credit-risk lookup portal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up a company by its 8-digit root (or paste the full CNPJ)
    Lookup {
        /// CNPJ root; non-digits are stripped, longer input is truncated
        root: String,
    },
    /// List recently looked-up roots, newest first
    Recents,
    /// Fetch the record for a root and write it as formatted JSON
    Export {
        root: String,
        /// Destination file (defaults to cisp_<root>.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Probe the backend health endpoint
    Health,
    /// Toggle the display theme, or set it explicitly
    Theme {
        #[arg(value_parser = ["light", "dark"])]
        mode: Option<String>,
    },
}
