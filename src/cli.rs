use clap::Parser;
use std::path::PathBuf;

/// Summarizes open issues, pull requests, stars and releases of the GitHub repositories
/// checked out under a directory.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// Root directory to scan.
    #[clap(long, value_parser, default_value = ".")]
    pub root: PathBuf,

    /// Scan repositories recursively.
    #[clap(long)]
    pub recursive: bool,

    /// Disable colored output.
    #[clap(long)]
    pub no_color: bool,
}

pub fn cmd() -> Cli {
    Cli::parse()
}
