//! Command-line interface definition

use clap::{Args, Parser, Subcommand};

/// Top-level CLI arguments
#[derive(Debug, Parser)]
#[command(name = "paddock", version, about = "Run and manage local virtual machines")]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prune the VM image and installer image caches
    Prune(PruneArgs),
}

/// Arguments for `paddock prune`
#[derive(Debug, Args)]
pub struct PruneArgs {
    /// Remove cache entries last accessed more than <N> days ago
    ///
    /// For example, --older-than=7 removes entries that weren't accessed
    /// by paddock in the last 7 days.
    #[arg(long, value_name = "N")]
    pub older_than: Option<u32>,

    /// Remove least recently used cache entries that do not fit the
    /// specified cache size budget <N>, expressed in gigabytes
    ///
    /// For example, --cache-budget=50 effectively shrinks all caches to a
    /// total size of 50 gigabytes.
    #[arg(long, value_name = "N")]
    pub cache_budget: Option<u64>,

    /// Collect garbage in the OCI cache (unreferenced blobs and abandoned
    /// partial pulls)
    #[arg(long, hide = true)]
    pub gc: bool,
}
