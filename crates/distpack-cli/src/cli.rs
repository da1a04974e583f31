//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "distpack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bundle the whole project tree, minus excluded names
    Project(ProjectArgs),
    /// Stage the Windows desktop build kit and bundle it
    Package(PackageArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

/// Options shared by every bundling command.
#[derive(clap::Args)]
pub struct CommonArgs {
    /// Project root (default: current directory)
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Output archive path
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// JSON file overriding the built-in profile
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Compression level (0 stores, 1-9 deflates)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(0..=9))]
    pub compression_level: Option<u8>,

    /// Overwrite output file if it exists
    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct ProjectArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Additional exclude pattern (`*x*`, `*x`, `x*` or exact name; can be
    /// repeated)
    #[arg(long = "exclude", short = 'x', value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Start from an empty exclusion list instead of the built-in one
    #[arg(long)]
    pub no_default_excludes: bool,
}

#[derive(clap::Args)]
pub struct PackageArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Package directory name inside the archive
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
