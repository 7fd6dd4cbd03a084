use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Compressed package catalog generator", long_about = None)]
pub struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by both generators.
#[derive(Args)]
pub struct CommonArgs {
    /// Repository root holding RPMS.<suffix> / SRPMS.<suffix> and base/
    pub dir: PathBuf,
    /// Subset suffix, e.g. `main`
    pub suffix: String,

    /// Use this suffix for the output name instead of <suffix>
    #[arg(long)]
    pub meta: Option<String>,
    /// Append chunks to an existing catalog instead of replacing it
    #[arg(long)]
    pub append: bool,
    /// Show a progress counter on stderr
    #[arg(long)]
    pub progress: bool,
    /// Checksum cache directory (default: user cache dir)
    #[arg(long)]
    pub cachedir: Option<PathBuf>,
    /// Reuse unchanged records from a previous catalog
    #[arg(long, conflicts_with = "prev_stdin")]
    pub prev: Option<PathBuf>,
    /// Read the previous catalog from stdin
    #[arg(long)]
    pub prev_stdin: bool,
    /// zstd or store
    #[arg(long, default_value = "zstd")]
    pub codec: String,
    /// zstd compression level
    #[arg(long, default_value_t = 19)]
    pub level: i32,
    /// Records per chunk at most
    #[arg(long = "merge", default_value_t = 8)]
    pub merge_threshold: usize,
    /// Print run statistics as JSON on stdout
    #[arg(long)]
    pub stats: bool,
}

#[derive(Args)]
pub struct PkgListArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Write `<srpm> <rpm>` lines for gensrclist to this file
    #[arg(long)]
    pub index: Option<PathBuf>,
    /// Update annotations (File/Importance/Date/Summary/URL stanzas)
    #[arg(long)]
    pub info: Option<PathBuf>,
    /// Extra paths to keep in stripped file lists, one per line
    #[arg(long)]
    pub useful_files: Option<PathBuf>,
    /// Do not collect file dependencies before stripping
    #[arg(long)]
    pub no_scan: bool,
    /// Keep full file lists
    #[arg(long)]
    pub bloat: bool,
    /// Keep changelog entries since this time (epoch seconds, YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub changelog_since: Option<String>,
}

#[derive(Args)]
pub struct SrcListArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Index written by `genpkglist --index`
    pub srpm_index: PathBuf,
    /// SRPMS.<suffix> sits inside the repository root next to base/
    #[arg(long)]
    pub flat: bool,
    /// Leave out sources that no binary package refers to
    #[arg(long)]
    pub mapi: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build base/pkglist.<suffix> from RPMS.<suffix>
    Genpkglist(PkgListArgs),

    /// Build base/srclist.<suffix> from SRPMS.<suffix>
    Gensrclist(SrcListArgs),

    /// Print every record of one or more catalogs through a %{TAG} format
    Query {
        format: String,
        #[arg(required = true)]
        catalogs: Vec<PathBuf>,
    },

    /// Decompress every chunk and check frame integrity
    Verify { catalog: PathBuf },
}
