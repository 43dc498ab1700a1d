use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tripcracker",
    about = "Scrapes an imageboard for tripcodes and cracks them against reverse-lookup databases"
)]
pub struct Cli {
    /// Path to the TOML config file. Falls back to the built-in defaults if missing.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk the tree and populate the cache without collecting any results.
    BuildCache(BuildCacheArgs),
    /// Walk the tree, collect tripcodes, and solve them against the reverse-lookup databases.
    Crack(CrackArgs),
    /// Walk the tree and dump the distinct public tripcode ciphers observed.
    DumpHashes(DumpHashesArgs),
    /// Walk the tree and dump the candidate words drawn from every post field.
    DumpWords(DumpWordsArgs),
    /// Walk the tree and dump n-gram frequency counts drawn from post bodies.
    DumpNgrams(DumpNgramsArgs),
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// On-disk cache file.
    #[arg(long)]
    pub cache_file: Option<String>,

    /// Number of worker threads in the pool.
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Use HTTPS instead of HTTP.
    #[arg(long)]
    pub https: bool,

    /// Serve exclusively from the cache; never touch the network.
    #[arg(long)]
    pub offline: bool,

    /// Only log warnings and above.
    #[arg(long)]
    pub quiet: bool,

    /// Log at debug verbosity.
    #[arg(long)]
    pub debug: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    pub logfile: Option<String>,
}

impl CommonArgs {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.quiet && self.debug {
            anyhow::bail!("--quiet and --debug are mutually exclusive");
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct BuildCacheArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Links (full URLs or `/board/`, `/board/N`, `/board/res/N` shorthands).
    /// Defaults to every board when none are given.
    pub links: Vec<String>,
}

#[derive(Args)]
pub struct CrackArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Public (DES-derived) tripcode database.
    #[arg(long)]
    pub public_tripcode_db: Option<String>,

    /// Secure (SHA1-derived) tripcode database.
    #[arg(long)]
    pub secure_tripcode_db: Option<String>,

    /// Links to crack. At least one is required.
    pub links: Vec<String>,
}

#[derive(Args)]
pub struct DumpHashesArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output file for the distinct ciphers.
    pub outfile: String,

    /// Links. Defaults to every board when none are given.
    pub links: Vec<String>,
}

#[derive(Args)]
pub struct DumpWordsArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output file for the candidate words.
    pub outfile: String,

    /// Links. Defaults to every board when none are given.
    pub links: Vec<String>,
}

#[derive(Args)]
pub struct DumpNgramsArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output file for the n-gram frequency table.
    pub outfile: String,

    /// Size of the sliding window.
    pub n: usize,

    /// Links. Defaults to every board when none are given.
    pub links: Vec<String>,
}
