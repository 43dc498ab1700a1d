mod cli;
mod commands;
mod logging;
mod runtime;
mod tree;

use clap::Parser;
use tracing::error;

use cli::{Cli, Commands};

// glibc malloc doesn't release memory well under the high fan-out concurrency
// a full-board crawl produces; mimalloc does.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let common = match &cli.command {
        Commands::BuildCache(a) => &a.common,
        Commands::Crack(a) => &a.common,
        Commands::DumpHashes(a) => &a.common,
        Commands::DumpWords(a) => &a.common,
        Commands::DumpNgrams(a) => &a.common,
    };
    if let Err(e) = common.validate() {
        eprintln!("configuration error: {e}");
        std::process::exit(1);
    }
    logging::init(common.quiet, common.debug, common.logfile.as_deref())?;

    let result = match cli.command {
        Commands::BuildCache(args) => commands::build_cache::run(args, &cli.config).await,
        Commands::Crack(args) => commands::crack::run(args, &cli.config).await,
        Commands::DumpHashes(args) => commands::dump_hashes::run(args, &cli.config).await,
        Commands::DumpWords(args) => commands::dump_words::run(args, &cli.config).await,
        Commands::DumpNgrams(args) => commands::dump_ngrams::run(args, &cli.config).await,
    };

    if let Err(e) = &result {
        error!(error = %e, "run failed");
    }
    result
}
