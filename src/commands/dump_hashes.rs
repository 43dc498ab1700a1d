use std::collections::BTreeSet;

use anyhow::Result;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use tripcracker_core::Post;
use tripcracker_entities::WorkUnit;
use tripcracker_pool::{PoolOutcome, WorkerPool};

use crate::cli::DumpHashesArgs;
use crate::runtime::{load_config, work_unit_roots, Runtime};

/// Walks the tree collecting the distinct public tripcode ciphers observed,
/// one per line, sorted.
pub async fn run(args: DumpHashesArgs, config_path: &str) -> Result<()> {
    let config = load_config(config_path);
    let rt = Runtime::new(&args.common, &config).await;
    let roots = work_unit_roots(&args.links, &rt.links, true)?;

    let cache = rt.cache.clone();
    let links = rt.links.clone();
    let pool: WorkerPool<WorkUnit, Post> = WorkerPool::new(rt.threads, move |unit| {
        let cache = cache.clone();
        let links = links.clone();
        async move {
            if let WorkUnit::Post(post) = &unit {
                return PoolOutcome::Done(post.clone());
            }
            match unit.process(&cache, &links).await {
                Ok(children) => PoolOutcome::Spawn(children),
                Err(e) => {
                    warn!(error = %e, "node expansion failed");
                    PoolOutcome::Empty
                }
            }
        }
    });

    for root in roots {
        pool.push(root).await;
    }
    pool.join().await;
    let posts = pool.get_results().await;
    pool.close().await;

    let ciphers: BTreeSet<String> = posts
        .into_iter()
        .filter_map(|p| p.public.map(|f| f.cipher.0))
        .collect();

    info!(count = ciphers.len(), outfile = %args.outfile, "writing distinct public ciphers");
    let mut file = tokio::fs::File::create(&args.outfile).await?;
    for cipher in ciphers {
        file.write_all(cipher.as_bytes()).await?;
        file.write_all(b"\n").await?;
    }

    rt.persist().await?;
    Ok(())
}
