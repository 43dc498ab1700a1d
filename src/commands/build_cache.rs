use anyhow::Result;
use tracing::{info, warn};
use tripcracker_pool::{PoolOutcome, WorkerPool};

use crate::cli::BuildCacheArgs;
use crate::runtime::{load_config, tree_roots, Runtime};
use crate::tree::TreeNode;

/// Walks the whole tree purely for the cache side effect: every thread is
/// fetched (`Thread::download`) but never decoded, and nothing is collected.
pub async fn run(args: BuildCacheArgs, config_path: &str) -> Result<()> {
    let config = load_config(config_path);
    let rt = Runtime::new(&args.common, &config).await;
    let roots = tree_roots(&args.links, &rt.links, true)?;

    let cache = rt.cache.clone();
    let links = rt.links.clone();
    let pool: WorkerPool<TreeNode, ()> = WorkerPool::new(rt.threads, move |node| {
        let cache = cache.clone();
        let links = links.clone();
        async move {
            match &node {
                TreeNode::Thread(thread) => {
                    if let Err(e) = thread.download(&cache, &links).await {
                        warn!(error = %e, "thread fetch failed");
                    }
                    PoolOutcome::Empty
                }
                _ => match node.children(&cache, &links).await {
                    Ok(children) => PoolOutcome::Spawn(children),
                    Err(e) => {
                        warn!(error = %e, "node expansion failed");
                        PoolOutcome::Empty
                    }
                },
            }
        }
    });

    for root in roots {
        pool.push(root).await;
    }
    pool.join().await;
    pool.close().await;

    info!("cache build complete");
    rt.persist().await?;
    Ok(())
}
