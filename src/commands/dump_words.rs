use std::collections::BTreeSet;

use anyhow::Result;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use tripcracker_entities::RawPost;
use tripcracker_extract::{words, PostFields};
use tripcracker_pool::{PoolOutcome, WorkerPool};

use crate::cli::DumpWordsArgs;
use crate::runtime::{load_config, tree_roots, Runtime};
use crate::tree::TreeNode;

/// Walks the tree downloading every thread's full post listing (not just the
/// tripcode-bearing subset) and sweeps `name`/`email`/`sub`/`com`/`filename`
/// on each post for candidate dictionary words.
pub async fn run(args: DumpWordsArgs, config_path: &str) -> Result<()> {
    let config = load_config(config_path);
    let rt = Runtime::new(&args.common, &config).await;
    let roots = tree_roots(&args.links, &rt.links, true)?;

    let cache = rt.cache.clone();
    let links = rt.links.clone();
    let pool: WorkerPool<TreeNode, Vec<RawPost>> = WorkerPool::new(rt.threads, move |node| {
        let cache = cache.clone();
        let links = links.clone();
        async move {
            match &node {
                TreeNode::Thread(thread) => match thread.download_and_decode(&cache, &links).await
                {
                    Ok(decoded) => PoolOutcome::Done(decoded.posts),
                    Err(e) => {
                        warn!(error = %e, "thread fetch failed");
                        PoolOutcome::Empty
                    }
                },
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
    let batches = pool.get_results().await;
    pool.close().await;

    let mut found: BTreeSet<String> = BTreeSet::new();
    for batch in batches {
        for raw in &batch {
            found.extend(words(&PostFields::from(raw)));
        }
    }

    info!(count = found.len(), outfile = %args.outfile, "writing candidate words");
    let mut file = tokio::fs::File::create(&args.outfile).await?;
    for word in found {
        file.write_all(word.as_bytes()).await?;
        file.write_all(b"\n").await?;
    }

    rt.persist().await?;
    Ok(())
}
