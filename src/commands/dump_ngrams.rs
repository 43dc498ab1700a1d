use std::collections::HashMap;

use anyhow::Result;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use tripcracker_entities::RawPost;
use tripcracker_extract::{ngrams, sanitize, tokenize};
use tripcracker_pool::{PoolOutcome, WorkerPool};

use crate::cli::DumpNgramsArgs;
use crate::runtime::{load_config, tree_roots, Runtime};
use crate::tree::TreeNode;

/// Walks the tree downloading every thread's full post listing and counts
/// `n`-sized token windows over each post's `com` field, writing the
/// frequency table most-frequent first.
pub async fn run(args: DumpNgramsArgs, config_path: &str) -> Result<()> {
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

    let mut counts: HashMap<Vec<String>, u64> = HashMap::new();
    for batch in batches {
        for raw in &batch {
            let Some(com) = raw.com.as_deref() else {
                continue;
            };
            let tokens = tokenize(&sanitize(com));
            for gram in ngrams(&tokens, args.n) {
                *counts.entry(gram).or_insert(0) += 1;
            }
        }
    }

    let mut ranked: Vec<(Vec<String>, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    info!(count = ranked.len(), outfile = %args.outfile, "writing n-gram frequency table");
    let mut file = tokio::fs::File::create(&args.outfile).await?;
    for (gram, count) in ranked {
        file.write_all(format!("{}\t{}\n", count, gram.join(" ")).as_bytes())
            .await?;
    }

    rt.persist().await?;
    Ok(())
}
