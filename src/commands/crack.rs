use anyhow::Result;
use tracing::{info, warn};
use tripcracker_core::{Post, SortedSet};
use tripcracker_entities::WorkUnit;
use tripcracker_pool::{PoolOutcome, WorkerPool};
use tripcracker_solver::{Solver, SqliteSolver};

use crate::cli::CrackArgs;
use crate::runtime::{load_config, work_unit_roots, Runtime};

/// Walks the tree collecting tripcode-bearing posts, then solves every
/// fragment against the public/secure reverse-lookup databases and prints
/// the ones that came back fully solved, sorted by post time.
pub async fn run(args: CrackArgs, config_path: &str) -> Result<()> {
    if args.links.is_empty() {
        anyhow::bail!("crack requires at least one link");
    }

    let config = load_config(config_path);
    let rt = Runtime::new(&args.common, &config).await;
    let roots = work_unit_roots(&args.links, &rt.links, false)?;

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

    info!(count = posts.len(), "collected tripcode-bearing posts");

    let mut dedup: SortedSet<Post> = SortedSet::new();
    dedup.update(posts);

    let public_db = args
        .public_tripcode_db
        .unwrap_or_else(|| config.solver.public_db.clone());
    let secure_db = args
        .secure_tripcode_db
        .unwrap_or_else(|| config.solver.secure_db.clone());
    let public_solver = SqliteSolver::open(&public_db)?;
    let secure_solver = SqliteSolver::open(&secure_db)?;

    let mut solved = Vec::new();
    for mut post in dedup.into_vec() {
        if let Some(fragment) = post.public.as_mut() {
            fragment.solve(public_solver.solve(&fragment.cipher).await?);
        }
        if let Some(fragment) = post.secure.as_mut() {
            fragment.solve(secure_solver.solve(&fragment.cipher).await?);
        }
        if post.solved() {
            solved.push(post);
        }
    }
    solved.sort_by_key(|p| p.time);

    for post in &solved {
        let public = post
            .public
            .as_ref()
            .and_then(|f| f.key.as_deref())
            .unwrap_or("-");
        let secure = post
            .secure
            .as_ref()
            .and_then(|f| f.key.as_deref())
            .unwrap_or("-");
        println!(
            "{}\t/{}/{}\t{}\tpublic={}\tsecure={}",
            post.time, post.board, post.thread, post.name, public, secure
        );
    }

    rt.persist().await?;
    Ok(())
}
