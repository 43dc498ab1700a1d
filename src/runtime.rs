use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::warn;
use tripcracker_cache::WebCache;
use tripcracker_core::{AppConfig, Links};
use tripcracker_entities::{classify, Board, WorkUnit, ALL_BOARDS};

use crate::cli::CommonArgs;
use crate::tree::TreeNode;

/// Cache and link configuration shared by every orchestrator, assembled once
/// from the config file plus whichever `CommonArgs` overrides the invoked
/// subcommand was given. `cache` is `Arc`-wrapped so worker closures can hold
/// their own handle while `persist` still runs against the same instance
/// after `join()`.
pub struct Runtime {
    pub cache: Arc<WebCache>,
    pub links: Links,
    pub threads: usize,
    cache_file: String,
    offline: bool,
}

impl Runtime {
    pub async fn new(common: &CommonArgs, config: &AppConfig) -> Self {
        let links = Links::new(
            config.links.page_host.clone(),
            config.links.api_host.clone(),
            common.https || config.links.https,
        );
        let cache = WebCache::new(
            config.general.max_retries,
            config.general.retry_lower_seconds,
            config.general.retry_upper_seconds,
        );
        let offline = common.offline || config.cache.offline;
        let cache_file = common
            .cache_file
            .clone()
            .unwrap_or_else(|| config.cache.cache_file.clone());

        cache.load(&cache_file).await;
        if offline {
            cache.set_offline_mode();
        } else {
            cache.set_online_mode();
        }

        Self {
            cache: Arc::new(cache),
            links,
            threads: common.threads.unwrap_or(config.pool.num_threads),
            cache_file,
            offline,
        }
    }

    /// Dumps the cache to disk unless running offline, per spec §2 ("loaded
    /// once at startup and dumped once at shutdown unless offline").
    pub async fn persist(&self) -> Result<()> {
        if self.offline {
            return Ok(());
        }
        if let Some(parent) = std::path::Path::new(&self.cache_file).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
        }
        self.cache.dump(&self.cache_file).await?;
        Ok(())
    }
}

/// Resolves CLI link arguments into crawl roots. Empty input defaults to
/// every board when `default_all_boards` is set (build-cache, dump-*);
/// otherwise it's a configuration error (crack requires at least one link).
pub fn work_unit_roots(
    links: &[String],
    link_cfg: &Links,
    default_all_boards: bool,
) -> Result<Vec<WorkUnit>> {
    if links.is_empty() {
        if default_all_boards {
            return Ok(ALL_BOARDS
                .iter()
                .map(|b| WorkUnit::Board(Board::new(*b)))
                .collect());
        }
        bail!("at least one link is required");
    }
    links
        .iter()
        .map(|l| classify(l, link_cfg).map_err(|e| anyhow::anyhow!(e)))
        .collect()
}

pub fn tree_roots(
    links: &[String],
    link_cfg: &Links,
    default_all_boards: bool,
) -> Result<Vec<TreeNode>> {
    work_unit_roots(links, link_cfg, default_all_boards).map(|units| {
        units
            .into_iter()
            .filter_map(|u| match u {
                WorkUnit::Board(b) => Some(TreeNode::Board(b)),
                WorkUnit::Page(p) => Some(TreeNode::Page(p)),
                WorkUnit::Thread(t) => Some(TreeNode::Thread(t)),
                WorkUnit::Post(_) => {
                    warn!("a link classified directly to a post has no tree expansion");
                    None
                }
            })
            .collect()
    })
}

pub fn load_config(path: &str) -> AppConfig {
    let text = std::fs::read_to_string(path).unwrap_or_else(|_| {
        warn!(path, "config file not found, using built-in defaults");
        include_str!("../config/default.toml").to_string()
    });
    toml::from_str(&text).unwrap_or_else(|e| {
        warn!(error = %e, "config file failed to parse, using built-in defaults");
        AppConfig::default()
    })
}
