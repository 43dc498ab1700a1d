//! The interior of the crawl tree (`Board`/`Page`/`Thread`) without the
//! `Post` leaf tier, for orchestrators that need every raw post on a thread
//! rather than only the tripcode-bearing subset `WorkUnit`/`Thread::process`
//! narrows down to (`dump-words`, `dump-ngrams`, `build-cache`).

use tripcracker_core::{CrawlError, Links};
use tripcracker_entities::{Board, Page, Thread, WorkUnit};

#[derive(Debug, Clone)]
pub enum TreeNode {
    Board(Board),
    Page(Page),
    Thread(Thread),
}

impl TreeNode {
    /// Expands one level. `Thread` is a leaf here: callers decide whether to
    /// `download` (cache side effect only) or `download_and_decode` (keep the
    /// raw posts) themselves, since the two orchestrator families that use
    /// this tree want different things from a thread.
    pub async fn children(
        &self,
        cache: &tripcracker_cache::WebCache,
        links: &Links,
    ) -> Result<Vec<TreeNode>, CrawlError> {
        match self {
            TreeNode::Board(board) => Ok(board
                .process(cache, links)
                .await?
                .into_iter()
                .filter_map(as_page)
                .collect()),
            TreeNode::Page(page) => Ok(page
                .process(cache, links)
                .await?
                .into_iter()
                .filter_map(as_thread)
                .collect()),
            TreeNode::Thread(_) => Ok(Vec::new()),
        }
    }
}

fn as_page(unit: WorkUnit) -> Option<TreeNode> {
    match unit {
        WorkUnit::Page(p) => Some(TreeNode::Page(p)),
        _ => None,
    }
}

fn as_thread(unit: WorkUnit) -> Option<TreeNode> {
    match unit {
        WorkUnit::Thread(t) => Some(TreeNode::Thread(t)),
        _ => None,
    }
}
