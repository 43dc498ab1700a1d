use tripcracker_cache::WebCache;
use tripcracker_core::{CrawlError, Links, Post};

use crate::board::Board;
use crate::page::Page;
use crate::thread::Thread;

/// The tagged union of entities a crawl's worker pool can carry, replacing
/// the original's dynamic `isinstance` dispatch with an explicit enum match
/// at the call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkUnit {
    Board(Board),
    Page(Page),
    Thread(Thread),
    Post(Post),
}

impl WorkUnit {
    /// Expands this unit one level, yielding its children. `Post` units have
    /// no children: calling `process` on one always yields an empty vec, since
    /// a post is a leaf the caller should route to solving instead.
    pub async fn process(
        &self,
        cache: &WebCache,
        links: &Links,
    ) -> Result<Vec<WorkUnit>, CrawlError> {
        match self {
            WorkUnit::Board(board) => board.process(cache, links).await,
            WorkUnit::Page(page) => page.process(cache, links).await,
            WorkUnit::Thread(thread) => thread.process(cache, links).await,
            WorkUnit::Post(_) => Ok(Vec::new()),
        }
    }
}
