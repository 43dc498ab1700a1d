use tracing::debug;
use tripcracker_cache::WebCache;
use tripcracker_core::{CrawlError, Links};
use url::Url;

use crate::json::PageListing;
use crate::thread::Thread;
use crate::work_unit::WorkUnit;

/// A board's page. Returns a JSON listing of thread summaries; `process()`
/// yields `Thread` entities for that page's board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub board: String,
    pub index: u32,
}

impl Page {
    pub fn new(board: impl Into<String>, index: u32) -> Self {
        Self {
            board: board.into(),
            index,
        }
    }

    pub fn url(&self, links: &Links) -> String {
        links.create_url(&format!("/{}/{}", self.board, self.index), None)
    }

    pub fn apiurl(&self, links: &Links) -> String {
        links.create_api_url(&format!("/{}/{}.json", self.board, self.index))
    }

    pub async fn process(
        &self,
        cache: &WebCache,
        links: &Links,
    ) -> Result<Vec<WorkUnit>, CrawlError> {
        let url = Url::parse(&self.apiurl(links)).map_err(|e| CrawlError::InvalidUrl(e.to_string()))?;
        let body = cache.download(&url, None).await;
        if body.is_empty() {
            debug!(board = %self.board, page = self.index, "empty page body, yielding zero threads");
            return Ok(Vec::new());
        }

        let listing: PageListing = match serde_json::from_slice(&body) {
            Ok(listing) => listing,
            Err(e) => {
                debug!(board = %self.board, page = self.index, error = %e, "page decode failed");
                return Ok(Vec::new());
            }
        };

        Ok(listing
            .threads
            .into_iter()
            .map(|stub| WorkUnit::Thread(Thread::new(self.board.clone(), stub.no)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_page_api_url() {
        let links = Links::default();
        let page = Page::new("g", 3);
        assert_eq!(page.apiurl(&links), "http://a.4cdn.org/g/3.json");
    }
}
