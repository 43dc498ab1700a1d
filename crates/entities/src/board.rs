use std::collections::BTreeSet;

use tracing::debug;
use tripcracker_cache::WebCache;
use tripcracker_core::{CrawlError, Links};
use url::Url;

use crate::json::CatalogPage;
use crate::page::Page;
use crate::work_unit::WorkUnit;

/// A board. Exposes a catalog endpoint returning page indices; `process()`
/// yields `Page` entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub name: String,
}

impl Board {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn url(&self, links: &Links) -> String {
        links.create_url(&format!("/{}/", self.name), None)
    }

    pub fn apiurl(&self, links: &Links) -> String {
        links.create_api_url(&format!("/{}/threads.json", self.name))
    }

    pub async fn process(
        &self,
        cache: &WebCache,
        links: &Links,
    ) -> Result<Vec<WorkUnit>, CrawlError> {
        let url = Url::parse(&self.apiurl(links)).map_err(|e| CrawlError::InvalidUrl(e.to_string()))?;
        let body = cache.download(&url, None).await;
        if body.is_empty() {
            debug!(board = %self.name, "empty catalog body, yielding zero pages");
            return Ok(Vec::new());
        }

        let pages: Vec<CatalogPage> = match serde_json::from_slice(&body) {
            Ok(pages) => pages,
            Err(e) => {
                debug!(board = %self.name, error = %e, "catalog decode failed");
                return Ok(Vec::new());
            }
        };

        let indices: BTreeSet<u32> = pages.iter().map(|p| p.page).collect();
        Ok(indices
            .into_iter()
            .map(|index| WorkUnit::Page(Page::new(self.name.clone(), index)))
            .collect())
    }
}

/// The site's full board list, allowing tripcodes (mirrors the original's
/// `all_boards`, used when an orchestrator is given zero links).
pub const ALL_BOARDS: &[&str] = &[
    "a", "b", "c", "d", "e", "f", "g", "gif", "h", "hr", "k", "m", "o", "p", "r", "s", "t", "u",
    "v", "vg", "vm", "vmg", "vr", "vrpg", "vst", "w", "wg", "i", "ic", "r9k", "s4s", "vip", "qa",
    "cm", "hm", "lgbt", "y", "3", "aco", "adv", "an", "bant", "biz", "cgl", "ck", "co", "diy",
    "fa", "fit", "gd", "int", "jp", "lit", "mlp", "mu", "n", "news", "out", "po", "pol", "pw",
    "qst", "sci", "soc", "sp", "tg", "toy", "trv", "tv", "vp", "vt", "wsg", "wsr", "x", "xs",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_catalog_api_url() {
        let links = Links::default();
        let board = Board::new("g");
        assert_eq!(
            board.apiurl(&links),
            "http://a.4cdn.org/g/threads.json"
        );
        assert_eq!(board.url(&links), "http://boards.4chan.org/g/");
    }
}
