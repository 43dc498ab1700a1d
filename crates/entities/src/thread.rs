use tracing::debug;
use tripcracker_cache::WebCache;
use tripcracker_core::{parse_trip, CrawlError, Links, Post};
use url::Url;

use crate::json::ThreadJson;
use crate::work_unit::WorkUnit;

/// A thread. `process()` downloads its full post listing and yields one
/// `Post` work unit per post that carries a tripcode; posts with no `trip`
/// field are discarded here rather than further down the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    pub board: String,
    pub id: u64,
}

impl Thread {
    pub fn new(board: impl Into<String>, id: u64) -> Self {
        Self {
            board: board.into(),
            id,
        }
    }

    pub fn url(&self, links: &Links) -> String {
        links.create_url(&format!("/{}/res/{}", self.board, self.id), None)
    }

    pub fn apiurl(&self, links: &Links) -> String {
        links.create_api_url(&format!("/{}/thread/{}.json", self.board, self.id))
    }

    /// Fetches and caches this thread's raw body without decoding it. Used by
    /// cache-warming passes that need the side effect of a cached entry but
    /// have no use for the parsed posts.
    pub async fn download(&self, cache: &WebCache, links: &Links) -> Result<(), CrawlError> {
        let url = Url::parse(&self.apiurl(links)).map_err(|e| CrawlError::InvalidUrl(e.to_string()))?;
        cache.download(&url, None).await;
        Ok(())
    }

    /// Downloads and decodes this thread's post listing, exposing raw fields
    /// (`com`, `sub`, `email`, `filename`) that `process()` discards but the
    /// n-gram and word extractors need. An empty body or a decode failure
    /// yields an empty listing rather than an error, matching `process()`.
    pub async fn download_and_decode(
        &self,
        cache: &WebCache,
        links: &Links,
    ) -> Result<ThreadJson, CrawlError> {
        let url = Url::parse(&self.apiurl(links)).map_err(|e| CrawlError::InvalidUrl(e.to_string()))?;
        let body = cache.download(&url, None).await;
        if body.is_empty() {
            debug!(board = %self.board, thread = self.id, "empty thread body, yielding zero posts");
            return Ok(ThreadJson::default());
        }

        match serde_json::from_slice(&body) {
            Ok(decoded) => Ok(decoded),
            Err(e) => {
                debug!(board = %self.board, thread = self.id, error = %e, "thread decode failed");
                Ok(ThreadJson::default())
            }
        }
    }

    pub async fn process(
        &self,
        cache: &WebCache,
        links: &Links,
    ) -> Result<Vec<WorkUnit>, CrawlError> {
        let decoded = self.download_and_decode(cache, links).await?;

        let mut units = Vec::new();
        for raw in decoded.posts {
            let Some(trip) = raw.trip.as_deref() else {
                continue;
            };
            let (public, secure) = parse_trip(trip);
            if public.is_none() && secure.is_none() {
                continue;
            }

            let name = raw
                .name
                .as_deref()
                .map(html_escape::decode_html_entities)
                .map(|c| c.into_owned())
                .unwrap_or_default();

            units.push(WorkUnit::Post(Post {
                name,
                time: raw.time,
                board: self.board.clone(),
                thread: self.id,
                post: raw.no,
                public,
                secure,
            }));
        }
        Ok(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_thread_api_url() {
        let links = Links::default();
        let thread = Thread::new("g", 555);
        assert_eq!(
            thread.apiurl(&links),
            "http://a.4cdn.org/g/thread/555.json"
        );
    }
}
