use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use tripcracker_core::{CrawlError, RetryStrategy};

use crate::format::{self, CacheEntry};

/// Thread-safe HTTP fetch with conditional revalidation, zlib compression at
/// rest, single-file persistence, and an offline mode that serves only from
/// the cache.
///
/// A single mutex guards the whole map; only get/set of whole entries are
/// critical sections, and downloads themselves happen outside the lock — two
/// concurrent requests for the same missing key may both fetch, and the last
/// writer wins. This is deliberate: duplicates are rare in a fan-out crawl
/// and per-key singleflight coordination is not worth the cost here.
pub struct WebCache {
    map: Mutex<HashMap<String, CacheEntry>>,
    client: reqwest::Client,
    online: AtomicBool,
    max_attempts: u32,
    retry_lower: u64,
    retry_upper: u64,
}

impl WebCache {
    pub fn new(max_attempts: u32, retry_lower: u64, retry_upper: u64) -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
            client: reqwest::Client::new(),
            online: AtomicBool::new(true),
            max_attempts,
            retry_lower,
            retry_upper,
        }
    }

    pub fn set_online_mode(&self) {
        self.online.store(true, Ordering::SeqCst);
    }

    pub fn set_offline_mode(&self) {
        self.online.store(false, Ordering::SeqCst);
    }

    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn url_to_key(url: &Url) -> String {
        url.path().to_string()
    }

    /// Downloads the body at `url`, retrying transient failures with randomized
    /// backoff. Returns an empty body if the retry budget is exhausted.
    pub async fn download(&self, url: &Url, timeout: Option<Duration>) -> Vec<u8> {
        let mut retrier = RetryStrategy::new(self.max_attempts, self.retry_lower, self.retry_upper);
        let mut delay = retrier.seconds();

        loop {
            let Some(secs) = delay else {
                debug!(url = %url, "retry budget exhausted, giving up");
                return Vec::new();
            };
            if secs > 0 {
                debug!(url = %url, seconds = secs, "sleeping before retry");
                tokio::time::sleep(Duration::from_secs(secs)).await;
            }

            let attempt = if self.is_online() {
                self.download_online(url, timeout).await
            } else {
                self.download_offline(url).await
            };

            match attempt {
                Ok(body) => return body,
                Err(e) => {
                    warn!(url = %url, error = %e, "download attempt failed");
                    retrier.register_error(&e);
                }
            }

            delay = retrier.seconds();
        }
    }

    async fn download_online(
        &self,
        url: &Url,
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>, CrawlError> {
        let key = Self::url_to_key(url);
        let cached = {
            let map = self.map.lock().await;
            map.get(&key).cloned()
        };

        let mut request = self.client.get(url.clone());
        if let Some(t) = timeout {
            request = request.timeout(t);
        }
        if let Some(entry) = &cached {
            request = request.header("If-Modified-Since", entry.last_modified.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| CrawlError::Network(e.to_string()))?;

        if response.status().as_u16() == 304 {
            let entry = cached.ok_or_else(|| {
                CrawlError::Network("received 304 for an uncached key".to_string())
            })?;
            return inflate(&entry.body);
        }

        if !response.status().is_success() {
            return Err(CrawlError::HttpPermanent {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let last_modified = response
            .headers()
            .get("last-modified")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response
            .bytes()
            .await
            .map_err(|e| CrawlError::Network(e.to_string()))?
            .to_vec();

        let compressed = deflate(&body)?;
        {
            let mut map = self.map.lock().await;
            map.insert(
                key,
                CacheEntry {
                    last_modified,
                    body: compressed,
                },
            );
        }

        Ok(body)
    }

    async fn download_offline(&self, url: &Url) -> Result<Vec<u8>, CrawlError> {
        let key = Self::url_to_key(url);
        let map = self.map.lock().await;
        match map.get(&key) {
            Some(entry) => inflate(&entry.body),
            None => Err(CrawlError::NotInCache(key)),
        }
    }

    /// Populates the in-memory map from a serialized file. A missing or empty
    /// file is interpreted as an empty cache.
    pub async fn load(&self, path: impl AsRef<Path>) {
        let bytes = tokio::fs::read(path.as_ref()).await.unwrap_or_default();
        match format::decode(&bytes) {
            Ok(entries) => {
                let count = entries.len();
                *self.map.lock().await = entries;
                debug!(count, path = %path.as_ref().display(), "loaded cache");
            }
            Err(e) => {
                warn!(error = %e, path = %path.as_ref().display(), "failed to decode cache file, starting empty");
                self.map.lock().await.clear();
            }
        }
    }

    /// Persists the in-memory map using a self-describing, version-tagged binary
    /// format.
    pub async fn dump(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let bytes = {
            let map = self.map.lock().await;
            format::encode(&map)
        };
        tokio::fs::write(path, bytes).await
    }

    /// Returns a snapshot of the current map, primarily for tests asserting the
    /// cache's invariants.
    pub async fn snapshot(&self) -> HashMap<String, CacheEntry> {
        self.map.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.map.lock().await.len()
    }
}

fn deflate(body: &[u8]) -> Result<Vec<u8>, CrawlError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(body)
        .map_err(|e| CrawlError::Other(e.into()))?;
    encoder.finish().map_err(|e| CrawlError::Other(e.into()))
}

fn inflate(compressed: &[u8]) -> Result<Vec<u8>, CrawlError> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| CrawlError::Other(e.into()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offline_hit_returns_cached_body() {
        let cache = WebCache::new(3, 0, 0);
        cache.set_offline_mode();
        {
            let mut map = cache.map.lock().await;
            map.insert(
                "/v/".to_string(),
                CacheEntry {
                    last_modified: "L".to_string(),
                    body: deflate(b"X").unwrap(),
                },
            );
        }
        let url = Url::parse("http://host/v/").unwrap();
        assert_eq!(cache.download(&url, None).await, b"X".to_vec());
    }

    #[tokio::test]
    async fn offline_miss_gives_up_after_retries_with_empty_body() {
        let cache = WebCache::new(2, 0, 0);
        cache.set_offline_mode();
        let url = Url::parse("http://host/u/").unwrap();
        assert_eq!(cache.download(&url, None).await, Vec::<u8>::new());
    }

    #[tokio::test]
    async fn load_of_missing_file_is_an_empty_cache() {
        let cache = WebCache::new(3, 5, 15);
        cache.load("/nonexistent/path/does-not-exist.bin").await;
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn dump_then_load_round_trips_the_mapping() {
        let cache = WebCache::new(3, 5, 15);
        {
            let mut map = cache.map.lock().await;
            map.insert(
                "/g/".to_string(),
                CacheEntry {
                    last_modified: "L1".to_string(),
                    body: deflate(b"BODY").unwrap(),
                },
            );
        }

        let dir = std::env::temp_dir().join(format!(
            "tripcracker-cache-test-{}",
            std::process::id()
        ));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let file = dir.join("cache.bin");

        cache.dump(&file).await.unwrap();

        let reloaded = WebCache::new(3, 5, 15);
        reloaded.load(&file).await;

        assert_eq!(reloaded.snapshot().await, cache.snapshot().await);

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn key_is_strictly_the_path_component() {
        let a = Url::parse("http://host/g/?foo=bar#frag").unwrap();
        let b = Url::parse("http://host/g/").unwrap();
        assert_eq!(WebCache::url_to_key(&a), WebCache::url_to_key(&b));
    }
}
