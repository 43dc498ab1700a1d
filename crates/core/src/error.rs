use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("network error: {0}")]
    Network(String),

    #[error("timeout after {0}s")]
    Timeout(u64),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("not in cache: {0}")]
    NotInCache(String),

    #[error("http {status} for {url}")]
    HttpPermanent { status: u16, url: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CrawlError {
    /// True for errors a `RetryStrategy` should never retry.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CrawlError::HttpPermanent { .. } | CrawlError::NotInCache(_) | CrawlError::InvalidUrl(_)
        )
    }
}
