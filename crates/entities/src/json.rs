use serde::Deserialize;

/// One page's worth of thread numbers from a board's catalog
/// (`GET /<board>/threads.json`).
#[derive(Debug, Deserialize)]
pub struct CatalogPage {
    pub page: u32,
    #[serde(default)]
    pub threads: Vec<serde_json::Value>,
}

/// A single page's thread listing (`GET /<board>/<page>.json`).
#[derive(Debug, Deserialize)]
pub struct PageListing {
    #[serde(default)]
    pub threads: Vec<ThreadStub>,
}

#[derive(Debug, Deserialize)]
pub struct ThreadStub {
    pub no: u64,
}

/// A thread's content (`GET /<board>/res/<id>.json` or `/thread/<id>.json`,
/// site convention-dependent).
#[derive(Debug, Default, Deserialize)]
pub struct ThreadJson {
    #[serde(default)]
    pub posts: Vec<RawPost>,
}

/// Known fields of a raw post, as emitted by the API. `trip` being absent
/// means the post carries no tripcode at all; `com`/`sub`/`email`/`filename`
/// feed the subsidiary n-gram and word extractors.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPost {
    pub no: u64,
    pub time: u64,
    #[serde(default)]
    pub trip: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub com: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}
