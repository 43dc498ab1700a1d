use once_cell::sync::Lazy;
use regex::Regex;

/// Board path shorthand: `/g/`
pub static BOARD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/(\w+)/?$").unwrap());
/// Page path shorthand: `/g/12`
pub static PAGE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/(\w+)/(\d+)$").unwrap());
/// Thread path shorthand: `/g/res/12345`
pub static THREAD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/(\w+)/res/(\d+)$").unwrap());

/// Consolidates scheme/host selection for the site so toggling HTTPS at startup
/// is a single write instead of threading a flag through every entity.
#[derive(Debug, Clone)]
pub struct Links {
    pub https: bool,
    pub page_host: String,
    pub api_host: String,
}

impl Links {
    pub fn new(page_host: impl Into<String>, api_host: impl Into<String>, https: bool) -> Self {
        Self {
            https,
            page_host: page_host.into(),
            api_host: api_host.into(),
        }
    }

    fn scheme(&self) -> &'static str {
        if self.https {
            "https"
        } else {
            "http"
        }
    }

    /// Builds a URL against the page host, with an optional post fragment.
    pub fn create_url(&self, path: &str, fragment: Option<&str>) -> String {
        match fragment {
            Some(f) if !f.is_empty() => {
                format!("{}://{}{}#{}", self.scheme(), self.page_host, path, f)
            }
            _ => format!("{}://{}{}", self.scheme(), self.page_host, path),
        }
    }

    /// Builds a URL against the API host. No fragment.
    pub fn create_api_url(&self, path: &str) -> String {
        format!("{}://{}{}", self.scheme(), self.api_host, path)
    }
}

impl Default for Links {
    fn default() -> Self {
        Self::new("boards.4chan.org", "a.4cdn.org", false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_http_and_https_urls() {
        let mut links = Links::default();
        assert_eq!(links.create_url("/g/", None), "http://boards.4chan.org/g/");
        links.https = true;
        assert_eq!(
            links.create_api_url("/g/threads.json"),
            "https://a.4cdn.org/g/threads.json"
        );
    }

    #[test]
    fn builds_url_with_fragment() {
        let links = Links::default();
        assert_eq!(
            links.create_url("/g/res/123", Some("p456")),
            "http://boards.4chan.org/g/res/123#p456"
        );
    }

    #[test]
    fn classifies_paths_in_specificity_order() {
        assert!(THREAD_PATTERN.is_match("/g/res/123"));
        assert!(!THREAD_PATTERN.is_match("/g/123"));
        assert!(PAGE_PATTERN.is_match("/g/5"));
        assert!(BOARD_PATTERN.is_match("/g/"));
        assert!(BOARD_PATTERN.is_match("/g"));
    }
}
