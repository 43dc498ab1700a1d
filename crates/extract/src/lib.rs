use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use tripcracker_entities::RawPost;

static LINE_BREAK_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<br>").unwrap());
static HTML_TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").unwrap());
static POST_REF_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r">>\d+").unwrap());
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9]\S*[A-Za-z0-9]|[A-Za-z0-9]").unwrap());
static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\s#]+").unwrap());

/// The raw per-post fields the word extractor sweeps, mirroring
/// `dump_words.py`'s five-field loop.
#[derive(Debug, Default, Clone)]
pub struct PostFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub sub: Option<String>,
    pub com: Option<String>,
    pub filename: Option<String>,
}

impl From<&RawPost> for PostFields {
    fn from(post: &RawPost) -> Self {
        Self {
            name: post.name.clone(),
            email: post.email.clone(),
            sub: post.sub.clone(),
            com: post.com.clone(),
            filename: post.filename.clone(),
        }
    }
}

/// Strips `<br>` to newlines, strips every other tag, unescapes HTML
/// entities, then strips `>>123456` post references. Pure and stateless —
/// safe to call from any number of worker threads without synchronization.
pub fn sanitize(html: &str) -> String {
    let stripped = LINE_BREAK_PATTERN.replace_all(html, "\n");
    let stripped = HTML_TAG_PATTERN.replace_all(&stripped, "");
    let unescaped = html_escape::decode_html_entities(&stripped);
    POST_REF_PATTERN.replace_all(&unescaped, "").into_owned()
}

/// Lowercases and splits sanitized text into alphanumeric-bounded runs.
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Sliding-window n-grams over a token sequence. Yields nothing if there are
/// fewer than `n` tokens.
pub fn ngrams(tokens: &[String], n: usize) -> impl Iterator<Item = Vec<String>> + '_ {
    let windows = if n == 0 || n > tokens.len() {
        0
    } else {
        tokens.len() - n + 1
    };
    (0..windows).map(move |i| tokens[i..i + n].to_vec())
}

/// Sanitizes and splits `name`/`email`/`sub`/`com`/`filename` on
/// whitespace/`#`, mirroring `dump_words.py`'s five-field sweep used to
/// build tripcode-candidate dictionaries.
pub fn words(post_fields: &PostFields) -> HashSet<String> {
    let mut found = HashSet::new();
    for field in [
        &post_fields.name,
        &post_fields.email,
        &post_fields.sub,
        &post_fields.com,
        &post_fields.filename,
    ] {
        let Some(contents) = field else { continue };
        let sanitized = sanitize(contents);
        for m in WORD_PATTERN.find_iter(&sanitized) {
            found.insert(m.as_str().to_string());
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_converts_breaks_strips_tags_and_refs() {
        let html = "hello<br>world &amp; <b>friends</b> &gt;&gt;123456 done";
        assert_eq!(sanitize(html), "hello\nworld & friends  done");
    }

    #[test]
    fn tokenize_lowercases_and_splits_on_whitespace() {
        assert_eq!(
            tokenize("Hello World 123"),
            vec!["hello".to_string(), "world".to_string(), "123".to_string()]
        );
    }

    #[test]
    fn ngrams_slides_a_window_of_size_n() {
        let tokens = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let grams: Vec<_> = ngrams(&tokens, 2).collect();
        assert_eq!(
            grams,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["b".to_string(), "c".to_string()],
            ]
        );
    }

    #[test]
    fn ngrams_of_n_greater_than_token_count_yields_nothing() {
        let tokens = vec!["a".to_string()];
        assert_eq!(ngrams(&tokens, 3).count(), 0);
    }

    #[test]
    fn words_sweeps_all_five_fields() {
        let fields = PostFields {
            name: Some("Anonymous".to_string()),
            email: Some("sage".to_string()),
            sub: None,
            com: Some("some text here".to_string()),
            filename: None,
        };
        let found = words(&fields);
        assert!(found.contains("Anonymous"));
        assert!(found.contains("sage"));
        assert!(found.contains("some"));
        assert!(found.contains("text"));
        assert!(found.contains("here"));
    }
}
