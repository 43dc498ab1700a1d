use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix pattern for the public (DES-derived) tripcode: `!` followed by 10 chars.
pub static PUBLIC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^!([./0-9A-Za-z]{10})").unwrap());
/// Infix pattern for the secure (SHA1-derived) tripcode: `!!` followed by 10 chars.
pub static SECURE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!!([./0-9A-Za-z]{10})").unwrap());

/// The ten-character rendered form of a tripcode as it appears on the site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cipher(pub String);

impl std::fmt::Display for Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tripcode fragment found in a post's `trip` field, with an optional solved key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripFragment {
    pub cipher: Cipher,
    pub key: Option<String>,
}

impl TripFragment {
    pub fn new(cipher: impl Into<String>) -> Self {
        Self {
            cipher: Cipher(cipher.into()),
            key: None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(&self.key, Some(k) if !k.is_empty())
    }

    pub fn solve(&mut self, phrase: Option<String>) {
        self.key = phrase;
    }
}

/// Extract the public and secure fragments from a raw `trip` string, if present.
pub fn parse_trip(trip: &str) -> (Option<TripFragment>, Option<TripFragment>) {
    let public = PUBLIC_PATTERN
        .captures(trip)
        .map(|c| TripFragment::new(c.get(1).unwrap().as_str()));
    let secure = SECURE_PATTERN
        .captures(trip)
        .map(|c| TripFragment::new(c.get(1).unwrap().as_str()));
    (public, secure)
}

/// An immutable record for a post that carries at least one tripcode fragment.
#[derive(Debug, Clone)]
pub struct Post {
    pub name: String,
    pub time: u64,
    pub board: String,
    pub thread: u64,
    pub post: u64,
    pub public: Option<TripFragment>,
    pub secure: Option<TripFragment>,
}

impl Post {
    /// True iff every present fragment has a non-empty solved key.
    pub fn solved(&self) -> bool {
        self.public.as_ref().map_or(true, TripFragment::is_solved)
            && self.secure.as_ref().map_or(true, TripFragment::is_solved)
    }

    fn identity(&self) -> (&str, u64, u64) {
        (&self.board, self.thread, self.post)
    }
}

impl PartialEq for Post {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}
impl Eq for Post {}

impl PartialOrd for Post {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Post {
    /// Ordered by the same `(board, thread, post)` identity as `Eq`, so a `SortedSet<Post>`
    /// dedups on exactly that identity. Callers that need time order (the cracker's final
    /// output) sort explicitly by `time` after dedup instead of relying on this impl.
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_fragments_from_one_trip() {
        let (public, secure) = parse_trip("!ABCDEFGHIJ!!0123456789");
        assert_eq!(public.unwrap().cipher.0, "ABCDEFGHIJ");
        assert_eq!(secure.unwrap().cipher.0, "0123456789");
    }

    #[test]
    fn parses_public_only() {
        let (public, secure) = parse_trip("!ABCDEFGHIJ");
        assert!(public.is_some());
        assert!(secure.is_none());
    }

    #[test]
    fn mismatched_trip_yields_neither_fragment() {
        let (public, secure) = parse_trip("not a trip");
        assert!(public.is_none());
        assert!(secure.is_none());
    }

    fn make_post(public_key: Option<&str>, secure_key: Option<&str>) -> Post {
        Post {
            name: "anon".into(),
            time: 0,
            board: "g".into(),
            thread: 1,
            post: 1,
            public: public_key.map(|k| {
                let mut f = TripFragment::new("ABCDEFGHIJ");
                f.solve(Some(k.to_string()));
                f
            }),
            secure: secure_key.map(|k| {
                let mut f = TripFragment::new("0123456789");
                f.solve(Some(k.to_string()));
                f
            }),
        }
    }

    #[test]
    fn solved_requires_every_present_fragment_solved() {
        let mut post = make_post(Some("secret"), None);
        post.secure = Some(TripFragment::new("0123456789"));
        assert!(!post.solved());

        let post = make_post(Some("secret"), None);
        assert!(post.solved());
    }

    #[test]
    fn eq_and_ord_agree_on_identity_regardless_of_time() {
        let mut a = make_post(None, None);
        let mut b = make_post(None, None);
        a.time = 100;
        b.time = 200;
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);

        b.post = 2;
        assert_ne!(a, b);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }
}
