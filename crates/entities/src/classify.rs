use tripcracker_core::{CrawlError, Links, BOARD_PATTERN, PAGE_PATTERN, THREAD_PATTERN};

use crate::board::Board;
use crate::page::Page;
use crate::thread::Thread;
use crate::work_unit::WorkUnit;

/// Classifies a link (a full URL or a bare `/board/...` shorthand) into the
/// most specific `WorkUnit` it matches. Patterns are tried thread, then
/// page, then board, since a page path is a strict prefix shape of a board
/// path and must be checked first.
pub fn classify(link: &str, _links: &Links) -> Result<WorkUnit, CrawlError> {
    let path = path_component(link);

    if let Some(caps) = THREAD_PATTERN.captures(&path) {
        let board = caps.get(1).unwrap().as_str().to_string();
        let id: u64 = caps
            .get(2)
            .unwrap()
            .as_str()
            .parse()
            .map_err(|_| CrawlError::InvalidUrl(link.to_string()))?;
        return Ok(WorkUnit::Thread(Thread::new(board, id)));
    }

    if let Some(caps) = PAGE_PATTERN.captures(&path) {
        let board = caps.get(1).unwrap().as_str().to_string();
        let index: u32 = caps
            .get(2)
            .unwrap()
            .as_str()
            .parse()
            .map_err(|_| CrawlError::InvalidUrl(link.to_string()))?;
        return Ok(WorkUnit::Page(Page::new(board, index)));
    }

    if let Some(caps) = BOARD_PATTERN.captures(&path) {
        let board = caps.get(1).unwrap().as_str().to_string();
        return Ok(WorkUnit::Board(Board::new(board)));
    }

    Err(CrawlError::InvalidUrl(link.to_string()))
}

/// Strips scheme and host from a link that looks like a full URL, leaving a
/// bare shorthand untouched so both forms feed the same patterns.
fn path_component(link: &str) -> String {
    if let Ok(parsed) = url::Url::parse(link) {
        let mut path = parsed.path().to_string();
        if path.len() > 1 && path.ends_with('/') {
            path.pop();
        }
        path
    } else {
        let mut path = link.to_string();
        if path.len() > 1 && path.ends_with('/') {
            path.pop();
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_a_full_thread_url() {
        let links = Links::default();
        let unit = classify("http://boards.4chan.org/g/res/123", &links).unwrap();
        assert_eq!(unit, WorkUnit::Thread(Thread::new("g", 123)));
    }

    #[test]
    fn classifies_a_bare_page_shorthand() {
        let links = Links::default();
        let unit = classify("/g/5", &links).unwrap();
        assert_eq!(unit, WorkUnit::Page(Page::new("g", 5)));
    }

    #[test]
    fn classifies_a_board_shorthand_with_trailing_slash() {
        let links = Links::default();
        let unit = classify("/g/", &links).unwrap();
        assert_eq!(unit, WorkUnit::Board(Board::new("g")));
    }

    #[test]
    fn rejects_an_unrecognized_shape() {
        let links = Links::default();
        assert!(classify("/g/res/abc", &links).is_err());
    }
}
