//! Keyset pages.
//!
//! Listings are ordered by a strictly increasing integer key, newest first.
//! A cursor is the key of the last item the client has already seen; the
//! next page holds the items with a smaller key.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Item with a keyset ordering key.
pub trait Keyed {
    fn key(&self) -> i64;
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Present only when more items exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<i64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<i64>) -> Self {
        Self { items, next_cursor }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Request for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor: Option<i64>,
    pub page_size: usize,
}

impl PageRequest {
    pub fn first(page_size: usize) -> Self {
        Self {
            cursor: None,
            page_size,
        }
    }

    pub fn after(cursor: Option<i64>, page_size: usize) -> Self {
        Self { cursor, page_size }
    }
}

/// Lenient cursor parsing: anything other than a positive integer means
/// "start from the top".
pub fn parse_cursor(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|c| *c > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cursor() {
        assert_eq!(parse_cursor(Some("42")), Some(42));
        assert_eq!(parse_cursor(Some(" 7 ")), Some(7));
        assert_eq!(parse_cursor(Some("abc")), None);
        assert_eq!(parse_cursor(Some("0")), None);
        assert_eq!(parse_cursor(Some("-3")), None);
        assert_eq!(parse_cursor(Some("")), None);
        assert_eq!(parse_cursor(None), None);
    }

    #[test]
    fn test_last_page_omits_cursor() {
        let page: Page<i64> = Page::new(vec![3, 2, 1], None);
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("next_cursor").is_none());

        let page: Page<i64> = Page::new(vec![5, 4], Some(4));
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["next_cursor"], 4);
    }
}
