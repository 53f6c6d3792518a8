//! Query results.

use serde_json::Value;
use std::collections::VecDeque;

/// One page of query results.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage {
    /// Documents on this page.
    pub items: Vec<Value>,
    /// Zero-based page number.
    pub index: usize,
}

/// A finite, one-shot sequence of query results.
///
/// Results are handed out page by page ([`Feed::next_page`]) or document by
/// document through [`Iterator`]. A drained feed stays drained; re-issue the
/// query to read the results again.
#[derive(Debug)]
pub struct Feed {
    pages: VecDeque<FeedPage>,
    current: VecDeque<Value>,
}

impl Feed {
    /// Split `items` into pages of at most `page_limit` documents.
    ///
    /// `None` puts everything on one page.
    pub fn paged(items: Vec<Value>, page_limit: Option<usize>) -> Self {
        let mut pages = VecDeque::new();
        match page_limit {
            Some(limit) => {
                let mut items = items.into_iter().peekable();
                let mut index = 0;
                while items.peek().is_some() {
                    let page: Vec<Value> = items.by_ref().take(limit).collect();
                    pages.push_back(FeedPage { items: page, index });
                    index += 1;
                }
            }
            None => {
                if !items.is_empty() {
                    pages.push_back(FeedPage { items, index: 0 });
                }
            }
        }
        Self {
            pages,
            current: VecDeque::new(),
        }
    }

    /// An empty feed.
    pub fn empty() -> Self {
        Self::paged(Vec::new(), None)
    }

    /// Take the next whole page.
    ///
    /// Documents already pulled from a page through the iterator are not
    /// returned again.
    pub fn next_page(&mut self) -> Option<FeedPage> {
        self.pages.pop_front()
    }

    /// Pages not yet taken.
    pub fn remaining_pages(&self) -> usize {
        self.pages.len()
    }
}

impl Iterator for Feed {
    type Item = Value;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.pop_front() {
                return Some(item);
            }
            let page = self.pages.pop_front()?;
            self.current = page.items.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn docs(n: usize) -> Vec<Value> {
        (0..n).map(|i| json!({"id": i.to_string()})).collect()
    }

    #[test]
    fn test_unbounded_single_page() {
        let mut feed = Feed::paged(docs(5), None);
        assert_eq!(feed.remaining_pages(), 1);
        assert_eq!(feed.next_page().unwrap().items.len(), 5);
        assert!(feed.next_page().is_none());
    }

    #[test]
    fn test_paging() {
        let mut feed = Feed::paged(docs(5), Some(2));
        let sizes: Vec<_> = std::iter::from_fn(|| feed.next_page())
            .map(|p| (p.index, p.items.len()))
            .collect();
        assert_eq!(sizes, [(0, 2), (1, 2), (2, 1)]);
    }

    #[test]
    fn test_iterator_crosses_pages_once() {
        let mut feed = Feed::paged(docs(3), Some(2));
        let ids: Vec<_> = feed.by_ref().map(|d| d["id"].clone()).collect();
        assert_eq!(ids, [json!("0"), json!("1"), json!("2")]);
        assert!(feed.next().is_none());
    }

    #[test]
    fn test_empty() {
        let mut feed = Feed::empty();
        assert_eq!(feed.remaining_pages(), 0);
        assert!(feed.next().is_none());
    }
}
