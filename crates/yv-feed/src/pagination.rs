//! Keyset paginator shared by every listing view.

use std::future::Future;

use yv_models::{Keyed, Page, PageRequest};

/// Fetch one page through `fetch(cursor, limit)`.
///
/// `fetch` must return rows ordered by key descending, restricted to
/// `key < cursor` when a cursor is given. One extra row is requested to
/// detect whether another page exists; when it does, `next_cursor` is the
/// key of the last item returned here.
pub async fn fetch_page<T, E, F, Fut>(request: PageRequest, fetch: F) -> Result<Page<T>, E>
where
    T: Keyed,
    F: FnOnce(Option<i64>, usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let page_size = request.page_size.max(1);
    let mut items = fetch(request.cursor, page_size + 1).await?;

    let next_cursor = if items.len() > page_size {
        items.truncate(page_size);
        items.last().map(Keyed::key)
    } else {
        None
    };

    Ok(Page::new(items, next_cursor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(i64);

    impl Keyed for Item {
        fn key(&self) -> i64 {
            self.0
        }
    }

    /// Listing over keys `1..=n`, newest first.
    fn listing(n: i64) -> impl Fn(Option<i64>, usize) -> std::future::Ready<Result<Vec<Item>, Infallible>>
    {
        move |cursor, limit| {
            let items = (1..=n)
                .rev()
                .filter(|k| cursor.map_or(true, |c| *k < c))
                .take(limit)
                .map(Item)
                .collect();
            std::future::ready(Ok(items))
        }
    }

    #[tokio::test]
    async fn test_chaining_visits_every_item_once() {
        for total in [0, 1, 11, 12, 13, 24, 25, 100] {
            let fetch = listing(total);
            let mut seen = Vec::new();
            let mut cursor = None;
            loop {
                let page = fetch_page(PageRequest::after(cursor, 12), &fetch)
                    .await
                    .unwrap();
                assert!(page.items.len() <= 12);
                seen.extend(page.items.iter().map(|i| i.0));
                match page.next_cursor {
                    Some(next) => cursor = Some(next),
                    None => break,
                }
            }
            let expected: Vec<i64> = (1..=total).rev().collect();
            assert_eq!(seen, expected, "total = {total}");
        }
    }

    #[tokio::test]
    async fn test_exact_fit_has_no_cursor() {
        let page = fetch_page(PageRequest::first(5), listing(5)).await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert!(page.is_last());
    }

    #[tokio::test]
    async fn test_cursor_is_last_returned_key() {
        let page = fetch_page(PageRequest::first(3), listing(10)).await.unwrap();
        assert_eq!(page.items, vec![Item(10), Item(9), Item(8)]);
        assert_eq!(page.next_cursor, Some(8));
    }

    #[tokio::test]
    async fn test_requests_one_extra_row() {
        let page = fetch_page(PageRequest::first(4), |cursor, limit| async move {
            assert_eq!(cursor, None);
            assert_eq!(limit, 5);
            Ok::<_, Infallible>(Vec::<Item>::new())
        })
        .await
        .unwrap();
        assert!(page.items.is_empty());
    }
}
