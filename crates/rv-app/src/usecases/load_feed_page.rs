//! Use case for paging through the video feed

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info_span, Instrument};

use rv_core::feed::{FeedPage, PageRequest};
use rv_core::ports::{FetchError, PostsPort};
use rv_core::PostId;

#[derive(Debug, Default)]
struct Cursor {
    next: Option<PostId>,
    exhausted: bool,
}

/// Keyset pagination over posts, newest first.
///
/// Remembers where the last page ended; `next_page` continues strictly below
/// it until a short page signals the end of the feed.
pub struct LoadFeedPage {
    posts: Arc<dyn PostsPort>,
    page_size: u32,
    cursor: Mutex<Cursor>,
}

impl LoadFeedPage {
    pub fn new(posts: Arc<dyn PostsPort>, page_size: u32) -> Self {
        Self {
            posts,
            page_size,
            cursor: Mutex::new(Cursor::default()),
        }
    }

    /// Load the newest posts and restart pagination from there.
    pub async fn first_page(&self) -> Result<FeedPage, FetchError> {
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner) = Cursor::default();
        self.load(PageRequest::first(self.page_size)).await
    }

    /// Load the page after the last one returned. `None` once the feed is
    /// exhausted.
    pub async fn next_page(&self) -> Result<Option<FeedPage>, FetchError> {
        let request = {
            let cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
            match (cursor.exhausted, cursor.next) {
                (true, _) => return Ok(None),
                (false, Some(next)) => PageRequest::after(next, self.page_size),
                (false, None) => PageRequest::first(self.page_size),
            }
        };
        self.load(request).await.map(Some)
    }

    async fn load(&self, request: PageRequest) -> Result<FeedPage, FetchError> {
        let span = info_span!("usecase.load_feed_page.execute", cursor = ?request.cursor);
        async {
            let posts = self.posts.fetch_posts(request).await?;
            let page = FeedPage::from_posts(posts, self.page_size);
            debug!(count = page.posts.len(), has_more = page.has_more, "feed page loaded");

            let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
            cursor.next = page.next_cursor.or(cursor.next);
            cursor.exhausted = !page.has_more;
            Ok(page)
        }
        .instrument(span)
        .await
    }
}
