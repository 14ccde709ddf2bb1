//! Feed data: posts, pagination cursor and post creation payloads.
//!
//! Rendering and playback are handled by the UI; only the data side lives here.

use serde::{Deserialize, Serialize};

use crate::ids::{PostId, UserId};

/// Default number of posts per feed page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub id: UserId,
    pub username: String,
}

/// Aggregate row returned by an embedded `count` select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRow {
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub video_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub user: Option<PostAuthor>,
    #[serde(default, rename = "nrOfLikes")]
    pub like_counts: Vec<CountRow>,
    #[serde(default, rename = "nrOfComments")]
    pub comment_counts: Vec<CountRow>,
    #[serde(default, rename = "nrOfShares")]
    pub share_counts: Vec<CountRow>,
}

fn total(rows: &[CountRow]) -> u64 {
    rows.iter().map(|row| row.count).sum()
}

/// Counters are zero when the select did not embed the relation.
impl Post {
    pub fn like_count(&self) -> u64 {
        total(&self.like_counts)
    }

    pub fn comment_count(&self) -> u64 {
        total(&self.comment_counts)
    }

    pub fn share_count(&self) -> u64 {
        total(&self.share_counts)
    }
}

/// Keyset page request: posts strictly older than `cursor`, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageRequest {
    pub cursor: Option<PostId>,
    pub limit: Option<u32>,
}

impl PageRequest {
    pub fn first(limit: u32) -> Self {
        Self {
            cursor: None,
            limit: Some(limit),
        }
    }

    pub fn after(cursor: PostId, limit: u32) -> Self {
        Self {
            cursor: Some(cursor),
            limit: Some(limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage {
    pub posts: Vec<Post>,
    pub next_cursor: Option<PostId>,
    pub has_more: bool,
}

impl FeedPage {
    /// Build a page from a backend response for a request of `limit` posts.
    ///
    /// A full page means more posts may follow; the cursor is the smallest id
    /// seen so the next request continues strictly below it.
    pub fn from_posts(posts: Vec<Post>, limit: u32) -> Self {
        let next_cursor = posts.iter().map(|post| post.id).min();
        let has_more = limit > 0 && posts.len() >= limit as usize;
        Self {
            posts,
            next_cursor,
            has_more,
        }
    }
}

/// Post submitted from the new-post screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub video_url: String,
    pub description: String,
}

/// Insert payload for the `posts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostInsert {
    pub video_url: String,
    pub description: String,
    pub user_id: UserId,
}
