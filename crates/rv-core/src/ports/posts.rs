use async_trait::async_trait;

use crate::feed::{PageRequest, Post, PostInsert};
use crate::ports::errors::FetchError;

#[async_trait]
pub trait PostsPort: Send + Sync {
    /// Posts newest first, strictly older than `page.cursor` when set.
    async fn fetch_posts(&self, page: PageRequest) -> Result<Vec<Post>, FetchError>;

    async fn create_post(&self, post: &PostInsert) -> Result<(), FetchError>;
}
