//! Use case for publishing a post
//! 发布视频帖子

use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use rv_core::feed::{NewPost, PostInsert};
use rv_core::ports::{FetchError, PostsPort};
use rv_core::validation::ValidationError;

use crate::session::SessionContext;

#[derive(Debug, thiserror::Error)]
pub enum CreatePostError {
    #[error("invalid post: {0}")]
    Validation(#[from] ValidationError),
    #[error("no signed-in user")]
    NotAuthenticated,
    #[error("post insert failed: {0}")]
    Fetch(#[from] FetchError),
}

/// Inserts a post that references an already uploaded video.
pub struct CreatePost {
    session: Arc<SessionContext>,
    posts: Arc<dyn PostsPort>,
}

impl CreatePost {
    pub fn new(session: Arc<SessionContext>, posts: Arc<dyn PostsPort>) -> Self {
        Self { session, posts }
    }

    pub async fn execute(&self, post: NewPost) -> Result<(), CreatePostError> {
        if post.video_url.trim().is_empty() {
            return Err(ValidationError::MissingField("video_url").into());
        }
        let user = self
            .session
            .current_user()
            .ok_or(CreatePostError::NotAuthenticated)?;
        let span = info_span!("usecase.create_post.execute", user_id = %user.id);

        async {
            self.posts
                .create_post(&PostInsert {
                    video_url: post.video_url,
                    description: post.description,
                    user_id: user.id.clone(),
                })
                .await?;
            info!("post created");
            Ok(())
        }
        .instrument(span)
        .await
    }
}
