//! Business logic use cases
//! 业务用例
//!
//! Record reads and writes go through the shared [`UserRecords`] cache so
//! that the navigation guard sees every change immediately.
//!
//! [`UserRecords`]: crate::records::UserRecords

pub mod create_post;
pub mod load_feed_page;
pub mod load_my_preferences;
pub mod load_my_profile;
pub mod onboarding;
pub mod update_gender;
pub mod update_gender_preference;

pub use create_post::{CreatePost, CreatePostError};
pub use load_feed_page::LoadFeedPage;
pub use load_my_preferences::LoadMyPreferences;
pub use load_my_profile::LoadMyProfile;
pub use onboarding::CompleteOnboardingStep;
pub use update_gender::UpdateGender;
pub use update_gender_preference::UpdateGenderPreference;

use rv_core::ports::FetchError;

/// Errors of the record use cases.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("no signed-in user")]
    NotAuthenticated,
    /// The write went through but no row came back, not even on re-read.
    #[error("no {0} row for the signed-in user")]
    MissingRecord(&'static str),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
