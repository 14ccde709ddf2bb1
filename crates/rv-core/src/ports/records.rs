//! Row access for the two records consulted by the navigation guard.

use async_trait::async_trait;

use crate::ids::UserId;
use crate::ports::errors::FetchError;
use crate::preferences::Preferences;
use crate::profile::{Gender, NewProfile, Profile};

#[async_trait]
pub trait ProfileRepositoryPort: Send + Sync {
    /// `Ok(None)` when the row does not exist.
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, FetchError>;

    async fn create_profile(&self, profile: &NewProfile) -> Result<(), FetchError>;

    /// Set the gender (possibly to "not specified") and mark the step done.
    /// Returns the updated row.
    async fn update_gender(
        &self,
        user_id: &UserId,
        gender: Option<Gender>,
    ) -> Result<Option<Profile>, FetchError>;
}

#[async_trait]
pub trait PreferencesRepositoryPort: Send + Sync {
    /// `Ok(None)` when the row does not exist.
    async fn get_preferences(&self, user_id: &UserId) -> Result<Option<Preferences>, FetchError>;

    /// Insert the row when missing, update it otherwise, and mark the step
    /// done. Returns the stored row.
    async fn upsert_gender_preference(
        &self,
        user_id: &UserId,
        gender_preference: Option<Gender>,
    ) -> Result<Option<Preferences>, FetchError>;
}
