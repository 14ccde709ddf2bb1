//! Cached records of the signed-in user.
//!
//! Holds the profile and preferences query cells shared by the navigation
//! guard and the onboarding use cases, and starts loading them whenever a
//! user signs in.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tracing::{debug, info_span, warn, Instrument};

use rv_core::ports::{FetchError, PreferencesRepositoryPort, ProfileRepositoryPort};
use rv_core::profile::Gender;
use rv_core::{AuthStatus, Preferences, Profile, Remote, SessionSnapshot, UserId};

use crate::query::{QueryCell, QueryOptions};
use crate::session::SessionObserver;

pub struct UserRecords {
    profiles: Arc<dyn ProfileRepositoryPort>,
    preferences: Arc<dyn PreferencesRepositoryPort>,
    profile: QueryCell<Option<Profile>>,
    prefs: QueryCell<Option<Preferences>>,
    owner: Mutex<Option<UserId>>,
}

impl UserRecords {
    pub fn new(
        profiles: Arc<dyn ProfileRepositoryPort>,
        preferences: Arc<dyn PreferencesRepositoryPort>,
        options: QueryOptions,
    ) -> Self {
        Self {
            profiles,
            preferences,
            profile: QueryCell::new("my-profile", options),
            prefs: QueryCell::new("my-preferences", options),
            owner: Mutex::new(None),
        }
    }

    pub fn profile_state(&self) -> Remote<Option<Profile>> {
        self.profile.snapshot()
    }

    pub fn preferences_state(&self) -> Remote<Option<Preferences>> {
        self.prefs.snapshot()
    }

    pub async fn load_profile(&self, user_id: &UserId) -> Result<Option<Profile>, FetchError> {
        self.profile
            .get_or_fetch(|| self.profiles.get_profile(user_id))
            .await
    }

    pub async fn load_preferences(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Preferences>, FetchError> {
        self.prefs
            .get_or_fetch(|| self.preferences.get_preferences(user_id))
            .await
    }

    /// Fetch both records concurrently unless they are fresh.
    ///
    /// Failures end up in the cells; the guard turns them into a retry prompt.
    pub async fn load(&self, user_id: &UserId) {
        let (profile, preferences) =
            tokio::join!(self.load_profile(user_id), self.load_preferences(user_id));
        debug!(
            profile_ok = profile.is_ok(),
            preferences_ok = preferences.is_ok(),
            "records loaded"
        );
    }

    /// Refetch both records, ignoring freshness.
    pub async fn refetch(&self, user_id: &UserId) {
        let (profile, preferences) = tokio::join!(
            self.profile.fetch(|| self.profiles.get_profile(user_id)),
            self.prefs
                .fetch(|| self.preferences.get_preferences(user_id)),
        );
        debug!(
            profile_ok = profile.is_ok(),
            preferences_ok = preferences.is_ok(),
            "records refetched"
        );
    }

    /// Write the gender answer with an optimistic cache update.
    ///
    /// When the backend does not echo the row back, the profile is re-read so
    /// that the cache always ends on server truth.
    pub async fn update_gender(
        &self,
        user_id: &UserId,
        gender: Option<Gender>,
    ) -> Result<Option<Profile>, FetchError> {
        self.profile
            .mutate_optimistic(
                |current| current.as_ref().map(|profile| profile.with_gender(gender)),
                async {
                    match self.profiles.update_gender(user_id, gender).await? {
                        Some(updated) => Ok(Some(updated)),
                        None => self.profiles.get_profile(user_id).await,
                    }
                },
            )
            .await
    }

    /// Insert or update the gender preference with an optimistic cache update.
    pub async fn update_gender_preference(
        &self,
        user_id: &UserId,
        gender_preference: Option<Gender>,
    ) -> Result<Option<Preferences>, FetchError> {
        self.prefs
            .mutate_optimistic(
                |current| {
                    Some(Preferences::projected(
                        current.as_ref(),
                        user_id,
                        gender_preference,
                    ))
                },
                async {
                    match self
                        .preferences
                        .upsert_gender_preference(user_id, gender_preference)
                        .await?
                    {
                        Some(updated) => Ok(Some(updated)),
                        None => self.preferences.get_preferences(user_id).await,
                    }
                },
            )
            .await
    }

    /// Drop cached records and any in-flight results.
    pub fn clear(&self) {
        self.profile.reset();
        self.prefs.reset();
        *self.owner.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Follow a session change.
    ///
    /// Returns the user whose records must now be loaded: a newly signed-in
    /// user, or a different user than the one the cache belongs to.
    pub fn track(&self, snapshot: &SessionSnapshot) -> Option<UserId> {
        match snapshot.auth_status() {
            AuthStatus::Loading => None,
            AuthStatus::Unauthenticated => {
                let had_owner = self
                    .owner
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some();
                if had_owner {
                    debug!("signed out, clearing cached records");
                    self.clear();
                }
                None
            }
            AuthStatus::Authenticated => {
                let user_id = snapshot.user.as_ref().map(|user| user.id.clone())?;
                let mut owner = self.owner.lock().unwrap_or_else(PoisonError::into_inner);
                if owner.as_ref() == Some(&user_id) {
                    return None;
                }
                if owner.is_some() {
                    debug!("user switched, clearing cached records");
                }
                self.profile.reset();
                self.prefs.reset();
                *owner = Some(user_id.clone());
                Some(user_id)
            }
        }
    }
}

/// Session observer that loads the records of every user who signs in.
pub struct RecordsLoader {
    records: Arc<UserRecords>,
}

impl RecordsLoader {
    pub fn new(records: Arc<UserRecords>) -> Self {
        Self { records }
    }
}

impl SessionObserver for RecordsLoader {
    fn on_session_changed(&self, snapshot: &SessionSnapshot) {
        let Some(user_id) = self.records.track(snapshot) else {
            return;
        };
        let Ok(handle) = Handle::try_current() else {
            warn!("no async runtime, records will load on first retry");
            return;
        };
        let records = self.records.clone();
        let span = info_span!("records.load", user_id = %user_id);
        handle.spawn(async move { records.load(&user_id).await }.instrument(span));
    }
}
