//! Test doubles shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::broadcast;

use rv_core::feed::{PageRequest, Post, PostInsert};
use rv_core::ports::*;
use rv_core::profile::{Gender, NewProfile};
use rv_core::session::PersistedSession;
use rv_core::{AuthSession, AuthUser, Preferences, Profile, SessionChange, UserId};

mockall::mock! {
    pub Profiles {}

    #[async_trait]
    impl ProfileRepositoryPort for Profiles {
        async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, FetchError>;
        async fn create_profile(&self, profile: &NewProfile) -> Result<(), FetchError>;
        async fn update_gender(
            &self,
            user_id: &UserId,
            gender: Option<Gender>,
        ) -> Result<Option<Profile>, FetchError>;
    }
}

mockall::mock! {
    pub PreferencesRepo {}

    #[async_trait]
    impl PreferencesRepositoryPort for PreferencesRepo {
        async fn get_preferences(&self, user_id: &UserId) -> Result<Option<Preferences>, FetchError>;
        async fn upsert_gender_preference(
            &self,
            user_id: &UserId,
            gender_preference: Option<Gender>,
        ) -> Result<Option<Preferences>, FetchError>;
    }
}

mockall::mock! {
    pub Posts {}

    #[async_trait]
    impl PostsPort for Posts {
        async fn fetch_posts(&self, page: PageRequest) -> Result<Vec<Post>, FetchError>;
        async fn create_post(&self, post: &PostInsert) -> Result<(), FetchError>;
    }
}

pub fn user(id: &str) -> AuthUser {
    AuthUser {
        id: UserId::from(id),
        email: format!("{id}@example.com"),
        display_name: id.to_string(),
    }
}

pub fn session_for(user: AuthUser) -> AuthSession {
    AuthSession {
        user,
        access_token: "access".to_string(),
        refresh_token: Some("refresh".to_string()),
        expires_at: None,
    }
}

pub fn profile(id: &str, gender: Option<Gender>, step_completed: bool) -> Profile {
    Profile {
        id: UserId::from(id),
        username: id.to_string(),
        gender,
        birth_date: NaiveDate::from_ymd_opt(1995, 3, 1).unwrap(),
        bio: None,
        profile_completion: Some(0),
        is_visible: Some(true),
        is_incognito: Some(false),
        gender_step_completed: step_completed,
        created_at: None,
        updated_at: None,
    }
}

pub fn preferences(id: &str, gender_preference: Option<Gender>, step_completed: bool) -> Preferences {
    Preferences {
        user_id: UserId::from(id),
        gender_preference,
        min_age: None,
        max_age: None,
        preference_step_completed: step_completed,
        created_at: None,
    }
}

/// Auth backend with one registered account per e-mail.
pub struct FakeAuth {
    pub changes: broadcast::Sender<SessionChange>,
    pub current: Mutex<Option<AuthSession>>,
    pub get_session_error: Mutex<Option<AuthError>>,
    pub accounts: Mutex<HashMap<String, (String, AuthUser)>>,
    pub require_confirmation: bool,
    pub sign_out_error: Mutex<Option<AuthError>>,
    pub password_updates: Mutex<Vec<String>>,
}

impl FakeAuth {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            changes,
            current: Mutex::new(None),
            get_session_error: Mutex::new(None),
            accounts: Mutex::new(HashMap::new()),
            require_confirmation: false,
            sign_out_error: Mutex::new(None),
            password_updates: Mutex::new(Vec::new()),
        }
    }

    pub fn with_account(self, user: AuthUser, password: &str) -> Self {
        self.accounts
            .lock()
            .unwrap()
            .insert(user.email.clone(), (password.to_string(), user));
        self
    }

    pub fn with_current(self, session: AuthSession) -> Self {
        *self.current.lock().unwrap() = Some(session);
        self
    }

    pub fn emit(&self, change: SessionChange) {
        let _ = self.changes.send(change);
    }
}

#[async_trait]
impl AuthPort for FakeAuth {
    async fn get_session(&self) -> Result<Option<AuthSession>, AuthError> {
        if let Some(err) = self.get_session_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.current.lock().unwrap().clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some((expected, user)) if expected == password => {
                let session = session_for(user.clone());
                *self.current.lock().unwrap() = Some(session.clone());
                self.emit(SessionChange::SignedIn(session.clone()));
                Ok(session)
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<SignUpOutcome, AuthError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AuthError::UserAlreadyExists);
        }
        let user = AuthUser {
            id: UserId::from(format!("u-{}", accounts.len() + 1)),
            email: email.to_string(),
            display_name: metadata.display_name,
        };
        accounts.insert(email.to_string(), (password.to_string(), user.clone()));
        let session = (!self.require_confirmation).then(|| session_for(user.clone()));
        *self.current.lock().unwrap() = session.clone();
        Ok(SignUpOutcome { session, user })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(err) = self.sign_out_error.lock().unwrap().clone() {
            return Err(err);
        }
        *self.current.lock().unwrap() = None;
        self.emit(SessionChange::SignedOut);
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), AuthError> {
        if self.current.lock().unwrap().is_none() {
            return Err(AuthError::NotAuthenticated);
        }
        self.password_updates
            .lock()
            .unwrap()
            .push(new_password.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    pub saved: Mutex<Vec<PersistedSession>>,
    pub initial: Mutex<PersistedSession>,
}

impl MemorySessionStore {
    pub fn with_initial(initial: PersistedSession) -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            initial: Mutex::new(initial),
        }
    }

    pub fn last_saved(&self) -> Option<PersistedSession> {
        self.saved.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SessionStorePort for MemorySessionStore {
    async fn load(&self) -> Result<PersistedSession, SessionStoreError> {
        Ok(self.initial.lock().unwrap().clone())
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), SessionStoreError> {
        self.saved.lock().unwrap().push(session.clone());
        Ok(())
    }
}

pub struct FixedClock(pub NaiveDate);

impl ClockPort for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or_default()
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub replaced: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn last(&self) -> Option<String> {
        self.replaced.lock().unwrap().last().cloned()
    }
}

impl NavigatorPort for RecordingNavigator {
    fn replace(&self, path: &str) {
        self.replaced.lock().unwrap().push(path.to_string());
    }
}
