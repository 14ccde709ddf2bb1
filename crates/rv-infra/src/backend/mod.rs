//! # Hosted backend client / 托管后端客户端
//!
//! One HTTP client serves the auth endpoints (`/auth/v1`) and the row
//! endpoints (`/rest/v1`) of the hosted backend. It owns the current
//! session, refreshes expired access tokens and broadcasts every session
//! change to subscribers.
//!
//! Every request carries the public `apikey` header. The bearer token is the
//! access token of the current session, or the anon key when signed out.

mod auth;
mod dto;
mod rows;
mod tokens;

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, Method, RequestBuilder};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

use rv_core::ports::ClockPort;
use rv_core::{AuthSession, SessionChange};

pub use tokens::TokenFile;

/// Request timeout applied when the caller does not supply its own client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Access tokens closer than this to expiry are refreshed before use.
const EXPIRY_MARGIN_SECS: i64 = 30;

const CHANGE_CHANNEL_CAPACITY: usize = 32;

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    /// Public anon key
    pub anon_key: String,
}

impl BackendSettings {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            anon_key: anon_key.into(),
        }
    }
}

pub struct BackendClient {
    http: Client,
    settings: BackendSettings,
    session: RwLock<Option<AuthSession>>,
    tokens: Option<TokenFile>,
    changes: broadcast::Sender<SessionChange>,
    clock: Arc<dyn ClockPort>,
    /// Serializes token refreshes so one expired token is exchanged once.
    refresh_lock: Mutex<()>,
}

impl BackendClient {
    /// Create a client with its own HTTP connection pool.
    pub fn new(settings: BackendSettings, clock: Arc<dyn ClockPort>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(http, settings, clock))
    }

    /// Create a client reusing an existing HTTP client.
    pub fn with_client(http: Client, settings: BackendSettings, clock: Arc<dyn ClockPort>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            http,
            settings,
            session: RwLock::new(None),
            tokens: None,
            changes,
            clock,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Persist tokens to `path` so that a session survives restarts.
    pub fn with_token_file(mut self, path: PathBuf) -> Self {
        self.tokens = Some(TokenFile::new(path));
        self
    }

    /// Load the session saved by a previous run, if any.
    ///
    /// The restored session is not validated here; the first
    /// `get_session` refreshes it when it has expired.
    pub async fn restore(&self) -> anyhow::Result<bool> {
        let Some(tokens) = &self.tokens else {
            return Ok(false);
        };
        let restored = tokens.load().await?;
        let found = restored.is_some();
        if found {
            debug!("restored backend session from token file");
        }
        self.store_in_memory(restored);
        Ok(found)
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    fn current(&self) -> Option<AuthSession> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_in_memory(&self, session: Option<AuthSession>) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    fn is_expired(&self, session: &AuthSession) -> bool {
        let now_secs = self.clock.now_ms() / 1000;
        session
            .expires_at
            .is_some_and(|expires_at| expires_at - EXPIRY_MARGIN_SECS <= now_secs)
    }

    /// Request with the `apikey` header and the given bearer token.
    fn request_with_token(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("apikey", &self.settings.anon_key)
            .bearer_auth(token)
    }

    /// Request authorized as the current user, or as anon when signed out.
    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let token = match self.valid_session().await {
            Some(session) => session.access_token,
            None => self.settings.anon_key.clone(),
        };
        self.request_with_token(method, path, &token)
    }

    /// Current session with a usable access token, refreshing when needed.
    ///
    /// Refresh failures are logged and yield `None`.
    async fn valid_session(&self) -> Option<AuthSession> {
        match self.ensure_fresh().await {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "token refresh failed");
                None
            }
        }
    }

    /// Replace the session, persist it and notify subscribers.
    async fn commit_session(&self, change: SessionChange) {
        self.keep_session(change.session().cloned()).await;

        // No receiver is not an error: nobody is listening yet.
        let _ = self.changes.send(change);
    }

    /// Hold and persist `session` without telling subscribers.
    async fn keep_session(&self, session: Option<AuthSession>) {
        self.store_in_memory(session.clone());

        if let Some(tokens) = &self.tokens {
            let persisted = match &session {
                Some(session) => tokens.save(session).await,
                None => tokens.clear().await,
            };
            if let Err(err) = persisted {
                warn!(error = %err, "failed to persist backend session");
            }
        }
    }
}
