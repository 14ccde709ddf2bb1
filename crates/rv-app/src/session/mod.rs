//! # Session context / 会话上下文
//!
//! Single owner of the process-wide [`SessionSnapshot`].
//!
//! - Restores the persisted snapshot and asks the auth backend for the
//!   current session on [`SessionContext::initialize`]
//! - Keeps a listener task subscribed to backend session changes until
//!   [`SessionContext::shutdown`]
//! - Applies login / register / logout results and persists every change
//! - Notifies observers and `watch` subscribers with whole snapshots
//!
//! All writes go through [`SessionContext::commit`], which replaces the
//! snapshot in one step.

mod errors;

pub use errors::{ChangePasswordError, RegisterError};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};

use rv_core::ports::{
    AuthError, AuthPort, ClockPort, ProfileRepositoryPort, SessionStorePort, SignUpMetadata,
};
use rv_core::profile::NewProfile;
use rv_core::session::SessionChange;
use rv_core::validation::{validate_new_password, RegistrationRequest};
use rv_core::{AuthStatus, AuthUser, SessionSnapshot};

/// Receives every committed snapshot, in commit order.
///
/// Called synchronously from the committing task; implementations must not
/// block.
pub trait SessionObserver: Send + Sync {
    fn on_session_changed(&self, snapshot: &SessionSnapshot);
}

/// Handle returned by [`SessionContext::add_observer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The backend opened a session right away.
    SignedIn(AuthUser),
    /// The account exists but must be confirmed (e.g. by e-mail) first.
    ConfirmationRequired(AuthUser),
}

pub struct SessionContext {
    auth: Arc<dyn AuthPort>,
    profiles: Arc<dyn ProfileRepositoryPort>,
    store: Arc<dyn SessionStorePort>,
    clock: Arc<dyn ClockPort>,
    state: watch::Sender<SessionSnapshot>,
    observers: Mutex<Vec<(ObserverId, Arc<dyn SessionObserver>)>>,
    next_observer: AtomicU64,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl SessionContext {
    pub fn new(
        auth: Arc<dyn AuthPort>,
        profiles: Arc<dyn ProfileRepositoryPort>,
        store: Arc<dyn SessionStorePort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            auth,
            profiles,
            store,
            clock,
            state,
            observers: Mutex::new(Vec::new()),
            next_observer: AtomicU64::new(1),
            listener: Mutex::new(None),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        let snapshot = self.state.borrow();
        match snapshot.auth_status() {
            AuthStatus::Authenticated => snapshot.user.clone(),
            _ => None,
        }
    }

    /// Receiver that always holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn add_observer(&self, observer: Arc<dyn SessionObserver>) -> ObserverId {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::Relaxed));
        lock(&self.observers).push((id, observer));
        id
    }

    /// Returns false when the observer was already removed.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = lock(&self.observers);
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Restore the persisted snapshot, resolve the current backend session and
    /// start listening for session changes.
    ///
    /// Never fails: an unreachable backend leaves the user unauthenticated.
    /// Calling it again while the listener runs only re-resolves the session.
    pub async fn initialize(self: &Arc<Self>) {
        let span = info_span!("session.initialize");
        async {
            match self.store.load().await {
                Ok(persisted) => {
                    debug!(
                        restored_user = persisted.user.is_some(),
                        "restored persisted session"
                    );
                    self.state.send_replace(SessionSnapshot::restored(persisted));
                }
                Err(err) => warn!(error = %err, "failed to restore persisted session"),
            }

            // Subscribe before asking for the current session so that no change
            // emitted in between is lost.
            let changes = self.auth.subscribe();

            match self.auth.get_session().await {
                Ok(Some(session)) => {
                    info!(user_id = %session.user.id, "session restored");
                    self.commit(|s| s.signed_in(session.user)).await;
                }
                Ok(None) => {
                    info!("no active session");
                    self.commit(|s| s.signed_out()).await;
                }
                Err(err) => {
                    error!(error = %err, "failed to resolve session, treating as signed out");
                    self.commit(|s| s.signed_out()).await;
                }
            }

            self.start_listener(changes);
        }
        .instrument(span)
        .await
    }

    fn start_listener(self: &Arc<Self>, mut changes: broadcast::Receiver<SessionChange>) {
        let mut listener = lock(&self.listener);
        if listener.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("session listener already running");
            return;
        }

        let context: Weak<Self> = Arc::downgrade(self);
        let handle = tokio::spawn(
            async move {
                loop {
                    let change = match changes.recv().await {
                        Ok(change) => change,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "session listener lagged behind");
                            continue;
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            debug!("session change channel closed");
                            break;
                        }
                    };
                    let Some(context) = context.upgrade() else {
                        break;
                    };
                    context.apply_change(change).await;
                }
            }
            .instrument(info_span!("session.listener")),
        );
        *listener = Some(handle);
    }

    async fn apply_change(&self, change: SessionChange) {
        match change {
            SessionChange::SignedIn(session) => {
                info!(user_id = %session.user.id, "signed in");
                self.commit(|s| s.signed_in(session.user)).await;
            }
            SessionChange::TokenRefreshed(session) => {
                debug!(user_id = %session.user.id, "token refreshed");
                self.commit(|s| s.signed_in(session.user)).await;
            }
            SessionChange::SignedOut => {
                info!("signed out");
                self.commit(|s| s.signed_out()).await;
            }
        }
    }

    /// Authenticate with e-mail and password.
    ///
    /// On failure the snapshot is left untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let span = info_span!("session.login");
        async {
            let session = self.auth.sign_in(email, password).await.map_err(|err| {
                warn!(error = %err, "sign in rejected");
                err
            })?;
            let user = session.user;
            info!(user_id = %user.id, "login succeeded");
            self.commit(|s| s.signed_in(user.clone())).await;
            Ok(user)
        }
        .instrument(span)
        .await
    }

    /// Validate the form, create the account and its profile row.
    ///
    /// Validation runs before any remote call.
    pub async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegistrationOutcome, RegisterError> {
        let span = info_span!("session.register");
        async {
            let birth_date = request.validate(self.clock.today())?;

            let outcome = self
                .auth
                .sign_up(
                    &request.email,
                    &request.password,
                    SignUpMetadata {
                        display_name: request.display_name.clone(),
                        birth_date,
                    },
                )
                .await?;
            let user = outcome.user;

            let Some(_session) = outcome.session else {
                info!(user_id = %user.id, "account created, confirmation required");
                self.commit(|s| s.signed_out()).await;
                return Ok(RegistrationOutcome::ConfirmationRequired(user));
            };

            let created = self
                .profiles
                .create_profile(&NewProfile::for_registration(
                    user.id.clone(),
                    request.display_name.trim().to_string(),
                    birth_date,
                ))
                .await;
            if let Err(err) = created {
                // An account without a profile row cannot pass onboarding.
                warn!(user_id = %user.id, error = %err, "profile creation failed, signing out");
                if let Err(sign_out) = self.auth.sign_out().await {
                    error!(error = %sign_out, "sign out after failed registration failed");
                }
                self.commit(|s| s.signed_out()).await;
                return Err(err.into());
            }

            info!(user_id = %user.id, "account created");
            self.commit(|s| s.signed_in(user.clone())).await;
            Ok(RegistrationOutcome::SignedIn(user))
        }
        .instrument(span)
        .await
    }

    /// End the backend session. The snapshot is only cleared when the
    /// backend confirms.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let span = info_span!("session.logout");
        async {
            self.auth.sign_out().await.map_err(|err| {
                error!(error = %err, "sign out failed");
                err
            })?;
            self.commit(|s| s.signed_out()).await;
            Ok(())
        }
        .instrument(span)
        .await
    }

    pub async fn set_terms_accepted(&self, accepted: bool) {
        self.commit(|s| s.with_terms_accepted(accepted)).await;
    }

    pub async fn change_password(
        &self,
        new_password: &str,
        confirmation: &str,
    ) -> Result<(), ChangePasswordError> {
        validate_new_password(new_password, confirmation)?;
        if self.current_user().is_none() {
            return Err(AuthError::NotAuthenticated.into());
        }
        self.auth.update_password(new_password).await?;
        info!("password changed");
        Ok(())
    }

    /// Stop the listener and drop all observers. The snapshot stays readable.
    pub fn shutdown(&self) {
        if let Some(handle) = lock(&self.listener).take() {
            handle.abort();
        }
        lock(&self.observers).clear();
        debug!("session context shut down");
    }

    /// Replace the snapshot, notify observers, persist.
    async fn commit(&self, update: impl FnOnce(&SessionSnapshot) -> SessionSnapshot) {
        self.state.send_modify(|current| {
            let next = update(current);
            *current = next;
        });
        let snapshot = self.snapshot();

        let observers: Vec<Arc<dyn SessionObserver>> = lock(&self.observers)
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in observers {
            observer.on_session_changed(&snapshot);
        }

        if let Err(err) = self.store.save(&snapshot.to_persisted()).await {
            error!(error = %err, "failed to persist session");
        }
    }
}

impl Drop for SessionContext {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.listener).take() {
            handle.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
