//! Navigation guard runner.
//!
//! Feeds the current session snapshot, the cached record states and the
//! resolved location into [`CompletenessGuard`] and performs the resulting
//! redirect through the navigator. Evaluation itself never suspends.

use std::sync::Arc;

use tracing::{debug, info, info_span, Instrument};

use rv_core::ports::NavigatorPort;
use rv_core::{CompletenessGuard, GuardDecision, GuardInput, RouteTable};

use crate::records::UserRecords;
use crate::session::SessionContext;

pub struct NavigationGuard {
    session: Arc<SessionContext>,
    records: Arc<UserRecords>,
    navigator: Arc<dyn NavigatorPort>,
    routes: RouteTable,
}

impl NavigationGuard {
    pub fn new(
        session: Arc<SessionContext>,
        records: Arc<UserRecords>,
        navigator: Arc<dyn NavigatorPort>,
        routes: RouteTable,
    ) -> Self {
        Self {
            session,
            records,
            navigator,
            routes,
        }
    }

    /// Decision for `path` given the current state. No side effects.
    pub fn evaluate(&self, path: &str) -> GuardDecision {
        let snapshot = self.session.snapshot();
        let profile = self.records.profile_state();
        let preferences = self.records.preferences_state();
        let location = self.routes.locate(path);

        CompletenessGuard::evaluate(&GuardInput {
            auth: snapshot.auth_status(),
            profile: &profile,
            preferences: &preferences,
            location: &location,
        })
    }

    /// Evaluate and, on a redirect, replace the current screen.
    ///
    /// Meant to be called on every render of a protected screen. A redirect
    /// to the screen already shown does not navigate.
    pub fn render(&self, path: &str) -> GuardDecision {
        let decision = self.evaluate(path);
        if let GuardDecision::Redirect(destination) = &decision {
            let target = self.routes.path_for(*destination);
            if target == path {
                debug!(path, "already on redirect target");
            } else {
                info!(from = path, to = target, "guard redirect");
                self.navigator.replace(target);
            }
        }
        decision
    }

    /// Refetch both records after a failure, then re-render `path`.
    pub async fn retry(&self, path: &str) -> GuardDecision {
        let Some(user) = self.session.current_user() else {
            debug!("retry without a signed-in user");
            return self.render(path);
        };
        let span = info_span!("guard.retry", user_id = %user.id);
        self.records.refetch(&user.id).instrument(span).await;
        self.render(path)
    }
}
