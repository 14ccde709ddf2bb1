//! Profile completeness guard.
//!
//! Pure decision function evaluated on every navigation render of the
//! protected screen tree. It inspects the authentication status, the profile
//! and preferences records and the current location, and returns exactly one
//! decision. It performs no I/O and holds no state.
//!
//! Evaluation order (first match wins):
//!
//! 1. auth loading → loading indicator
//! 2. unauthenticated → redirect to login
//! 3. a record fetch failed → error screen with retry
//! 4. a record fetch pending → loading indicator, unless already on an
//!    onboarding screen (the form must not be interrupted)
//! 5. gender missing → gender onboarding
//! 6. gender preference missing → preferences onboarding
//! 7. allow
//!
//! A redirect is never issued towards the current location.

use serde::Serialize;

use crate::preferences::Preferences;
use crate::profile::{Gate, Profile};
use crate::remote::{FetchFailure, Remote};
use crate::session::AuthStatus;

/// Places the guard can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Destination {
    Login,
    GenderOnboarding,
    PreferencesOnboarding,
}

/// Current position inside the protected tree.
///
/// The login screen lives outside the protected tree and therefore has no
/// variant here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    GenderOnboarding,
    PreferencesOnboarding,
    Elsewhere(String),
}

impl Location {
    pub fn is_onboarding(&self) -> bool {
        matches!(
            self,
            Location::GenderOnboarding | Location::PreferencesOnboarding
        )
    }

    pub fn is(&self, destination: Destination) -> bool {
        matches!(
            (self, destination),
            (Location::GenderOnboarding, Destination::GenderOnboarding)
                | (
                    Location::PreferencesOnboarding,
                    Destination::PreferencesOnboarding
                )
        )
    }
}

/// Content of the blocking error screen. Retrying always refetches both
/// records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPrompt {
    pub profile: Option<FetchFailure>,
    pub preferences: Option<FetchFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    ShowLoading,
    ShowError(RetryPrompt),
    Redirect(Destination),
    Allow,
}

/// Latest snapshot of everything the guard looks at.
#[derive(Debug, Clone, Copy)]
pub struct GuardInput<'a> {
    pub auth: AuthStatus,
    pub profile: &'a Remote<Option<Profile>>,
    pub preferences: &'a Remote<Option<Preferences>>,
    pub location: &'a Location,
}

pub struct CompletenessGuard;

impl CompletenessGuard {
    pub fn evaluate(input: &GuardInput<'_>) -> GuardDecision {
        match input.auth {
            AuthStatus::Loading => return GuardDecision::ShowLoading,
            // Checked before any record state so results of fetches started
            // for a previous session are never acted upon.
            AuthStatus::Unauthenticated => return GuardDecision::Redirect(Destination::Login),
            AuthStatus::Authenticated => {}
        }

        if input.profile.is_failed() || input.preferences.is_failed() {
            return GuardDecision::ShowError(RetryPrompt {
                profile: input.profile.failure().cloned(),
                preferences: input.preferences.failure().cloned(),
            });
        }

        let (profile, preferences) = match (input.profile.ready(), input.preferences.ready()) {
            (Some(profile), Some(preferences)) => (profile.as_ref(), preferences.as_ref()),
            _ if input.location.is_onboarding() => return GuardDecision::Allow,
            _ => return GuardDecision::ShowLoading,
        };

        let gender = profile.map_or(Gate::Absent, Profile::gender_gate);
        let preference = preferences.map_or(Gate::Absent, Preferences::gender_preference_gate);

        let decision = match (gender, preference) {
            (Gate::Absent, _) => redirect_unless_at(Destination::GenderOnboarding, input.location),
            (Gate::Present(_), Gate::Absent) => {
                redirect_unless_at(Destination::PreferencesOnboarding, input.location)
            }
            (Gate::Present(_), Gate::Present(_)) => GuardDecision::Allow,
        };

        #[cfg(feature = "tracing")]
        {
            if let GuardDecision::Redirect(destination) = &decision {
                tracing::trace!(?destination, location = ?input.location, "onboarding incomplete");
            }
        }

        decision
    }
}

fn redirect_unless_at(destination: Destination, location: &Location) -> GuardDecision {
    if location.is(destination) {
        GuardDecision::Allow
    } else {
        GuardDecision::Redirect(destination)
    }
}
