//! Route table: redirect destinations to screen paths and back.

use serde::{Deserialize, Serialize};

use crate::guard::{Destination, Location};

pub const DEFAULT_LOGIN_PATH: &str = "/(auth)/login";
pub const DEFAULT_GENDER_ONBOARDING_PATH: &str = "/(protected)/(onboarding)/OnboardingGender";
pub const DEFAULT_PREFERENCES_ONBOARDING_PATH: &str =
    "/(protected)/(onboarding)/OnboardingPreferencesGender";
pub const DEFAULT_HOME_PATH: &str = "/(protected)/(tabs)";

/// Concrete screen paths for every place the core can send the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    pub login: String,
    pub gender_onboarding: String,
    pub preferences_onboarding: String,
    pub home: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            login: DEFAULT_LOGIN_PATH.to_string(),
            gender_onboarding: DEFAULT_GENDER_ONBOARDING_PATH.to_string(),
            preferences_onboarding: DEFAULT_PREFERENCES_ONBOARDING_PATH.to_string(),
            home: DEFAULT_HOME_PATH.to_string(),
        }
    }
}

impl RouteTable {
    pub fn path_for(&self, destination: Destination) -> &str {
        match destination {
            Destination::Login => &self.login,
            Destination::GenderOnboarding => &self.gender_onboarding,
            Destination::PreferencesOnboarding => &self.preferences_onboarding,
        }
    }

    /// Resolve a protected-tree path into a guard location.
    ///
    /// Only the two onboarding screens are distinguished; every other path is
    /// kept verbatim as `Location::Elsewhere`.
    pub fn locate(&self, path: &str) -> Location {
        let path = normalize(path);
        if path == normalize(&self.gender_onboarding) {
            Location::GenderOnboarding
        } else if path == normalize(&self.preferences_onboarding) {
            Location::PreferencesOnboarding
        } else {
            Location::Elsewhere(path.to_string())
        }
    }
}

fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}
