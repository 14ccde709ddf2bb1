//! Profile record and the completeness gates derived from it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Gender values accepted by the backend enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    Male,
    Female,
    NonBinary,
}

/// Presence of a field that gates navigation.
///
/// Gated fields are always matched exhaustively so that the missing-data
/// branch is never skipped by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate<T> {
    Present(T),
    Absent,
}

impl<T> Gate<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Gate::Present(_))
    }
}

/// Answer to the gender onboarding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenderAnswer {
    Specified(Gender),
    /// The user chose not to say; the step is still complete.
    Undisclosed,
}

/// A row of the `profiles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    /// ISO date (`YYYY-MM-DD`).
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_completion: Option<i32>,
    #[serde(default)]
    pub is_visible: Option<bool>,
    #[serde(default)]
    pub is_incognito: Option<bool>,
    /// Set by the backend once the gender step has been answered, including
    /// with "prefer not to say".
    #[serde(default)]
    pub gender_step_completed: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn gender_gate(&self) -> Gate<GenderAnswer> {
        match (self.gender, self.gender_step_completed) {
            (Some(gender), _) => Gate::Present(GenderAnswer::Specified(gender)),
            (None, true) => Gate::Present(GenderAnswer::Undisclosed),
            (None, false) => Gate::Absent,
        }
    }

    /// Local projection of a gender update, used before the server answers.
    pub fn with_gender(&self, gender: Option<Gender>) -> Self {
        Self {
            gender,
            gender_step_completed: true,
            ..self.clone()
        }
    }
}

/// Insert payload for the profile created at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProfile {
    pub id: UserId,
    pub username: String,
    pub birth_date: NaiveDate,
    pub profile_completion: i32,
    pub is_visible: bool,
    pub is_incognito: bool,
}

impl NewProfile {
    pub fn for_registration(id: UserId, username: String, birth_date: NaiveDate) -> Self {
        Self {
            id,
            username,
            birth_date,
            profile_completion: 0,
            is_visible: true,
            is_incognito: false,
        }
    }
}
