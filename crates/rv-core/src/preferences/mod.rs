//! Matching preferences record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::profile::{Gate, Gender};

/// Answer to the preferences onboarding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceAnswer {
    Only(Gender),
    /// "No preference" is a complete answer.
    Anyone,
}

/// A row of the `preferences` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub user_id: UserId,
    #[serde(default)]
    pub gender_preference: Option<Gender>,
    #[serde(default)]
    pub min_age: Option<i32>,
    #[serde(default)]
    pub max_age: Option<i32>,
    #[serde(default)]
    pub preference_step_completed: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Preferences {
    pub fn gender_preference_gate(&self) -> Gate<PreferenceAnswer> {
        match (self.gender_preference, self.preference_step_completed) {
            (Some(gender), _) => Gate::Present(PreferenceAnswer::Only(gender)),
            (None, true) => Gate::Present(PreferenceAnswer::Anyone),
            (None, false) => Gate::Absent,
        }
    }

    /// Local projection of a preference update.
    ///
    /// When the row does not exist yet a fresh one is synthesized, matching
    /// the insert the backend performs in that case.
    pub fn projected(
        current: Option<&Preferences>,
        user_id: &UserId,
        gender_preference: Option<Gender>,
    ) -> Preferences {
        match current {
            Some(existing) => Preferences {
                gender_preference,
                preference_step_completed: true,
                ..existing.clone()
            },
            None => Preferences {
                user_id: user_id.clone(),
                gender_preference,
                min_age: None,
                max_age: None,
                preference_step_completed: true,
                created_at: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_preferences_row() {
        let prefs: Preferences = serde_json::from_str(
            r#"{"user_id":"u-1","gender_preference":"male","min_age":18,"max_age":99,"created_at":"2025-02-24T14:35:22+00:00"}"#,
        )
        .unwrap();

        assert_eq!(prefs.gender_preference, Some(Gender::Male));
        assert_eq!(
            prefs.gender_preference_gate(),
            Gate::Present(PreferenceAnswer::Only(Gender::Male))
        );
    }

    #[test]
    fn test_null_preference_without_flag_is_absent() {
        let prefs: Preferences =
            serde_json::from_str(r#"{"user_id":"u-1","gender_preference":null}"#).unwrap();
        assert_eq!(prefs.gender_preference_gate(), Gate::Absent);
    }

    #[test]
    fn test_null_preference_with_flag_means_anyone() {
        let prefs: Preferences = serde_json::from_str(
            r#"{"user_id":"u-1","gender_preference":null,"preference_step_completed":true}"#,
        )
        .unwrap();
        assert_eq!(
            prefs.gender_preference_gate(),
            Gate::Present(PreferenceAnswer::Anyone)
        );
    }

    #[test]
    fn test_projected_synthesizes_missing_row() {
        let user_id = UserId::from("u-1");
        let projected = Preferences::projected(None, &user_id, Some(Gender::Female));

        assert_eq!(projected.user_id, user_id);
        assert_eq!(projected.gender_preference, Some(Gender::Female));
        assert!(projected.preference_step_completed);
    }

    #[test]
    fn test_projected_keeps_age_range() {
        let existing = Preferences {
            user_id: UserId::from("u-1"),
            gender_preference: None,
            min_age: Some(25),
            max_age: Some(40),
            preference_step_completed: false,
            created_at: None,
        };
        let projected = Preferences::projected(Some(&existing), &existing.user_id, None);

        assert_eq!(projected.min_age, Some(25));
        assert_eq!(projected.max_age, Some(40));
        assert!(projected.gender_preference_gate().is_present());
    }
}
