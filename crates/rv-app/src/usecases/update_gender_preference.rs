//! Use case for answering the preferences onboarding step

use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use rv_core::preferences::PreferenceAnswer;
use rv_core::Preferences;

use super::RecordError;
use crate::records::UserRecords;
use crate::session::SessionContext;

/// Stores which gender the user wants to meet, or "no preference".
///
/// Creates the preferences row on first use. Cache handling is the same as
/// [`UpdateGender`](super::UpdateGender).
pub struct UpdateGenderPreference {
    session: Arc<SessionContext>,
    records: Arc<UserRecords>,
}

impl UpdateGenderPreference {
    pub fn new(session: Arc<SessionContext>, records: Arc<UserRecords>) -> Self {
        Self { session, records }
    }

    pub async fn execute(
        &self,
        answer: PreferenceAnswer,
    ) -> Result<Preferences, RecordError> {
        let user = self
            .session
            .current_user()
            .ok_or(RecordError::NotAuthenticated)?;
        let gender_preference = match answer {
            PreferenceAnswer::Only(gender) => Some(gender),
            PreferenceAnswer::Anyone => None,
        };
        let span = info_span!(
            "usecase.update_gender_preference.execute",
            user_id = %user.id,
            ?gender_preference
        );

        async {
            match self
                .records
                .update_gender_preference(&user.id, gender_preference)
                .await
            {
                Ok(Some(preferences)) => {
                    info!("gender preference updated");
                    Ok(preferences)
                }
                Ok(None) => {
                    warn!("gender preference written but no preferences row found");
                    Err(RecordError::MissingRecord("preferences"))
                }
                Err(err) => {
                    warn!(error = %err, "gender preference update failed, cache rolled back");
                    Err(err.into())
                }
            }
        }
        .instrument(span)
        .await
    }
}
