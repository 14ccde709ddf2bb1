//! Use case for answering the gender onboarding step
//! 设置性别

use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use rv_core::profile::{Gender, GenderAnswer};
use rv_core::Profile;

use super::RecordError;
use crate::records::UserRecords;
use crate::session::SessionContext;

/// Stores the user's gender, or "prefer not to say".
///
/// ## Behavior / 行为
/// - The cached profile shows the new answer before the backend confirms
/// - A failed write restores the previous cached profile
/// - A successful write leaves the server's row in the cache
/// - A write that leaves no profile row is an error, so the caller stays on
///   the form instead of being sent back to it by the guard
pub struct UpdateGender {
    session: Arc<SessionContext>,
    records: Arc<UserRecords>,
}

impl UpdateGender {
    pub fn new(session: Arc<SessionContext>, records: Arc<UserRecords>) -> Self {
        Self { session, records }
    }

    pub async fn execute(&self, answer: GenderAnswer) -> Result<Profile, RecordError> {
        let user = self
            .session
            .current_user()
            .ok_or(RecordError::NotAuthenticated)?;
        let gender: Option<Gender> = match answer {
            GenderAnswer::Specified(gender) => Some(gender),
            GenderAnswer::Undisclosed => None,
        };
        let span = info_span!("usecase.update_gender.execute", user_id = %user.id, ?gender);

        async {
            match self.records.update_gender(&user.id, gender).await {
                Ok(Some(profile)) => {
                    info!("gender updated");
                    Ok(profile)
                }
                Ok(None) => {
                    warn!("gender written but no profile row found");
                    Err(RecordError::MissingRecord("profile"))
                }
                Err(err) => {
                    warn!(error = %err, "gender update failed, cache rolled back");
                    Err(err.into())
                }
            }
        }
        .instrument(span)
        .await
    }
}
