//! Use case for reading the signed-in user's matching preferences

use std::sync::Arc;

use tracing::{info_span, Instrument};

use rv_core::Preferences;

use super::RecordError;
use crate::records::UserRecords;
use crate::session::SessionContext;

pub struct LoadMyPreferences {
    session: Arc<SessionContext>,
    records: Arc<UserRecords>,
}

impl LoadMyPreferences {
    pub fn new(session: Arc<SessionContext>, records: Arc<UserRecords>) -> Self {
        Self { session, records }
    }

    pub async fn execute(&self) -> Result<Option<Preferences>, RecordError> {
        let user = self
            .session
            .current_user()
            .ok_or(RecordError::NotAuthenticated)?;
        let span = info_span!("usecase.load_my_preferences.execute", user_id = %user.id);

        async {
            let preferences = self.records.load_preferences(&user.id).await?;
            Ok(preferences)
        }
        .instrument(span)
        .await
    }
}
