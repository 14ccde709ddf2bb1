//! Use case for reading the signed-in user's profile
//! 读取当前用户资料

use std::sync::Arc;

use tracing::{info_span, Instrument};

use rv_core::Profile;

use super::RecordError;
use crate::records::UserRecords;
use crate::session::SessionContext;

/// Returns the cached profile while fresh, otherwise fetches it.
///
/// `Ok(None)` means the profile row does not exist.
pub struct LoadMyProfile {
    session: Arc<SessionContext>,
    records: Arc<UserRecords>,
}

impl LoadMyProfile {
    pub fn new(session: Arc<SessionContext>, records: Arc<UserRecords>) -> Self {
        Self { session, records }
    }

    pub async fn execute(&self) -> Result<Option<Profile>, RecordError> {
        let user = self
            .session
            .current_user()
            .ok_or(RecordError::NotAuthenticated)?;
        let span = info_span!("usecase.load_my_profile.execute", user_id = %user.id);

        async {
            let profile = self.records.load_profile(&user.id).await?;
            Ok(profile)
        }
        .instrument(span)
        .await
    }
}
