//! Onboarding step submission
//! 引导步骤提交
//!
//! Each onboarding screen stores its answer, then returns to the home screen.
//! The navigation guard decides from there whether another step is pending.

use std::sync::Arc;

use rv_core::ports::NavigatorPort;
use rv_core::preferences::PreferenceAnswer;
use rv_core::profile::GenderAnswer;

use super::{RecordError, UpdateGender, UpdateGenderPreference};

pub struct CompleteOnboardingStep {
    update_gender: UpdateGender,
    update_gender_preference: UpdateGenderPreference,
    navigator: Arc<dyn NavigatorPort>,
    home: String,
}

impl CompleteOnboardingStep {
    pub fn new(
        update_gender: UpdateGender,
        update_gender_preference: UpdateGenderPreference,
        navigator: Arc<dyn NavigatorPort>,
        home: String,
    ) -> Self {
        Self {
            update_gender,
            update_gender_preference,
            navigator,
            home,
        }
    }

    /// Store the gender answer. Stays on the screen when the write fails.
    pub async fn submit_gender(&self, answer: GenderAnswer) -> Result<(), RecordError> {
        self.update_gender.execute(answer).await?;
        self.navigator.replace(&self.home);
        Ok(())
    }

    /// Store the preference answer. Stays on the screen when the write fails.
    pub async fn submit_gender_preference(
        &self,
        answer: PreferenceAnswer,
    ) -> Result<(), RecordError> {
        self.update_gender_preference.execute(answer).await?;
        self.navigator.replace(&self.home);
        Ok(())
    }
}
