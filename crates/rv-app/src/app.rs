//! The application runtime.
//!
//! Owns the session context, the record cache and the navigation guard, and
//! hands out use cases wired to them.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use rv_core::feed::DEFAULT_PAGE_SIZE;
use rv_core::ports::{NavigatorPort, PostsPort};
use rv_core::{AppConfig, RouteTable};

use crate::deps::AppDeps;
use crate::guard::NavigationGuard;
use crate::query::QueryOptions;
use crate::records::{RecordsLoader, UserRecords};
use crate::session::{ObserverId, SessionContext};
use crate::usecases::*;

pub struct App {
    session: Arc<SessionContext>,
    records: Arc<UserRecords>,
    guard: NavigationGuard,
    posts: Arc<dyn PostsPort>,
    navigator: Arc<dyn NavigatorPort>,
    routes: RouteTable,
    loader: ObserverId,
}

impl App {
    /// This constructor signature is the dependency manifest.
    /// 这个构造函数签名就是依赖清单。
    pub fn new(deps: AppDeps, config: &AppConfig) -> Self {
        let AppDeps {
            auth,
            profiles,
            preferences,
            posts,
            session_store,
            navigator,
            clock,
        } = deps;

        let options = QueryOptions {
            retry: config.fetch_retry,
            stale_time: Duration::from_secs(config.stale_time_secs),
        };
        let session = Arc::new(SessionContext::new(
            auth,
            profiles.clone(),
            session_store,
            clock,
        ));
        let records = Arc::new(UserRecords::new(profiles, preferences, options));
        let loader = session.add_observer(Arc::new(RecordsLoader::new(records.clone())));
        let guard = NavigationGuard::new(
            session.clone(),
            records.clone(),
            navigator.clone(),
            config.routes.clone(),
        );

        Self {
            session,
            records,
            guard,
            posts,
            navigator,
            routes: config.routes.clone(),
            loader,
        }
    }

    /// Resolve the current session and start listening for changes.
    pub async fn start(&self) {
        self.session.initialize().await;
        info!(status = ?self.session.snapshot().auth_status(), "app started");
    }

    pub fn shutdown(&self) {
        self.session.remove_observer(self.loader);
        self.session.shutdown();
        self.records.clear();
        info!("app shut down");
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn records(&self) -> &Arc<UserRecords> {
        &self.records
    }

    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    pub fn update_gender(&self) -> UpdateGender {
        UpdateGender::new(self.session.clone(), self.records.clone())
    }

    pub fn update_gender_preference(&self) -> UpdateGenderPreference {
        UpdateGenderPreference::new(self.session.clone(), self.records.clone())
    }

    pub fn load_my_profile(&self) -> LoadMyProfile {
        LoadMyProfile::new(self.session.clone(), self.records.clone())
    }

    pub fn load_my_preferences(&self) -> LoadMyPreferences {
        LoadMyPreferences::new(self.session.clone(), self.records.clone())
    }

    pub fn complete_onboarding_step(&self) -> CompleteOnboardingStep {
        CompleteOnboardingStep::new(
            self.update_gender(),
            self.update_gender_preference(),
            self.navigator.clone(),
            self.routes.home.clone(),
        )
    }

    pub fn load_feed_page(&self) -> LoadFeedPage {
        LoadFeedPage::new(self.posts.clone(), DEFAULT_PAGE_SIZE)
    }

    pub fn create_post(&self) -> CreatePost {
        CreatePost::new(self.session.clone(), self.posts.clone())
    }
}
