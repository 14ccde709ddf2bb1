//! End-to-end onboarding against a mocked backend.
//!
//! Wires the real backend client and file session store into the app, then
//! walks a new user from the login redirect through both onboarding steps.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use mockito::{Matcher, Server};
use tempfile::TempDir;

use rv_app::{App, AppDeps, RegisterError};
use rv_core::ports::{AuthPort, NavigatorPort, SessionStorePort};
use rv_core::preferences::PreferenceAnswer;
use rv_core::profile::{Gender, GenderAnswer};
use rv_core::routes::{
    DEFAULT_GENDER_ONBOARDING_PATH, DEFAULT_HOME_PATH, DEFAULT_LOGIN_PATH,
    DEFAULT_PREFERENCES_ONBOARDING_PATH,
};
use rv_core::validation::RegistrationRequest;
use rv_core::{AppConfig, AuthStatus, Destination, GuardDecision, Remote};
use rv_infra::{BackendClient, BackendSettings, FileSessionStore, SystemClock};

#[derive(Default)]
struct RecordingNavigator {
    replaced: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    fn last(&self) -> Option<String> {
        self.replaced.lock().unwrap().last().cloned()
    }
}

impl NavigatorPort for RecordingNavigator {
    fn replace(&self, path: &str) {
        self.replaced.lock().unwrap().push(path.to_string());
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn profile_row(gender: Option<&str>, step_completed: bool) -> serde_json::Value {
    serde_json::json!({
        "id": "u-1",
        "username": "nova",
        "gender": gender,
        "birth_date": "2000-01-01",
        "profile_completion": 0,
        "is_visible": true,
        "is_incognito": false,
        "gender_step_completed": step_completed
    })
}

async fn mock_backend(server: &mut Server) {
    server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "access_token": "access-1",
                "refresh_token": "refresh-1",
                "expires_in": 3600,
                "user": {
                    "id": "u-1",
                    "email": "nova@example.com",
                    "user_metadata": { "username": "nova" }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/rest/v1/profiles")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.u-1".into()))
        .with_status(200)
        .with_body(serde_json::json!([profile_row(None, false)]).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/rest/v1/preferences")
        .match_query(Matcher::UrlEncoded("user_id".into(), "eq.u-1".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    server
        .mock("PATCH", "/rest/v1/profiles")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.u-1".into()))
        .match_header("authorization", "Bearer access-1")
        .with_status(200)
        .with_body(serde_json::json!([profile_row(None, true)]).to_string())
        .create_async()
        .await;
    server
        .mock("POST", "/rest/v1/preferences")
        .match_query(Matcher::UrlEncoded("on_conflict".into(), "user_id".into()))
        .match_body(Matcher::PartialJson(
            serde_json::json!({ "gender_preference": "female" }),
        ))
        .with_status(201)
        .with_body(
            r#"[{"user_id":"u-1","gender_preference":"female","preference_step_completed":true}]"#,
        )
        .create_async()
        .await;
    server
        .mock("POST", "/auth/v1/logout")
        .with_status(204)
        .create_async()
        .await;
}

async fn wait_for_records(app: &App) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let ready = matches!(app.records().profile_state(), Remote::Ready(_))
                && matches!(app.records().preferences_state(), Remote::Ready(_));
            if ready {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("records never loaded");
}

struct Harness {
    app: App,
    backend: Arc<BackendClient>,
    session_store: Arc<FileSessionStore>,
    navigator: Arc<RecordingNavigator>,
    _data_dir: TempDir,
}

fn harness(server: &Server) -> Harness {
    let data_dir = TempDir::new().unwrap();
    let backend = Arc::new(
        BackendClient::new(
            BackendSettings::new(server.url(), "anon-key"),
            Arc::new(SystemClock),
        )
        .unwrap(),
    );
    let session_store = Arc::new(FileSessionStore::with_defaults(data_dir.path().to_path_buf()));
    let navigator = Arc::new(RecordingNavigator::default());
    let app = App::new(
        AppDeps {
            auth: backend.clone(),
            profiles: backend.clone(),
            preferences: backend.clone(),
            posts: backend.clone(),
            session_store: session_store.clone(),
            navigator: navigator.clone(),
            clock: Arc::new(SystemClock),
        },
        &AppConfig::with_system_defaults(data_dir.path().to_path_buf()),
    );
    Harness {
        app,
        backend,
        session_store,
        navigator,
        _data_dir: data_dir,
    }
}

#[tokio::test]
async fn test_new_user_is_walked_through_onboarding() {
    init_tracing();
    let mut server = Server::new_async().await;
    mock_backend(&mut server).await;
    let Harness {
        app,
        session_store,
        navigator,
        _data_dir,
        ..
    } = harness(&server);

    app.start().await;
    assert_eq!(
        app.guard().render(DEFAULT_HOME_PATH),
        GuardDecision::Redirect(Destination::Login)
    );
    assert_eq!(navigator.last().as_deref(), Some(DEFAULT_LOGIN_PATH));

    app.session()
        .login("nova@example.com", "secret-pass")
        .await
        .unwrap();
    wait_for_records(&app).await;

    assert_eq!(
        app.guard().render(DEFAULT_HOME_PATH),
        GuardDecision::Redirect(Destination::GenderOnboarding)
    );
    assert_eq!(
        navigator.last().as_deref(),
        Some(DEFAULT_GENDER_ONBOARDING_PATH)
    );

    let onboarding = app.complete_onboarding_step();
    onboarding
        .submit_gender(GenderAnswer::Undisclosed)
        .await
        .unwrap();
    assert_eq!(navigator.last().as_deref(), Some(DEFAULT_HOME_PATH));
    assert_eq!(
        app.guard().render(DEFAULT_HOME_PATH),
        GuardDecision::Redirect(Destination::PreferencesOnboarding)
    );
    assert_eq!(
        navigator.last().as_deref(),
        Some(DEFAULT_PREFERENCES_ONBOARDING_PATH)
    );

    onboarding
        .submit_gender_preference(PreferenceAnswer::Only(Gender::Female))
        .await
        .unwrap();
    assert_eq!(app.guard().render(DEFAULT_HOME_PATH), GuardDecision::Allow);

    let persisted = session_store.load().await.unwrap();
    assert!(persisted.is_authenticated);
    assert_eq!(persisted.user.map(|u| u.display_name).as_deref(), Some("nova"));

    app.session().logout().await.unwrap();
    assert_eq!(
        app.guard().render(DEFAULT_HOME_PATH),
        GuardDecision::Redirect(Destination::Login)
    );
    assert!(!session_store.load().await.unwrap().is_authenticated);

    app.shutdown();
}

#[tokio::test]
async fn test_registration_without_profile_row_ends_signed_out() {
    init_tracing();
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/v1/signup")
        .with_status(200)
        .with_body(
            serde_json::json!({
                "access_token": "access-2",
                "refresh_token": "refresh-2",
                "expires_in": 3600,
                "user": {
                    "id": "u-2",
                    "email": "nova@example.com",
                    "user_metadata": { "username": "nova" }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("POST", "/rest/v1/profiles")
        .with_status(409)
        .with_body(r#"{"code":"23505","message":"duplicate key"}"#)
        .create_async()
        .await;
    let logout = server
        .mock("POST", "/auth/v1/logout")
        .match_header("authorization", "Bearer access-2")
        .with_status(204)
        .create_async()
        .await;
    let Harness {
        app,
        backend,
        session_store,
        _data_dir,
        ..
    } = harness(&server);
    app.start().await;

    let result = app
        .session()
        .register(RegistrationRequest {
            email: "nova@example.com".to_string(),
            password: "secret-pass".to_string(),
            display_name: "nova".to_string(),
            birth_date: chrono::NaiveDate::from_ymd_opt(2000, 1, 1),
            accepted_terms: true,
        })
        .await;

    assert!(matches!(result, Err(RegisterError::Profile(_))));
    logout.assert_async().await;
    // Let the listener drain the backend's notifications.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        app.session().snapshot().auth_status(),
        AuthStatus::Unauthenticated
    );
    assert_eq!(backend.get_session().await.unwrap(), None);
    assert!(!session_store.load().await.unwrap().is_authenticated);
    assert_eq!(
        app.guard().render(DEFAULT_HOME_PATH),
        GuardDecision::Redirect(Destination::Login)
    );

    app.shutdown();
}
