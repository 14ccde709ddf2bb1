//! Wire types of the auth and row endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use rv_core::profile::Gender;
use rv_core::{AuthSession, AuthUser, UserId};

#[derive(Debug, Serialize)]
pub struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SignUpRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: UserMetadata,
}

/// Account metadata written at sign-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct PasswordUpdate<'a> {
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RemoteUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl From<RemoteUser> for AuthUser {
    fn from(user: RemoteUser) -> Self {
        AuthUser {
            id: UserId::from(user.id),
            email: user.email.unwrap_or_default(),
            display_name: user.user_metadata.username.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: RemoteUser,
}

impl TokenResponse {
    /// Convert into a session, deriving `expires_at` from `expires_in` when
    /// the server only sends the latter.
    pub fn into_session(self, now_secs: i64) -> AuthSession {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| now_secs + secs));
        AuthSession {
            user: self.user.into(),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}

/// Sign-up answers with a session when no confirmation is required, and
/// with the bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(TokenResponse),
    User(RemoteUser),
}

/// Error body of both endpoint families.
///
/// The auth server uses `error_code`/`msg` (older versions
/// `error`/`error_description`), the row server uses `message`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Parse a response body, keeping the raw text as message when it is
    /// not the expected JSON.
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_else(|_| ErrorBody {
            message: (!body.trim().is_empty()).then(|| body.trim().to_string()),
            ..ErrorBody::default()
        })
    }

    pub fn code(&self) -> Option<&str> {
        self.error_code.as_deref().or(self.error.as_deref())
    }

    pub fn message(&self) -> String {
        self.msg
            .as_deref()
            .or(self.error_description.as_deref())
            .or(self.message.as_deref())
            .or(self.code())
            .unwrap_or("unknown error")
            .to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct GenderPatch {
    pub gender: Option<Gender>,
    pub gender_step_completed: bool,
}

#[derive(Debug, Serialize)]
pub struct PreferenceUpsert<'a> {
    pub user_id: &'a UserId,
    pub gender_preference: Option<Gender>,
    pub preference_step_completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_up_response_distinguishes_session_and_user() {
        let with_session = r#"{"access_token":"a","expires_in":60,"user":{"id":"u-1"}}"#;
        let bare_user = r#"{"id":"u-1","email":"a@b.c","user_metadata":{"username":"nova"}}"#;

        assert!(matches!(
            serde_json::from_str::<SignUpResponse>(with_session).unwrap(),
            SignUpResponse::Session(_)
        ));
        assert!(matches!(
            serde_json::from_str::<SignUpResponse>(bare_user).unwrap(),
            SignUpResponse::User(_)
        ));
    }

    #[test]
    fn test_into_session_derives_expiry_from_expires_in() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"a","expires_in":60,"user":{"id":"u-1"}}"#)
                .unwrap();

        let session = response.into_session(1_000);

        assert_eq!(session.expires_at, Some(1_060));
        assert_eq!(session.user.display_name, "");
    }

    #[test]
    fn test_error_body_prefers_human_message() {
        let body = ErrorBody::parse(
            r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#,
        );

        assert_eq!(body.code(), Some("invalid_credentials"));
        assert_eq!(body.message(), "Invalid login credentials");
    }

    #[test]
    fn test_error_body_falls_back_to_raw_text() {
        let body = ErrorBody::parse("Bad Gateway");

        assert_eq!(body.code(), None);
        assert_eq!(body.message(), "Bad Gateway");
    }

    #[test]
    fn test_gender_patch_serializes_kebab_case_and_null() {
        let patch = GenderPatch {
            gender: Some(Gender::NonBinary),
            gender_step_completed: true,
        };
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"gender":"non-binary","gender_step_completed":true}"#
        );

        let undisclosed = GenderPatch {
            gender: None,
            gender_step_completed: true,
        };
        assert_eq!(
            serde_json::to_string(&undisclosed).unwrap(),
            r#"{"gender":null,"gender_step_completed":true}"#
        );
    }
}
