//! `AuthPort` over the `/auth/v1` endpoints.

use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use tokio::sync::broadcast;
use tracing::{debug, info, info_span, warn, Instrument};

use rv_core::ports::{AuthError, AuthPort, SignUpMetadata, SignUpOutcome};
use rv_core::{AuthSession, SessionChange};

use super::dto::{
    ErrorBody, PasswordGrant, PasswordUpdate, RefreshGrant, SignUpRequest, SignUpResponse,
    TokenResponse, UserMetadata,
};
use super::BackendClient;

fn transport(err: reqwest::Error) -> AuthError {
    AuthError::Transport(err.to_string())
}

/// Map an unsuccessful auth response to an [`AuthError`].
fn auth_error(status: StatusCode, body: &str) -> AuthError {
    let body = ErrorBody::parse(body);
    let message = body.message();
    match body.code() {
        Some("email_not_confirmed") => AuthError::EmailNotConfirmed,
        // Older servers report unconfirmed accounts as a failed grant.
        _ if message.contains("Email not confirmed") => AuthError::EmailNotConfirmed,
        Some("invalid_credentials") | Some("invalid_grant") => AuthError::InvalidCredentials,
        Some("user_already_exists") | Some("email_exists") => AuthError::UserAlreadyExists,
        _ if message.contains("already registered") => AuthError::UserAlreadyExists,
        _ if status == StatusCode::UNAUTHORIZED => AuthError::NotAuthenticated,
        _ => AuthError::Rejected {
            status: status.as_u16(),
            message,
        },
    }
}

async fn error_from(response: Response) -> AuthError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    auth_error(status, &body)
}

impl BackendClient {
    fn now_secs(&self) -> i64 {
        self.clock.now_ms() / 1000
    }

    async fn token_grant<B: serde::Serialize + ?Sized>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> Result<AuthSession, AuthError> {
        let response = self
            .request_with_token(
                Method::POST,
                &format!("/auth/v1/token?grant_type={grant_type}"),
                &self.settings.anon_key,
            )
            .json(body)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Transport(format!("malformed token response: {e}")))?;
        Ok(token.into_session(self.now_secs()))
    }

    /// Current session, exchanging the refresh token when the access token
    /// has expired.
    ///
    /// A rejected refresh signs the client out and yields `Ok(None)`.
    pub(super) async fn ensure_fresh(&self) -> Result<Option<AuthSession>, AuthError> {
        let Some(session) = self.current() else {
            return Ok(None);
        };
        if !self.is_expired(&session) {
            return Ok(Some(session));
        }

        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we waited.
        let Some(session) = self.current() else {
            return Ok(None);
        };
        if !self.is_expired(&session) {
            return Ok(Some(session));
        }

        let Some(refresh_token) = session.refresh_token.as_deref() else {
            debug!("access token expired without refresh token");
            self.commit_session(SessionChange::SignedOut).await;
            return Ok(None);
        };

        let span = info_span!("auth.refresh", user_id = %session.user.id);
        match self
            .token_grant("refresh_token", &RefreshGrant { refresh_token })
            .instrument(span)
            .await
        {
            Ok(refreshed) => {
                self.commit_session(SessionChange::TokenRefreshed(refreshed.clone()))
                    .await;
                Ok(Some(refreshed))
            }
            Err(AuthError::Transport(message)) => Err(AuthError::Transport(message)),
            Err(err) => {
                warn!(error = %err, "refresh token rejected, signing out");
                self.commit_session(SessionChange::SignedOut).await;
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl AuthPort for BackendClient {
    async fn get_session(&self) -> Result<Option<AuthSession>, AuthError> {
        self.ensure_fresh().await
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let span = info_span!("auth.sign_in");
        async {
            let session = self
                .token_grant("password", &PasswordGrant { email, password })
                .await?;
            info!(user_id = %session.user.id, "signed in");
            self.commit_session(SessionChange::SignedIn(session.clone()))
                .await;
            Ok(session)
        }
        .instrument(span)
        .await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<SignUpOutcome, AuthError> {
        let span = info_span!("auth.sign_up");
        async {
            let body = SignUpRequest {
                email,
                password,
                data: UserMetadata {
                    username: Some(metadata.display_name),
                    birth_date: Some(metadata.birth_date),
                },
            };
            let response = self
                .request_with_token(Method::POST, "/auth/v1/signup", &self.settings.anon_key)
                .json(&body)
                .send()
                .await
                .map_err(transport)?;

            if !response.status().is_success() {
                return Err(error_from(response).await);
            }

            let parsed: SignUpResponse = response
                .json()
                .await
                .map_err(|e| AuthError::Transport(format!("malformed sign-up response: {e}")))?;

            match parsed {
                SignUpResponse::Session(token) => {
                    let session = token.into_session(self.now_secs());
                    info!(user_id = %session.user.id, "signed up with active session");
                    // The caller announces the sign-in once the profile row exists.
                    self.keep_session(Some(session.clone())).await;
                    Ok(SignUpOutcome {
                        user: session.user.clone(),
                        session: Some(session),
                    })
                }
                SignUpResponse::User(user) => {
                    info!(user_id = %user.id, "signed up, confirmation pending");
                    Ok(SignUpOutcome {
                        session: None,
                        user: user.into(),
                    })
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.current() else {
            self.commit_session(SessionChange::SignedOut).await;
            return Ok(());
        };

        let response = self
            .request_with_token(Method::POST, "/auth/v1/logout", &session.access_token)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        // An expired or revoked token means the server already forgot us.
        if !status.is_success()
            && status != StatusCode::UNAUTHORIZED
            && status != StatusCode::NOT_FOUND
        {
            return Err(error_from(response).await);
        }

        info!(user_id = %session.user.id, "signed out");
        self.commit_session(SessionChange::SignedOut).await;
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), AuthError> {
        let session = self.ensure_fresh().await?.ok_or(AuthError::NotAuthenticated)?;

        let response = self
            .request_with_token(Method::PUT, "/auth/v1/user", &session.access_token)
            .json(&PasswordUpdate {
                password: new_password,
            })
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        info!(user_id = %session.user.id, "password updated");
        Ok(())
    }
}
