//! Row ports over the `/rest/v1` endpoints.
//!
//! Tables: `profiles` keyed by `id`, `preferences` keyed by `user_id`, and
//! `posts` with the author and comment count embedded.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info_span, Instrument};

use rv_core::feed::{PageRequest, Post, PostInsert};
use rv_core::ports::{
    FetchError, PostsPort, PreferencesRepositoryPort, ProfileRepositoryPort,
};
use rv_core::profile::{Gender, NewProfile};
use rv_core::{Preferences, Profile, UserId};

use super::dto::{ErrorBody, GenderPatch, PreferenceUpsert};
use super::BackendClient;

const POSTS_SELECT: &str = "*,user:profiles(*),nrOfComments:comments(count)";

fn transport(err: reqwest::Error) -> FetchError {
    FetchError::Transport(err.to_string())
}

fn fetch_error(status: StatusCode, body: &str) -> FetchError {
    if status == StatusCode::UNAUTHORIZED {
        return FetchError::NotAuthenticated;
    }
    FetchError::Backend {
        status: status.as_u16(),
        message: ErrorBody::parse(body).message(),
    }
}

async fn send(request: RequestBuilder) -> Result<Response, FetchError> {
    let response = request.send().await.map_err(transport)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(fetch_error(status, &body))
}

/// Decode a row array and keep the first row, if any.
async fn first_row<T: DeserializeOwned>(response: Response) -> Result<Option<T>, FetchError> {
    let body = response.text().await.map_err(transport)?;
    let rows: Vec<T> =
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(rows.into_iter().next())
}

fn eq(value: &UserId) -> String {
    format!("eq.{value}")
}

#[async_trait]
impl ProfileRepositoryPort for BackendClient {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, FetchError> {
        let request = self
            .request(Method::GET, "/rest/v1/profiles")
            .await
            .query(&[("select", "*".to_string()), ("id", eq(user_id))]);
        let response = send(request)
            .instrument(info_span!("rows.get_profile", user_id = %user_id))
            .await?;
        first_row(response).await
    }

    async fn create_profile(&self, profile: &NewProfile) -> Result<(), FetchError> {
        let request = self
            .request(Method::POST, "/rest/v1/profiles")
            .await
            .header("Prefer", "return=minimal")
            .json(profile);
        send(request)
            .instrument(info_span!("rows.create_profile", user_id = %profile.id))
            .await?;
        debug!(user_id = %profile.id, "profile row created");
        Ok(())
    }

    async fn update_gender(
        &self,
        user_id: &UserId,
        gender: Option<Gender>,
    ) -> Result<Option<Profile>, FetchError> {
        let request = self
            .request(Method::PATCH, "/rest/v1/profiles")
            .await
            .query(&[("id", eq(user_id))])
            .header("Prefer", "return=representation")
            .json(&GenderPatch {
                gender,
                gender_step_completed: true,
            });
        let response = send(request)
            .instrument(info_span!("rows.update_gender", user_id = %user_id))
            .await?;
        first_row(response).await
    }
}

#[async_trait]
impl PreferencesRepositoryPort for BackendClient {
    async fn get_preferences(&self, user_id: &UserId) -> Result<Option<Preferences>, FetchError> {
        let request = self
            .request(Method::GET, "/rest/v1/preferences")
            .await
            .query(&[("select", "*".to_string()), ("user_id", eq(user_id))]);
        let response = send(request)
            .instrument(info_span!("rows.get_preferences", user_id = %user_id))
            .await?;
        first_row(response).await
    }

    async fn upsert_gender_preference(
        &self,
        user_id: &UserId,
        gender_preference: Option<Gender>,
    ) -> Result<Option<Preferences>, FetchError> {
        let request = self
            .request(Method::POST, "/rest/v1/preferences")
            .await
            .query(&[("on_conflict", "user_id")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&PreferenceUpsert {
                user_id,
                gender_preference,
                preference_step_completed: true,
            });
        let response = send(request)
            .instrument(info_span!("rows.upsert_gender_preference", user_id = %user_id))
            .await?;
        first_row(response).await
    }
}

#[async_trait]
impl PostsPort for BackendClient {
    async fn fetch_posts(&self, page: PageRequest) -> Result<Vec<Post>, FetchError> {
        let mut query = vec![
            ("select", POSTS_SELECT.to_string()),
            ("order", "id.desc".to_string()),
        ];
        if let Some(limit) = page.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(cursor) = page.cursor {
            query.push(("id", format!("lt.{}", cursor.value())));
        }

        let request = self
            .request(Method::GET, "/rest/v1/posts")
            .await
            .query(&query);
        let response = send(request)
            .instrument(info_span!("rows.fetch_posts", cursor = ?page.cursor.map(|c| c.value())))
            .await?;
        let body = response.text().await.map_err(transport)?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn create_post(&self, post: &PostInsert) -> Result<(), FetchError> {
        let request = self
            .request(Method::POST, "/rest/v1/posts")
            .await
            .header("Prefer", "return=minimal")
            .json(post);
        send(request)
            .instrument(info_span!("rows.create_post", user_id = %post.user_id))
            .await?;
        Ok(())
    }
}
