use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::DirectoryConfig;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Identity directory is not configured")]
    NotConfigured,

    #[error("Directory request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected directory response: {0}")]
    UnexpectedResponse(String),
}

/// Email-to-identity lookup against the external identity provider. The core
/// only ever sees this contract; the provider's response-shape quirks stay
/// behind the reqwest implementation.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Resolve an email address to the provider's opaque user id, if any
    async fn resolve_user_id_by_email(
        &self,
        email: &str,
    ) -> Result<Option<String>, DirectoryError>;

    /// Reverse lookup used to decorate member listings. Best-effort.
    async fn email_for_user_id(&self, user_id: &str) -> Result<Option<String>, DirectoryError>;
}

#[derive(Debug, Clone, Deserialize)]
struct DirectoryUser {
    #[serde(default)]
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Directory backed by the provider's admin users endpoint. Requires a
/// service key; constructed from an explicitly passed `DirectoryConfig`.
pub struct AdminDirectory {
    client: reqwest::Client,
    config: DirectoryConfig,
}

impl AdminDirectory {
    pub fn new(config: DirectoryConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    async fn list_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError> {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .ok_or(DirectoryError::NotConfigured)?;
        let service_key = self
            .config
            .service_key
            .as_deref()
            .ok_or(DirectoryError::NotConfigured)?;

        let url = format!("{}/auth/v1/admin/users", base_url.trim_end_matches('/'));
        let body: Value = self
            .client
            .get(url)
            .bearer_auth(service_key)
            .header("apikey", service_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        users_from_response(body)
    }
}

/// The provider has shipped both `{"users": [...]}` and a bare array over
/// time; accept either.
fn users_from_response(body: Value) -> Result<Vec<DirectoryUser>, DirectoryError> {
    let list = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("users") {
            Some(Value::Array(items)) => items,
            other => {
                return Err(DirectoryError::UnexpectedResponse(format!(
                    "expected a users array, got {:?}",
                    other.map(|v| v.to_string())
                )))
            }
        },
        other => {
            return Err(DirectoryError::UnexpectedResponse(format!(
                "expected object or array, got {}",
                other
            )))
        }
    };

    Ok(list
        .into_iter()
        .filter_map(|item| serde_json::from_value::<DirectoryUser>(item).ok())
        .filter(|user| !user.id.is_empty())
        .collect())
}

/// Fixture directory for environments without a reachable provider
/// (`DIRECTORY_MODE=local`): the email's local part is taken verbatim as the
/// user id, so `alice@anything` resolves to `alice`.
pub struct LocalDirectory;

#[async_trait]
impl IdentityDirectory for LocalDirectory {
    async fn resolve_user_id_by_email(
        &self,
        email: &str,
    ) -> Result<Option<String>, DirectoryError> {
        Ok(email
            .split('@')
            .next()
            .filter(|local| !local.is_empty())
            .map(str::to_string))
    }

    async fn email_for_user_id(&self, user_id: &str) -> Result<Option<String>, DirectoryError> {
        if user_id.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("{}@local.test", user_id)))
    }
}

#[async_trait]
impl IdentityDirectory for AdminDirectory {
    async fn resolve_user_id_by_email(
        &self,
        email: &str,
    ) -> Result<Option<String>, DirectoryError> {
        let users = self.list_users().await?;
        Ok(users
            .into_iter()
            .find(|user| {
                user.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .map(|user| user.id))
    }

    async fn email_for_user_id(&self, user_id: &str) -> Result<Option<String>, DirectoryError> {
        let users = self.list_users().await?;
        Ok(users
            .into_iter()
            .find(|user| user.id == user_id)
            .and_then(|user| user.email))
    }
}
