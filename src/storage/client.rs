//! REST client for the requirement draft service
//!
//! Drafts live under `{base}/requirements/drafts`. The service answers
//! validation failures with HTTP 422 and a JSON `{ "message": ... }` body.

use super::error::StorageError;
use super::traits::DraftStorage;
use crate::config::DraftConfig;
use crate::state::RequirementFormData;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Timeout for the reachability probe
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Client for the remote draft service
#[derive(Debug, Clone)]
pub struct HttpDraftStorage {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedDraft {
    #[serde(alias = "draftId", alias = "_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "error")]
    message: String,
}

impl HttpDraftStorage {
    pub fn new(config: &DraftConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn drafts_url(&self, draft_id: Option<&str>) -> String {
        match draft_id {
            Some(id) => self.url(&format!("requirements/drafts/{id}")),
            None => self.url("requirements/drafts"),
        }
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let request = self
            .http
            .request(method, url)
            .header("X-Request-Id", uuid::Uuid::new_v4().to_string());
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Turn a non-success response into the matching error
async fn check(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(error_from_body(status, &body))
}

fn error_from_body(status: StatusCode, body: &str) -> StorageError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string());

    if status == StatusCode::UNPROCESSABLE_ENTITY {
        StorageError::Validation { message }
    } else {
        StorageError::Remote {
            status: status.as_u16(),
            message,
        }
    }
}

/// Decode a draft body; `null`, `{}` and an empty body all mean "no draft"
fn decode_draft(body: &str) -> Result<Option<RequirementFormData>, StorageError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: serde_json::Value = serde_json::from_str(body)?;
    let value = match value {
        serde_json::Value::Null => return Ok(None),
        // some deployments wrap the draft as { "data": {...} }
        serde_json::Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    };
    let empty = match &value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if empty {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}

#[async_trait]
impl DraftStorage for HttpDraftStorage {
    async fn is_online(&self) -> bool {
        // any HTTP answer counts; only a failed connection means offline
        self.request(Method::GET, self.url("health"))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .is_ok()
    }

    async fn create_draft(&self, form: &RequirementFormData) -> Result<String, StorageError> {
        let response = self
            .request(Method::POST, self.drafts_url(None))
            .json(form)
            .send()
            .await?;
        let created: CreatedDraft = check(response).await?.json().await?;
        Ok(created.id)
    }

    async fn update_draft(
        &self,
        draft_id: &str,
        form: &RequirementFormData,
        notify: bool,
    ) -> Result<(), StorageError> {
        let response = self
            .request(Method::PUT, self.drafts_url(Some(draft_id)))
            .query(&[("notify", notify)])
            .json(form)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn load_draft(&self, draft_id: &str) -> Result<Option<RequirementFormData>, StorageError> {
        let response = self
            .request(Method::GET, self.drafts_url(Some(draft_id)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound {
                id: draft_id.to_string(),
            });
        }
        let body = check(response).await?.text().await?;
        decode_draft(&body)
    }
}
