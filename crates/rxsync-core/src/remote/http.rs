//! reqwest-backed implementation of [`RemoteApi`].

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;

use crate::token::AuthToken;
use crate::util::{compact_text, is_http_url};

use super::{
    deserialize_optional_id, CreatePrescription, RemoteApi, RemoteError, RemotePage, RemoteResult,
};

/// HTTP client for the prescription service.
///
/// One plain request per operation; timeouts come from the client builder
/// and retrying is the caller's decision.
#[derive(Clone)]
pub struct HttpRemoteClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRemoteClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RemoteResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            base_url,
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn prescriptions_url(&self) -> String {
        format!("{}/prescriptions", self.base_url)
    }

    fn prescription_url(&self, remote_id: &str) -> String {
        format!("{}/prescriptions/{remote_id}", self.base_url)
    }
}

#[async_trait::async_trait]
impl RemoteApi for HttpRemoteClient {
    async fn create(
        &self,
        token: &AuthToken,
        payload: &CreatePrescription,
    ) -> RemoteResult<String> {
        let response = self
            .client
            .post(self.prescriptions_url())
            .bearer_auth(token.as_str())
            .header("Accept", "application/json")
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }

        let body = response.json::<CreateResponse>().await?;
        body.into_id()
    }

    async fn update(&self, token: &AuthToken, remote_id: &str, content: &str) -> RemoteResult<()> {
        let payload = serde_json::json!({ "content": content });
        let response = self
            .client
            .put(self.prescription_url(remote_id))
            .bearer_auth(token.as_str())
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(unexpected_status(response).await);
        }
        Ok(())
    }

    async fn delete(&self, token: &AuthToken, remote_id: &str) -> RemoteResult<()> {
        let response = self
            .client
            .delete(self.prescription_url(remote_id))
            .bearer_auth(token.as_str())
            .header("Accept", "application/json")
            .send()
            .await?;

        if response.status() != StatusCode::NO_CONTENT {
            return Err(unexpected_status(response).await);
        }
        Ok(())
    }

    async fn list(
        &self,
        token: &AuthToken,
        patient_id: Option<i64>,
        doctor_id: Option<i64>,
        page: u32,
    ) -> RemoteResult<RemotePage> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(patient_id) = patient_id {
            query.push(("patient_id", patient_id.to_string()));
        }
        if let Some(doctor_id) = doctor_id {
            query.push(("doctor_id", doctor_id.to_string()));
        }
        query.push(("page", page.to_string()));

        let response = self
            .client
            .get(self.prescriptions_url())
            .bearer_auth(token.as_str())
            .header("Accept", "application/json")
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }

        Ok(response.json::<RemotePage>().await?)
    }
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    id: Option<String>,
    #[serde(default)]
    data: Option<CreateResponseData>,
}

#[derive(Debug, Deserialize)]
struct CreateResponseData {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    id: Option<String>,
}

impl CreateResponse {
    fn into_id(self) -> RemoteResult<String> {
        self.id
            .or_else(|| self.data.and_then(|data| data.id))
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                RemoteError::InvalidPayload("create response did not include an id".to_string())
            })
    }
}

#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    error: Option<String>,
    message: Option<String>,
}

async fn unexpected_status(response: reqwest::Response) -> RemoteError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = parse_api_error(status, &body);
    if status == StatusCode::CONFLICT {
        RemoteError::Conflict(message)
    } else {
        RemoteError::Api(message)
    }
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<RemoteErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", compact_text(&message), status.as_u16());
        }
    }

    let compacted = compact_text(body);
    if compacted.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{compacted} ({})", status.as_u16())
    }
}

fn normalize_base_url(raw: String) -> RemoteResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(RemoteError::InvalidConfiguration(
            "base URL must not be empty".to_string(),
        ));
    }
    if is_http_url(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(RemoteError::InvalidConfiguration(
            "base URL must include http:// or https://".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_base_url_trims_trailing_slash() {
        let normalized = normalize_base_url("https://api.example.com/".to_string()).unwrap();
        assert_eq!(normalized, "https://api.example.com");
    }

    #[test]
    fn normalize_base_url_rejects_invalid_values() {
        assert!(normalize_base_url(String::new()).is_err());
        assert!(normalize_base_url("api.example.com".to_string()).is_err());
    }

    #[test]
    fn create_response_accepts_top_level_id() {
        let response: CreateResponse = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(response.into_id().unwrap(), "42");
    }

    #[test]
    fn create_response_accepts_nested_id() {
        let response: CreateResponse =
            serde_json::from_str(r#"{"data": {"id": "abc"}}"#).unwrap();
        assert_eq!(response.into_id().unwrap(), "abc");
    }

    #[test]
    fn create_response_without_id_is_invalid() {
        let response: CreateResponse = serde_json::from_str(r#"{"status": "ok"}"#).unwrap();
        assert!(response.into_id().is_err());
    }

    #[test]
    fn parse_api_error_prefers_message_field() {
        let rendered = parse_api_error(
            StatusCode::CONFLICT,
            r#"{"message": "Prescription was modified"}"#,
        );
        assert_eq!(rendered, "Prescription was modified (409)");
    }

    #[test]
    fn parse_api_error_falls_back_to_body() {
        let rendered = parse_api_error(StatusCode::BAD_GATEWAY, "upstream unavailable");
        assert_eq!(rendered, "upstream unavailable (502)");
    }

    #[test]
    fn parse_api_error_handles_empty_body() {
        let rendered = parse_api_error(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(rendered, "HTTP 500");
    }
}
