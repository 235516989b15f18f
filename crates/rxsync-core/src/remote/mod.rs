//! Client for the authoritative prescription service.

mod http;
mod mock;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::token::AuthToken;

pub use http::HttpRemoteClient;
pub use mock::{CallGate, MockRemote};

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Invalid remote configuration: {0}")]
    InvalidConfiguration(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Remote API error: {0}")]
    Api(String),
    #[error("Remote rejected the write as conflicting: {0}")]
    Conflict(String),
    #[error("Invalid remote payload: {0}")]
    InvalidPayload(String),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

impl RemoteError {
    /// Whether the remote refused the write because its copy is newer.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<RemoteError> for crate::error::Error {
    fn from(error: RemoteError) -> Self {
        Self::Network(error.to_string())
    }
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CreatePrescription {
    pub content: String,
    pub date: String,
    pub doctor_id: i64,
    pub patient_id: i64,
}

/// A prescription as the remote service reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteItem {
    #[serde(deserialize_with = "deserialize_flexible_id")]
    pub id: String,
    #[serde(default)]
    pub patient: Option<RemoteRef>,
    #[serde(default)]
    pub doctor: Option<RemoteRef>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A referenced patient or doctor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RemoteRef {
    pub id: i64,
}

/// One page of the remote listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemotePage {
    #[serde(default)]
    pub data: Vec<RemoteItem>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

impl RemotePage {
    /// Page count the service advertises; a missing header means a single
    /// page.
    #[must_use]
    pub fn last_page(&self) -> u32 {
        self.meta
            .as_ref()
            .and_then(|meta| meta.last_page)
            .map_or(1, |last_page| last_page.max(1))
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub last_page: Option<u32>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// The four operations the authoritative service exposes.
///
/// Every call authenticates with the caller's bearer token; implementations
/// do not retry. Failed calls surface as [`RemoteError`] and the sync side
/// decides what to do with the record.
#[async_trait::async_trait]
pub trait RemoteApi: Send + Sync + 'static {
    /// Create a prescription; returns the id the service assigned.
    async fn create(&self, token: &AuthToken, payload: &CreatePrescription)
        -> RemoteResult<String>;

    /// Replace the content of an existing prescription. Anything but a
    /// plain 200 is a failure.
    async fn update(&self, token: &AuthToken, remote_id: &str, content: &str) -> RemoteResult<()>;

    /// Delete a prescription. Anything but a 204 is a failure.
    async fn delete(&self, token: &AuthToken, remote_id: &str) -> RemoteResult<()>;

    /// Fetch one page of prescriptions for a patient/doctor pair. Pages are
    /// numbered from 1.
    async fn list(
        &self,
        token: &AuthToken,
        patient_id: Option<i64>,
        doctor_id: Option<i64>,
        page: u32,
    ) -> RemoteResult<RemotePage>;
}

fn deserialize_flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(value) => value.to_string(),
        Raw::Text(value) => value,
    })
}

pub(crate) fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Number(value) => value.to_string(),
        Raw::Text(value) => value,
    }))
}
