use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use rxsync_core::config::SyncConfig;
use rxsync_core::db::{Database, PrescriptionStore};
use rxsync_core::models::{Envelope, PrescriptionRecord};
use rxsync_core::remote::{
    CreatePrescription, HttpRemoteClient, RemoteApi, RemoteError, RemotePage, RemoteResult,
};
use rxsync_core::service::RecordService;
use rxsync_core::sync::{CycleReport, SyncEngine};
use rxsync_core::token::{AuthToken, FileTokenStore};
use rxsync_core::util::normalize_text_option;
use serde::Serialize;

use crate::cli::Cli;
use crate::error::CliError;

/// Resolved paths and endpoints, flag over environment over default.
pub struct AppOptions {
    pub db_path: PathBuf,
    pub api_url: Option<String>,
    pub token_path: PathBuf,
}

impl AppOptions {
    pub fn resolve(cli: &Cli) -> Self {
        let db_path = cli
            .db
            .clone()
            .or_else(|| env::var_os("RXSYNC_DB").map(PathBuf::from))
            .unwrap_or_else(default_db_path);
        let api_url = normalize_text_option(
            cli.api_url
                .clone()
                .or_else(|| env::var("RXSYNC_API_URL").ok()),
        );
        let token_path = cli
            .token_file
            .clone()
            .or_else(|| env::var_os("RXSYNC_TOKEN_FILE").map(PathBuf::from))
            .unwrap_or_else(default_token_path);

        Self {
            db_path,
            api_url,
            token_path,
        }
    }

    pub const fn api_configured(&self) -> bool {
        self.api_url.is_some()
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rxsync")
}

fn default_db_path() -> PathBuf {
    data_dir().join("rxsync.db")
}

fn default_token_path() -> PathBuf {
    data_dir().join("token.json")
}

/// The remote seam the CLI wires into the engine.
///
/// Local-only commands work without an API base URL; anything that actually
/// reaches the network through the unconfigured variant gets a clear error.
pub enum CliRemote {
    Http(HttpRemoteClient),
    Unconfigured,
}

fn unconfigured() -> RemoteError {
    RemoteError::InvalidConfiguration(
        "no API base URL configured; set RXSYNC_API_URL or pass --api-url".to_string(),
    )
}

#[async_trait::async_trait]
impl RemoteApi for CliRemote {
    async fn create(
        &self,
        token: &AuthToken,
        payload: &CreatePrescription,
    ) -> RemoteResult<String> {
        match self {
            Self::Http(client) => client.create(token, payload).await,
            Self::Unconfigured => Err(unconfigured()),
        }
    }

    async fn update(&self, token: &AuthToken, remote_id: &str, content: &str) -> RemoteResult<()> {
        match self {
            Self::Http(client) => client.update(token, remote_id, content).await,
            Self::Unconfigured => Err(unconfigured()),
        }
    }

    async fn delete(&self, token: &AuthToken, remote_id: &str) -> RemoteResult<()> {
        match self {
            Self::Http(client) => client.delete(token, remote_id).await,
            Self::Unconfigured => Err(unconfigured()),
        }
    }

    async fn list(
        &self,
        token: &AuthToken,
        patient_id: Option<i64>,
        doctor_id: Option<i64>,
        page: u32,
    ) -> RemoteResult<RemotePage> {
        match self {
            Self::Http(client) => client.list(token, patient_id, doctor_id, page).await,
            Self::Unconfigured => Err(unconfigured()),
        }
    }
}

/// Everything a command needs: the open database and the wired service.
pub struct AppContext {
    service: RecordService<CliRemote, FileTokenStore>,
    _db: Database,
}

impl AppContext {
    pub async fn open(options: &AppOptions) -> Result<Self, CliError> {
        if let Some(parent) = options.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::open(&options.db_path).await?;

        let config = options
            .api_url
            .as_ref()
            .map_or_else(SyncConfig::default, |url| SyncConfig::new(url.clone()));
        let remote = if config.base_url.is_empty() {
            tracing::debug!("no API base URL configured, running local-only");
            CliRemote::Unconfigured
        } else {
            CliRemote::Http(HttpRemoteClient::new(
                config.base_url.clone(),
                config.request_timeout,
            )?)
        };

        let store = PrescriptionStore::new(db.connection());
        let tokens = FileTokenStore::new(&options.token_path);
        let engine = Arc::new(SyncEngine::new(
            store.clone(),
            Arc::new(remote),
            tokens,
            config,
        ));

        Ok(Self {
            service: RecordService::new(store, engine),
            _db: db,
        })
    }

    pub const fn service(&self) -> &RecordService<CliRemote, FileTokenStore> {
        &self.service
    }
}

/// Unwrap a data-carrying envelope into the CLI error shape.
pub fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T, CliError> {
    if envelope.success {
        envelope
            .data
            .ok_or_else(|| CliError::OperationFailed("operation returned no data".to_string()))
    } else {
        Err(failure_error(envelope.error))
    }
}

/// Check a unit envelope for success.
pub fn ensure_success(envelope: &Envelope<()>) -> Result<(), CliError> {
    if envelope.success {
        Ok(())
    } else {
        Err(failure_error(envelope.error.clone()))
    }
}

fn failure_error(error: Option<String>) -> CliError {
    CliError::OperationFailed(error.unwrap_or_else(|| "unknown error".to_string()))
}

pub fn normalize_record_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyId)
    } else {
        Ok(trimmed.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct RecordListItem {
    pub id: String,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: String,
    pub content: String,
    pub synced: bool,
    pub remote_id: Option<String>,
}

pub fn record_to_list_item(record: &PrescriptionRecord) -> RecordListItem {
    RecordListItem {
        id: record.id.to_string(),
        patient_id: record.patient_id,
        doctor_id: record.doctor_id,
        date: record.date.clone(),
        content: record.content.clone(),
        synced: record.synced,
        remote_id: record.remote_id.clone(),
    }
}

pub fn format_record_lines(records: &[PrescriptionRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| {
            let marker = if record.synced { " " } else { "*" };
            let preview = content_preview(&record.content, 40);
            format!(
                "{marker} {id:<30}  {date}  {preview}",
                id = record.id,
                date = record.date,
            )
        })
        .collect()
}

pub fn content_preview(content: &str, max_chars: usize) -> String {
    let first_line = content.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_cycle_report(report: &CycleReport) -> Vec<String> {
    if report.was_skipped() {
        return vec!["Sync skipped: a cycle is already running".to_string()];
    }
    if report.pending == 0 {
        return vec!["Nothing to push".to_string()];
    }

    let mut lines = vec![format!(
        "Pushed {} of {} pending: {} created, {} updated, {} deleted",
        report.created + report.updated + report.deleted,
        report.pending,
        report.created,
        report.updated,
        report.deleted,
    )];
    if report.resolved_conflicts > 0 {
        lines.push(format!("Conflicts resolved: {}", report.resolved_conflicts));
    }
    for failure in &report.failures {
        lines.push(format!("Failed {}: {}", failure.id, failure.error));
    }
    lines
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rxsync_core::models::PrescriptionDraft;
    use rxsync_core::sync::RecordFailure;

    use super::*;

    #[test]
    fn normalize_record_identifier_trims_and_rejects_empty() {
        assert_eq!(
            normalize_record_identifier("  prec-42  ").unwrap(),
            "prec-42"
        );
        assert!(matches!(
            normalize_record_identifier(" \n "),
            Err(CliError::EmptyId)
        ));
    }

    #[test]
    fn content_preview_truncates_with_ellipsis() {
        let preview = content_preview("Amoxicillin 500mg three times daily for ten days", 20);
        assert_eq!(preview, "Amoxicillin 500mg...");
        assert_eq!(content_preview("short", 20), "short");
    }

    #[test]
    fn content_preview_collapses_whitespace_and_keeps_first_line() {
        assert_eq!(
            content_preview("Panadol  1g\nat night", 40),
            "Panadol 1g"
        );
    }

    #[test]
    fn format_record_lines_marks_pending_records() {
        let record = PrescriptionRecord::new_local(PrescriptionDraft {
            patient_id: 16,
            doctor_id: 3,
            date: "2024-01-01".to_string(),
            content: "Panadol".to_string(),
        });

        let lines = format_record_lines(std::slice::from_ref(&record));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with('*'));
        assert!(lines[0].contains("2024-01-01"));
        assert!(lines[0].contains("Panadol"));
    }

    #[test]
    fn format_cycle_report_summarizes_counts_and_failures() {
        let mut report = CycleReport::default();
        assert_eq!(format_cycle_report(&report), vec!["Nothing to push"]);

        report.pending = 3;
        report.created = 1;
        report.updated = 1;
        report.failures.push(RecordFailure {
            id: "prec-7".to_string(),
            error: "boom (500)".to_string(),
        });

        let lines = format_cycle_report(&report);
        assert_eq!(
            lines[0],
            "Pushed 2 of 3 pending: 1 created, 1 updated, 0 deleted"
        );
        assert_eq!(lines[1], "Failed prec-7: boom (500)");
    }

    #[test]
    fn unwrap_envelope_maps_failures() {
        let ok = Envelope::ok(7);
        assert_eq!(unwrap_envelope(ok).unwrap(), 7);

        let failed: Envelope<i32> = Envelope::failure("no such record");
        let error = unwrap_envelope(failed).unwrap_err();
        assert!(matches!(error, CliError::OperationFailed(message) if message == "no such record"));
    }
}
