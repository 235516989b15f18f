//! Envelope-returning operation surface consumed by calling UI code.

use std::sync::Arc;

use tracing::warn;

use crate::db::{ConflictLogEntry, PrescriptionStore};
use crate::error::{Error, Result};
use crate::models::{Envelope, PrescriptionDraft, PrescriptionRecord, RecordId, SearchSelector};
use crate::remote::RemoteApi;
use crate::sync::{merge_results, resolve_conflict, CycleReport, SyncEngine, SyncStatus};
use crate::token::TokenStore;
use crate::util::{normalize_date, now_millis};

/// Front door for record operations.
///
/// Every mutation lands locally first and nudges the sync engine; remote
/// failures never surface here, only local-store failures and malformed
/// input do. Callers render the `synced` flag if they want to show
/// propagation state.
#[derive(Clone)]
pub struct RecordService<R: RemoteApi, T: TokenStore> {
    store: PrescriptionStore,
    engine: Arc<SyncEngine<R, T>>,
}

impl<R: RemoteApi, T: TokenStore> RecordService<R, T> {
    #[must_use]
    pub fn new(store: PrescriptionStore, engine: Arc<SyncEngine<R, T>>) -> Self {
        Self { store, engine }
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<SyncEngine<R, T>> {
        &self.engine
    }

    /// Create a new prescription locally and queue it for push.
    pub async fn create(&self, draft: PrescriptionDraft) -> Envelope<PrescriptionRecord> {
        let draft = match validate_draft(draft) {
            Ok(draft) => draft,
            Err(error) => return Envelope::failure(error),
        };

        let mut record = PrescriptionRecord::new_local(draft);
        match self.store.put(&record).await {
            Ok(rev) => {
                record.rev = rev;
                self.engine.request_sync();
                Envelope::ok_with_id(record.id.to_string(), record)
            }
            Err(error) => Envelope::failure(error),
        }
    }

    /// Insert an already-synced record, merging if the id is taken.
    pub async fn add(&self, record: PrescriptionRecord) -> Envelope<PrescriptionRecord> {
        match self.try_add(record).await {
            Ok(stored) => Envelope::ok_with_id(stored.id.to_string(), stored),
            Err(error) => Envelope::failure(error),
        }
    }

    /// All live records for the selector.
    ///
    /// With `refresh`, the remote listing is pulled first and new records
    /// are appended to the locally served rows; a failing pull degrades to
    /// local-only results.
    pub async fn search(
        &self,
        selector: SearchSelector,
        refresh: bool,
    ) -> Envelope<Vec<PrescriptionRecord>> {
        let local = match self.store.find(&selector).await {
            Ok(rows) => rows,
            Err(error) => return Envelope::failure(error),
        };

        if !refresh {
            return Envelope::ok(local);
        }

        match self.engine.pull(selector).await {
            Ok(outcome) => Envelope::ok(merge_results(local, &outcome.new_records)),
            Err(error) => {
                warn!(%error, "pull failed, serving local records only");
                Envelope::ok(local)
            }
        }
    }

    /// Replace a record's content locally and queue the update for push.
    pub async fn update(&self, id: &RecordId, content: &str) -> Envelope<PrescriptionRecord> {
        let content = content.trim();
        if content.is_empty() {
            return Envelope::failure(Error::InvalidInput(
                "prescription content must not be empty".to_string(),
            ));
        }

        match self.try_update(id, content).await {
            Ok(record) => {
                self.engine.request_sync();
                Envelope::ok_with_id(record.id.to_string(), record)
            }
            Err(error) => Envelope::failure(error),
        }
    }

    /// Tombstone a record; the engine deletes it remotely later.
    pub async fn delete(&self, id: &RecordId) -> Envelope<()> {
        match self.store.soft_delete(id, now_millis()).await {
            Ok(()) => {
                self.engine.request_sync();
                Envelope::ok_empty()
            }
            Err(error) => Envelope::failure(error),
        }
    }

    /// Destroy the whole local collection. Used on logout.
    pub async fn clear(&self) -> Envelope<()> {
        match self.store.clear().await {
            Ok(()) => Envelope::ok_empty(),
            Err(error) => Envelope::failure(error),
        }
    }

    /// Resolution audit rows for one record.
    pub async fn conflict_history(&self, id: &RecordId) -> Envelope<Vec<ConflictLogEntry>> {
        match self.store.conflict_history(id).await {
            Ok(entries) => Envelope::ok(entries),
            Err(error) => Envelope::failure(error),
        }
    }

    /// Run one sync cycle now.
    pub async fn sync_now(&self) -> Envelope<CycleReport> {
        match self.engine.run_cycle().await {
            Ok(report) => Envelope::ok(report),
            Err(error) => Envelope::failure(error),
        }
    }

    pub async fn status(&self) -> Envelope<SyncStatus> {
        match self.engine.status().await {
            Ok(status) => Envelope::ok(status),
            Err(error) => Envelope::failure(error),
        }
    }

    async fn try_add(&self, record: PrescriptionRecord) -> Result<PrescriptionRecord> {
        match self.store.put(&record).await {
            Ok(rev) => {
                let mut stored = record;
                stored.rev = rev;
                Ok(stored)
            }
            Err(error) if error.is_conflict() => {
                // Tombstoned ids stay dead; only live rows are merged into
                let Some(existing) = self.store.get(&record.id).await? else {
                    return Err(error);
                };
                resolve_conflict(&self.store, &existing, &record, now_millis()).await
            }
            Err(error) => Err(error),
        }
    }

    async fn try_update(&self, id: &RecordId, content: &str) -> Result<PrescriptionRecord> {
        let Some(mut record) = self.store.get(id).await? else {
            return Err(Error::NotFound(id.to_string()));
        };
        record.apply_edit(content, now_millis());

        match self.store.put(&record).await {
            Ok(rev) => {
                record.rev = rev;
                Ok(record)
            }
            Err(error) if error.is_conflict() => {
                let Some(existing) = self.store.get(id).await? else {
                    return Err(error);
                };
                resolve_conflict(&self.store, &existing, &record, now_millis()).await
            }
            Err(error) => Err(error),
        }
    }
}

fn validate_draft(draft: PrescriptionDraft) -> Result<PrescriptionDraft> {
    if draft.patient_id <= 0 || draft.doctor_id <= 0 {
        return Err(Error::InvalidInput(
            "patient_id and doctor_id must be positive".to_string(),
        ));
    }
    let content = draft.content.trim().to_string();
    if content.is_empty() {
        return Err(Error::InvalidInput(
            "prescription content must not be empty".to_string(),
        ));
    }
    let date = normalize_date(&draft.date).ok_or_else(|| {
        Error::InvalidInput(format!("'{}' is not a valid ISO date", draft.date))
    })?;

    Ok(PrescriptionDraft {
        patient_id: draft.patient_id,
        doctor_id: draft.doctor_id,
        date,
        content,
    })
}
