//! The sync engine: drains pending local mutations to the remote service.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::db::{PrescriptionStore, StoreStatus};
use crate::error::{Error, Result};
use crate::models::{PrescriptionRecord, SearchSelector, SyncAction};
use crate::remote::{CreatePrescription, RemoteApi};
use crate::token::{AuthToken, TokenStore};
use crate::util::now_millis;

use super::gate::SyncGate;
use super::merge::resolve_conflict;
use super::pull::{map_remote_item, PullMerger, PullOutcome};

/// Why a requested cycle did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyRunning,
    NotAuthenticated,
}

/// A record the cycle could not push; it stays pending for the next run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    pub id: String,
    pub error: String,
}

/// Tally of one sync cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub skipped: Option<SkipReason>,
    pub pending: usize,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub resolved_conflicts: usize,
    pub failures: Vec<RecordFailure>,
}

impl CycleReport {
    const fn skip(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            pending: 0,
            created: 0,
            updated: 0,
            deleted: 0,
            resolved_conflicts: 0,
            failures: Vec::new(),
        }
    }

    #[must_use]
    pub const fn was_skipped(&self) -> bool {
        self.skipped.is_some()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Snapshot for status reporting.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SyncStatus {
    pub store: StoreStatus,
    pub running: bool,
    pub authenticated: bool,
}

enum PushOutcome {
    Created { resolved: bool },
    Updated { resolved: bool },
    Deleted,
    Skipped,
}

/// Orchestrates push and pull against the remote service.
///
/// Cycles are single-flight: a request while one runs is a no-op. Within a
/// cycle, pending records are pushed one at a time and failures are isolated
/// per record; a record that cannot be pushed simply stays pending and is
/// retried on the next cycle, with no cap on attempts.
pub struct SyncEngine<R: RemoteApi, T: TokenStore> {
    store: PrescriptionStore,
    remote: Arc<R>,
    tokens: T,
    config: SyncConfig,
    gate: SyncGate,
    wakeup: Notify,
}

impl<R: RemoteApi, T: TokenStore> SyncEngine<R, T> {
    #[must_use]
    pub fn new(store: PrescriptionStore, remote: Arc<R>, tokens: T, config: SyncConfig) -> Self {
        Self {
            store,
            remote,
            tokens,
            config,
            gate: SyncGate::new(),
            wakeup: Notify::new(),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.gate.is_running()
    }

    /// Run one push cycle to completion.
    ///
    /// Returns a skipped report when a cycle is already running or no
    /// bearer token is stored. Errors are cycle-level only (the store is
    /// unreachable); per-record push failures land in the report.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let Some(_permit) = self.gate.try_begin() else {
            debug!("sync cycle already running, request ignored");
            return Ok(CycleReport::skip(SkipReason::AlreadyRunning));
        };

        let Some(token) = self.tokens.load()? else {
            debug!("no bearer token stored, deferring sync");
            return Ok(CycleReport::skip(SkipReason::NotAuthenticated));
        };

        let pending = self.store.find_unsynced().await?;
        let mut report = CycleReport {
            pending: pending.len(),
            ..CycleReport::default()
        };

        for record in pending {
            match self.push_record(&token, &record).await {
                Ok(PushOutcome::Created { resolved }) => {
                    report.created += 1;
                    if resolved {
                        report.resolved_conflicts += 1;
                    }
                }
                Ok(PushOutcome::Updated { resolved }) => {
                    report.updated += 1;
                    if resolved {
                        report.resolved_conflicts += 1;
                    }
                }
                Ok(PushOutcome::Deleted) => report.deleted += 1,
                Ok(PushOutcome::Skipped) => {}
                Err(error) => {
                    warn!(id = %record.id, %error, "push failed, record stays pending");
                    report.failures.push(RecordFailure {
                        id: record.id.to_string(),
                        error: error.to_string(),
                    });
                }
            }
        }

        info!(
            pending = report.pending,
            created = report.created,
            updated = report.updated,
            deleted = report.deleted,
            resolved = report.resolved_conflicts,
            failed = report.failures.len(),
            "sync cycle finished"
        );
        Ok(report)
    }

    /// Pull remote records for the pair into the local store.
    ///
    /// Without a stored token this is a no-op; reads keep serving whatever
    /// is local.
    pub async fn pull(&self, selector: SearchSelector) -> Result<PullOutcome> {
        let Some(token) = self.tokens.load()? else {
            debug!("no bearer token stored, serving local records only");
            return Ok(PullOutcome::default());
        };

        let merger = PullMerger::new(
            &self.store,
            self.remote.as_ref(),
            self.config.page_size,
            self.config.max_pull_pages,
        );
        merger.pull(&token, selector).await
    }

    /// Ask the background loop to run a cycle soon.
    pub fn request_sync(&self) {
        self.wakeup.notify_one();
    }

    /// Signal that network connectivity returned.
    pub fn notify_online(&self) {
        info!("network restored, requesting sync");
        self.request_sync();
    }

    pub async fn status(&self) -> Result<SyncStatus> {
        Ok(SyncStatus {
            store: self.store.counts().await?,
            running: self.gate.is_running(),
            authenticated: self.tokens.load()?.is_some(),
        })
    }

    /// Start the background loop: an immediate cycle, then one per interval,
    /// plus any cycle requested via [`Self::request_sync`].
    #[must_use]
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(engine.config.sync_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    () = engine.wakeup.notified() => {}
                }
                if let Err(error) = engine.run_cycle().await {
                    warn!(%error, "sync cycle failed");
                }
            }
        })
    }

    async fn push_record(
        &self,
        token: &AuthToken,
        record: &PrescriptionRecord,
    ) -> Result<PushOutcome> {
        match record.action {
            SyncAction::None => {
                debug!(id = %record.id, "pending record owes no remote operation, skipping");
                Ok(PushOutcome::Skipped)
            }
            SyncAction::Add => self.push_create(token, record).await,
            SyncAction::Update => self.push_update(token, record).await,
            SyncAction::Delete => self.push_delete(token, record).await,
        }
    }

    async fn push_create(
        &self,
        token: &AuthToken,
        record: &PrescriptionRecord,
    ) -> Result<PushOutcome> {
        let payload = CreatePrescription {
            content: record.content.clone(),
            date: record.date.clone(),
            doctor_id: record.doctor_id,
            patient_id: record.patient_id,
        };

        match self.remote.create(token, &payload).await {
            Ok(remote_id) => {
                let assigned =
                    (record.id.remote_part() != Some(remote_id.as_str())).then_some(remote_id.as_str());
                let marked = self
                    .store
                    .mark_synced(&record.id, &record.rev, assigned, now_millis())
                    .await?;
                if !marked {
                    debug!(id = %record.id, "record changed during push, leaving pending");
                }
                Ok(PushOutcome::Created { resolved: false })
            }
            Err(error) if error.is_conflict() => {
                self.resolve_and_retry(token, record).await?;
                Ok(PushOutcome::Created { resolved: true })
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn push_update(
        &self,
        token: &AuthToken,
        record: &PrescriptionRecord,
    ) -> Result<PushOutcome> {
        match self
            .remote
            .update(token, record.push_target(), &record.content)
            .await
        {
            Ok(()) => {
                let marked = self
                    .store
                    .mark_synced(&record.id, &record.rev, None, now_millis())
                    .await?;
                if !marked {
                    debug!(id = %record.id, "record changed during push, leaving pending");
                }
                Ok(PushOutcome::Updated { resolved: false })
            }
            Err(error) if error.is_conflict() => {
                self.resolve_and_retry(token, record).await?;
                Ok(PushOutcome::Updated { resolved: true })
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn push_delete(
        &self,
        token: &AuthToken,
        record: &PrescriptionRecord,
    ) -> Result<PushOutcome> {
        if record.never_pushed() {
            // The remote never saw this record; there is nothing to delete
            // there.
            self.store.hard_remove(&record.id).await?;
            return Ok(PushOutcome::Deleted);
        }

        self.remote.delete(token, record.push_target()).await?;
        self.store.hard_remove(&record.id).await?;
        Ok(PushOutcome::Deleted)
    }

    /// Merge the conflicting remote copy into the local pending record and
    /// retry the write once.
    async fn resolve_and_retry(
        &self,
        token: &AuthToken,
        record: &PrescriptionRecord,
    ) -> Result<()> {
        let Some(existing) = self.materialize_remote(token, record).await? else {
            return Err(Error::Network(format!(
                "remote reported a conflict on {} but no remote copy was found",
                record.id
            )));
        };

        let merged = resolve_conflict(&self.store, &existing, record, now_millis()).await?;

        self.remote
            .update(token, merged.push_target(), &merged.content)
            .await?;
        self.store
            .mark_synced(&merged.id, &merged.rev, None, now_millis())
            .await?;
        Ok(())
    }

    /// Fetch the remote copy of a record by scanning the listing for its
    /// pair. The result carries the local record's identity so a merge lands
    /// on the stored row.
    async fn materialize_remote(
        &self,
        token: &AuthToken,
        record: &PrescriptionRecord,
    ) -> Result<Option<PrescriptionRecord>> {
        if record.never_pushed() {
            return Ok(None);
        }
        let target = record.push_target();

        let mut page: u32 = 1;
        loop {
            let response = self
                .remote
                .list(token, Some(record.patient_id), Some(record.doctor_id), page)
                .await?;
            let item_count = response.data.len();

            if let Some(item) = response.data.iter().find(|item| item.id == target) {
                let Some(mut existing) = map_remote_item(item) else {
                    return Ok(None);
                };
                existing.id = record.id.clone();
                existing.rev = record.rev.clone();
                existing.conflicts = record.conflicts.clone();
                if item.created_at.is_none() {
                    existing.created_at = record.created_at;
                }
                return Ok(Some(existing));
            }

            if page >= response.last_page()
                || item_count < self.config.page_size
                || page >= self.config.max_pull_pages
            {
                return Ok(None);
            }
            page += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::PrescriptionDraft;
    use crate::remote::MockRemote;
    use crate::token::MemoryTokenStore;
    use pretty_assertions::assert_eq;

    async fn setup(
        tokens: MemoryTokenStore,
    ) -> (Database, PrescriptionStore, MockRemote, SyncEngine<MockRemote, MemoryTokenStore>) {
        let db = Database::open_in_memory().await.unwrap();
        let store = PrescriptionStore::new(db.connection());
        let remote = MockRemote::new();
        let engine = SyncEngine::new(
            PrescriptionStore::new(db.connection()),
            Arc::new(remote.clone()),
            tokens,
            SyncConfig::default(),
        );
        (db, store, remote, engine)
    }

    fn draft(content: &str) -> PrescriptionDraft {
        PrescriptionDraft {
            patient_id: 16,
            doctor_id: 3,
            date: "2024-01-01".to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cycle_without_token_is_skipped() {
        let (_db, store, remote, engine) = setup(MemoryTokenStore::new()).await;
        store
            .put(&PrescriptionRecord::new_local(draft("Panadol")))
            .await
            .unwrap();

        let report = engine.run_cycle().await.unwrap();

        assert_eq!(report.skipped, Some(SkipReason::NotAuthenticated));
        assert_eq!(remote.create_calls(), 0);
        assert_eq!(store.find_unsynced().await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn never_pushed_tombstone_is_removed_without_network() {
        let (_db, store, remote, engine) = setup(MemoryTokenStore::with_token("secret")).await;

        let record = PrescriptionRecord::new_local(draft("Panadol"));
        store.put(&record).await.unwrap();
        store.soft_delete(&record.id, now_millis()).await.unwrap();

        let report = engine.run_cycle().await.unwrap();

        assert_eq!(report.deleted, 1);
        assert_eq!(remote.delete_calls(), 0);
        assert!(store.existing_ids().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn bearer_token_accompanies_every_call() {
        let (_db, store, remote, engine) = setup(MemoryTokenStore::with_token("secret")).await;
        store
            .put(&PrescriptionRecord::new_local(draft("Panadol")))
            .await
            .unwrap();

        engine.run_cycle().await.unwrap();

        let tokens = remote.seen_tokens();
        assert!(!tokens.is_empty());
        assert!(tokens.iter().all(|token| token == "secret"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn status_reflects_store_and_token() {
        let (_db, store, _remote, engine) = setup(MemoryTokenStore::new()).await;
        store
            .put(&PrescriptionRecord::new_local(draft("Panadol")))
            .await
            .unwrap();

        let status = engine.status().await.unwrap();
        assert_eq!(status.store.total, 1);
        assert_eq!(status.store.pending, 1);
        assert!(!status.running);
        assert!(!status.authenticated);
    }
}
