//! Pulls remote-authoritative records into the local store.

use std::collections::HashSet;

use tracing::debug;

use crate::db::PrescriptionStore;
use crate::error::Result;
use crate::models::{PrescriptionRecord, RecordId, SearchSelector};
use crate::remote::{RemoteApi, RemoteItem};
use crate::token::AuthToken;
use crate::util::{normalize_date, now_millis, parse_remote_timestamp};

/// What one pull pass did.
#[derive(Debug, Clone, Default)]
pub struct PullOutcome {
    pub fetched_pages: u32,
    pub new_records: Vec<PrescriptionRecord>,
    pub skipped_existing: usize,
    pub skipped_foreign: usize,
    pub skipped_invalid: usize,
}

impl PullOutcome {
    #[must_use]
    pub fn new_count(&self) -> usize {
        self.new_records.len()
    }
}

/// Pages through the remote listing and persists records not yet known
/// locally.
///
/// Paging stops at the advertised last page, on a short page, or at the
/// page cap, whichever comes first. Ids already present locally are left
/// alone (tombstones included, so a deleted-but-unacknowledged record is
/// never resurrected), and mapped records whose patient or doctor does not
/// match the query are dropped before persisting.
pub struct PullMerger<'a, R: RemoteApi> {
    store: &'a PrescriptionStore,
    remote: &'a R,
    page_size: usize,
    max_pages: u32,
}

impl<'a, R: RemoteApi> PullMerger<'a, R> {
    #[must_use]
    pub fn new(store: &'a PrescriptionStore, remote: &'a R, page_size: usize, max_pages: u32) -> Self {
        Self {
            store,
            remote,
            page_size: page_size.max(1),
            max_pages: max_pages.max(1),
        }
    }

    pub async fn pull(&self, token: &AuthToken, selector: SearchSelector) -> Result<PullOutcome> {
        let mut known = self.store.existing_ids().await?;
        let mut outcome = PullOutcome::default();
        let mut page: u32 = 1;

        loop {
            let response = self
                .remote
                .list(token, selector.patient_id, selector.doctor_id, page)
                .await?;
            outcome.fetched_pages = page;
            let item_count = response.data.len();

            for item in &response.data {
                let Some(record) = map_remote_item(item) else {
                    outcome.skipped_invalid += 1;
                    continue;
                };
                if !selector.matches(record.patient_id, record.doctor_id) {
                    debug!(id = %record.id, "dropping remote record outside the queried pair");
                    outcome.skipped_foreign += 1;
                    continue;
                }
                if known.contains(record.id.as_str()) {
                    outcome.skipped_existing += 1;
                    continue;
                }

                self.store.put(&record).await?;
                known.insert(record.id.to_string());
                outcome.new_records.push(record);
            }

            if page >= response.last_page()
                || item_count < self.page_size
                || page >= self.max_pages
            {
                break;
            }
            page += 1;
        }

        debug!(
            pages = outcome.fetched_pages,
            new = outcome.new_records.len(),
            existing = outcome.skipped_existing,
            "pull finished"
        );
        Ok(outcome)
    }
}

/// Map a remote item to the local record shape. `None` when the item is
/// missing the fields a local record requires.
pub(crate) fn map_remote_item(item: &RemoteItem) -> Option<PrescriptionRecord> {
    let patient = item.patient?;
    let doctor = item.doctor?;
    let date = normalize_date(item.date.as_deref()?)?;
    let created_at = item
        .created_at
        .as_deref()
        .and_then(parse_remote_timestamp)
        .unwrap_or_else(now_millis);

    Some(PrescriptionRecord::new_synced(
        RecordId::from_remote(&item.id),
        patient.id,
        doctor.id,
        date,
        item.content.clone().unwrap_or_default(),
        created_at,
    ))
}

/// Append freshly pulled records to an already-served result set.
///
/// Rows the caller has already seen are never replaced or reordered; only
/// ids not yet present are appended.
#[must_use]
pub fn merge_results(
    mut current: Vec<PrescriptionRecord>,
    fetched: &[PrescriptionRecord],
) -> Vec<PrescriptionRecord> {
    let seen: HashSet<&str> = current.iter().map(|record| record.id.as_str()).collect();
    let additions: Vec<PrescriptionRecord> = fetched
        .iter()
        .filter(|record| !seen.contains(record.id.as_str()))
        .cloned()
        .collect();
    drop(seen);
    current.extend(additions);
    current
}
