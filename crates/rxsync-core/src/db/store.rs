//! Prescription store: the durable, locally-writable document collection

use std::collections::HashSet;

use libsql::Connection;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{PrescriptionRecord, RecordId, Revision, SearchSelector, SyncAction};

const COLUMNS: &str = "id, rev, patient_id, doctor_id, date, content, synced, action, \
                       remote_id, created_at, last_modified, last_conflict_resolved, conflicts";

/// One resolved conflict, as recorded in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictLogEntry {
    pub record_id: String,
    pub losing_rev: String,
    pub winning_rev: String,
    pub resolved_at: i64,
}

/// Row counts reported by [`PrescriptionStore::counts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    pub total: u64,
    pub pending: u64,
    pub tombstones: u64,
}

/// libSQL-backed store for prescription records.
///
/// Every mutation is a single-row write; revision markers provide the
/// optimistic concurrency check (`put` fails with [`Error::Conflict`] when
/// the stored marker is not the one the writer read). Tombstones stay in
/// the table, invisible to `get`/`find`, until the sync side hard-removes
/// them.
#[derive(Clone)]
pub struct PrescriptionStore {
    conn: Connection,
}

impl PrescriptionStore {
    /// Create a store over the given connection.
    #[must_use]
    pub fn new(conn: &Connection) -> Self {
        Self { conn: conn.clone() }
    }

    /// Upsert a record by id, returning the revision marker now stored.
    ///
    /// Inserts keep the record's own marker; updates require the record's
    /// marker to match the stored one and advance it.
    pub async fn put(&self, record: &PrescriptionRecord) -> Result<Revision> {
        match self.stored_rev(&record.id).await? {
            None => {
                self.insert(record, &record.rev).await?;
                Ok(record.rev.clone())
            }
            Some(stored) if stored == record.rev => {
                let next = stored.next();
                self.update_row(record, &next).await?;
                Ok(next)
            }
            Some(stored) => Err(Error::Conflict {
                id: record.id.to_string(),
                stored: stored.to_string(),
                incoming: record.rev.to_string(),
            }),
        }
    }

    /// Write a record unconditionally, bypassing the revision check.
    ///
    /// Only conflict resolution uses this; the stored marker still advances
    /// so later optimistic writes observe the forced one.
    pub async fn force_put(&self, record: &PrescriptionRecord) -> Result<Revision> {
        let next = match self.stored_rev(&record.id).await? {
            Some(stored) => stored.next(),
            None => record.rev.clone(),
        };

        self.conn
            .execute(
                "INSERT INTO prescriptions (id, rev, patient_id, doctor_id, date, content, \
                 synced, action, remote_id, created_at, last_modified, last_conflict_resolved, conflicts) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT(id) DO UPDATE SET \
                 rev = excluded.rev, \
                 patient_id = excluded.patient_id, \
                 doctor_id = excluded.doctor_id, \
                 date = excluded.date, \
                 content = excluded.content, \
                 synced = excluded.synced, \
                 action = excluded.action, \
                 remote_id = excluded.remote_id, \
                 created_at = excluded.created_at, \
                 last_modified = excluded.last_modified, \
                 last_conflict_resolved = excluded.last_conflict_resolved, \
                 conflicts = excluded.conflicts",
                row_params(record, &next)?,
            )
            .await?;

        Ok(next)
    }

    /// Fetch a live record by id; tombstones and absent ids yield `None`.
    pub async fn get(&self, id: &RecordId) -> Result<Option<PrescriptionRecord>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM prescriptions WHERE id = ? AND action != 'delete'"
                ),
                libsql::params![id.as_str()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(parse_record(&row)?)),
            None => Ok(None),
        }
    }

    /// All live records matching the selector, in insertion order.
    pub async fn find(&self, selector: &SearchSelector) -> Result<Vec<PrescriptionRecord>> {
        let mut sql = format!("SELECT {COLUMNS} FROM prescriptions WHERE action != 'delete'");
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(patient_id) = selector.patient_id {
            sql.push_str(" AND patient_id = ?");
            params.push(libsql::Value::Integer(patient_id));
        }
        if let Some(doctor_id) = selector.doctor_id {
            sql.push_str(" AND doctor_id = ?");
            params.push(libsql::Value::Integer(doctor_id));
        }
        sql.push_str(" ORDER BY rowid ASC");

        let mut rows = self.conn.query(&sql, params).await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(parse_record(&row)?);
        }
        Ok(records)
    }

    /// Mark a live record as a tombstone awaiting the remote delete.
    pub async fn soft_delete(&self, id: &RecordId, now: i64) -> Result<()> {
        let mut rows = self
            .conn
            .query(
                "SELECT rev FROM prescriptions WHERE id = ? AND action != 'delete'",
                libsql::params![id.as_str()],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Err(Error::NotFound(id.to_string()));
        };
        let stored = Revision::from(row.get::<String>(0)?);
        let next = stored.next();

        let affected = self
            .conn
            .execute(
                "UPDATE prescriptions SET action = 'delete', synced = 0, rev = ?, last_modified = ? \
                 WHERE id = ? AND action != 'delete'",
                libsql::params![next.as_str(), now, id.as_str()],
            )
            .await?;

        if affected == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Physically delete a record. The sync side calls this once the remote
    /// delete is acknowledged (or was never owed).
    pub async fn hard_remove(&self, id: &RecordId) -> Result<()> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM prescriptions WHERE id = ?",
                libsql::params![id.as_str()],
            )
            .await?;

        if affected == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Record a successful push: `synced=true, action=none`, timestamps and
    /// the captured remote id updated.
    ///
    /// Guarded by the revision observed before the push; returns `false`
    /// when a local write advanced the record mid-flight, in which case
    /// nothing changes and the newer state syncs on the next cycle.
    pub async fn mark_synced(
        &self,
        id: &RecordId,
        rev: &Revision,
        remote_id: Option<&str>,
        now: i64,
    ) -> Result<bool> {
        let next = rev.next();
        let affected = match remote_id {
            Some(remote) => {
                self.conn
                    .execute(
                        "UPDATE prescriptions SET synced = 1, action = 'none', rev = ?, \
                         last_modified = ?, remote_id = ? WHERE id = ? AND rev = ?",
                        libsql::params![next.as_str(), now, remote, id.as_str(), rev.as_str()],
                    )
                    .await?
            }
            None => {
                self.conn
                    .execute(
                        "UPDATE prescriptions SET synced = 1, action = 'none', rev = ?, \
                         last_modified = ? WHERE id = ? AND rev = ?",
                        libsql::params![next.as_str(), now, id.as_str(), rev.as_str()],
                    )
                    .await?
            }
        };
        Ok(affected > 0)
    }

    /// All pending records (tombstones included), oldest write first.
    pub async fn find_unsynced(&self) -> Result<Vec<PrescriptionRecord>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM prescriptions WHERE synced = 0 \
                     ORDER BY last_modified ASC, rowid ASC"
                ),
                (),
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(parse_record(&row)?);
        }
        Ok(records)
    }

    /// Every stored id, tombstones included. The pull path dedups against
    /// this set so a deleted-but-unacknowledged record is not re-created.
    pub async fn existing_ids(&self) -> Result<HashSet<String>> {
        let mut rows = self.conn.query("SELECT id FROM prescriptions", ()).await?;
        let mut ids = HashSet::new();
        while let Some(row) = rows.next().await? {
            ids.insert(row.get::<String>(0)?);
        }
        Ok(ids)
    }

    /// Destroy all records and audit rows, leaving an empty collection.
    pub async fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM prescriptions", ()).await?;
        self.conn.execute("DELETE FROM conflict_log", ()).await?;
        Ok(())
    }

    /// Append a resolution to the conflict audit log.
    pub async fn log_conflict(
        &self,
        record_id: &RecordId,
        losing_rev: &str,
        winning_rev: &str,
        resolved_at: i64,
    ) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO conflict_log (record_id, losing_rev, winning_rev, resolved_at) \
                 VALUES (?, ?, ?, ?)",
                libsql::params![record_id.as_str(), losing_rev, winning_rev, resolved_at],
            )
            .await?;
        Ok(())
    }

    /// Audit log rows for one record, oldest first.
    pub async fn conflict_history(&self, record_id: &RecordId) -> Result<Vec<ConflictLogEntry>> {
        let mut rows = self
            .conn
            .query(
                "SELECT record_id, losing_rev, winning_rev, resolved_at FROM conflict_log \
                 WHERE record_id = ? ORDER BY resolved_at ASC, id ASC",
                libsql::params![record_id.as_str()],
            )
            .await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(ConflictLogEntry {
                record_id: row.get::<String>(0)?,
                losing_rev: row.get::<String>(1)?,
                winning_rev: row.get::<String>(2)?,
                resolved_at: row.get::<i64>(3)?,
            });
        }
        Ok(entries)
    }

    /// Row counts for status reporting.
    pub async fn counts(&self) -> Result<StoreStatus> {
        let mut rows = self
            .conn
            .query(
                "SELECT COUNT(*), \
                 COALESCE(SUM(CASE WHEN synced = 0 THEN 1 ELSE 0 END), 0), \
                 COALESCE(SUM(CASE WHEN action = 'delete' THEN 1 ELSE 0 END), 0) \
                 FROM prescriptions",
                (),
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(StoreStatus::default());
        };
        Ok(StoreStatus {
            total: u64::try_from(row.get::<i64>(0)?).unwrap_or(0),
            pending: u64::try_from(row.get::<i64>(1)?).unwrap_or(0),
            tombstones: u64::try_from(row.get::<i64>(2)?).unwrap_or(0),
        })
    }

    async fn stored_rev(&self, id: &RecordId) -> Result<Option<Revision>> {
        let mut rows = self
            .conn
            .query(
                "SELECT rev FROM prescriptions WHERE id = ?",
                libsql::params![id.as_str()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Revision::from(row.get::<String>(0)?))),
            None => Ok(None),
        }
    }

    async fn insert(&self, record: &PrescriptionRecord, rev: &Revision) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO prescriptions (id, rev, patient_id, doctor_id, date, content, \
                 synced, action, remote_id, created_at, last_modified, last_conflict_resolved, conflicts) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                row_params(record, rev)?,
            )
            .await?;
        Ok(())
    }

    async fn update_row(&self, record: &PrescriptionRecord, rev: &Revision) -> Result<()> {
        let conflicts = serde_json::to_string(&record.conflicts)?;
        self.conn
            .execute(
                "UPDATE prescriptions SET rev = ?, patient_id = ?, doctor_id = ?, date = ?, \
                 content = ?, synced = ?, action = ?, remote_id = ?, created_at = ?, \
                 last_modified = ?, last_conflict_resolved = ?, conflicts = ? WHERE id = ?",
                libsql::params![
                    rev.as_str(),
                    record.patient_id,
                    record.doctor_id,
                    record.date.as_str(),
                    record.content.as_str(),
                    i32::from(record.synced),
                    record.action.as_str(),
                    record.remote_id.clone().map_or(libsql::Value::Null, libsql::Value::Text),
                    record.created_at,
                    record.last_modified,
                    record.last_conflict_resolved.map_or(libsql::Value::Null, libsql::Value::Integer),
                    conflicts,
                    record.id.as_str()
                ],
            )
            .await?;
        Ok(())
    }
}

fn row_params(record: &PrescriptionRecord, rev: &Revision) -> Result<Vec<libsql::Value>> {
    let conflicts = serde_json::to_string(&record.conflicts)?;
    Ok(vec![
        libsql::Value::Text(record.id.to_string()),
        libsql::Value::Text(rev.to_string()),
        libsql::Value::Integer(record.patient_id),
        libsql::Value::Integer(record.doctor_id),
        libsql::Value::Text(record.date.clone()),
        libsql::Value::Text(record.content.clone()),
        libsql::Value::Integer(i64::from(record.synced)),
        libsql::Value::Text(record.action.as_str().to_string()),
        record
            .remote_id
            .clone()
            .map_or(libsql::Value::Null, libsql::Value::Text),
        libsql::Value::Integer(record.created_at),
        libsql::Value::Integer(record.last_modified),
        record
            .last_conflict_resolved
            .map_or(libsql::Value::Null, libsql::Value::Integer),
        libsql::Value::Text(conflicts),
    ])
}

fn parse_record(row: &libsql::Row) -> Result<PrescriptionRecord> {
    let action_raw = row.get::<String>(7)?;
    let action = SyncAction::parse(&action_raw)
        .ok_or_else(|| Error::Storage(format!("unknown action '{action_raw}'")))?;

    let remote_id = match row.get_value(8)? {
        libsql::Value::Text(value) => Some(value),
        _ => None,
    };
    let last_conflict_resolved = match row.get_value(11)? {
        libsql::Value::Integer(value) => Some(value),
        _ => None,
    };
    let conflicts: Vec<String> = serde_json::from_str(&row.get::<String>(12)?)?;

    Ok(PrescriptionRecord {
        id: RecordId::from(row.get::<String>(0)?),
        rev: Revision::from(row.get::<String>(1)?),
        patient_id: row.get::<i64>(2)?,
        doctor_id: row.get::<i64>(3)?,
        date: row.get::<String>(4)?,
        content: row.get::<String>(5)?,
        synced: row.get::<i32>(6)? != 0,
        action,
        remote_id,
        created_at: row.get::<i64>(9)?,
        last_modified: row.get::<i64>(10)?,
        last_conflict_resolved,
        conflicts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::PrescriptionDraft;
    use crate::util::now_millis;
    use pretty_assertions::assert_eq;

    async fn setup() -> (Database, PrescriptionStore) {
        let db = Database::open_in_memory().await.unwrap();
        let store = PrescriptionStore::new(db.connection());
        (db, store)
    }

    fn draft(patient_id: i64, doctor_id: i64, content: &str) -> PrescriptionDraft {
        PrescriptionDraft {
            patient_id,
            doctor_id,
            date: "2024-01-01".to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_put_and_get() {
        let (_db, store) = setup().await;

        let record = PrescriptionRecord::new_local(draft(16, 3, "Panadol"));
        let rev = store.put(&record).await.unwrap();
        assert_eq!(rev, record.rev);

        let fetched = store.get(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched, record);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_put_advances_rev_on_update() {
        let (_db, store) = setup().await;

        let mut record = PrescriptionRecord::new_local(draft(16, 3, "Panadol"));
        record.rev = store.put(&record).await.unwrap();

        record.apply_edit("Aspirin", now_millis());
        let rev = store.put(&record).await.unwrap();
        assert_eq!(rev.generation(), 2);

        let fetched = store.get(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, "Aspirin");
        assert_eq!(fetched.rev, rev);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_put_stale_rev_conflicts() {
        let (_db, store) = setup().await;

        let mut record = PrescriptionRecord::new_local(draft(16, 3, "Panadol"));
        let stale = record.rev.clone();
        record.rev = store.put(&record).await.unwrap();

        record.apply_edit("Aspirin", now_millis());
        store.put(&record).await.unwrap();

        let mut racer = record.clone();
        racer.rev = stale;
        racer.content = "Ibuprofen".to_string();
        let err = store.put(&racer).await.unwrap_err();
        assert!(err.is_conflict());

        // The store still holds the earlier write
        let fetched = store.get(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, "Aspirin");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_force_put_bypasses_rev_check() {
        let (_db, store) = setup().await;

        let mut record = PrescriptionRecord::new_local(draft(16, 3, "Panadol"));
        record.rev = store.put(&record).await.unwrap();

        let mut forced = record.clone();
        forced.rev = Revision::from("0-bogus");
        forced.content = "Merged".to_string();
        let rev = store.force_put(&forced).await.unwrap();
        assert_eq!(rev.generation(), record.rev.generation() + 1);

        let fetched = store.get(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, "Merged");
        assert_eq!(fetched.rev, rev);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_find_filters_by_selector() {
        let (_db, store) = setup().await;

        store
            .put(&PrescriptionRecord::new_local(draft(16, 3, "A")))
            .await
            .unwrap();
        store
            .put(&PrescriptionRecord::new_local(draft(16, 4, "B")))
            .await
            .unwrap();
        store
            .put(&PrescriptionRecord::new_local(draft(17, 3, "C")))
            .await
            .unwrap();

        let all = store.find(&SearchSelector::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let patient = store
            .find(&SearchSelector {
                patient_id: Some(16),
                doctor_id: None,
            })
            .await
            .unwrap();
        assert_eq!(patient.len(), 2);

        let pair = store.find(&SearchSelector::for_pair(16, 3)).await.unwrap();
        assert_eq!(pair.len(), 1);
        assert_eq!(pair[0].content, "A");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_find_returns_insertion_order() {
        let (_db, store) = setup().await;

        for content in ["first", "second", "third"] {
            store
                .put(&PrescriptionRecord::new_local(draft(16, 3, content)))
                .await
                .unwrap();
        }

        let rows = store.find(&SearchSelector::for_pair(16, 3)).await.unwrap();
        let contents: Vec<_> = rows.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_soft_delete_hides_record_but_keeps_row() {
        let (_db, store) = setup().await;

        let record = PrescriptionRecord::new_local(draft(16, 3, "Panadol"));
        store.put(&record).await.unwrap();

        store.soft_delete(&record.id, now_millis()).await.unwrap();

        assert!(store.get(&record.id).await.unwrap().is_none());
        assert!(store
            .find(&SearchSelector::for_pair(16, 3))
            .await
            .unwrap()
            .is_empty());

        // Still present for dedup and still pending for the sync side
        assert!(store
            .existing_ids()
            .await
            .unwrap()
            .contains(record.id.as_str()));
        let pending = store.find_unsynced().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].action, SyncAction::Delete);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_soft_delete_missing_id() {
        let (_db, store) = setup().await;
        let err = store
            .soft_delete(&RecordId::from("nope"), now_millis())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_hard_remove_destroys_row() {
        let (_db, store) = setup().await;

        let record = PrescriptionRecord::new_local(draft(16, 3, "Panadol"));
        store.put(&record).await.unwrap();
        store.soft_delete(&record.id, now_millis()).await.unwrap();

        store.hard_remove(&record.id).await.unwrap();

        assert!(store.get(&record.id).await.unwrap().is_none());
        assert!(!store
            .existing_ids()
            .await
            .unwrap()
            .contains(record.id.as_str()));
        assert!(store.find_unsynced().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_mark_synced_clears_pending_state() {
        let (_db, store) = setup().await;

        let record = PrescriptionRecord::new_local(draft(16, 3, "Panadol"));
        store.put(&record).await.unwrap();

        let marked = store
            .mark_synced(&record.id, &record.rev, Some("42"), now_millis())
            .await
            .unwrap();
        assert!(marked);

        let fetched = store.get(&record.id).await.unwrap().unwrap();
        assert!(fetched.synced);
        assert_eq!(fetched.action, SyncAction::None);
        assert_eq!(fetched.remote_id.as_deref(), Some("42"));
        assert_eq!(fetched.created_at, record.created_at);
        assert!(store.find_unsynced().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_mark_synced_skips_on_stale_rev() {
        let (_db, store) = setup().await;

        let mut record = PrescriptionRecord::new_local(draft(16, 3, "Panadol"));
        let observed = record.rev.clone();
        record.rev = store.put(&record).await.unwrap();

        // A local edit lands while the push is in flight
        record.apply_edit("Aspirin", now_millis());
        store.put(&record).await.unwrap();

        let marked = store
            .mark_synced(&record.id, &observed, None, now_millis())
            .await
            .unwrap();
        assert!(!marked);

        let fetched = store.get(&record.id).await.unwrap().unwrap();
        assert!(!fetched.synced);
        assert_eq!(fetched.content, "Aspirin");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_clear_empties_collection() {
        let (_db, store) = setup().await;

        let record = PrescriptionRecord::new_local(draft(16, 3, "Panadol"));
        store.put(&record).await.unwrap();
        store
            .log_conflict(&record.id, "1-a", "2-b", now_millis())
            .await
            .unwrap();

        store.clear().await.unwrap();

        assert!(store.existing_ids().await.unwrap().is_empty());
        assert!(store.conflict_history(&record.id).await.unwrap().is_empty());
        assert_eq!(store.counts().await.unwrap(), StoreStatus::default());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_conflict_log_round_trip() {
        let (_db, store) = setup().await;

        let id = RecordId::from("prec-42");
        store.log_conflict(&id, "2-aaa", "3-bbb", 1000).await.unwrap();
        store.log_conflict(&id, "3-bbb", "4-ccc", 2000).await.unwrap();

        let history = store.conflict_history(&id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].losing_rev, "2-aaa");
        assert_eq!(history[1].winning_rev, "4-ccc");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_counts() {
        let (_db, store) = setup().await;

        let synced = PrescriptionRecord::new_synced(
            RecordId::from_remote("1"),
            16,
            3,
            "2024-01-01".to_string(),
            "A".to_string(),
            1000,
        );
        store.put(&synced).await.unwrap();

        let pending = PrescriptionRecord::new_local(draft(16, 3, "B"));
        store.put(&pending).await.unwrap();

        let doomed = PrescriptionRecord::new_local(draft(16, 3, "C"));
        store.put(&doomed).await.unwrap();
        store.soft_delete(&doomed.id, now_millis()).await.unwrap();

        assert_eq!(
            store.counts().await.unwrap(),
            StoreStatus {
                total: 3,
                pending: 2,
                tombstones: 1,
            }
        );
    }
}
