//! Prescription record model

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::Revision;
use crate::util::now_millis;

/// Prefix marking ids derived from a remote-assigned id.
pub const REMOTE_ID_PREFIX: &str = "prec-";

/// A unique identifier for a prescription record.
///
/// Two schemes exist: locally-created records get a high-resolution
/// timestamp plus a random suffix, and remote-origin records get the
/// deterministic `"prec-" + remoteId` derivation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Mint a fresh id for a locally-created record.
    #[must_use]
    pub fn generate() -> Self {
        let stamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let tail: String = Uuid::new_v4().simple().to_string().chars().take(6).collect();
        Self(format!("{stamp}{tail}"))
    }

    /// Derive the local id for a remote-assigned id.
    ///
    /// The prefix is stable; dedup and lookups rely on the same remote id
    /// always mapping to the same local id.
    #[must_use]
    pub fn from_remote(remote_id: &str) -> Self {
        Self(format!("{REMOTE_ID_PREFIX}{}", remote_id.trim()))
    }

    /// Whether this id came from the remote derivation.
    #[must_use]
    pub fn is_remote_derived(&self) -> bool {
        self.0.starts_with(REMOTE_ID_PREFIX)
    }

    /// The remote id embedded in a derived local id, if any.
    #[must_use]
    pub fn remote_part(&self) -> Option<&str> {
        self.0.strip_prefix(REMOTE_ID_PREFIX)
    }

    /// String form of the id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The remote operation a record still owes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    /// Fully synced, nothing owed
    None,
    /// Owes a remote create
    Add,
    /// Owes a remote content update
    Update,
    /// Owes a remote delete (tombstone)
    Delete,
}

impl SyncAction {
    /// Storage form of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Parse the storage form back into an action.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "add" => Some(Self::Add),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a prescription record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionDraft {
    pub patient_id: i64,
    pub doctor_id: i64,
    /// ISO date, `YYYY-MM-DD`
    pub date: String,
    /// Free-text prescription body
    pub content: String,
}

/// A prescription record in the local store.
///
/// `synced == false` exactly when `action != None`; the constructors and
/// mutators below keep the two fields in step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionRecord {
    /// Unique identifier
    pub id: RecordId,
    /// Revision marker, changes on every write
    pub rev: Revision,
    pub patient_id: i64,
    pub doctor_id: i64,
    /// ISO date, `YYYY-MM-DD`
    pub date: String,
    /// Free-text prescription body
    pub content: String,
    /// True iff the last known local state matches the remote state
    pub synced: bool,
    /// Remote operation still owed
    pub action: SyncAction,
    /// Remote-assigned id, captured on push when it differs from `id`
    pub remote_id: Option<String>,
    /// Creation timestamp (Unix ms); never overwritten by merges
    pub created_at: i64,
    /// Last local write or successful sync (Unix ms)
    pub last_modified: i64,
    /// Timestamp of the most recent conflict merge (Unix ms)
    pub last_conflict_resolved: Option<i64>,
    /// Revision markers that lost a conflict merge, oldest first
    pub conflicts: Vec<String>,
}

impl PrescriptionRecord {
    /// Create a pending record from a local draft (`action=add`).
    #[must_use]
    pub fn new_local(draft: PrescriptionDraft) -> Self {
        let now = now_millis();
        Self {
            id: RecordId::generate(),
            rev: Revision::initial(),
            patient_id: draft.patient_id,
            doctor_id: draft.doctor_id,
            date: draft.date,
            content: draft.content,
            synced: false,
            action: SyncAction::Add,
            remote_id: None,
            created_at: now,
            last_modified: now,
            last_conflict_resolved: None,
            conflicts: Vec::new(),
        }
    }

    /// Create an already-synced record, as the pull path does.
    #[must_use]
    pub fn new_synced(
        id: RecordId,
        patient_id: i64,
        doctor_id: i64,
        date: String,
        content: String,
        created_at: i64,
    ) -> Self {
        let remote_id = id.remote_part().map(str::to_string);
        Self {
            id,
            rev: Revision::initial(),
            patient_id,
            doctor_id,
            date,
            content,
            synced: true,
            action: SyncAction::None,
            remote_id,
            created_at,
            last_modified: now_millis(),
            last_conflict_resolved: None,
            conflicts: Vec::new(),
        }
    }

    /// Apply a local content edit, queueing the owed remote operation.
    ///
    /// A record that still owes its create keeps `action=add` so the push
    /// side issues one POST with the latest content.
    pub fn apply_edit(&mut self, content: impl Into<String>, now: i64) {
        self.content = content.into();
        self.synced = false;
        if self.action != SyncAction::Add {
            self.action = SyncAction::Update;
        }
        self.last_modified = now;
    }

    /// Mark this record as a tombstone awaiting the remote delete.
    pub fn mark_tombstone(&mut self, now: i64) {
        self.synced = false;
        self.action = SyncAction::Delete;
        self.last_modified = now;
    }

    /// The id the remote side knows this record by, when one exists.
    ///
    /// Resolution order: captured `remote_id`, then the derived-id prefix
    /// strip, then the raw local id as a legacy fallback.
    #[must_use]
    pub fn push_target(&self) -> &str {
        if let Some(remote_id) = self.remote_id.as_deref() {
            return remote_id;
        }
        self.id.remote_part().unwrap_or_else(|| self.id.as_str())
    }

    /// True when the remote side has never seen this record.
    #[must_use]
    pub fn never_pushed(&self) -> bool {
        self.remote_id.is_none() && !self.id.is_remote_derived()
    }

    /// True when the synced flag and owed action agree.
    #[must_use]
    pub const fn invariant_holds(&self) -> bool {
        self.synced == matches!(self.action, SyncAction::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn draft() -> PrescriptionDraft {
        PrescriptionDraft {
            patient_id: 16,
            doctor_id: 3,
            date: "2024-01-01".to_string(),
            content: "Panadol".to_string(),
        }
    }

    #[test]
    fn record_id_unique() {
        assert_ne!(RecordId::generate(), RecordId::generate());
    }

    #[test]
    fn record_id_remote_derivation_is_stable() {
        let a = RecordId::from_remote("42");
        let b = RecordId::from_remote("42");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "prec-42");
        assert!(a.is_remote_derived());
        assert_eq!(a.remote_part(), Some("42"));
    }

    #[test]
    fn local_id_is_not_remote_derived() {
        let id = RecordId::generate();
        assert!(!id.is_remote_derived());
        assert_eq!(id.remote_part(), None);
    }

    #[test]
    fn sync_action_round_trip() {
        for action in [
            SyncAction::None,
            SyncAction::Add,
            SyncAction::Update,
            SyncAction::Delete,
        ] {
            assert_eq!(SyncAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(SyncAction::parse("bogus"), None);
    }

    #[test]
    fn new_local_is_pending_add() {
        let record = PrescriptionRecord::new_local(draft());
        assert!(!record.synced);
        assert_eq!(record.action, SyncAction::Add);
        assert_eq!(record.created_at, record.last_modified);
        assert!(record.conflicts.is_empty());
        assert!(record.invariant_holds());
        assert!(record.never_pushed());
    }

    #[test]
    fn new_synced_owes_nothing() {
        let record = PrescriptionRecord::new_synced(
            RecordId::from_remote("42"),
            16,
            3,
            "2024-01-01".to_string(),
            "Panadol".to_string(),
            1_700_000_000_000,
        );
        assert!(record.synced);
        assert_eq!(record.action, SyncAction::None);
        assert_eq!(record.remote_id.as_deref(), Some("42"));
        assert!(record.invariant_holds());
    }

    #[test]
    fn apply_edit_queues_update() {
        let mut record = PrescriptionRecord::new_synced(
            RecordId::from_remote("42"),
            16,
            3,
            "2024-01-01".to_string(),
            "Panadol".to_string(),
            1_700_000_000_000,
        );
        record.apply_edit("Aspirin", record.last_modified + 5);
        assert_eq!(record.content, "Aspirin");
        assert!(!record.synced);
        assert_eq!(record.action, SyncAction::Update);
        assert!(record.invariant_holds());
    }

    #[test]
    fn apply_edit_keeps_pending_add() {
        let mut record = PrescriptionRecord::new_local(draft());
        record.apply_edit("Aspirin", record.last_modified + 5);
        assert_eq!(record.action, SyncAction::Add);
    }

    #[test]
    fn push_target_resolution_order() {
        let mut record = PrescriptionRecord::new_local(draft());
        let local_id = record.id.as_str().to_string();
        assert_eq!(record.push_target(), local_id);

        record.id = RecordId::from_remote("42");
        assert_eq!(record.push_target(), "42");

        record.remote_id = Some("99".to_string());
        assert_eq!(record.push_target(), "99");
    }

    #[test]
    fn tombstone_keeps_invariant() {
        let mut record = PrescriptionRecord::new_local(draft());
        record.mark_tombstone(record.last_modified + 1);
        assert_eq!(record.action, SyncAction::Delete);
        assert!(!record.synced);
        assert!(record.invariant_holds());
    }
}
