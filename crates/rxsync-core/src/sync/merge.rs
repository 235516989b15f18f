//! Deterministic conflict resolution between two versions of one record.

use tracing::debug;

use crate::db::PrescriptionStore;
use crate::error::Result;
use crate::models::PrescriptionRecord;

/// Merge two divergent versions of the same logical record.
///
/// Document-level last-writer-wins: every field of `incoming` supersedes
/// `existing`, with three carve-outs that keep the stored lineage intact.
/// `created_at` always comes from `existing`, the merged record keeps
/// `existing`'s id and revision marker (so a follow-up write lands on the
/// stored row), and `incoming`'s revision marker is appended to the conflict
/// audit trail as the one that lost the race.
///
/// Pure in its inputs. Calling it twice with the same arguments yields
/// identical output.
#[must_use]
pub fn merge_records(
    existing: &PrescriptionRecord,
    incoming: &PrescriptionRecord,
    now: i64,
) -> PrescriptionRecord {
    let mut merged = incoming.clone();
    merged.id = existing.id.clone();
    merged.rev = existing.rev.clone();
    merged.created_at = existing.created_at;
    merged.conflicts = existing.conflicts.clone();
    merged.conflicts.push(incoming.rev.to_string());
    merged.last_conflict_resolved = Some(now);
    merged
}

/// Resolve a conflict by merging and force-writing the result.
///
/// The returned record carries the revision marker now stored. Errors leave
/// the original conflict in place for the next cycle; nothing is dropped.
pub async fn resolve_conflict(
    store: &PrescriptionStore,
    existing: &PrescriptionRecord,
    incoming: &PrescriptionRecord,
    now: i64,
) -> Result<PrescriptionRecord> {
    let mut merged = merge_records(existing, incoming, now);
    let losing_rev = incoming.rev.to_string();

    let rev = store.force_put(&merged).await?;
    store
        .log_conflict(&merged.id, &losing_rev, rev.as_str(), now)
        .await?;

    debug!(
        id = %merged.id,
        losing_rev = %losing_rev,
        winning_rev = %rev,
        "resolved write conflict"
    );

    merged.rev = rev;
    Ok(merged)
}
