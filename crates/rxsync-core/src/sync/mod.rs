//! Offline-first synchronization: push drain, pull merge, and conflict
//! resolution.

mod engine;
mod gate;
mod merge;
mod pull;

pub use engine::{CycleReport, RecordFailure, SkipReason, SyncEngine, SyncStatus};
pub use gate::{SyncGate, SyncPermit, SyncState};
pub use merge::{merge_records, resolve_conflict};
pub use pull::{merge_results, PullMerger, PullOutcome};
