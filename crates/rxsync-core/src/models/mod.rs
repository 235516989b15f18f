//! Data models for rxsync

mod envelope;
mod record;
mod revision;
mod selector;

pub use envelope::Envelope;
pub use record::{
    PrescriptionDraft, PrescriptionRecord, RecordId, SyncAction, REMOTE_ID_PREFIX,
};
pub use revision::Revision;
pub use selector::SearchSelector;
