//! rxsync-core - Core library for rxsync
//!
//! Offline-first synchronization of prescription records: the locally
//! writable store, the remote HTTP client, and the engine that reconciles
//! the two.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod remote;
pub mod service;
pub mod sync;
pub mod token;
pub mod util;

pub use config::SyncConfig;
pub use error::{Error, Result};
pub use models::{PrescriptionDraft, PrescriptionRecord, RecordId};
pub use service::RecordService;
pub use sync::SyncEngine;
