//! Database layer for rxsync

mod connection;
mod migrations;
mod store;

pub use connection::Database;
pub use store::{ConflictLogEntry, PrescriptionStore, StoreStatus};
