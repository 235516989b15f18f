pub mod clear;
pub mod common;
pub mod create;
pub mod delete;
pub mod init;
pub mod list;
pub mod status;
pub mod sync;
pub mod token;
pub mod update;
