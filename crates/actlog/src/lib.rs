// # -----------------------------
// # crates/actlog/src/lib.rs
// # -----------------------------
//! Disk-backed activity log.
//!
//! [`ActivityLog`] keeps a newest-first list of [`Activity`] records in
//! memory and mirrors it to a pretty-printed JSON array on disk. URL
//! records expire after seven days and are dropped from the file on the
//! next save.

pub mod activity;
pub mod error;
pub mod log;

pub use activity::{Activity, DataKind, URL_RETENTION_MS};
pub use error::{ActivityLogError, ActivityLogResult};
pub use log::{ActivityLog, LoadReport, SaveReport};

pub use actlog_common::{Actor, Clock, ManualClock, Principal, SystemClock};
