//! The activity log: a newest-first list guarded by a mutex and mirrored
//! to a JSON array on disk.
//!
//! The mutex only covers the in-memory list. Saves snapshot the list under
//! the lock and write the file after releasing it, so readers never wait
//! on disk I/O. A save racing an add may persist a snapshot without the
//! new record; the add's own save follows and catches up.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use actlog_common::fs::{self, SafeFileWriter};
use actlog_common::{Clock, SystemClock};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::activity::{Activity, ActivityDocument};
use crate::error::{ActivityLogError, ActivityLogResult};

/// Outcome of a save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Records written to the file.
    pub written: usize,
    /// Expired records left out of the file (still held in memory).
    pub expired: usize,
}

/// Outcome of a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// The backing file did not exist; the log was cleared.
    pub missing: bool,
    /// Records now held in memory.
    pub loaded: usize,
    /// Elements that failed validation and were dropped.
    pub skipped: usize,
    /// Loaded records that were already expired.
    pub expired: usize,
    /// A compacting save ran and succeeded.
    pub compacted: bool,
}

#[derive(Debug)]
pub struct ActivityLog {
    path: PathBuf,
    records: Mutex<VecDeque<Activity>>,
    clock: Arc<dyn Clock>,
    writer: SafeFileWriter,
}

impl ActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Arc::new(SystemClock))
    }

    /// Log whose expiry checks use `clock` instead of the wall clock.
    pub fn with_clock(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            records: Mutex::new(VecDeque::new()),
            clock,
            writer: SafeFileWriter::new(),
        }
    }

    pub fn with_writer(mut self, writer: SafeFileWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    // Records are immutable values, so a panic while the lock was held
    // cannot leave the list half-updated.
    fn records(&self) -> MutexGuard<'_, VecDeque<Activity>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Prepends `activity` and saves synchronously. Save failures are
    /// logged; the record stays in memory and is written by the next save.
    pub fn add_to_log(&self, activity: Activity) {
        if let Err(e) = self.try_add_to_log(activity) {
            self.report_save_failure(&e);
        }
    }

    /// Prepends `activity` and saves once, returning the save's outcome.
    /// The record is kept in memory either way.
    pub fn try_add_to_log(&self, activity: Activity) -> ActivityLogResult<SaveReport> {
        self.records().push_front(activity);
        self.try_save()
    }

    /// Newest-first copy of the current records.
    pub fn get_log(&self) -> Vec<Activity> {
        self.records().iter().cloned().collect()
    }

    /// Writes all non-expired records to disk, reporting failures.
    pub fn save(&self) {
        if let Err(e) = self.try_save() {
            self.report_save_failure(&e);
        }
    }

    fn report_save_failure(&self, e: &ActivityLogError) {
        warn!(
            path = %self.path.display(),
            code = e.code(),
            transient = e.is_transient(),
            error = %e,
            "failed to save activity log"
        );
    }

    /// Writes all non-expired records to disk. Expired records are left
    /// out of the file but not removed from memory.
    pub fn try_save(&self) -> ActivityLogResult<SaveReport> {
        let now = self.clock.now_millis();
        let (documents, expired) = {
            let records = self.records();
            let mut documents: Vec<ActivityDocument> = Vec::with_capacity(records.len());
            let mut expired = 0;
            for activity in records.iter() {
                if activity.should_expire_at(now) {
                    expired += 1;
                } else {
                    documents.push(activity.serialize());
                }
            }
            (documents, expired)
        };

        let json = serde_json::to_vec_pretty(&documents)
            .map_err(|source| ActivityLogError::Encode { source })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::ensure_dir(parent)
                .map_err(|e| ActivityLogError::io(parent, "create directory", e))?;
        }
        self.writer
            .write(&self.path, &json)
            .map_err(|e| ActivityLogError::io(&self.path, "write", e))?;

        debug!(
            path = %self.path.display(),
            written = documents.len(),
            expired,
            "saved activity log"
        );
        Ok(SaveReport {
            written: documents.len(),
            expired,
        })
    }

    /// Replaces the in-memory records with the file's, reporting failures.
    pub fn load(&self) {
        if let Err(e) = self.try_load() {
            warn!(path = %self.path.display(), code = e.code(), error = %e, "failed to load activity log");
        }
    }

    /// Replaces the in-memory records with the file's contents.
    ///
    /// A missing file clears the log. Unreadable or non-array files leave
    /// the log untouched. Elements that fail validation are skipped. When
    /// any loaded record has expired, the file is compacted right away.
    pub fn try_load(&self) -> ActivityLogResult<LoadReport> {
        let text = fs::read_text_if_exists(&self.path)
            .map_err(|e| ActivityLogError::io(&self.path, "read", e))?;

        let Some(text) = text else {
            self.records().clear();
            debug!(path = %self.path.display(), "no activity log on disk");
            return Ok(LoadReport {
                missing: true,
                ..LoadReport::default()
            });
        };

        let elements = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(elements)) => elements,
            Ok(other) => {
                return Err(ActivityLogError::MalformedDocument {
                    path: self.path.clone(),
                    reason: format!("expected a JSON array, found {}", json_type(&other)),
                })
            }
            Err(e) => {
                return Err(ActivityLogError::MalformedDocument {
                    path: self.path.clone(),
                    reason: e.to_string(),
                })
            }
        };

        let now = self.clock.now_millis();
        let mut parsed = VecDeque::with_capacity(elements.len());
        let mut skipped = 0;
        let mut expired = 0;
        for (index, element) in elements.iter().enumerate() {
            match Activity::deserialize(element) {
                Ok(activity) => {
                    if activity.should_expire_at(now) {
                        expired += 1;
                    }
                    parsed.push_back(activity);
                }
                Err(e) => {
                    skipped += 1;
                    warn!(path = %self.path.display(), index, error = %e, "skipping malformed activity record");
                }
            }
        }

        let loaded = parsed.len();
        *self.records() = parsed;

        let compacted = expired > 0
            && match self.try_save() {
                Ok(_) => true,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "failed to compact activity log");
                    false
                }
            };

        info!(
            path = %self.path.display(),
            loaded,
            skipped,
            expired,
            compacted,
            "loaded activity log"
        );
        Ok(LoadReport {
            missing: false,
            loaded,
            skipped,
            expired,
            compacted,
        })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
