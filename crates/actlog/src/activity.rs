//! A single logged action and its on-disk document shape.

use std::fmt;

use actlog_common::{Actor, Clock, SystemClock};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ActivityLogError, ActivityLogResult};

/// URL records are kept for seven days.
pub const URL_RETENTION_MS: i64 = 7 * 24 * 60 * 60 * 1000;

const USER_PLAYER: &str = "player";
const USER_OTHER: &str = "other";

/// What `data_value` refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataKind {
    /// Link to an external resource (e.g. an uploaded report).
    Url,
    /// Path to a local artifact.
    File,
    /// Kind written by a newer version; kept verbatim.
    Other(String),
}

impl DataKind {
    pub fn as_str(&self) -> &str {
        match self {
            DataKind::Url => "url",
            DataKind::File => "file",
            DataKind::Other(kind) => kind,
        }
    }
}

impl From<String> for DataKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "url" => DataKind::Url,
            "file" => DataKind::File,
            _ => DataKind::Other(kind),
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged action. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    user: String,
    user_id: Option<Uuid>,
    time: i64,
    activity_type: String,
    data_kind: DataKind,
    data_value: String,
}

impl Activity {
    /// Activity whose payload is a URL.
    pub fn url(
        actor: &impl Actor,
        time: i64,
        activity_type: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::new(actor, time, activity_type.into(), DataKind::Url, url.into())
    }

    /// Activity whose payload is a file path.
    pub fn file(
        actor: &impl Actor,
        time: i64,
        activity_type: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self::new(
            actor,
            time,
            activity_type.into(),
            DataKind::File,
            file_path.into(),
        )
    }

    fn new(
        actor: &impl Actor,
        time: i64,
        activity_type: String,
        data_kind: DataKind,
        data_value: String,
    ) -> Self {
        Self {
            user: actor.name().to_string(),
            user_id: actor.unique_id(),
            time,
            activity_type,
            data_kind,
            data_value,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    /// Credited to a known principal rather than an anonymous one.
    pub fn is_player(&self) -> bool {
        self.user_id.is_some()
    }

    /// Creation time in epoch milliseconds.
    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn activity_type(&self) -> &str {
        &self.activity_type
    }

    pub fn data_kind(&self) -> &DataKind {
        &self.data_kind
    }

    pub fn data_value(&self) -> &str {
        &self.data_value
    }

    /// Epoch milliseconds after which the record expires, if it ever does.
    pub fn expires_at(&self) -> Option<i64> {
        match self.data_kind {
            DataKind::Url => Some(self.time.saturating_add(URL_RETENTION_MS)),
            _ => None,
        }
    }

    /// Checked against the wall clock at the moment of the call.
    pub fn should_expire(&self) -> bool {
        self.should_expire_with(&SystemClock)
    }

    pub fn should_expire_with(&self, clock: &dyn Clock) -> bool {
        self.should_expire_at(clock.now_millis())
    }

    pub fn should_expire_at(&self, now_millis: i64) -> bool {
        match self.expires_at() {
            Some(deadline) => now_millis > deadline,
            None => false,
        }
    }

    /// Document form written to the log file.
    pub fn serialize(&self) -> ActivityDocument {
        let (kind, uuid) = match self.user_id {
            Some(id) => (USER_PLAYER, Some(id.to_string())),
            None => (USER_OTHER, None),
        };

        ActivityDocument {
            user: UserDocument {
                kind: Some(kind.to_string()),
                name: self.user.clone(),
                uuid,
            },
            time: self.time,
            activity_type: self.activity_type.clone(),
            data: DataDocument {
                kind: self.data_kind.as_str().to_string(),
                value: self.data_value.clone(),
            },
        }
    }

    /// Rebuilds an activity from one element of the log file.
    pub fn deserialize(document: &serde_json::Value) -> ActivityLogResult<Self> {
        let document = ActivityDocument::deserialize(document)
            .map_err(|e| ActivityLogError::malformed_record(e.to_string()))?;
        Self::deserialize_document(document)
    }

    /// Inverse of [`Activity::serialize`].
    pub fn deserialize_document(document: ActivityDocument) -> ActivityLogResult<Self> {
        Self::try_from(document)
    }
}

impl TryFrom<ActivityDocument> for Activity {
    type Error = ActivityLogError;

    fn try_from(document: ActivityDocument) -> ActivityLogResult<Self> {
        // `uuid` decides player/other; `user.type` is informational only.
        let user_id = document
            .user
            .uuid
            .as_deref()
            .map(|raw| {
                Uuid::parse_str(raw).map_err(|e| {
                    ActivityLogError::malformed_record(format!("invalid user uuid '{raw}': {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            user: document.user.name,
            user_id,
            time: document.time,
            activity_type: document.activity_type,
            data_kind: DataKind::from(document.data.kind),
            data_value: document.data.value,
        })
    }
}

/// `{"user": {...}, "time": .., "type": "..", "data": {...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDocument {
    pub user: UserDocument,
    pub time: i64,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub data: DataDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDocument {
    /// `"player"` or `"other"`. Written for readers of the file; never read
    /// back, whatever its shape.
    #[serde(rename = "type", skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDocument {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}
