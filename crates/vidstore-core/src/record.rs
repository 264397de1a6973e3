//! The video record entity and its validated creation input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::ids::VideoId;

/// Message returned when `servers` is missing, not an array, or empty.
pub const SERVERS_REQUIRED: &str = "servers array required";

/// A stored video record.
///
/// `servers` is an ordered list of opaque server-group descriptors (stream
/// URLs grouped by quality and subtitle variants). Its contents are passed
/// through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: VideoId,
    pub title: String,
    pub servers: Vec<Value>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl VideoRecord {
    /// The title used when the caller does not supply one.
    pub fn default_title(id: VideoId) -> String {
        format!("Video {id}")
    }
}

/// Validated input for creating a record.
///
/// The only way to obtain a `NewVideo` is through [`NewVideo::new`] or
/// [`NewVideo::from_servers`], so a store never sees an empty `servers` list.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVideo {
    title: Option<String>,
    servers: Vec<Value>,
}

impl NewVideo {
    /// Validate raw request fields.
    ///
    /// `servers` must be a non-empty JSON array; absent, `null`, non-array,
    /// and empty values are all rejected with [`SERVERS_REQUIRED`]. An empty
    /// title is treated as omitted.
    pub fn new(title: Option<String>, servers: Option<Value>) -> Result<Self> {
        match servers {
            Some(Value::Array(items)) => Self::from_servers(title, items),
            _ => Err(Error::validation(SERVERS_REQUIRED)),
        }
    }

    /// Validate an already-split list of server descriptors.
    pub fn from_servers(title: Option<String>, servers: Vec<Value>) -> Result<Self> {
        if servers.is_empty() {
            return Err(Error::validation(SERVERS_REQUIRED));
        }
        Ok(Self {
            title: title.filter(|t| !t.is_empty()),
            servers,
        })
    }

    /// Turn this input into a record with a fresh id and the current time.
    pub fn into_record(self) -> VideoRecord {
        self.into_record_with(VideoId::new(), timestamp::now())
    }

    /// Turn this input into a record with an explicit id and creation time.
    pub fn into_record_with(self, id: VideoId, created_at: DateTime<Utc>) -> VideoRecord {
        VideoRecord {
            id,
            title: self
                .title
                .unwrap_or_else(|| VideoRecord::default_title(id)),
            servers: self.servers,
            created_at,
        }
    }
}

/// RFC 3339 timestamps with millisecond precision and a `Z` suffix.
///
/// Every backend stores `createdAt` at millisecond precision so that a record
/// read back is identical to the one returned from `create`.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// The current time truncated to whole milliseconds.
    pub fn now() -> DateTime<Utc> {
        let now = Utc::now();
        DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
    }

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s).map(|ts| ts.with_timezone(&Utc))
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }
}
