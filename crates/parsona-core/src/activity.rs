//! Raw activity records and content fingerprinting.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::CoreError;

pub const DEFAULT_SOURCE_TYPE: &str = "linkedin";

/// One stored unit of user activity. Append-only: never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawActivity {
    pub id: i64,
    pub public_id: Uuid,
    pub user_id: Uuid,
    pub source_type: String,
    pub raw_payload: Value,
    /// SHA-256 of the canonicalized payload; unique across all users.
    pub content_hash: String,
    pub ingested_at: DateTime<Utc>,
}

/// An activity ready to be offered to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRawActivity {
    pub user_id: Uuid,
    pub source_type: String,
    pub raw_payload: Value,
    pub content_hash: String,
    pub ingested_at: DateTime<Utc>,
}

impl NewRawActivity {
    /// Fingerprint `payload` and wrap it for insertion.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PayloadNotObject`] if the payload is not a JSON object.
    pub fn from_payload(
        user_id: Uuid,
        raw_payload: Value,
        ingested_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        if !raw_payload.is_object() {
            return Err(CoreError::PayloadNotObject);
        }
        let content_hash = content_fingerprint(&raw_payload);
        Ok(Self {
            user_id,
            source_type: DEFAULT_SOURCE_TYPE.to_string(),
            raw_payload,
            content_hash,
            ingested_at,
        })
    }
}

/// The fields the signal extractor reads from a payload, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityFields<'a> {
    pub text: &'a str,
    pub likes: u64,
    pub comments: u64,
    /// Payload `date`, or the ingestion time when absent or unparseable.
    pub occurred_at: DateTime<Utc>,
}

impl RawActivity {
    #[must_use]
    pub fn fields(&self) -> ActivityFields<'_> {
        let payload = &self.raw_payload;
        ActivityFields {
            text: payload.get("text").and_then(Value::as_str).unwrap_or(""),
            likes: count_field(payload.get("likes")),
            comments: count_field(payload.get("comments")),
            occurred_at: payload
                .get("date")
                .and_then(Value::as_str)
                .and_then(parse_timestamp)
                .unwrap_or(self.ingested_at),
        }
    }
}

fn count_field(value: Option<&Value>) -> u64 {
    let Some(value) = value else {
        return 0;
    };
    if let Some(n) = value.as_u64() {
        return n;
    }
    match value.as_f64() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(f) if f.is_finite() && f > 0.0 => f as u64,
        _ => 0,
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Serialize a JSON value with object keys sorted at every level and no
/// insignificant whitespace. Two payloads that differ only in key order
/// produce the same string.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Hex-encoded SHA-256 of the canonical payload form.
#[must_use]
pub fn content_fingerprint(payload: &Value) -> String {
    format!("{:x}", Sha256::digest(canonical_json(payload).as_bytes()))
}
