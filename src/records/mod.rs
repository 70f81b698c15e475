//! Record kinds stored as issues.
//!
//! Each record renders to an issue title, a human-readable markdown body and
//! a label set. After the prose the body carries a fenced JSON block tagged
//! with a versioned marker; decoding prefers that block and only falls back
//! to pattern-matching the prose for issues that lack it.

pub mod contact;
pub mod order;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub use contact::{ContactRecord, ContactSubmission};
pub use order::{Customer, FulfillmentStatus, LineItem, OrderRecord, OrderSubmission};

pub const PAYLOAD_VERSION: u32 = 1;

const PAYLOAD_MARKER: &str = "<!-- storefront-record:v";

/// Matches a block that runs to the end of the body.
static PAYLOAD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A<!-- storefront-record:v(\d+) -->\n```json\n(.*)\n```\s*\z").unwrap()
});

/// Identifier and link of a freshly created record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub issue_id: u64,
    pub issue_url: String,
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    kind: String,
    record: T,
}

/// Append the structured block for `record` to the prose body.
pub(crate) fn embed_payload<T: Serialize>(
    prose: &str,
    kind: &str,
    record: &T,
) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string_pretty(&Envelope {
        kind: kind.to_string(),
        record,
    })?;
    Ok(format!(
        "{}\n\n<!-- storefront-record:v{} -->\n```json\n{}\n```\n",
        prose, PAYLOAD_VERSION, json
    ))
}

/// Structured block of the expected kind, if present and readable.
///
/// Only the last marker that starts a line is considered, and its block must
/// close the body. Markers typed into the prose come earlier and are ignored.
/// Serialized JSON never puts a marker at the start of a line.
pub(crate) fn extract_payload<T: DeserializeOwned>(body: &str, kind: &str) -> Option<T> {
    let start = match body.rfind(&format!("\n{}", PAYLOAD_MARKER)) {
        Some(at) => at + 1,
        None if body.starts_with(PAYLOAD_MARKER) => 0,
        None => return None,
    };
    let caps = PAYLOAD_REGEX.captures(&body[start..])?;
    let version: u32 = caps.get(1)?.as_str().parse().ok()?;
    if version != PAYLOAD_VERSION {
        return None;
    }
    let envelope: Envelope<T> = serde_json::from_str(caps.get(2)?.as_str()).ok()?;
    (envelope.kind == kind).then_some(envelope.record)
}

/// First capture group of `re` in `text`.
pub(crate) fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Issue bodies edited through the web UI come back with CRLF endings.
pub(crate) fn normalize_newlines(body: &str) -> String {
    body.replace("\r\n", "\n")
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
