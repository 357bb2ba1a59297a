//! Datagram framing and JSON decoding
//!
//! A datagram carries one or more newline-delimited JSON flow records.
//! Bytes are decoded as UTF-8 lossily; blank lines are skipped.

use contracts::FlowRecord;
use serde_json::{Map, Value};
use tracing::debug;

/// Longest line prefix echoed into debug logs
const LOG_PREVIEW_CHARS: usize = 80;

/// Records decoded from one datagram
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedBatch {
    /// Successfully decoded records, in line order
    pub records: Vec<FlowRecord>,

    /// Non-blank lines that were not a JSON object
    pub errors: u64,
}

/// Decode a single line into a flow record
///
/// The line must hold a JSON object; field values are coerced, never
/// rejected.
pub fn decode_line(line: &str) -> Result<FlowRecord, serde_json::Error> {
    let object: Map<String, Value> = serde_json::from_str(line)?;
    serde_json::from_value(Value::Object(object))
}

/// Split a datagram into lines and decode each one
pub fn decode_datagram(payload: &[u8]) -> DecodedBatch {
    let text = String::from_utf8_lossy(payload);
    let mut batch = DecodedBatch::default();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match decode_line(line) {
            Ok(record) => batch.records.push(record),
            Err(e) => {
                batch.errors += 1;
                let preview: String = line.chars().take(LOG_PREVIEW_CHARS).collect();
                debug!(error = %e, line = %preview, "Invalid flow record");
            }
        }
    }

    batch
}
