//! FlowRecord - Collector output, Counter Store input
//!
//! One summarized directional exchange between two hosts. Decoding is
//! lenient: malformed counts become 0 and unusable addresses become absent,
//! so a record never fails to decode because of its field values.

use std::fmt;
use std::sync::Arc;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

/// Flow delivery callback type
///
/// The collector hands every decoded record to this callback. Uses `Arc`
/// so one callback can be shared by several listeners.
pub type FlowCallback = Arc<dyn Fn(FlowRecord) + Send + Sync>;

/// Flow summary record
///
/// Wire form is a JSON object such as
/// `{"src_ip":"10.0.0.1","dst_ip":"8.8.8.8","bytes":120,"packets":1}`.
/// Unknown keys (ports, protocol, timestamp) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRecord {
    /// Source address
    #[serde(
        rename = "src_ip",
        alias = "source",
        default,
        deserialize_with = "lenient_address",
        skip_serializing_if = "Option::is_none"
    )]
    pub source: Option<String>,

    /// Destination address
    #[serde(
        rename = "dst_ip",
        alias = "destination",
        default,
        deserialize_with = "lenient_address",
        skip_serializing_if = "Option::is_none"
    )]
    pub destination: Option<String>,

    /// Bytes transferred
    #[serde(default, deserialize_with = "lenient_count")]
    pub bytes: u64,

    /// Packets transferred
    #[serde(default, deserialize_with = "lenient_count")]
    pub packets: u64,
}

impl FlowRecord {
    /// Create a record between two hosts
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        bytes: u64,
        packets: u64,
    ) -> Self {
        Self {
            source: Some(source.into()),
            destination: Some(destination.into()),
            bytes,
            packets,
        }
    }

    /// Create a record that only names its source
    pub fn from_source(source: impl Into<String>, bytes: u64, packets: u64) -> Self {
        Self {
            source: Some(source.into()),
            destination: None,
            bytes,
            packets,
        }
    }

    /// Source address, `None` when absent or empty
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref().filter(|s| !s.is_empty())
    }

    /// Destination address, `None` when absent or empty
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref().filter(|s| !s.is_empty())
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(CountVisitor)
}

fn lenient_address<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(AddressVisitor)
}

/// Coerce a float count: finite non-negative values truncate toward zero.
fn count_from_f64(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value as u64
    } else {
        0
    }
}

fn count_from_str(value: &str) -> u64 {
    let value = value.trim();
    if let Ok(n) = value.parse::<u64>() {
        return n;
    }
    if value.parse::<i64>().is_ok() {
        // negative integer
        return 0;
    }
    value.parse::<f64>().map(count_from_f64).unwrap_or(0)
}

struct CountVisitor;

impl<'de> Visitor<'de> for CountVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a byte or packet count")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        Ok(u64::try_from(v).unwrap_or(0))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
        Ok(count_from_f64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        Ok(count_from_str(v))
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<u64, E> {
        Ok(0)
    }

    fn visit_unit<E: de::Error>(self) -> Result<u64, E> {
        Ok(0)
    }

    fn visit_none<E: de::Error>(self) -> Result<u64, E> {
        Ok(0)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<u64, D::Error> {
        deserializer.deserialize_any(CountVisitor)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<u64, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(0)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<u64, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(0)
    }
}

struct AddressVisitor;

impl<'de> Visitor<'de> for AddressVisitor {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a host address string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok((!v.is_empty()).then(|| v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok((!v.is_empty()).then_some(v))
    }

    fn visit_u64<E: de::Error>(self, _v: u64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_i64<E: de::Error>(self, _v: i64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_f64<E: de::Error>(self, _v: f64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(AddressVisitor)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> FlowRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_decode_full_record() {
        let record = decode(
            r#"{"src_ip":"192.168.1.10","dst_ip":"8.8.8.8","src_port":54321,
                "dst_port":53,"protocol":17,"bytes":120,"packets":1,"ts":1690000000}"#,
        );
        assert_eq!(record, FlowRecord::new("192.168.1.10", "8.8.8.8", 120, 1));
    }

    #[test]
    fn test_missing_counts_default_to_zero() {
        let record = decode(r#"{"src_ip":"a"}"#);
        assert_eq!(record.bytes, 0);
        assert_eq!(record.packets, 0);
        assert_eq!(record.destination(), None);
    }

    #[test]
    fn test_malformed_counts_coerce() {
        let record = decode(r#"{"src_ip":"a","bytes":"1500","packets":"abc"}"#);
        assert_eq!(record.bytes, 1500);
        assert_eq!(record.packets, 0);

        let record = decode(r#"{"src_ip":"a","bytes":-5,"packets":2.9}"#);
        assert_eq!(record.bytes, 0);
        assert_eq!(record.packets, 2);

        let record = decode(r#"{"src_ip":"a","bytes":null,"packets":[1,2]}"#);
        assert_eq!(record.bytes, 0);
        assert_eq!(record.packets, 0);

        let record = decode(r#"{"src_ip":"a","bytes":{"v":1},"packets":true}"#);
        assert_eq!(record.bytes, 0);
        assert_eq!(record.packets, 0);

        let record = decode(r#"{"src_ip":"a","bytes":" -7 ","packets":"3.5"}"#);
        assert_eq!(record.bytes, 0);
        assert_eq!(record.packets, 3);
    }

    #[test]
    fn test_oversized_counts_saturate() {
        let record = decode(r#"{"src_ip":"a","bytes":1e300,"packets":"12345678901234567890123"}"#);
        assert_eq!(record.bytes, u64::MAX);
        assert_eq!(record.packets, u64::MAX);
    }

    #[test]
    fn test_unusable_addresses_are_absent() {
        let record = decode(r#"{"src_ip":"","dst_ip":42,"bytes":1}"#);
        assert_eq!(record.source(), None);
        assert_eq!(record.destination(), None);
        assert_eq!(record.bytes, 1);

        let record = decode(r#"{"src_ip":null,"dst_ip":["x"]}"#);
        assert_eq!(record.source, None);
        assert_eq!(record.destination, None);
    }

    #[test]
    fn test_long_form_aliases() {
        let record = decode(r#"{"source":"a","destination":"b","bytes":3}"#);
        assert_eq!(record.source(), Some("a"));
        assert_eq!(record.destination(), Some("b"));
    }

    #[test]
    fn test_empty_strings_in_code_are_absent() {
        let record = FlowRecord::new("", "b", 1, 1);
        assert_eq!(record.source(), None);
        assert_eq!(record.destination(), Some("b"));
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let json = serde_json::to_string(&FlowRecord::from_source("a", 10, 1)).unwrap();
        assert_eq!(json, r#"{"src_ip":"a","bytes":10,"packets":1}"#);
    }
}
