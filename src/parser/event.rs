//! Raw trace event schema.
//!
//! Capture files are Chrome-trace-format JSON: an array of event objects
//! under the `traceEvents` key. Fields vary by record kind (complete spans,
//! flow markers, metadata rows), so everything is optional here and the
//! graph builder decides which records carry enough to use.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Flow phase of a correlation marker
///
/// Only meaningful for the paired launch/execution markers; every other
/// record decodes as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    /// CPU-side launch call site ("s" in the capture)
    Start,
    /// Moment the kernel begins execution ("f" in the capture)
    Finish,
    /// Anything else
    Other,
}

impl FlowPhase {
    /// Map the raw phase string to a flow phase
    pub fn from_ph(ph: Option<&str>) -> Self {
        match ph {
            Some("s") => FlowPhase::Start,
            Some("f") => FlowPhase::Finish,
            _ => FlowPhase::Other,
        }
    }
}

/// One raw timestamped record from the capture
///
/// **Public** - input unit for the graph builder
#[derive(Debug, Clone, Deserialize)]
pub struct TraceEvent {
    /// Event name (operation, kernel, or marker)
    #[serde(default)]
    pub name: Option<String>,

    /// Event category; identifies device-kernel records
    #[serde(default)]
    pub cat: Option<String>,

    /// Start timestamp in the log's native unit (microseconds for the
    /// captures we consume)
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub ts: Option<i64>,

    /// Duration; absent for correlation markers and metadata rows
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub dur: Option<i64>,

    /// Raw phase marker ("s"/"f" for flow events)
    #[serde(default)]
    pub ph: Option<String>,

    /// Correlation id shared by a start-flow/finish-flow marker pair
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub id: Option<u64>,

    /// Free-form attributes (shape metadata, capture hints). Presence of
    /// the key itself distinguishes a real span record from auxiliary rows.
    #[serde(default)]
    pub args: Option<serde_json::Map<String, Value>>,
}

impl TraceEvent {
    /// Flow phase of this record
    pub fn phase(&self) -> FlowPhase {
        FlowPhase::from_ph(self.ph.as_deref())
    }

    /// True when the record carries everything a tree span needs. The
    /// `args` key must be present, even if empty: capture writers emit it
    /// on every real operation record, and auxiliary rows omit it.
    pub fn is_complete_span(&self) -> bool {
        self.name.is_some() && self.ts.is_some() && self.dur.is_some() && self.args.is_some()
    }

    /// True when the record is a start-flow or finish-flow marker
    pub fn is_flow_marker(&self) -> bool {
        self.name.is_some()
            && self.ts.is_some()
            && self.cat.is_some()
            && matches!(self.phase(), FlowPhase::Start | FlowPhase::Finish)
    }
}

/// Accept integers, floats, and decimal strings for timestamp-like fields.
/// Capture sources disagree on the JSON type; the original unit is integral.
fn de_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(json_to_i64))
}

/// Accept integers and decimal or hex strings for correlation ids
fn de_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(json_to_u64))
}

fn json_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn json_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let s = s.trim();
            if let Some(hex) = s.strip_prefix("0x") {
                u64::from_str_radix(hex, 16).ok()
            } else {
                s.parse::<u64>().ok()
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_span_detection() {
        let event: TraceEvent = serde_json::from_str(
            r#"{"name": "aten::add", "cat": "cpu_op", "ts": 100, "dur": 20, "args": {}}"#,
        )
        .unwrap();
        assert!(event.is_complete_span());
        assert!(!event.is_flow_marker());
        assert_eq!(event.phase(), FlowPhase::Other);
    }

    #[test]
    fn test_flow_marker_detection() {
        let event: TraceEvent = serde_json::from_str(
            r#"{"name": "launch", "cat": "async", "ts": 105, "ph": "f", "id": 7}"#,
        )
        .unwrap();
        assert!(event.is_flow_marker());
        assert!(!event.is_complete_span());
        assert_eq!(event.phase(), FlowPhase::Finish);
        assert_eq!(event.id, Some(7));
    }

    #[test]
    fn test_span_without_args_key_is_not_complete() {
        let event: TraceEvent =
            serde_json::from_str(r#"{"name": "aten::add", "ts": 100, "dur": 20}"#).unwrap();
        assert!(!event.is_complete_span());
        assert!(event.args.is_none());
    }

    #[test]
    fn test_string_and_float_timestamps() {
        let event: TraceEvent =
            serde_json::from_str(r#"{"name": "op", "ts": "1234", "dur": 56.7}"#).unwrap();
        assert_eq!(event.ts, Some(1234));
        assert_eq!(event.dur, Some(56));
    }

    #[test]
    fn test_hex_correlation_id() {
        let event: TraceEvent =
            serde_json::from_str(r#"{"name": "m", "ts": 1, "id": "0x1f"}"#).unwrap();
        assert_eq!(event.id, Some(31));
    }
}
