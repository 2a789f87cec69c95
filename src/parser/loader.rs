//! Capture file loading and iteration window selection.
//!
//! Loads the `traceEvents` array from a profiler capture file and locates
//! the time window covering one training iteration via the boundary marker
//! events the profilers emit.

use super::event::TraceEvent;
use crate::utils::config::{ITERATION_MARKER_PREFIXES, KERNEL_GRACE_PERIOD};
use crate::utils::error::ParseError;
use log::{debug, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Time window over the capture selected by iteration markers.
///
/// Unbounded sides default to `[0, i64::MAX)`. Device-kernel events get an
/// extra grace period past the end boundary (see `kernel_end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationWindow {
    pub start: i64,
    pub end: i64,
}

impl Default for IterationWindow {
    fn default() -> Self {
        Self {
            start: 0,
            end: i64::MAX,
        }
    }
}

impl IterationWindow {
    /// End boundary for device-kernel events.
    ///
    /// Kernels launched inside the iteration routinely complete after the
    /// boundary marker, so they get a fixed buffer.
    pub fn kernel_end(&self) -> i64 {
        self.end.saturating_add(KERNEL_GRACE_PERIOD)
    }

    /// True when `ts` lies inside the window proper
    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.start && ts <= self.end
    }

    /// True when `ts` lies inside the kernel window (end + grace period)
    pub fn contains_kernel(&self, ts: i64) -> bool {
        ts >= self.start && ts <= self.kernel_end()
    }
}

/// Load the ordered event sequence from a capture file
///
/// **Public** - main entry point for loading
///
/// Individual events that fail to decode are skipped with a warning;
/// capture formats routinely include partial or auxiliary records.
///
/// # Errors
/// * `ParseError::IoError` - file cannot be opened
/// * `ParseError::JsonError` - top-level JSON is invalid
/// * `ParseError::InvalidFormat` - no `traceEvents` array present
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<TraceEvent>, ParseError> {
    let path = path.as_ref();
    debug!("Loading capture: {}", path.display());

    let file = File::open(path)?;
    let raw: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;

    let raw_events = match &raw {
        // Standard capture: object with a traceEvents array
        serde_json::Value::Object(obj) => obj
            .get("traceEvents")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                ParseError::InvalidFormat("Capture has no traceEvents array".to_string())
            })?,
        // Bare array of events (pre-export tooling sometimes strips the wrapper)
        serde_json::Value::Array(arr) => arr,
        _ => {
            return Err(ParseError::InvalidFormat(
                "Capture must be a JSON object or array".to_string(),
            ))
        }
    };

    let mut events = Vec::with_capacity(raw_events.len());
    let mut skipped = 0usize;
    for (index, value) in raw_events.iter().enumerate() {
        match serde_json::from_value::<TraceEvent>(value.clone()) {
            Ok(event) => events.push(event),
            Err(e) => {
                // Log but don't fail - some records may be malformed
                warn!("Skipping undecodable event {}: {}", index, e);
                skipped += 1;
            }
        }
    }

    if events.is_empty() && !raw_events.is_empty() {
        return Err(ParseError::InvalidFormat(
            "All trace events failed to decode".to_string(),
        ));
    }

    debug!("Loaded {} events ({} skipped)", events.len(), skipped);
    Ok(events)
}

/// Locate the time window for one iteration by marker name substring
///
/// **Public** - called before graph construction when an iteration is given
///
/// Scans for events whose name contains `iteration{N}` or `ProfilerStep#{N}`
/// (window start) and the same marker for `N + num_iterations` (window end).
/// A missing marker leaves that boundary unbounded.
pub fn iteration_window(
    events: &[TraceEvent],
    iteration: u32,
    num_iterations: u32,
) -> IterationWindow {
    let mut window = IterationWindow::default();
    let start_suffix = iteration.to_string();
    let end_suffix = (iteration + num_iterations).to_string();

    for event in events {
        let (Some(name), Some(ts)) = (event.name.as_deref(), event.ts) else {
            continue;
        };
        for prefix in ITERATION_MARKER_PREFIXES {
            if name.contains(&format!("{}{}", prefix, start_suffix)) {
                window.start = ts;
            }
            if name.contains(&format!("{}{}", prefix, end_suffix)) {
                window.end = ts;
            }
        }
    }

    if window.start == 0 {
        warn!("No start marker found for iteration {}", iteration);
    }
    if window.end == i64::MAX {
        warn!(
            "No end marker found for iteration {}",
            iteration + num_iterations
        );
    }
    debug!(
        "Iteration {} window: [{}, {}]",
        iteration, window.start, window.end
    );

    window
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(name: &str, ts: i64) -> TraceEvent {
        serde_json::from_value(serde_json::json!({ "name": name, "ts": ts })).unwrap()
    }

    #[test]
    fn test_iteration_window_from_markers() {
        let events = vec![
            marker("iteration3 begin", 1_000),
            marker("aten::add", 1_500),
            marker("iteration4 begin", 9_000),
        ];

        let window = iteration_window(&events, 3, 1);
        assert_eq!(window.start, 1_000);
        assert_eq!(window.end, 9_000);
        assert_eq!(window.kernel_end(), 9_000 + KERNEL_GRACE_PERIOD);
    }

    #[test]
    fn test_profiler_step_markers() {
        let events = vec![
            marker("ProfilerStep#12", 500),
            marker("ProfilerStep#13", 700),
        ];

        let window = iteration_window(&events, 12, 1);
        assert_eq!(window.start, 500);
        assert_eq!(window.end, 700);
    }

    #[test]
    fn test_missing_markers_leave_window_unbounded() {
        let events = vec![marker("aten::mul", 100)];
        let window = iteration_window(&events, 1, 1);
        assert_eq!(window, IterationWindow::default());
    }

    #[test]
    fn test_window_containment() {
        let window = IterationWindow { start: 10, end: 20 };
        assert!(window.contains(10));
        assert!(window.contains(20));
        assert!(!window.contains(21));
        assert!(window.contains_kernel(20 + KERNEL_GRACE_PERIOD));
        assert!(!window.contains_kernel(21 + KERNEL_GRACE_PERIOD));
    }
}
