//! In-memory log capture for tests
//!
//! Installs a subscriber layer that keeps every event so tests can check
//! what an upload logged: its lifecycle under one request id, or the
//! metadata failures swallowed for one record.

use crate::errors::ExErrorKind;
use filevault_core_types::schema::{
    FIELD_COMPONENT, FIELD_DURATION_MS, FIELD_ERR_CODE, FIELD_ERR_KIND, FIELD_EVENT, FIELD_OP,
    FIELD_RECORD_ID, FIELD_REQUEST_ID,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One captured event, fields rendered as strings
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub component: Option<String>,
    pub op: Option<String>,
    pub event: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn record_id(&self) -> Option<&str> {
        self.field(FIELD_RECORD_ID)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.field(FIELD_REQUEST_ID)
    }

    pub fn err_code(&self) -> Option<&str> {
        self.field(FIELD_ERR_CODE)
    }

    /// Debug rendering of the `ExErrorKind`, e.g. `MetadataWriteFailure`
    pub fn err_kind(&self) -> Option<&str> {
        self.field(FIELD_ERR_KIND)
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.field(FIELD_DURATION_MS).and_then(|v| v.parse().ok())
    }
}

#[derive(Default)]
struct FieldCollector(HashMap<String, String>);

impl FieldCollector {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }
}

/// Layer that appends every event to a shared list
pub struct TestCaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCaptureLayer {
    pub fn new() -> (Self, TestCapture) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let layer = Self {
            events: Arc::clone(&events),
        };
        (layer, TestCapture { events })
    }
}

impl<S> Layer<S> for TestCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut collector = FieldCollector::default();
        event.record(&mut collector);
        let fields = collector.0;

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            component: fields.get(FIELD_COMPONENT).cloned(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            fields,
        };

        if let Ok(mut events) = self.events.lock() {
            events.push(captured);
        }
    }
}

/// Handle on the captured events
#[derive(Clone)]
pub struct TestCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn matching<F>(&self, predicate: F) -> Vec<CapturedEvent>
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().into_iter().filter(|e| predicate(e)).collect()
    }

    pub fn events_for_op(&self, op: &str) -> Vec<CapturedEvent> {
        self.matching(|e| e.op.as_deref() == Some(op))
    }

    pub fn events_for_record(&self, record_id: &str) -> Vec<CapturedEvent> {
        self.matching(|e| e.record_id() == Some(record_id))
    }

    /// Events logged under one `add_file` request
    pub fn events_for_request(&self, request_id: &str) -> Vec<CapturedEvent> {
        self.matching(|e| e.request_id() == Some(request_id))
    }

    /// Lifecycle events (`start`, `end`, `end_error`) of one request, in order
    pub fn lifecycle_of(&self, request_id: &str) -> Vec<String> {
        self.events_for_request(request_id)
            .into_iter()
            .filter_map(|e| e.event)
            .collect()
    }

    /// Swallowed metadata failures logged for `record_id`
    pub fn metadata_failures_for(&self, record_id: &str) -> Vec<CapturedEvent> {
        self.matching(|e| {
            e.level == Level::ERROR
                && e.err_code() == Some(ExErrorKind::MetadataWriteFailure.code())
                && e.record_id() == Some(record_id)
        })
    }

    /// # Panics
    ///
    /// Panics if no event has this `op` and `event`
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        let found = events
            .iter()
            .any(|e| e.op.as_deref() == Some(op) && e.event.as_deref() == Some(event));
        assert!(
            found,
            "no event op={} event={} among {} captured",
            op,
            event,
            events.len()
        );
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.matching(predicate).len()
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber (first call only)
///
/// Every test in a binary shares the same list, so filter on something the
/// test owns: a record id, a request id, a unique op name.
///
/// ```
/// use filevault_core::logging_facility::test_capture::init_test_capture;
/// use filevault_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_example_op", record_id = "doc-r1");
/// assert_eq!(capture.events_for_record("doc-r1").len(), 1);
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = TestCaptureLayer::new();
            tracing_subscriber::registry().with(layer).init();
            capture
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(fields: &[(&str, &str)]) -> CapturedEvent {
        CapturedEvent {
            level: Level::ERROR,
            component: None,
            op: None,
            event: None,
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_duration_parses_or_is_absent() {
        assert_eq!(event(&[("duration_ms", "42")]).duration_ms(), Some(42));
        assert_eq!(event(&[("duration_ms", "soon")]).duration_ms(), None);
        assert_eq!(event(&[]).duration_ms(), None);
    }

    #[test]
    fn test_accessors_use_schema_names() {
        let e = event(&[("request_id", "q1"), ("err_code", "ERR_NOT_FOUND")]);
        assert_eq!(e.request_id(), Some("q1"));
        assert_eq!(e.err_code(), Some("ERR_NOT_FOUND"));
        assert_eq!(e.record_id(), None);
    }
}
