//! Structured logging emitted by the choreographer.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use perfui_core::Range;
use perfui_runtime::Choreographer;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: HashMap<String, String>,
}

#[derive(Clone, Default)]
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(HashMap<String, String>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0
            .insert(field.name().to_string(), format!("{value:?}"));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(HashMap::new());
        event.record(&mut visitor);
        let message = visitor.0.remove("message").unwrap_or_default();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields: visitor.0,
        });
    }
}

fn with_captured_tracing(f: impl FnOnce()) -> Vec<CapturedEvent> {
    let capture = EventCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    tracing::subscriber::with_default(subscriber, f);
    capture.events.lock().unwrap().clone()
}

#[test]
fn registration_is_logged_at_debug() {
    let events = with_captured_tracing(|| {
        let choreographer = Choreographer::new();
        let range = Rc::new(RefCell::new(Range::new(0.0, 1.0)));
        choreographer.register(range.clone());
        choreographer.register(range);
    });

    let registered: Vec<_> = events
        .iter()
        .filter(|e| e.message == "participant registered")
        .collect();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].level, tracing::Level::DEBUG);
    assert_eq!(registered[0].fields.get("participants").map(String::as_str), Some("1"));
    assert!(
        events
            .iter()
            .any(|e| e.message == "participant already registered; ignoring")
    );
}

#[test]
fn frames_are_traced_with_their_length() {
    let events = with_captured_tracing(|| {
        let mut choreographer = Choreographer::new();
        choreographer.step();
    });

    let frame = events
        .iter()
        .find(|e| e.message == "frame complete")
        .expect("frame completion event");
    assert_eq!(frame.level, tracing::Level::TRACE);
    assert_eq!(
        frame.fields.get("frame_length_us").map(String::as_str),
        Some("16666")
    );
}

#[test]
fn reset_request_is_logged() {
    let events = with_captured_tracing(|| {
        let mut choreographer = Choreographer::new();
        choreographer.request_reset();
        choreographer.step();
    });

    assert!(events.iter().any(|e| e.message == "reset requested"));
    assert!(events.iter().any(|e| e.message == "resetting participants"));
}
