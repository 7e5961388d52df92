use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Fields of one recorded event, rendered with `Debug`. The message is stored under `message`.
pub(crate) type EventFields = BTreeMap<String, String>;

/// Layer that keeps every event it sees, for assertions on log output.
#[derive(Clone, Default)]
pub(crate) struct RecordedEvents(Arc<Mutex<Vec<EventFields>>>);

impl RecordedEvents {
  pub(crate) fn find(&self, message: &str) -> Option<EventFields> {
    self
      .0
      .lock()
      .unwrap()
      .iter()
      .find(|fields| fields.get("message").map(String::as_str) == Some(message))
      .cloned()
  }
}

struct FieldRecorder<'a>(&'a mut EventFields);

impl Visit for FieldRecorder<'_> {
  fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
    self.0.insert(field.name().to_string(), format!("{value:?}"));
  }
}

impl<S: Subscriber> Layer<S> for RecordedEvents {
  fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
    let mut fields = EventFields::new();
    event.record(&mut FieldRecorder(&mut fields));
    self.0.lock().unwrap().push(fields);
  }
}
