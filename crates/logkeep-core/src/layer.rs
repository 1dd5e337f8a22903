//! Tracing Layer that persists events through a [`Logger`].
//!
//! Applications that already instrument with `tracing` can add this layer to
//! their subscriber and get the logger's file persistence, retention and
//! export without calling [`Logger`] directly.

use std::fmt::Write as FmtWrite;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::logger::Logger;

/// Events from this crate are never persisted, so the writer's own
/// diagnostics cannot feed back into the file.
const OWN_TARGET_PREFIX: &str = "logkeep_core";

/// Forwards each event as `LEVEL message key=value ...`, tagged with its target.
pub struct LoggerLayer {
    logger: Arc<Logger>,
}

impl LoggerLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }
}

impl<S> Layer<S> for LoggerLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();
        if target.starts_with(OWN_TARGET_PREFIX) {
            return;
        }

        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        self.logger
            .log_with_tag(target, &visitor.render(metadata.level().as_str()));
    }
}

/// Collects the message and the remaining fields of one event.
#[derive(Default)]
struct LineVisitor {
    message: Option<String>,
    fields: String,
}

impl LineVisitor {
    fn push_field(&mut self, name: &str, value: impl std::fmt::Display) {
        let _ = write!(self.fields, " {}={}", name, value);
    }

    fn render(self, level: &str) -> String {
        format!(
            "{} {}{}",
            level,
            self.message.unwrap_or_default(),
            self.fields
        )
    }
}

impl Visit for LineVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.push_field(field.name(), value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push_field(field.name(), value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push_field(field.name(), value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push_field(field.name(), value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push_field(field.name(), value);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push_field(field.name(), value);
    }
}
