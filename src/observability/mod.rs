//! Observability for the index layer
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//!
//! Observability is read-only: it never changes the outcome of the
//! operation that emits it, and a failed write is ignored.

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::IndexDropped, &[("index", "by_email"), ("table", "users")]);
    }
}
