//! Observable events of the index layer
//!
//! Events are explicit and typed; the logger only ever sees their string form.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Table schemas loaded
    SchemasLoaded,

    // Registry
    /// A descriptor was inserted or replaced
    IndexRegistered,
    /// A descriptor was removed because its index is no longer declared
    IndexDropped,
    /// Registry resynchronized with table metadata
    IndexReloadComplete,
    /// Registry resynchronization failed; nothing changed
    IndexReloadFailed,

    // View derivation
    /// Backing view schema derived
    BackingViewDerived,
    /// Index definition rejected during derivation
    IndexDefinitionRejected,
    /// Derivation hit an unreachable state
    InvariantViolated,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",

            Event::IndexRegistered => "INDEX_REGISTERED",
            Event::IndexDropped => "INDEX_DROPPED",
            Event::IndexReloadComplete => "INDEX_RELOAD_COMPLETE",
            Event::IndexReloadFailed => "INDEX_RELOAD_FAILED",

            Event::BackingViewDerived => "BACKING_VIEW_DERIVED",
            Event::IndexDefinitionRejected => "INDEX_DEFINITION_REJECTED",
            Event::InvariantViolated => "INVARIANT_VIOLATED",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::IndexRegistered => Severity::Trace,
            Event::IndexReloadFailed | Event::IndexDefinitionRejected => Severity::Warn,
            Event::InvariantViolated => Severity::Fatal,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL: [Event; 9] = [
        Event::ConfigLoaded,
        Event::SchemasLoaded,
        Event::IndexRegistered,
        Event::IndexDropped,
        Event::IndexReloadComplete,
        Event::IndexReloadFailed,
        Event::BackingViewDerived,
        Event::IndexDefinitionRejected,
        Event::InvariantViolated,
    ];

    #[test]
    fn test_event_names_unique() {
        let names: HashSet<&str> = ALL.iter().map(Event::as_str).collect();
        assert_eq!(names.len(), ALL.len());
    }

    #[test]
    fn test_only_invariant_violation_is_fatal() {
        for event in ALL {
            let fatal = event.severity() == Severity::Fatal;
            assert_eq!(fatal, event == Event::InvariantViolated, "{}", event);
        }
    }
}
