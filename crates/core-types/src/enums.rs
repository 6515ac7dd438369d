use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of trading event recorded on a log line.
///
/// Matching is case-insensitive: any event ending in `_OPEN` opens a position
/// (`BUY_OPEN`, `sell_open`, ...), and `POSITION_CLOSE` closes one. Everything
/// else is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A position-opening event; holds the event name as logged.
    Open(String),
    PositionClose,
    /// Any other event (heartbeats, modifications, ...).
    Other(String),
}

impl EventKind {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let upper = trimmed.to_ascii_uppercase();
        if upper == "POSITION_CLOSE" {
            EventKind::PositionClose
        } else if upper.ends_with("_OPEN") {
            EventKind::Open(trimmed.to_string())
        } else {
            EventKind::Other(trimmed.to_string())
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, EventKind::Open(_))
    }

    pub fn is_close(&self) -> bool {
        matches!(self, EventKind::PositionClose)
    }

    /// Returns the event name as it should be written back to a log.
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Open(name) | EventKind::Other(name) => name,
            EventKind::PositionClose => "POSITION_CLOSE",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_events_case_insensitively() {
        assert_eq!(EventKind::parse("BUY_OPEN"), EventKind::Open("BUY_OPEN".to_string()));
        assert!(EventKind::parse("sell_open").is_open());
        assert!(EventKind::parse("position_close").is_close());
        assert!(EventKind::parse(" POSITION_CLOSE ").is_close());
        assert_eq!(
            EventKind::parse("ORDER_MODIFY"),
            EventKind::Other("ORDER_MODIFY".to_string())
        );
    }

    #[test]
    fn close_is_not_an_open() {
        // "POSITION_CLOSE" must never be mistaken for an open, and "CLOSE_OPEN" is an open.
        assert!(!EventKind::parse("POSITION_CLOSE").is_open());
        assert!(EventKind::parse("CLOSE_OPEN").is_open());
        assert!(!EventKind::parse("PARTIAL_POSITION_CLOSE").is_close());
    }
}
