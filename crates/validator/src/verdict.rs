use crate::error::ValidationFailure;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Ok,
    Warn,
    Error,
}

impl Severity {
    fn tag(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

/// One human-readable line of validator output, e.g. `[WARN] Log is empty; ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.tag(), self.message)
    }
}

/// The outcome of validating one log file.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationVerdict {
    diagnostics: Vec<Diagnostic>,
    failure: Option<ValidationFailure>,
}

impl ValidationVerdict {
    pub fn passed() -> Self {
        Self {
            diagnostics: vec![Diagnostic::new(Severity::Ok, "Log validation successful.")],
            failure: None,
        }
    }

    /// A pass that still deserves attention, like an empty log.
    pub fn passed_with_warning(message: impl Into<String>) -> Self {
        Self {
            diagnostics: vec![Diagnostic::new(Severity::Warn, message)],
            failure: None,
        }
    }

    pub fn failed(failure: ValidationFailure) -> Self {
        Self {
            diagnostics: vec![Diagnostic::new(Severity::Error, failure.to_string())],
            failure: Some(failure),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.failure.is_none()
    }

    pub fn failure(&self) -> Option<&ValidationFailure> {
        self.failure.as_ref()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// 0 for a pass (warnings included), 1 for any failure.
    pub fn exit_code(&self) -> u8 {
        if self.is_pass() { 0 } else { 1 }
    }
}
