//! # Validator
//!
//! The offline gate a trade log has to pass before anything trusts it. It checks
//! the header, that every timestamp is readable, that no calendar day lost more
//! than the configured limit, and that opened and closed volume net to zero.
//!
//! The `validate-log` binary wraps [`validate`] for pipelines: it prints the
//! diagnostics and exits 0 on a pass, 1 on any failure.

pub mod error;
pub mod gate;
pub mod verdict;

pub use error::ValidationFailure;
pub use gate::{LogValidator, TOLERANCE};
pub use verdict::{Diagnostic, Severity, ValidationVerdict};

use configuration::RiskLimits;
use std::io::{self, Write};
use std::path::Path;

/// Validates the log at `path` against `limits`.
pub fn validate(path: &Path, limits: RiskLimits) -> ValidationVerdict {
    LogValidator::new(limits).validate(path)
}

/// Writes the verdict's diagnostic lines, one per line.
pub fn write_report<W: Write>(verdict: &ValidationVerdict, out: &mut W) -> io::Result<()> {
    for diagnostic in verdict.diagnostics() {
        writeln!(out, "{diagnostic}")?;
    }
    Ok(())
}
