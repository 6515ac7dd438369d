//! # Core Types
//!
//! The shared vocabulary of the workspace: what a line of the trade log looks
//! like once it has been read, and the lenient parsers used to read it.

pub mod enums;
pub mod error;
pub mod parse;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::EventKind;
pub use error::CoreError;
pub use parse::{parse_decimal, parse_offset, parse_timestamp, ParsedTimestamp};
pub use structs::{TradeRow, TradeTable, REQUIRED_COLUMNS};
