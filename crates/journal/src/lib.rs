//! # Journal
//!
//! Reads the trade-event logs the trading process appends to. It finds the
//! newest log in a directory and turns it into a [`TradeTable`](core_types::TradeTable)
//! of typed rows; it never writes.

pub mod discovery;
pub mod error;
pub mod reader;

pub use discovery::latest_log;
pub use error::JournalError;
pub use reader::{load_trades, read_latest, read_trades};
