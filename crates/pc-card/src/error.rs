//! Error types for board controllers

use pc_gpio::LineError;
use thiserror::Error;

/// Errors that can occur while building or driving a board
#[derive(Debug, Error)]
pub enum BoardError {
    /// Line, bus or register access failed
    #[error("line error: {0}")]
    Line(#[from] LineError),

    /// Board variant cannot be wired in the requested slot
    #[error("{board} not supported in slot {slot}")]
    UnsupportedSlot { board: &'static str, slot: u8 },

    /// Frequency table has no entry for the frequency (malformed table)
    #[error("no band in {table} table for {hz} Hz")]
    NoMatchingBand { table: &'static str, hz: u64 },

    /// Board configuration could not be parsed
    #[error("invalid board configuration: {0}")]
    Config(#[from] serde_json::Error),
}
