//! Personality Card GPIO Library
//!
//! This crate provides a single "set levels on named lines" capability for
//! the control lines of RF personality cards, backed by one of three
//! physically different mechanisms:
//!
//! - **Direct**: lines requested from a GPIO chip and written in one call
//! - **Serial mux**: the CARP FPGA line mux, which connects a personality card
//!   pin to a constant or a transceiver GPO through a clocked 4-bit protocol
//! - **Register GPO**: bits of the transceiver's GPO data register, updated by
//!   read-modify-write
//!
//! # Architecture
//!
//! Hardware access goes through the traits in [`platform`]; the crate never
//! talks to a kernel interface directly. Each backend binds a fixed list of
//! pins at construction and is wrapped in a [`LineHandle`], which checks the
//! arity of every write and remembers the last levels written.
//!
//! # Example
//!
//! ```rust
//! use pc_gpio::{DirectLines, LineHandle};
//! use pc_gpio::platform::{GpioChip, LineRequest};
//! use pc_gpio::LineError;
//!
//! struct Chip;
//! struct Request;
//!
//! impl LineRequest for Request {
//!     fn set_values(&self, _values: &[u8]) -> Result<(), LineError> {
//!         Ok(())
//!     }
//! }
//!
//! impl GpioChip for Chip {
//!     fn request_lines(
//!         &self,
//!         _offsets: &[u32],
//!         _consumer: &str,
//!     ) -> Result<Box<dyn LineRequest>, LineError> {
//!         Ok(Box::new(Request))
//!     }
//! }
//!
//! let lines = DirectLines::request(&Chip, &[95, 96, 97], "TX_FILT").unwrap();
//! let mut handle = LineHandle::from(lines);
//! handle.set(&[1, 0, 1]).unwrap();
//! assert_eq!(handle.last_levels(), Some(&[1, 0, 1][..]));
//! ```

pub mod direct;
pub mod error;
pub mod gpo;
pub mod line;
pub mod mux;
pub mod platform;

pub use direct::DirectLines;
pub use error::LineError;
pub use gpo::{AdGpo, GpoController, GpoLines};
pub use line::{Backend, LineHandle};
pub use mux::{CarpInput, CarpOutput, LineMux, MuxLines};
pub use platform::{BlockBus, Delay, GpioChip, LineRequest, Platform, RegisterDevice, StdDelay};

/// Logic low
pub const LOW: u8 = 0;

/// Logic high
pub const HIGH: u8 = 1;
