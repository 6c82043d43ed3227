//! Personality Card Simulation Library
//!
//! This crate provides an in-memory platform for exercising line backends and
//! board controllers without hardware. It includes:
//!
//! - **SimPlatform**: GPIO chips, register devices, I2C buses and a delay
//!   provider sharing one state
//! - **Transaction**: a journal entry for every line write, register access,
//!   bus write and delay, in the order they happened
//! - **CARP mux fabric**: latched mux routes decoded from the select, clock
//!   and reset lines, readable with `SimPlatform::mux_route`
//!
//! Resources can be taken offline, or given a write budget with
//! `SimPlatform::fail_after`, to exercise failure paths.
//!
//! # Example
//!
//! ```rust
//! use pc_gpio::platform::Platform;
//! use pc_gpio::DirectLines;
//! use pc_sim::{SimPlatform, Transaction};
//!
//! let platform = SimPlatform::new();
//! let chip = platform.gpio_chip(0).unwrap();
//!
//! let lines = DirectLines::request(chip.as_ref(), &[125, 126], "RX_TX").unwrap();
//! lines.set_values(&[1, 0]).unwrap();
//!
//! assert_eq!(platform.line_level(0, 125), Some(1));
//! assert_eq!(
//!     platform.journal(),
//!     vec![Transaction::LinesSet { chip: 0, offsets: vec![125, 126], values: vec![1, 0] }]
//! );
//! ```

pub mod journal;
pub mod platform;

pub use journal::Transaction;
pub use platform::{SimBus, SimChip, SimDelay, SimPlatform, SimRegisterDevice};
