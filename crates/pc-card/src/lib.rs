//! Personality Card Control Library
//!
//! This crate provides controllers for RF personality cards and their
//! backpack boards:
//!
//! - **Argon**: external synthesizer and mixers for frequencies above 6 GHz,
//!   with a TX harmonic filter bank
//! - **Bismuth**: two-stage PA, LNAs, RX step attenuator and TX filters
//! - **Tellurium**: RX low-pass/high-pass filters, TX filters and a PA
//! - **Selenium**: two RX paths, each with low-pass and high-pass filters
//! - **Cardf**: two-channel front end with band-pass RX filters and
//!   LNA/PA/Bluetooth/WiFi amplifier enables
//!
//! # Architecture
//!
//! Every board is opened from a config struct against a
//! [`pc_gpio::Platform`] and owns the line handles it acquired. Boards in
//! different slots of one CARP carrier share the line mux through a
//! [`Carrier`]. Filter selection goes through the tables in [`filters`];
//! Argon also owns the [`synth::Synthesizer`] sequencer. Configuration mistakes (an unknown PA
//! level, a path the board lacks) are reported as warnings through the
//! injected [`Diagnostics`] sink and write nothing; hardware failures are
//! returned as [`BoardError`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use pc_card::{Card, CardConfig, TracingDiagnostics};
//! use pc_sim::SimPlatform;
//!
//! let platform = SimPlatform::new();
//! let config = CardConfig::from_json(r#"{"board": "selenium", "gpiochip": 3}"#).unwrap();
//!
//! let mut card = Card::open(&platform, &config, Arc::new(TracingDiagnostics)).unwrap();
//! assert_eq!(card.name(), "selenium_0");
//!
//! if let Card::Selenium(selenium) = &mut card {
//!     selenium.configure_filters(1_000_000_000, None).unwrap();
//! }
//! // Path 0, low-pass select lines on the base chip
//! assert_eq!(platform.line_level(0, 95), Some(1));
//! ```

pub mod argon;
pub mod bank;
pub mod bismuth;
pub mod card;
pub mod cardf;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod filters;
pub mod selenium;
pub mod synth;
pub mod tellurium;
pub mod wiring;

pub use argon::Argon;
pub use bismuth::Bismuth;
pub use card::Card;
pub use cardf::Cardf;
pub use config::{
    ArgonConfig, BismuthConfig, CardConfig, CardfConfig, SeleniumConfig, TelluriumConfig,
};
pub use diagnostics::{
    DiagnosticRecord, Diagnostics, RecordingDiagnostics, Reporter, TracingDiagnostics,
};
pub use error::BoardError;
pub use filters::{FrequencyTable, Selection};
pub use selenium::Selenium;
pub use synth::{SynthState, Synthesizer};
pub use tellurium::Tellurium;
pub use wiring::Carrier;
