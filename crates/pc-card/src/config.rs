//! Board configuration
//!
//! Boards are described in JSON, tagged by `"board"`:
//!
//! ```json
//! [
//!     { "board": "argon", "slot": 0, "gpiochip": 2, "i2c_bus": 1, "address": 43 },
//!     { "board": "tellurium", "slot": 1, "gpiochip": 3, "carp": true },
//!     { "board": "cardf", "gpiochip": 4 }
//! ]
//! ```
//!
//! Omitted fields take the defaults of each board's constructor.

use serde::{Deserialize, Serialize};

use crate::error::BoardError;

fn default_true() -> bool {
    true
}

/// Configuration for one board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "board", rename_all = "lowercase")]
pub enum CardConfig {
    Argon(ArgonConfig),
    Bismuth(BismuthConfig),
    Tellurium(TelluriumConfig),
    Selenium(SeleniumConfig),
    Cardf(CardfConfig),
}

impl CardConfig {
    /// Parse one board description
    pub fn from_json(json: &str) -> Result<Self, BoardError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a list of board descriptions
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, BoardError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, BoardError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Argon: synthesizer up/down-converter card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgonConfig {
    #[serde(default)]
    pub slot: u8,
    pub gpiochip: u32,
    #[serde(default)]
    pub transceiver: u8,
    pub i2c_bus: u32,
    /// I2C address of the SPI bridge
    pub address: u8,
    #[serde(default)]
    pub carp: bool,
    #[serde(default = "default_true")]
    pub control_rxtx: bool,
    #[serde(default = "default_true")]
    pub reset: bool,
}

impl ArgonConfig {
    pub fn new(slot: u8, gpiochip: u32, transceiver: u8, i2c_bus: u32, address: u8) -> Self {
        Self {
            slot,
            gpiochip,
            transceiver,
            i2c_bus,
            address,
            carp: false,
            control_rxtx: true,
            reset: true,
        }
    }
}

/// Bismuth: PA and LNA card with RX attenuator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BismuthConfig {
    #[serde(default)]
    pub slot: u8,
    pub gpiochip: u32,
    #[serde(default)]
    pub transceiver: u8,
    #[serde(default = "default_true")]
    pub carp: bool,
    #[serde(default = "default_true")]
    pub control_rxtx: bool,
    #[serde(default)]
    pub reset: bool,
}

impl BismuthConfig {
    pub fn new(slot: u8, gpiochip: u32, transceiver: u8) -> Self {
        Self {
            slot,
            gpiochip,
            transceiver,
            carp: true,
            control_rxtx: true,
            reset: false,
        }
    }
}

/// Tellurium: RX filter and PA card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelluriumConfig {
    #[serde(default)]
    pub slot: u8,
    pub gpiochip: u32,
    #[serde(default)]
    pub transceiver: u8,
    #[serde(default)]
    pub carp: bool,
    #[serde(default = "default_true")]
    pub control_rxtx: bool,
    #[serde(default = "default_true")]
    pub reset: bool,
}

impl TelluriumConfig {
    pub fn new(slot: u8, gpiochip: u32, transceiver: u8) -> Self {
        Self {
            slot,
            gpiochip,
            transceiver,
            carp: false,
            control_rxtx: true,
            reset: true,
        }
    }
}

/// Selenium: dual-path RX filter card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeleniumConfig {
    #[serde(default)]
    pub slot: u8,
    pub gpiochip: u32,
    #[serde(default)]
    pub carp: bool,
    #[serde(default = "default_true")]
    pub reset: bool,
}

impl SeleniumConfig {
    pub fn new(slot: u8, gpiochip: u32) -> Self {
        Self {
            slot,
            gpiochip,
            carp: false,
            reset: true,
        }
    }
}

/// Cardf: dual-channel front end with band-pass RX filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardfConfig {
    pub gpiochip: u32,
    #[serde(default = "default_true")]
    pub control_rxtx: bool,
    #[serde(default)]
    pub reset: bool,
}

impl CardfConfig {
    pub fn new(gpiochip: u32) -> Self {
        Self {
            gpiochip,
            control_rxtx: true,
            reset: false,
        }
    }
}
