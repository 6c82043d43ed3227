//! Any supported board behind one type

use std::sync::Arc;

use pc_gpio::platform::Platform;

use crate::argon::Argon;
use crate::bismuth::Bismuth;
use crate::cardf::Cardf;
use crate::config::CardConfig;
use crate::diagnostics::Diagnostics;
use crate::error::BoardError;
use crate::selenium::Selenium;
use crate::tellurium::Tellurium;
use crate::wiring::Carrier;

/// An opened board of any kind
#[derive(Debug)]
pub enum Card {
    Argon(Argon),
    Bismuth(Bismuth),
    Tellurium(Tellurium),
    Selenium(Selenium),
    Cardf(Cardf),
}

impl Card {
    /// Open the board described by `config`
    pub fn open(
        platform: &dyn Platform,
        config: &CardConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, BoardError> {
        Self::open_on(&Carrier::new(platform), config, diagnostics)
    }

    /// Open the board described by `config`, sharing `carrier`
    pub fn open_on(
        carrier: &Carrier<'_>,
        config: &CardConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, BoardError> {
        Ok(match config {
            CardConfig::Argon(c) => Card::Argon(Argon::open_on(carrier, c, diagnostics)?),
            CardConfig::Bismuth(c) => Card::Bismuth(Bismuth::open_on(carrier, c, diagnostics)?),
            CardConfig::Tellurium(c) => {
                Card::Tellurium(Tellurium::open_on(carrier, c, diagnostics)?)
            }
            CardConfig::Selenium(c) => {
                Card::Selenium(Selenium::open_on(carrier, c, diagnostics)?)
            }
            CardConfig::Cardf(c) => Card::Cardf(Cardf::open_on(carrier, c, diagnostics)?),
        })
    }

    /// Open every board in `configs` on one carrier, stopping at the first
    /// failure
    pub fn open_all(
        platform: &dyn Platform,
        configs: &[CardConfig],
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Vec<Self>, BoardError> {
        let carrier = Carrier::new(platform);
        configs
            .iter()
            .map(|config| Self::open_on(&carrier, config, diagnostics.clone()))
            .collect()
    }

    /// Instance name
    pub fn name(&self) -> &str {
        match self {
            Card::Argon(b) => b.name(),
            Card::Bismuth(b) => b.name(),
            Card::Tellurium(b) => b.name(),
            Card::Selenium(b) => b.name(),
            Card::Cardf(b) => b.name(),
        }
    }

    /// Drive the board to its safe baseline
    pub fn reset(&mut self) -> Result<(), BoardError> {
        match self {
            Card::Argon(b) => b.reset(),
            Card::Bismuth(b) => b.reset(),
            Card::Tellurium(b) => b.reset(),
            Card::Selenium(b) => b.reset(),
            Card::Cardf(b) => b.reset(),
        }
    }

    /// Switch to transmit; Selenium is receive-only and ignores this
    pub fn configure_transmit(&mut self) -> Result<(), BoardError> {
        match self {
            Card::Argon(b) => b.configure_transmit(),
            Card::Bismuth(b) => b.configure_transmit(),
            Card::Tellurium(b) => b.configure_transmit(),
            Card::Selenium(_) => Ok(()),
            Card::Cardf(b) => b.configure_transmit(),
        }
    }

    /// Switch to receive
    pub fn configure_receive(&mut self) -> Result<(), BoardError> {
        match self {
            Card::Argon(b) => b.configure_receive(),
            Card::Bismuth(b) => b.configure_receive(),
            Card::Tellurium(b) => b.configure_receive(),
            Card::Selenium(_) => Ok(()),
            Card::Cardf(b) => b.configure_receive(),
        }
    }
}
