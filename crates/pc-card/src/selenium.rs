//! Selenium dual-path RX filter card
//!
//! Selenium has two independent RX paths, each with a low-pass and a
//! high-pass filter bank. Path 0's low-pass bank and first high-pass line
//! sit on the backpack; everything else is on the card.

use std::sync::Arc;

use pc_gpio::platform::Platform;

use crate::bank::{rf_paths, LineBank};
use crate::config::SeleniumConfig;
use crate::diagnostics::{Diagnostics, Reporter};
use crate::error::BoardError;
use crate::filters::{
    FrequencyTable, RX_HIGH_PASS, RX_HPF_UNFILTERED_HZ, RX_LOW_PASS, RX_LPF_UNFILTERED_HZ,
};
use crate::wiring::{Carrier, Wiring};

const BOARD: &str = "selenium";

/// Number of RX paths
pub const RX_PATHS: usize = 2;

/// Selenium card controller
#[derive(Debug)]
pub struct Selenium {
    reporter: Reporter,
    lpf: [LineBank; RX_PATHS],
    hpf: [LineBank; RX_PATHS],
}

impl Selenium {
    /// Acquire every line, then reset if configured
    pub fn open(
        platform: &dyn Platform,
        config: &SeleniumConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, BoardError> {
        Self::open_on(&Carrier::new(platform), config, diagnostics)
    }

    /// Like [`Selenium::open`], sharing `carrier` with other boards
    pub fn open_on(
        carrier: &Carrier<'_>,
        config: &SeleniumConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, BoardError> {
        let reporter = Reporter::new(format!("{}_{}", BOARD, config.slot), diagnostics);
        reporter.debug(format!(
            "Initializing on gpiochip{} slot {} (CARP {})",
            config.gpiochip, config.slot, config.carp
        ));

        let wiring = Wiring::new(carrier, config.gpiochip, config.carp);

        let lpf = [
            LineBank::single(
                "lpf0",
                wiring.backpack(config.slot, &[1, 2, 3], &[95, 96, 97], "SELENIUM_LPF")?,
            ),
            LineBank::single("lpf1", wiring.card(&[2, 3, 4], "SELENIUM_LPF")?),
        ];
        let hpf = [
            LineBank::new(
                "hpf0",
                vec![
                    wiring.backpack(config.slot, &[4], &[98], "SELENIUM_HPF")?,
                    wiring.card(&[0, 1], "SELENIUM_HPF")?,
                ],
            ),
            LineBank::single("hpf1", wiring.card(&[5, 6, 7], "SELENIUM_HPF")?),
        ];

        let mut selenium = Self { reporter, lpf, hpf };
        if config.reset {
            selenium.reset()?;
        }
        Ok(selenium)
    }

    /// Instance name, e.g. `selenium_0`
    pub fn name(&self) -> &str {
        self.reporter.name()
    }

    pub fn lpf(&self, path: usize) -> Option<&LineBank> {
        self.lpf.get(path)
    }

    pub fn hpf(&self, path: usize) -> Option<&LineBank> {
        self.hpf.get(path)
    }

    /// Both paths unfiltered
    pub fn reset(&mut self) -> Result<(), BoardError> {
        self.reporter.info("Resetting");
        self.configure_unfiltered(None)
    }

    /// Select the low-pass filter for `hz` on `path`, or on both paths
    /// for `None`
    pub fn configure_lpf(&mut self, hz: u64, path: Option<usize>) -> Result<(), BoardError> {
        configure_paths(&self.reporter, &mut self.lpf, &RX_LOW_PASS, "LPF", hz, path)
    }

    /// Select the high-pass filter for `hz` on `path`, or on both paths
    /// for `None`
    pub fn configure_hpf(&mut self, hz: u64, path: Option<usize>) -> Result<(), BoardError> {
        configure_paths(&self.reporter, &mut self.hpf, &RX_HIGH_PASS, "HPF", hz, path)
    }

    pub fn configure_filters(&mut self, hz: u64, path: Option<usize>) -> Result<(), BoardError> {
        self.configure_lpf(hz, path)?;
        self.configure_hpf(hz, path)
    }

    pub fn configure_unfiltered(&mut self, path: Option<usize>) -> Result<(), BoardError> {
        self.configure_lpf(RX_LPF_UNFILTERED_HZ, path)?;
        self.configure_hpf(RX_HPF_UNFILTERED_HZ, path)
    }
}

fn configure_paths(
    reporter: &Reporter,
    banks: &mut [LineBank; RX_PATHS],
    table: &FrequencyTable,
    kind: &'static str,
    hz: u64,
    path: Option<usize>,
) -> Result<(), BoardError> {
    let Some(paths) = rf_paths(path, RX_PATHS) else {
        reporter.warn(format!("RX path must be 0-{} or both", RX_PATHS - 1));
        return Ok(());
    };
    let selection = table.select(kind, hz)?;
    for index in paths {
        reporter.info(format!(
            "Set {} to {} for rx_path {}",
            kind, selection.label, index
        ));
        banks[index].drive(selection.levels)?;
    }
    Ok(())
}
