//! Tellurium RX filter and PA card
//!
//! Tellurium has a low-pass and a high-pass RX filter bank in series, a TX
//! harmonic filter bank and a two-stage PA. The high-pass bank spans two
//! chips: two select lines on the backpack, the third on the card.

use std::sync::Arc;

use pc_gpio::platform::Platform;
use pc_gpio::{LineHandle, HIGH, LOW};

use crate::bank::{LineBank, RxTxLines};
use crate::config::TelluriumConfig;
use crate::diagnostics::{Diagnostics, Reporter};
use crate::error::BoardError;
use crate::filters::{
    RX_HIGH_PASS, RX_HPF_UNFILTERED_HZ, RX_LOW_PASS, RX_LPF_UNFILTERED_HZ, TX_FILTERS,
    TX_UNFILTERED_HZ,
};
use crate::wiring::{Carrier, Wiring};

const BOARD: &str = "tellurium";

/// PA stage levels, lowest power first
pub const PA_LEVELS: [[u8; 2]; 3] = [[0, 0], [1, 0], [1, 1]];

/// Tellurium card controller
#[derive(Debug)]
pub struct Tellurium {
    reporter: Reporter,
    tx_enable: LineHandle,
    rx_tx: Option<RxTxLines>,
    rx_lpf: LineBank,
    rx_hpf: LineBank,
    pa: LineBank,
    tx_filters: LineBank,
    pa_enable: LineHandle,
}

impl Tellurium {
    /// Acquire every line, then reset if configured
    pub fn open(
        platform: &dyn Platform,
        config: &TelluriumConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, BoardError> {
        Self::open_on(&Carrier::new(platform), config, diagnostics)
    }

    /// Like [`Tellurium::open`], sharing `carrier` with other boards
    pub fn open_on(
        carrier: &Carrier<'_>,
        config: &TelluriumConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, BoardError> {
        let reporter = Reporter::new(format!("{}_{}", BOARD, config.slot), diagnostics);
        reporter.debug(format!(
            "Initializing on gpiochip{} slot {} (CARP {})",
            config.gpiochip, config.slot, config.carp
        ));

        let wiring = Wiring::new(carrier, config.gpiochip, config.carp);

        let tx_enable = wiring.tx_enable(BOARD, config.slot)?;
        let rx_tx = if config.control_rxtx {
            Some(wiring.rx_tx(config.transceiver, "TELLURIUM")?)
        } else {
            None
        };
        let rx_lpf = LineBank::single(
            "rx_lpf",
            wiring.backpack(config.slot, &[1, 2, 3], &[95, 96, 97], "TELLURIUM_LPF")?,
        );
        let rx_hpf = LineBank::new(
            "rx_hpf",
            vec![
                wiring.backpack(config.slot, &[4, 5], &[98, 99], "TELLURIUM_HPF")?,
                wiring.card(&[0], "TELLURIUM_HPF")?,
            ],
        );
        let pa = LineBank::single("pa", wiring.card(&[1, 2], "TELLURIUM_PA")?);
        let tx_filters =
            LineBank::single("tx_filters", wiring.card(&[3, 4, 5], "TELLURIUM_TX_FILT")?);
        let pa_enable = wiring.card(&[7], "TELLURIUM_PA_ENABLE")?;

        let mut tellurium = Self {
            reporter,
            tx_enable,
            rx_tx,
            rx_lpf,
            rx_hpf,
            pa,
            tx_filters,
            pa_enable,
        };
        if config.reset {
            tellurium.reset()?;
        }
        Ok(tellurium)
    }

    /// Instance name, e.g. `tellurium_0`
    pub fn name(&self) -> &str {
        self.reporter.name()
    }

    pub fn rx_lpf(&self) -> &LineBank {
        &self.rx_lpf
    }

    pub fn rx_hpf(&self) -> &LineBank {
        &self.rx_hpf
    }

    pub fn pa(&self) -> &LineBank {
        &self.pa
    }

    pub fn tx_filters(&self) -> &LineBank {
        &self.tx_filters
    }

    /// RX and TX unfiltered, lowest PA level, PA off, receiving
    pub fn reset(&mut self) -> Result<(), BoardError> {
        self.reporter.info("Resetting");
        self.configure_rx_unfiltered()?;
        self.configure_tx_unfiltered()?;
        self.configure_pa(0)?;
        self.configure_receive()
    }

    /// Select the RX low-pass filter for `hz`
    pub fn configure_rx_lpf(&mut self, hz: u64) -> Result<(), BoardError> {
        let selection = RX_LOW_PASS.select("LPF", hz)?;
        self.rx_lpf.drive(selection.levels)?;
        self.reporter.info(format!("Set LPF to {}", selection.label));
        Ok(())
    }

    /// Select the RX high-pass filter for `hz`
    pub fn configure_rx_hpf(&mut self, hz: u64) -> Result<(), BoardError> {
        let selection = RX_HIGH_PASS.select("HPF", hz)?;
        self.rx_hpf.drive(selection.levels)?;
        self.reporter.info(format!("Set HPF to {}", selection.label));
        Ok(())
    }

    /// Select both RX filters for `hz`
    pub fn configure_rx_filters(&mut self, hz: u64) -> Result<(), BoardError> {
        self.configure_rx_lpf(hz)?;
        self.configure_rx_hpf(hz)
    }

    pub fn configure_rx_unfiltered(&mut self) -> Result<(), BoardError> {
        self.configure_rx_lpf(RX_LPF_UNFILTERED_HZ)?;
        self.configure_rx_hpf(RX_HPF_UNFILTERED_HZ)
    }

    /// Select the TX filter for `hz`
    pub fn configure_tx_filters(&mut self, hz: u64) -> Result<(), BoardError> {
        let selection = TX_FILTERS.select("TX", hz)?;
        self.reporter
            .info(format!("Configuring TX filters for {}", selection.label));
        self.tx_filters.drive(selection.levels)?;
        Ok(())
    }

    pub fn configure_tx_unfiltered(&mut self) -> Result<(), BoardError> {
        self.configure_tx_filters(TX_UNFILTERED_HZ)
    }

    /// Set the PA power level (0-2)
    ///
    /// Out-of-range levels are reported and leave the hardware untouched.
    pub fn configure_pa(&mut self, level: u8) -> Result<(), BoardError> {
        let Some(levels) = PA_LEVELS.get(usize::from(level)) else {
            self.reporter.warn("Power level must be 0-2");
            return Ok(());
        };
        self.pa.drive(levels)?;
        self.reporter.info(format!("Power level set to {}", level));
        Ok(())
    }

    pub fn enable_pa(&mut self) -> Result<(), BoardError> {
        self.reporter.info("Enabling PAs");
        self.pa_enable.set(&[HIGH])?;
        self.tx_enable.set(&[HIGH])?;
        Ok(())
    }

    pub fn disable_pa(&mut self) -> Result<(), BoardError> {
        self.reporter.info("Disabling PAs");
        self.tx_enable.set(&[LOW])?;
        self.pa_enable.set(&[LOW])?;
        Ok(())
    }

    pub fn configure_transmit(&mut self) -> Result<(), BoardError> {
        self.reporter.debug("Configuring for transmit");
        if let Some(rx_tx) = &mut self.rx_tx {
            rx_tx.set_rx(false)?;
            rx_tx.set_tx(true)?;
        }
        Ok(())
    }

    /// Switch to receive; the PA is always turned off first
    pub fn configure_receive(&mut self) -> Result<(), BoardError> {
        self.reporter.debug("Configuring for receive");
        self.disable_pa()?;
        if let Some(rx_tx) = &mut self.rx_tx {
            rx_tx.set_tx(false)?;
            rx_tx.set_rx(true)?;
        }
        Ok(())
    }
}
