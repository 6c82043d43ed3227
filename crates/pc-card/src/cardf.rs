//! Cardf dual-channel front end
//!
//! Cardf drives two transmit/receive channels. Each channel has its own TX
//! filter bank, while a single band-pass bank serves both receivers. The
//! card also carries LNA, PA, Bluetooth and WiFi amplifier enables and a
//! TX inhibit line. It does not sit behind a CARP carrier.

use std::sync::Arc;

use pc_gpio::platform::Platform;
use pc_gpio::{LineHandle, HIGH, LOW};

use crate::bank::{rf_paths, LineBank, RxTxLines};
use crate::config::CardfConfig;
use crate::diagnostics::{Diagnostics, Reporter};
use crate::error::BoardError;
use crate::filters::{RX_BAND_PASS, RX_BPF_UNFILTERED_HZ, TX_FILTERS, TX_UNFILTERED_HZ};
use crate::wiring::{Carrier, Wiring};

const BOARD: &str = "cardf";

/// Number of TX channels
pub const TX_PATHS: usize = 2;

/// Cardf card controller
#[derive(Debug)]
pub struct Cardf {
    reporter: Reporter,
    tx_enable: LineBank,
    rx_tx: Option<RxTxLines>,
    rx_bpf: LineBank,
    tx_filters: [LineBank; TX_PATHS],
    lna_enable: LineBank,
    pa_enable: LineBank,
    bt_enable: LineBank,
    wifi_enable: LineBank,
    tx_inhibit: LineHandle,
}

impl Cardf {
    /// Acquire every line, then reset if configured
    pub fn open(
        platform: &dyn Platform,
        config: &CardfConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, BoardError> {
        Self::open_on(&Carrier::new(platform), config, diagnostics)
    }

    /// Like [`Cardf::open`], sharing `carrier` with other boards
    pub fn open_on(
        carrier: &Carrier<'_>,
        config: &CardfConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, BoardError> {
        let reporter = Reporter::new(format!("{}_{}", BOARD, config.gpiochip), diagnostics);
        reporter.debug(format!("Initializing on gpiochip{}", config.gpiochip));

        let wiring = Wiring::new(carrier, config.gpiochip, false);

        let tx_inhibit = wiring.card(&[11], "CARDF_TX_INHIB")?;
        let rx_tx = if config.control_rxtx {
            Some(RxTxLines::new(
                wiring.base(&[132, 135], "CARDF_RX_CTRL")?,
                wiring.base(&[133, 136], "CARDF_TX_CTRL")?,
            ))
        } else {
            None
        };
        let rx_bpf = LineBank::single("rx_bpf", wiring.card(&[12, 10], "CARDF_RX_BPF")?);
        let tx_filters = [
            LineBank::single("tx_filters0", wiring.base(&[82, 83, 84], "CARDF_TX_FILT_0")?),
            LineBank::single("tx_filters1", wiring.base(&[85, 86, 44], "CARDF_TX_FILT_1")?),
        ];
        let lna_enable = LineBank::single("lna", wiring.card(&[0, 1, 2, 3], "CARDF_LNA_CTRL")?);
        let pa_enable = LineBank::single("pa", wiring.card(&[8, 9], "CARDF_PA_CTRL")?);
        let bt_enable = LineBank::single("bt", wiring.card(&[4, 6], "CARDF_BT_CTRL")?);
        let wifi_enable = LineBank::single("wifi", wiring.card(&[5, 7], "CARDF_WIFI_CTRL")?);
        let tx_enable = LineBank::single("tx_enable", wiring.base(&[78, 79], "CARDF_TX_EN")?);

        let mut cardf = Self {
            reporter,
            tx_enable,
            rx_tx,
            rx_bpf,
            tx_filters,
            lna_enable,
            pa_enable,
            bt_enable,
            wifi_enable,
            tx_inhibit,
        };
        if config.reset {
            cardf.reset()?;
        }
        Ok(cardf)
    }

    /// Instance name, e.g. `cardf_4`
    pub fn name(&self) -> &str {
        self.reporter.name()
    }

    pub fn rx_bpf(&self) -> &LineBank {
        &self.rx_bpf
    }

    pub fn tx_filters(&self, path: usize) -> Option<&LineBank> {
        self.tx_filters.get(path)
    }

    /// RX and TX unfiltered, every amplifier off, TX inhibited, receiving
    pub fn reset(&mut self) -> Result<(), BoardError> {
        self.reporter.info("Resetting");
        self.configure_rx_unfiltered()?;
        self.configure_tx_unfiltered(None)?;
        self.disable_pa()?;
        self.disable_lnas()?;
        self.disable_bt()?;
        self.disable_wifi()
    }

    pub fn enable_bt(&mut self) -> Result<(), BoardError> {
        self.reporter.debug("Enabling BT amplifiers");
        Ok(self.bt_enable.drive_all(HIGH)?)
    }

    pub fn disable_bt(&mut self) -> Result<(), BoardError> {
        self.reporter.debug("Disabling BT amplifiers");
        Ok(self.bt_enable.drive_all(LOW)?)
    }

    pub fn enable_wifi(&mut self) -> Result<(), BoardError> {
        self.reporter.debug("Enabling WiFi amplifiers");
        Ok(self.wifi_enable.drive_all(HIGH)?)
    }

    pub fn disable_wifi(&mut self) -> Result<(), BoardError> {
        self.reporter.debug("Disabling WiFi amplifiers");
        Ok(self.wifi_enable.drive_all(LOW)?)
    }

    pub fn enable_lnas(&mut self) -> Result<(), BoardError> {
        self.reporter.debug("Enabling LNAs");
        Ok(self.lna_enable.drive_all(HIGH)?)
    }

    pub fn disable_lnas(&mut self) -> Result<(), BoardError> {
        self.reporter.debug("Disabling LNAs");
        Ok(self.lna_enable.drive_all(LOW)?)
    }

    /// Select the RX band-pass filter for `hz`
    pub fn configure_rx_filters(&mut self, hz: u64) -> Result<(), BoardError> {
        let selection = RX_BAND_PASS.select("BPF", hz)?;
        self.rx_bpf.drive(selection.levels)?;
        self.reporter.info(format!("Set BPF to {}", selection.label));
        Ok(())
    }

    pub fn configure_rx_unfiltered(&mut self) -> Result<(), BoardError> {
        self.configure_rx_filters(RX_BPF_UNFILTERED_HZ)
    }

    /// Switch both channels to transmit with the PAs on and TX uninhibited
    pub fn enable_pa(&mut self) -> Result<(), BoardError> {
        self.reporter.info("Enabling PAs");
        if let Some(rx_tx) = &mut self.rx_tx {
            rx_tx.set_rx(false)?;
            rx_tx.set_tx(true)?;
        }
        self.pa_enable.drive_all(HIGH)?;
        self.tx_enable.drive_all(HIGH)?;
        self.tx_inhibit.set(&[LOW])?;
        Ok(())
    }

    /// Inhibit TX, turn the PAs off and switch both channels to receive
    pub fn disable_pa(&mut self) -> Result<(), BoardError> {
        self.reporter.info("Disabling PAs");
        self.tx_inhibit.set(&[HIGH])?;
        self.tx_enable.drive_all(LOW)?;
        self.pa_enable.drive_all(LOW)?;
        if let Some(rx_tx) = &mut self.rx_tx {
            rx_tx.set_rx(true)?;
            rx_tx.set_tx(false)?;
        }
        Ok(())
    }

    /// LNAs off, then PAs on
    pub fn configure_transmit(&mut self) -> Result<(), BoardError> {
        self.disable_lnas()?;
        self.enable_pa()
    }

    /// PAs off, then LNAs on
    pub fn configure_receive(&mut self) -> Result<(), BoardError> {
        self.disable_pa()?;
        self.enable_lnas()
    }

    /// Select the TX filter for `hz` on channel `path`, or on both channels
    /// for `None`
    pub fn configure_tx_filters(&mut self, hz: u64, path: Option<usize>) -> Result<(), BoardError> {
        let Some(paths) = rf_paths(path, TX_PATHS) else {
            self.reporter
                .warn(format!("TX path must be 0-{} or both", TX_PATHS - 1));
            return Ok(());
        };
        let selection = TX_FILTERS.select("TX", hz)?;
        for index in paths {
            self.reporter.info(format!(
                "Configuring TX filters for {} on tx_path {}",
                selection.label, index
            ));
            self.tx_filters[index].drive(selection.levels)?;
        }
        Ok(())
    }

    pub fn configure_tx_unfiltered(&mut self, path: Option<usize>) -> Result<(), BoardError> {
        self.configure_tx_filters(TX_UNFILTERED_HZ, path)
    }
}
