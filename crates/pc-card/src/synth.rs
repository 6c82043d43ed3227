//! Argon frequency synthesizer
//!
//! The synthesizer on the Argon card sits behind an I2C-to-SPI bridge. Each
//! SPI word is three bytes: register address, high byte, low byte.
//!
//! # Bands
//!
//! The synthesizer covers three bands, each with a fixed centre frequency.
//! A band is selected by the first upper bound the requested frequency is
//! strictly below:
//!
//! | Band | Range (GHz)    | Centre (GHz) |
//! |------|----------------|--------------|
//! | 0    | 6.00 .. 11.93  | 5.93         |
//! | 1    | 11.93 .. 17.86 | 11.86        |
//! | 2    | 17.86 .. 21.00 | 15.00        |
//!
//! Every band is programmed from [`BASE_MAP`] with a handful of registers
//! replaced; see [`register_map`].

use std::fmt;

use pc_gpio::platform::{BlockBus, Delay};
use pc_gpio::{LineError, LineHandle, HIGH, LOW};

use crate::diagnostics::Reporter;

/// One SPI word: register address, high byte, low byte
pub type RegisterWord = [u8; 3];

/// Bridge register selecting the synthesizer as SPI target
pub const SPI_SELECT: u8 = 0x01;

/// Bridge configuration register
pub const BRIDGE_CONFIG: u8 = 0x00;

/// Lowest frequency that needs the synthesizer
pub const SYNTH_MIN_HZ: u64 = 6_000_000_000;

/// Upper bounds of each band (exclusive)
pub const BAND_UPPER_HZ: [u64; 3] = [11_930_000_000, 17_860_000_000, 21_000_000_000];

/// Centre frequency of each band
pub const BAND_CENTER_HZ: [u64; 3] = [5_930_000_000, 11_860_000_000, 15_000_000_000];

/// Calibration settle time after loading a band
pub const CALIBRATION_DELAY_MS: u32 = 10;

/// Software reset, then release
pub const RESET: [u8; 6] = [0x00, 0x24, 0x12, 0x00, 0x24, 0x10];

pub const POWER_DOWN: [u8; 3] = [0x00, 0x24, 0x11];

pub const POWER_UP: [u8; 3] = [0x00, 0x24, 0x10];

/// Start frequency calibration
pub const FCAL_ENABLE: [u8; 3] = [0x00, 0x27, 0x1C];

/// Register image for band 0, written from register 0x4E down to 0x00
#[rustfmt::skip]
pub const BASE_MAP: [RegisterWord; 79] = [
    [0x4E, 0x00, 0x03], [0x4D, 0x00, 0x00], [0x4C, 0x00, 0x0C],
    [0x4B, 0x08, 0x00], [0x4A, 0x00, 0x00], [0x49, 0x00, 0x3F],
    [0x48, 0x00, 0x01], [0x47, 0x00, 0x81], [0x46, 0xC3, 0x50],
    [0x45, 0x00, 0x00], [0x44, 0x03, 0xE8], [0x43, 0x00, 0x00],
    [0x42, 0x01, 0xF4], [0x41, 0x00, 0x00], [0x40, 0x13, 0x88],
    [0x3F, 0x00, 0x00], [0x3E, 0x03, 0x22], [0x3D, 0x00, 0xA8],
    [0x3C, 0x00, 0x00], [0x3B, 0x00, 0x01], [0x3A, 0x90, 0x01],
    [0x39, 0x00, 0x20], [0x38, 0x00, 0x00], [0x37, 0x00, 0x00],
    [0x36, 0x00, 0x00], [0x35, 0x00, 0x00], [0x34, 0x08, 0x20],
    [0x33, 0x00, 0x80], [0x32, 0x00, 0x00], [0x31, 0x41, 0x80],
    [0x30, 0x03, 0x00], [0x2F, 0x03, 0x00], [0x2E, 0x07, 0xFC],
    [0x2D, 0xC0, 0xDF], [0x2C, 0x1F, 0x23], [0x2B, 0x01, 0x2C],
    [0x2A, 0x00, 0x00], [0x29, 0x00, 0x00], [0x28, 0x00, 0x00],
    [0x27, 0x03, 0xE8], [0x26, 0x00, 0x00], [0x25, 0x04, 0x04],
    [0x24, 0x00, 0x3B], [0x23, 0x00, 0x04], [0x22, 0x00, 0x00],
    [0x21, 0x1E, 0x21], [0x20, 0x03, 0x93], [0x1F, 0x43, 0xEC],
    [0x1E, 0x31, 0x8C], [0x1D, 0x31, 0x8C], [0x1C, 0x04, 0x88],
    [0x1B, 0x00, 0x02], [0x1A, 0x0D, 0xB0], [0x19, 0x0C, 0x2B],
    [0x18, 0x07, 0x1A], [0x17, 0x00, 0x7C], [0x16, 0x00, 0x01],
    [0x15, 0x04, 0x01], [0x14, 0xE0, 0x48], [0x13, 0x27, 0xB7],
    [0x12, 0x00, 0x64], [0x11, 0x01, 0x2C], [0x10, 0x00, 0x80],
    [0x0F, 0x06, 0x4F], [0x0E, 0x1E, 0x70], [0x0D, 0x40, 0x00],
    [0x0C, 0x50, 0x01], [0x0B, 0x00, 0x18], [0x0A, 0x12, 0xD8],
    [0x09, 0x06, 0x04], [0x08, 0x20, 0x00], [0x07, 0x00, 0xB2],
    [0x06, 0xC8, 0x02], [0x05, 0x00, 0xC8], [0x04, 0x0A, 0x43],
    [0x03, 0x06, 0x42], [0x02, 0x05, 0x00], [0x01, 0x08, 0x08],
    [0x00, 0x27, 0x14],
];

/// Registers replaced in [`BASE_MAP`] for each band
const BAND_OVERRIDES: [&[RegisterWord]; 3] = [
    &[],
    &[[0x2E, 0x07, 0xFD], [0x2D, 0xC8, 0xDF]],
    &[
        [0x2E, 0x07, 0xFD],
        [0x2D, 0xC8, 0xDF],
        [0x2B, 0x00, 0x00],
        [0x24, 0x00, 0x4B],
    ],
];

/// Band for `hz`, if the synthesizer can reach it
pub fn band_for(hz: u64) -> Option<usize> {
    if hz < SYNTH_MIN_HZ {
        return None;
    }
    BAND_UPPER_HZ.iter().position(|&upper| hz < upper)
}

/// Full register image for `band`, in write order
///
/// [`BASE_MAP`] is never modified; overrides replace words with the same
/// register address.
pub fn register_map(band: usize) -> Option<Vec<RegisterWord>> {
    let overrides = BAND_OVERRIDES.get(band)?;
    Some(
        BASE_MAP
            .iter()
            .map(|word| {
                overrides
                    .iter()
                    .find(|o| o[0] == word[0])
                    .copied()
                    .unwrap_or(*word)
            })
            .collect(),
    )
}

/// Sequencer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SynthState {
    /// Powered down; frequencies pass through unchanged
    #[default]
    Down,
    /// Band registers partially written
    Tuning(usize),
    /// Band loaded and calibrated
    Locked(usize),
}

impl SynthState {
    /// Centre frequency of the locked band
    pub fn center_hz(&self) -> Option<u64> {
        match self {
            SynthState::Locked(band) => BAND_CENTER_HZ.get(*band).copied(),
            _ => None,
        }
    }

    /// Frequency the transceiver sees for RF frequency `hz`
    pub fn offset(&self, hz: u64) -> u64 {
        match self.center_hz() {
            Some(center) => hz.saturating_sub(center),
            None => hz,
        }
    }
}

impl fmt::Display for SynthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthState::Down => write!(f, "down"),
            SynthState::Tuning(band) => write!(f, "tuning band {}", band),
            SynthState::Locked(band) => write!(f, "locked to band {}", band),
        }
    }
}

/// Control lines around the synthesizer
#[derive(Debug)]
pub struct SynthLines {
    pub enable: LineHandle,
    pub rx_mixer: LineHandle,
    pub tx_mixer: LineHandle,
}

/// Synthesizer sequencer
pub struct Synthesizer {
    bus: Box<dyn BlockBus>,
    address: u8,
    delay: Box<dyn Delay>,
    lines: SynthLines,
    state: SynthState,
    reporter: Reporter,
}

impl Synthesizer {
    /// Take ownership of the bridge at `address` on `bus`
    ///
    /// No hardware is touched; the state starts as [`SynthState::Down`].
    pub fn new(
        bus: Box<dyn BlockBus>,
        address: u8,
        delay: Box<dyn Delay>,
        lines: SynthLines,
        reporter: Reporter,
    ) -> Self {
        Self {
            bus,
            address,
            delay,
            lines,
            state: SynthState::Down,
            reporter,
        }
    }

    pub fn state(&self) -> SynthState {
        self.state
    }

    pub fn lines(&self) -> &SynthLines {
        &self.lines
    }

    /// Put the I2C-to-SPI bridge in its default mode
    pub fn configure_bridge(&mut self) -> Result<(), LineError> {
        self.bus.write_block(self.address, BRIDGE_CONFIG, &[0x00])
    }

    /// Send raw bytes to the synthesizer
    pub fn send(&mut self, data: &[u8]) -> Result<(), LineError> {
        self.bus.write_block(self.address, SPI_SELECT, data)
    }

    /// Power down and disable the synthesizer and both mixers
    pub fn reset(&mut self) -> Result<(), LineError> {
        self.reporter.info("Resetting Synthesizer");
        self.send(&RESET)?;
        self.send(&POWER_DOWN)?;
        self.state = SynthState::Down;
        self.lines.enable.set(&[LOW])?;
        self.lines.rx_mixer.set(&[LOW])?;
        self.lines.tx_mixer.set(&[LOW])
    }

    /// Tune for RF frequency `hz`
    ///
    /// Returns the frequency the transceiver should tune to: `hz` minus the
    /// band centre when locked, `hz` unchanged otherwise.
    pub fn configure(&mut self, hz: u64) -> Result<u64, LineError> {
        self.reset()?;
        if hz < SYNTH_MIN_HZ {
            return Ok(hz);
        }

        self.lines.enable.set(&[HIGH])?;
        self.send(&POWER_UP)?;
        self.send(&RESET)?;

        let Some((band, words)) = band_for(hz).and_then(|band| Some((band, register_map(band)?)))
        else {
            self.reporter.warn(format!(
                "Could not tune to frequency {}. Frequency must be less than {}",
                hz,
                BAND_UPPER_HZ[BAND_UPPER_HZ.len() - 1]
            ));
            self.send(&POWER_DOWN)?;
            self.lines.enable.set(&[LOW])?;
            return Ok(hz);
        };

        self.reporter.info(format!(
            "Configuring synthesizer for frequency {}",
            BAND_CENTER_HZ[band]
        ));
        self.state = SynthState::Tuning(band);
        for word in &words {
            self.send(word)?;
        }
        self.delay.delay_ms(CALIBRATION_DELAY_MS);
        self.send(&FCAL_ENABLE)?;
        self.state = SynthState::Locked(band);

        self.lines.rx_mixer.set(&[HIGH])?;
        self.lines.tx_mixer.set(&[HIGH])?;
        Ok(self.state.offset(hz))
    }
}

impl fmt::Debug for Synthesizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synthesizer")
            .field("address", &self.address)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
