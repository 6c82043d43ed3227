//! Frequency tables for filter banks
//!
//! Every switchable filter bank on a personality card is described by a
//! table mapping a frequency to the levels of its select lines. Three
//! matching rules are in use:
//!
//! - [`FrequencyTable::UpTo`]: ascending upper edges, first edge `>= hz` wins
//!   (low-pass and TX harmonic filters)
//! - [`FrequencyTable::From`]: descending lower edges, first edge `<= hz` wins
//!   (high-pass filters)
//! - [`FrequencyTable::Within`]: closed ranges, first range containing `hz`
//!   wins (band-pass filters)
//!
//! The last entry of every table is its catch-all and is selected whenever
//! no earlier entry matches.

use crate::error::BoardError;

/// Edge used by catch-all entries of [`FrequencyTable::UpTo`] tables
pub const UNFILTERED_EDGE_HZ: u64 = 9_999_999_999;

/// Frequency that selects the TX bypass path
pub const TX_UNFILTERED_HZ: u64 = 4_000_000_000;

/// Frequency that selects the RX low-pass bypass path
pub const RX_LPF_UNFILTERED_HZ: u64 = 4_000_000_000;

/// Frequency that selects the RX high-pass bypass path
pub const RX_HPF_UNFILTERED_HZ: u64 = 100_000_000;

/// Frequency that selects the RX band-pass bypass path
pub const RX_BPF_UNFILTERED_HZ: u64 = 1;

/// A table entry keyed by a single band edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub edge_hz: u64,
    pub levels: &'static [u8],
    pub label: &'static str,
}

/// A table entry covering a closed frequency range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassBand {
    pub low_hz: u64,
    pub high_hz: u64,
    pub levels: &'static [u8],
    pub label: &'static str,
}

impl Band {
    pub const fn new(edge_hz: u64, levels: &'static [u8], label: &'static str) -> Self {
        Self {
            edge_hz,
            levels,
            label,
        }
    }
}

impl PassBand {
    pub const fn new(
        low_hz: u64,
        high_hz: u64,
        levels: &'static [u8],
        label: &'static str,
    ) -> Self {
        Self {
            low_hz,
            high_hz,
            levels,
            label,
        }
    }

    fn contains(&self, hz: u64) -> bool {
        (self.low_hz..=self.high_hz).contains(&hz)
    }
}

/// An ordered frequency-to-levels table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyTable {
    UpTo(&'static [Band]),
    From(&'static [Band]),
    Within(&'static [PassBand]),
}

/// The entry chosen for a frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Position of the entry in its table
    pub index: usize,
    pub levels: &'static [u8],
    pub label: &'static str,
}

impl FrequencyTable {
    /// Number of entries
    pub fn len(&self) -> usize {
        match self {
            Self::UpTo(bands) | Self::From(bands) => bands.len(),
            Self::Within(bands) => bands.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pick the entry for `hz`
    ///
    /// Returns `None` only for an empty table.
    pub fn classify(&self, hz: u64) -> Option<Selection> {
        match self {
            Self::UpTo(bands) => pick_band(bands, |b| hz <= b.edge_hz),
            Self::From(bands) => pick_band(bands, |b| hz >= b.edge_hz),
            Self::Within(bands) => {
                let index = bands
                    .iter()
                    .position(|b| b.contains(hz))
                    .or_else(|| bands.len().checked_sub(1))?;
                let band = &bands[index];
                Some(Selection {
                    index,
                    levels: band.levels,
                    label: band.label,
                })
            }
        }
    }

    /// Like [`FrequencyTable::classify`], naming the table in the error
    pub fn select(&self, table: &'static str, hz: u64) -> Result<Selection, BoardError> {
        self.classify(hz)
            .ok_or(BoardError::NoMatchingBand { table, hz })
    }

    /// Number of select lines, if every entry agrees
    pub fn arity(&self) -> Option<usize> {
        let lens: Vec<usize> = match self {
            Self::UpTo(bands) | Self::From(bands) => {
                bands.iter().map(|b| b.levels.len()).collect()
            }
            Self::Within(bands) => bands.iter().map(|b| b.levels.len()).collect(),
        };
        let first = *lens.first()?;
        lens.iter().all(|&len| len == first).then_some(first)
    }

    /// Whether the table is non-empty, has a uniform arity and its edges
    /// are ordered for its matching rule
    pub fn is_well_formed(&self) -> bool {
        if self.arity().is_none() {
            return false;
        }
        match self {
            Self::UpTo(bands) => bands.windows(2).all(|w| w[0].edge_hz < w[1].edge_hz),
            Self::From(bands) => bands.windows(2).all(|w| w[0].edge_hz > w[1].edge_hz),
            Self::Within(bands) => bands.iter().all(|b| b.low_hz <= b.high_hz),
        }
    }
}

fn pick_band(bands: &[Band], matches: impl Fn(&Band) -> bool) -> Option<Selection> {
    let index = bands
        .iter()
        .position(matches)
        .or_else(|| bands.len().checked_sub(1))?;
    let band = &bands[index];
    Some(Selection {
        index,
        levels: band.levels,
        label: band.label,
    })
}

// ============================================================================
// Board Tables
// ============================================================================

/// TX harmonic filter bank
pub const TX_FILTERS: FrequencyTable = FrequencyTable::UpTo(TX_FILTER_BANDS);

const TX_FILTER_BANDS: &[Band] = &[
    Band::new(230_000_000, &[1, 0, 1], "230MHz"),
    Band::new(560_000_000, &[0, 1, 1], "560MHz"),
    Band::new(1_300_000_000, &[1, 1, 0], "1.3GHz"),
    Band::new(3_125_000_000, &[0, 1, 0], "3.125GHz"),
    Band::new(UNFILTERED_EDGE_HZ, &[0, 0, 1], "UNFILTERED"),
];

/// RX low-pass filter bank
pub const RX_LOW_PASS: FrequencyTable = FrequencyTable::UpTo(RX_LOW_PASS_BANDS);

const RX_LOW_PASS_BANDS: &[Band] = &[
    Band::new(145_000_000, &[0, 1, 0], "145MHz"),
    Band::new(440_000_000, &[0, 1, 1], "440MHz"),
    Band::new(1_370_000_000, &[1, 0, 1], "1.37GHz"),
    Band::new(3_000_000_000, &[1, 1, 0], "3GHz"),
    Band::new(UNFILTERED_EDGE_HZ, &[0, 0, 1], "UNFILTERED"),
];

/// RX high-pass filter bank
pub const RX_HIGH_PASS: FrequencyTable = FrequencyTable::From(RX_HIGH_PASS_BANDS);

const RX_HIGH_PASS_BANDS: &[Band] = &[
    Band::new(3_780_000_000, &[1, 1, 0], "3.78GHz"),
    Band::new(1_930_000_000, &[1, 0, 1], "1.93GHz"),
    Band::new(840_000_000, &[0, 1, 1], "840MHz"),
    Band::new(135_000_000, &[0, 1, 0], "135MHz"),
    Band::new(0, &[0, 0, 1], "UNFILTERED"),
];

/// RX band-pass filter bank on the Cardf card
pub const RX_BAND_PASS: FrequencyTable = FrequencyTable::Within(RX_BAND_PASS_BANDS);

const RX_BAND_PASS_BANDS: &[PassBand] = &[
    PassBand::new(902_000_000, 928_000_000, &[0, 1], "900MHz"),
    PassBand::new(2_400_000_000, 2_500_000_000, &[1, 0], "2.4GHz"),
    PassBand::new(5_000_000_000, 6_000_000_000, &[1, 1], "5GHz"),
    PassBand::new(0, UNFILTERED_EDGE_HZ, &[0, 0], "UNFILTERED"),
];
