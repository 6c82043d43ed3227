//! Backend-independent line handles

use crate::direct::DirectLines;
use crate::error::{check_arity, LineError};
use crate::gpo::GpoLines;
use crate::mux::MuxLines;
use tracing::trace;

/// The mechanism behind a [`LineHandle`]
#[derive(Debug)]
pub enum Backend {
    /// Lines on a GPIO chip
    Direct(DirectLines),
    /// Personality card pins routed through the CARP line mux
    Mux(MuxLines),
    /// Bits of the transceiver GPO register
    Gpo(GpoLines),
}

impl Backend {
    /// Returns a short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Direct(_) => "direct",
            Backend::Mux(_) => "mux",
            Backend::Gpo(_) => "gpo",
        }
    }
}

/// A fixed set of output lines on one backend
///
/// Levels are always written as a full vector matching [`LineHandle::arity`].
#[derive(Debug)]
pub struct LineHandle {
    backend: Backend,
    last_levels: Option<Vec<u8>>,
}

impl LineHandle {
    /// Wrap a backend
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            last_levels: None,
        }
    }

    /// Backend driving these lines
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Number of lines
    pub fn arity(&self) -> usize {
        match &self.backend {
            Backend::Direct(lines) => lines.arity(),
            Backend::Mux(lines) => lines.arity(),
            Backend::Gpo(lines) => lines.arity(),
        }
    }

    /// Drive every line; `levels[i]` goes to the i-th bound line
    ///
    /// Nothing is recorded unless the backend accepted the write.
    pub fn set(&mut self, levels: &[u8]) -> Result<(), LineError> {
        check_arity(self.arity(), levels)?;
        trace!("{} lines <- {:?}", self.backend.name(), levels);

        match &self.backend {
            Backend::Direct(lines) => lines.set_values(levels)?,
            Backend::Mux(lines) => lines.set_values(levels)?,
            Backend::Gpo(lines) => lines.set_values(levels)?,
        }

        self.last_levels = Some(levels.to_vec());
        Ok(())
    }

    /// Levels from the last successful [`LineHandle::set`]
    pub fn last_levels(&self) -> Option<&[u8]> {
        self.last_levels.as_deref()
    }
}

impl From<DirectLines> for LineHandle {
    fn from(lines: DirectLines) -> Self {
        Self::new(Backend::Direct(lines))
    }
}

impl From<MuxLines> for LineHandle {
    fn from(lines: MuxLines) -> Self {
        Self::new(Backend::Mux(lines))
    }
}

impl From<GpoLines> for LineHandle {
    fn from(lines: GpoLines) -> Self {
        Self::new(Backend::Gpo(lines))
    }
}
