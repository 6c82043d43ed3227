//! Named groups of lines
//!
//! A board function such as "TX filter select" may be wired across several
//! backends (two lines on a backpack expander, a third on the card chip).
//! [`LineBank`] presents those handles as one ordered set of levels.

use pc_gpio::{LineError, LineHandle, HIGH, LOW};

/// Ordered lines driven together, possibly spanning backends
#[derive(Debug)]
pub struct LineBank {
    name: &'static str,
    handles: Vec<LineHandle>,
}

impl LineBank {
    /// Group `handles` in order under `name`
    pub fn new(name: &'static str, handles: Vec<LineHandle>) -> Self {
        Self { name, handles }
    }

    /// A bank of one handle
    pub fn single(name: &'static str, handle: LineHandle) -> Self {
        Self::new(name, vec![handle])
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Total number of lines
    pub fn arity(&self) -> usize {
        self.handles.iter().map(LineHandle::arity).sum()
    }

    /// Drive every line, handle by handle in bank order
    ///
    /// The arity is checked before anything is written.
    pub fn drive(&mut self, levels: &[u8]) -> Result<(), LineError> {
        let expected = self.arity();
        if levels.len() != expected {
            return Err(LineError::InvalidArity {
                expected,
                actual: levels.len(),
            });
        }

        let mut rest = levels;
        for handle in &mut self.handles {
            let (head, tail) = rest.split_at(handle.arity());
            handle.set(head)?;
            rest = tail;
        }
        Ok(())
    }

    /// Drive every line to the same level
    pub fn drive_all(&mut self, level: u8) -> Result<(), LineError> {
        let levels = vec![level; self.arity()];
        self.drive(&levels)
    }

    /// Levels last written to every line, if every handle has been written
    pub fn levels(&self) -> Option<Vec<u8>> {
        let mut levels = Vec::with_capacity(self.arity());
        for handle in &self.handles {
            levels.extend_from_slice(handle.last_levels()?);
        }
        Some(levels)
    }
}

/// Indices of the RF paths addressed by `path` on a board with `count`
/// parallel paths
///
/// `None` addresses every path. Returns `None` for an index the board does
/// not have.
pub fn rf_paths(path: Option<usize>, count: usize) -> Option<Vec<usize>> {
    match path {
        None => Some((0..count).collect()),
        Some(index) if index < count => Some(vec![index]),
        Some(_) => None,
    }
}

/// Transceiver RX and TX path controls
///
/// Each side may be more than one line (one per channel); all lines on a
/// side are driven to the same level.
#[derive(Debug)]
pub struct RxTxLines {
    rx: LineHandle,
    tx: LineHandle,
}

impl RxTxLines {
    pub fn new(rx: LineHandle, tx: LineHandle) -> Self {
        Self { rx, tx }
    }

    pub fn set_rx(&mut self, enabled: bool) -> Result<(), LineError> {
        drive_side(&mut self.rx, enabled)
    }

    pub fn set_tx(&mut self, enabled: bool) -> Result<(), LineError> {
        drive_side(&mut self.tx, enabled)
    }

    pub fn rx(&self) -> &LineHandle {
        &self.rx
    }

    pub fn tx(&self) -> &LineHandle {
        &self.tx
    }
}

fn drive_side(handle: &mut LineHandle, enabled: bool) -> Result<(), LineError> {
    let level = if enabled { HIGH } else { LOW };
    let levels = vec![level; handle.arity()];
    handle.set(&levels)
}
