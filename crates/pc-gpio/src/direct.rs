//! Lines driven directly through a GPIO chip

use std::fmt;

use tracing::trace;

use crate::error::{check_arity, LineError};
use crate::platform::{GpioChip, LineRequest};

/// Output lines requested from a GPIO chip
pub struct DirectLines {
    request: Box<dyn LineRequest>,
    offsets: Vec<u32>,
    consumer: String,
}

impl DirectLines {
    /// Request `offsets` from `chip` as outputs
    pub fn request(
        chip: &dyn GpioChip,
        offsets: &[u32],
        consumer: &str,
    ) -> Result<Self, LineError> {
        let request = chip.request_lines(offsets, consumer)?;
        Ok(Self {
            request,
            offsets: offsets.to_vec(),
            consumer: consumer.to_string(),
        })
    }

    /// Line offsets in request order
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// Consumer label used for the request
    pub fn consumer(&self) -> &str {
        &self.consumer
    }

    /// Number of lines
    pub fn arity(&self) -> usize {
        self.offsets.len()
    }

    /// Drive all lines with a single write
    pub fn set_values(&self, levels: &[u8]) -> Result<(), LineError> {
        check_arity(self.arity(), levels)?;
        trace!("{} {:?} <- {:?}", self.consumer, self.offsets, levels);
        self.request.set_values(levels)
    }
}

impl fmt::Debug for DirectLines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectLines")
            .field("offsets", &self.offsets)
            .field("consumer", &self.consumer)
            .finish()
    }
}
