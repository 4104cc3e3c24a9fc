//! Hardware output collaborator.
//!
//! The graph drives platform audio through this seam; session configuration
//! beyond start/stop lives with the platform, not here.

use crate::error::Result;
use crate::format::StreamFormat;

/// Output device behind the graph's hardware output node.
pub trait AudioBackend: Send {
    /// The hardware output format. The stereo format instruments are
    /// connected with derives its sample rate from this.
    fn output_format(&self) -> StreamFormat;

    /// Pre-allocate resources before starting. Optional.
    fn prepare(&mut self) -> Result<()> {
        Ok(())
    }

    fn start(&mut self) -> Result<()>;

    fn stop(&mut self);
}

/// Headless backend: always available, renders nothing.
#[derive(Debug, Clone)]
pub struct NullBackend {
    format: StreamFormat,
}

impl NullBackend {
    pub fn new() -> Self {
        Self {
            format: StreamFormat::stereo(44100.0),
        }
    }

    pub fn with_format(format: StreamFormat) -> Self {
        Self { format }
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for NullBackend {
    fn output_format(&self) -> StreamFormat {
        self.format
    }

    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) {}
}
