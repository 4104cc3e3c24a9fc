//! Stream format descriptors for graph connections.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Channel count and sample rate of an audio connection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamFormat {
    pub sample_rate: f64,
    pub channels: u16,
}

impl StreamFormat {
    pub const fn new(sample_rate: f64, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Standard stereo format at the given rate.
    ///
    /// This is the fixed format instruments are connected to the mixer with,
    /// derived from the hardware output rate.
    pub const fn stereo(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            channels: 2,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.sample_rate > 0.0 && self.channels > 0
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ch @ {} Hz", self.channels, self.sample_rate)
    }
}
