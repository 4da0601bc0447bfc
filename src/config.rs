#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::REFERENCE_SAMPLE_RATE;

/// Runtime parameters shared by every instrument and the voice manager.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: f32,
    /// Lowest pitch any string model will be asked to play; sizes delay lines.
    pub lowest_frequency: f32,
    /// Release window a voice keeps rendering after note-off, in seconds.
    pub mute_time: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: REFERENCE_SAMPLE_RATE,
            lowest_frequency: 50.0,
            mute_time: 0.2,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_lowest_frequency(mut self, frequency: f32) -> Self {
        self.lowest_frequency = frequency;
        self
    }

    /// Mute window expressed in samples.
    pub fn mute_samples(&self) -> i64 {
        (self.mute_time * self.sample_rate).round().max(1.0) as i64
    }
}
