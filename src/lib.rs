pub mod config;
pub mod dsp; // Tick-rate DSP primitives
pub mod error;
pub mod instrument; // Physical models built from the primitives
pub mod io;
pub mod synth; // Voice management and polyphony

pub use config::EngineConfig;
pub use error::DelayError;

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Sample rate the legacy instrument presets were tuned at.
pub const REFERENCE_SAMPLE_RATE: f32 = 22_050.0;

/// Scale a per-sample rate authored at [`REFERENCE_SAMPLE_RATE`] to `sample_rate`.
///
/// Envelope rates are raw per-sample increments, so a preset rate has to be
/// rescaled explicitly to keep its duration in seconds.
#[inline]
pub fn rate_at(rate: f32, sample_rate: f32) -> f32 {
    rate * REFERENCE_SAMPLE_RATE / sample_rate
}

/// Scale factor for MIDI-style control values (`0..=128`).
pub(crate) const NORM_7: f32 = 1.0 / 128.0;
