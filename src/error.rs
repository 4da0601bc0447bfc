use thiserror::Error;

/// Configuration errors raised by delay lines.
///
/// A delay that does not fit the buffer is a caller bug: the line was sized
/// for a lower pitch than it is now asked to play. Truncating it would detune
/// the instrument, so `try_set_delay` reports it instead.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DelayError {
    #[error("delay of {requested} samples exceeds capacity (max {max})")]
    ExceedsCapacity { requested: f32, max: f32 },
    #[error("delay of {requested} samples is below the minimum of {min}")]
    TooShort { requested: f32, min: f32 },
    #[error("delay must be a finite number of samples")]
    NotFinite,
}
