//! Low-level DSP primitives used by the instruments.
//!
//! Every component allocates once at construction and is realtime-safe
//! afterwards, so they can be embedded directly inside instrument structs.
//! Each exposes `tick` for one sample and `last_out` for the most recent one.

/// Band-limited impulse train, sawtooth and square oscillators.
pub mod blit;
/// Non-interpolating, linear and allpass-interpolating delay lines.
pub mod delay;
/// Linear ramp and attack/decay/sustain/release envelopes.
pub mod envelope;
/// One-zero, one-pole, DC blocker, biquad and FIR filters.
pub mod filter;
/// Uniform white noise sources.
pub mod noise;
/// JCRev reverberator.
pub mod reverb;
/// Memoryless jet and bow nonlinearities.
pub mod table;
/// Interpolated table playback.
pub mod wavetable;

pub use envelope::AdsrState;
