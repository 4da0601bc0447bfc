//! Real-world scenario benchmarks.
//!
//! These benchmarks run complete physical models and a polyphonic voice
//! manager, the way the demo binary drives them.

mod instruments;
mod voices;

pub use instruments::bench_instruments;
pub use voices::bench_voices;
