//! Benchmarks for low-level DSP primitives.

mod blit;
mod delay;
mod envelope;
mod filter;
mod reverb;

pub use blit::bench_blit;
pub use delay::bench_delay;
pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use reverb::bench_reverb;
