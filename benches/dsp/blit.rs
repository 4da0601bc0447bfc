//! Benchmarks for band-limited impulse train oscillators.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use waveguide_synth::dsp::blit::{Blit, BlitSaw, BlitSquare};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_blit(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/blit");

    for &size in BLOCK_SIZES {
        let mut impulse = Blit::new(220.0, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("impulse", size), &size, |b, _| {
            b.iter(|| (0..size).map(|_| black_box(impulse.tick())).sum::<f32>())
        });

        let mut saw = BlitSaw::new(220.0, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("saw", size), &size, |b, _| {
            b.iter(|| (0..size).map(|_| black_box(saw.tick())).sum::<f32>())
        });

        let mut square = BlitSquare::new(220.0, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("square", size), &size, |b, _| {
            b.iter(|| (0..size).map(|_| black_box(square.tick())).sum::<f32>())
        });
    }

    group.finish();
}
