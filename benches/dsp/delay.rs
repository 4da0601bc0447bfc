//! Benchmarks for the delay line family.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use waveguide_synth::dsp::delay::{DelayA, DelayL, DelayN};

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        // Integer delay, 10ms at 48kHz
        let mut delay = DelayN::with_delay(480);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("non_interpolating", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                delay.render(black_box(&mut buffer));
            })
        });

        // Swept fractional delay (chorus-like)
        let mut delay = DelayL::new(1024);
        group.bench_with_input(BenchmarkId::new("linear_swept", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for (i, &sample) in input.iter().enumerate() {
                    delay.set_delay(480.0 + (i as f32 * 0.1).sin() * 48.0);
                    sum += delay.tick(black_box(sample));
                }
                sum
            })
        });

        let mut delay = DelayA::new(1024);
        delay.set_delay(480.37);
        group.bench_with_input(BenchmarkId::new("allpass", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &sample in &input {
                    sum += delay.tick(black_box(sample));
                }
                sum
            })
        });
    }

    group.finish();
}
