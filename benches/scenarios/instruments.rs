//! Benchmarks for single physical-model instruments.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use waveguide_synth::instrument::{
    control, BowedBar, Drone, Flute, Instrument, Mandolin, Plucked, ShakerPreset, Shakers, Sitar,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

const LOWEST: f32 = 50.0;

fn bench_one<I: Instrument>(
    group: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>,
    name: &str,
    size: usize,
    instrument: &mut I,
) {
    let mut buffer = vec![0.0f32; size];
    group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
        b.iter(|| {
            instrument.render(black_box(&mut buffer));
        })
    });
}

pub fn bench_instruments(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/instruments");

    for &size in BLOCK_SIZES {
        let mut plucked = Plucked::new(SAMPLE_RATE, LOWEST);
        plucked.note_on(220.0, 0.8);
        bench_one(&mut group, "plucked", size, &mut plucked);

        let mut mandolin = Mandolin::new(SAMPLE_RATE, LOWEST);
        mandolin.note_on(220.0, 0.8);
        bench_one(&mut group, "mandolin", size, &mut mandolin);

        let mut sitar = Sitar::new(SAMPLE_RATE, LOWEST);
        sitar.note_on(220.0, 0.8);
        bench_one(&mut group, "sitar", size, &mut sitar);

        let mut drone = Drone::new(SAMPLE_RATE, LOWEST);
        drone.note_on(110.0, 0.8);
        bench_one(&mut group, "drone", size, &mut drone);

        let mut flute = Flute::new(SAMPLE_RATE, LOWEST);
        flute.note_on(440.0, 0.8);
        bench_one(&mut group, "flute", size, &mut flute);

        // Tibetan bowl
        let mut bar = BowedBar::new(SAMPLE_RATE, LOWEST);
        bar.control_change(control::BAR_PRESET, 3.0);
        bar.note_on(220.0, 0.8);
        bench_one(&mut group, "bowed_bar", size, &mut bar);

        let mut shakers = Shakers::new(SAMPLE_RATE);
        shakers.setup(ShakerPreset::Maraca);
        shakers.note_on(440.0, 1.0);
        bench_one(&mut group, "shakers_maraca", size, &mut shakers);
    }

    group.finish();
}
