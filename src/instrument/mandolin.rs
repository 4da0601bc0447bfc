//! Mandolin: a pair of detuned strings excited by a body response.
//!
//! Instead of a noise burst the strings are driven by a recorded (or
//! synthesized) impulse response of the instrument body, replayed from the
//! start on every pluck. Playing the body table faster or slower changes the
//! apparent body size.

use std::f32::consts::TAU;

use crate::dsp::noise::Noise;
use crate::dsp::wavetable::WaveTable;
use crate::instrument::{control, normalize_control, Instrument, Plucked2};
use crate::REFERENCE_SAMPLE_RATE;

/// Modes of the built-in body response: frequency in Hz, decay time in
/// seconds and relative level.
const BODY_MODES: [(f32, f32, f32); 5] = [
    (190.0, 0.030, 1.0),
    (330.0, 0.025, 0.7),
    (520.0, 0.020, 0.5),
    (1_100.0, 0.010, 0.3),
    (2_300.0, 0.006, 0.2),
];
const BODY_LENGTH: usize = 1_024;

/// Decaying resonances plus a short noise click, sampled at the reference rate.
pub fn default_body() -> Vec<f32> {
    let mut noise = Noise::with_seed(0x6d61_6e64);
    let mut body: Vec<f32> = (0..BODY_LENGTH)
        .map(|n| {
            let t = n as f32 / REFERENCE_SAMPLE_RATE;
            let modes: f32 = BODY_MODES
                .iter()
                .map(|&(frequency, decay, level)| {
                    level * (-t / decay).exp() * (TAU * frequency * t).sin()
                })
                .sum();
            modes + 0.5 * noise.tick() * (-t / 0.002).exp()
        })
        .collect();

    let peak = body.iter().fold(0.0f32, |acc, x| acc.max(x.abs()));
    if peak > 0.0 {
        for sample in &mut body {
            *sample /= peak;
        }
    }
    body
}

#[derive(Debug, Clone)]
pub struct Mandolin {
    strings: Plucked2,
    body: WaveTable,
    sample_rate: f32,
    body_size: f32,
}

impl Mandolin {
    pub fn new(sample_rate: f32, lowest_frequency: f32) -> Self {
        Self::with_body(sample_rate, lowest_frequency, default_body())
    }

    /// Use a caller-supplied body response recorded at 22.05 kHz.
    pub fn with_body(sample_rate: f32, lowest_frequency: f32, body: Vec<f32>) -> Self {
        let mut body = WaveTable::from_samples(body, false);
        // Stay silent until the first pluck.
        while !body.is_finished() {
            body.tick();
        }
        let mut mandolin = Self {
            strings: Plucked2::new(sample_rate, lowest_frequency),
            body,
            sample_rate,
            body_size: 1.0,
        };
        mandolin.set_body_size(1.0);
        mandolin
    }

    pub fn frequency(&self) -> f32 {
        self.strings.frequency()
    }

    /// Relative body size; 1 replays the response at its recorded rate.
    pub fn set_body_size(&mut self, size: f32) {
        if size <= 0.0 || !size.is_finite() {
            log::warn!("Mandolin: body size {size} must be positive; ignoring");
            return;
        }
        self.body_size = size;
        self.body.set_rate(size * REFERENCE_SAMPLE_RATE / self.sample_rate);
    }

    pub fn body_size(&self) -> f32 {
        self.body_size
    }

    /// Restart the body response as the excitation.
    pub fn pluck(&mut self, amplitude: f32) {
        self.body.reset();
        self.strings.prepare_pluck(amplitude);
    }

    /// Pluck at `position`, a fraction of the string length.
    pub fn pluck_at(&mut self, amplitude: f32, position: f32) {
        self.strings.set_pluck_position(position);
        self.pluck(amplitude);
    }

    pub fn set_detune(&mut self, detune: f32) {
        self.strings.set_detune(detune);
    }

    pub fn set_base_loop_gain(&mut self, gain: f32) {
        self.strings.set_base_loop_gain(gain);
    }

    pub fn set_pluck_position(&mut self, position: f32) {
        self.strings.set_pluck_position(position);
    }

    pub fn clear(&mut self) {
        self.strings.clear();
    }
}

impl Instrument for Mandolin {
    fn set_frequency(&mut self, frequency: f32) {
        self.strings.set_frequency(frequency);
    }

    fn note_on(&mut self, frequency: f32, amplitude: f32) {
        self.set_frequency(frequency);
        self.pluck(amplitude);
    }

    fn note_off(&mut self, amplitude: f32) {
        self.strings.note_off(amplitude);
    }

    fn control_change(&mut self, number: u16, value: f32) {
        if number == control::BODY_SIZE {
            let norm = normalize_control("Mandolin", value);
            self.set_body_size(norm * 2.0);
        } else if !self.strings.handle_string_control("Mandolin", number, value) {
            log::warn!("Mandolin: undefined control number {number}");
        }
    }

    #[inline]
    fn tick(&mut self) -> f32 {
        let excitation = if self.body.is_finished() {
            0.0
        } else {
            self.body.tick() * self.strings.pluck_amplitude()
        };
        self.strings.tick_strings(excitation)
    }

    fn last_out(&self) -> f32 {
        self.strings.last_out()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_until_plucked() {
        let mut mandolin = Mandolin::new(44_100.0, 50.0);
        assert!((0..1_000).all(|_| mandolin.tick() == 0.0));
    }

    #[test]
    fn pluck_rings_then_decays() {
        let mut mandolin = Mandolin::new(44_100.0, 50.0);
        mandolin.note_on(392.0, 0.9);
        let out: Vec<f32> = (0..88_200).map(|_| mandolin.tick()).collect();
        let early: f32 = out[..4_410].iter().map(|x| x * x).sum();
        let late: f32 = out[83_790..].iter().map(|x| x * x).sum();
        assert!(early > 0.0);
        assert!(late < early * 0.5, "{early} -> {late}");
        assert!(out.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn body_size_control_sets_playback_rate() {
        let mut mandolin = Mandolin::new(22_050.0, 50.0);
        mandolin.control_change(control::BODY_SIZE, 32.0);
        assert!((mandolin.body_size() - 0.5).abs() < 1e-6);
        assert!((mandolin.body.rate() - 0.5).abs() < 1e-6);

        // Zero size is rejected.
        mandolin.control_change(control::BODY_SIZE, 0.0);
        assert!((mandolin.body_size() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn default_body_is_normalized() {
        let body = default_body();
        let peak = body.iter().fold(0.0f32, |acc, x| acc.max(x.abs()));
        assert!((peak - 1.0).abs() < 1e-6);
        assert_eq!(body.len(), BODY_LENGTH);
    }
}
