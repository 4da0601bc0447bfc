//! Flute - Jet-Driven Bore Waveguide
//!
//! ```text
//!                    ┌──── jet reflection ←────┐
//!                    ↓                         │
//! breath ──→ (+) ──→ [jet delay] ──→ [jet table] ──→ (+) ──→ [bore delay] ──┬──→ out
//!  ↑                                                  ↑                     │
//! noise + vibrato                        end reflection ←── [DC] ←── [−LP] ─┘
//! ```
//!
//! The breath pressure is shaped by an ADSR and perturbed by noise and a
//! sine vibrato. The jet table is the cubic nonlinearity `x(x² − 1)` that
//! models the air jet flipping in and out of the embouchure hole.

use crate::dsp::delay::DelayL;
use crate::dsp::envelope::Adsr;
use crate::dsp::filter::{DcBlock, OnePole};
use crate::dsp::noise::Noise;
use crate::dsp::table::JetTable;
use crate::dsp::wavetable::WaveTable;
use crate::instrument::{checked_frequency, clamp_amplitude, control, normalize_control, Instrument};
use crate::{rate_at, REFERENCE_SAMPLE_RATE};

const VIBRATO_TABLE_LENGTH: usize = 256;

/// Slowest breath release at the reference rate, about 0.2 s from full pressure.
const MIN_RELEASE_RATE: f32 = 0.0002;

#[derive(Debug, Clone)]
pub struct Flute {
    sample_rate: f32,
    jet_delay: DelayL,
    bore_delay: DelayL,
    jet_table: JetTable,
    filter: OnePole,
    dc_block: DcBlock,
    noise: Noise,
    adsr: Adsr,
    vibrato: WaveTable,
    last_frequency: f32,
    max_pressure: f32,
    jet_reflection: f32,
    end_reflection: f32,
    noise_gain: f32,
    vibrato_gain: f32,
    output_gain: f32,
    jet_ratio: f32,
    last_out: f32,
}

impl Flute {
    pub fn new(sample_rate: f32, lowest_frequency: f32) -> Self {
        let lowest = checked_frequency("Flute", lowest_frequency);
        // The bore sounds a fifth below the played pitch.
        let bore_capacity = (1.5 * sample_rate / lowest) as usize + 2;
        let jet_capacity = bore_capacity * 3 / 5 + 1;

        let mut filter = OnePole::new();
        filter.set_pole(0.7 - 0.1 * REFERENCE_SAMPLE_RATE / sample_rate);
        filter.set_gain(-1.0);

        let mut adsr = Adsr::new(sample_rate);
        adsr.set_all_times(0.005, 0.01, 0.8, 0.010);

        let mut vibrato = WaveTable::sine(VIBRATO_TABLE_LENGTH);
        vibrato.set_frequency(5.925, sample_rate);

        let mut flute = Self {
            sample_rate,
            jet_delay: DelayL::new(jet_capacity),
            bore_delay: DelayL::new(bore_capacity),
            jet_table: JetTable::new(),
            filter,
            dc_block: DcBlock::new(0.99),
            noise: Noise::new(),
            adsr,
            vibrato,
            last_frequency: 220.0,
            max_pressure: 0.0,
            jet_reflection: 0.5,
            end_reflection: 0.5,
            noise_gain: 0.15,
            vibrato_gain: 0.05,
            output_gain: 1.0,
            jet_ratio: 0.32,
            last_out: 0.0,
        };
        flute.set_frequency(220.0);
        flute
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.noise.reseed(seed);
        self
    }

    /// Jet length as a fraction of the bore length.
    pub fn set_jet_delay(&mut self, ratio: f32) {
        self.jet_ratio = ratio;
        self.jet_delay.set_delay(self.bore_delay.delay() * ratio);
    }

    pub fn set_jet_reflection(&mut self, coefficient: f32) {
        self.jet_reflection = coefficient;
    }

    pub fn set_end_reflection(&mut self, coefficient: f32) {
        self.end_reflection = coefficient;
    }

    pub fn set_noise_gain(&mut self, gain: f32) {
        self.noise_gain = gain;
    }

    pub fn set_vibrato_frequency(&mut self, frequency: f32) {
        self.vibrato.set_frequency(frequency, self.sample_rate);
    }

    pub fn set_vibrato_gain(&mut self, gain: f32) {
        self.vibrato_gain = gain;
    }

    /// Ramp the breath up to `amplitude` at `rate` per sample.
    pub fn start_blowing(&mut self, amplitude: f32, rate: f32) {
        if amplitude <= 0.0 || rate <= 0.0 {
            log::warn!("Flute: start_blowing needs positive amplitude and rate");
            return;
        }
        self.adsr.set_attack_rate(rate);
        self.max_pressure = amplitude / 0.8;
        self.adsr.key_on();
    }

    /// Let the breath fall to zero at `rate` per sample.
    ///
    /// A non-positive rate still releases, at the slowest allowed rate.
    pub fn stop_blowing(&mut self, rate: f32) {
        let floor = rate_at(MIN_RELEASE_RATE, self.sample_rate);
        let rate = if rate > 0.0 {
            rate
        } else {
            log::warn!("Flute: stop_blowing needs a positive rate; using {floor}");
            floor
        };
        self.adsr.set_release_rate(rate);
        self.adsr.key_off();
    }

    pub fn clear(&mut self) {
        self.jet_delay.clear();
        self.bore_delay.clear();
        self.filter.clear();
        self.dc_block.clear();
        self.last_out = 0.0;
    }
}

impl Instrument for Flute {
    fn set_frequency(&mut self, frequency: f32) {
        let frequency = checked_frequency("Flute", frequency);
        self.last_frequency = frequency * 0.66666;
        // Less the filter delay and the one-sample feedback delay.
        let delay = self.sample_rate / self.last_frequency - 2.0;
        self.bore_delay.set_delay(delay);
        self.jet_delay.set_delay(delay * self.jet_ratio);
    }

    fn note_on(&mut self, frequency: f32, amplitude: f32) {
        let amplitude = clamp_amplitude("Flute", amplitude);
        self.set_frequency(frequency);
        self.start_blowing(1.1 + amplitude * 0.2, rate_at(amplitude * 0.02, self.sample_rate));
        self.output_gain = amplitude + 0.001;
    }

    fn note_off(&mut self, amplitude: f32) {
        let amplitude = clamp_amplitude("Flute", amplitude);
        let rate = (amplitude * 0.02).max(MIN_RELEASE_RATE);
        self.stop_blowing(rate_at(rate, self.sample_rate));
    }

    fn control_change(&mut self, number: u16, value: f32) {
        let norm = normalize_control("Flute", value);
        match number {
            control::JET_DELAY => self.set_jet_delay(0.08 + 0.48 * norm),
            control::NOISE_GAIN => self.set_noise_gain(norm * 0.4),
            control::VIBRATO_FREQUENCY => self.set_vibrato_frequency(norm * 12.0),
            control::VIBRATO_GAIN => self.set_vibrato_gain(norm * 0.4),
            control::BREATH_PRESSURE => self.adsr.set_target(norm),
            _ => log::warn!("Flute: undefined control number {number}"),
        }
    }

    #[inline]
    fn tick(&mut self) -> f32 {
        let mut breath = self.max_pressure * self.adsr.tick();
        breath += breath * (self.noise_gain * self.noise.tick() + self.vibrato_gain * self.vibrato.tick());

        let reflection = self.dc_block.tick(self.filter.tick(self.bore_delay.last_out()));
        let jet = self.jet_delay.tick(breath - self.jet_reflection * reflection);
        let pressure = self.jet_table.lookup(jet) + self.end_reflection * reflection;

        self.last_out = 0.3 * self.bore_delay.tick(pressure) * self.output_gain;
        self.last_out
    }

    fn last_out(&self) -> f32 {
        self.last_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blowing_builds_a_tone() {
        let mut flute = Flute::new(22_050.0, 100.0).with_seed(2);
        flute.note_on(440.0, 0.8);
        let out: Vec<f32> = (0..22_050).map(|_| flute.tick()).collect();
        let energy: f32 = out[11_025..].iter().map(|x| x * x).sum();
        assert!(energy > 0.0);
        assert!(out.iter().all(|x| x.is_finite() && x.abs() < 5.0));
    }

    #[test]
    fn note_off_releases_the_breath() {
        let mut flute = Flute::new(22_050.0, 100.0).with_seed(2);
        flute.note_on(440.0, 0.8);
        for _ in 0..4_000 {
            flute.tick();
        }
        flute.note_off(0.8);
        for _ in 0..4_000 {
            flute.tick();
        }
        assert_eq!(flute.adsr.last_out(), 0.0);
    }

    #[test]
    fn silent_note_off_still_releases() {
        let mut flute = Flute::new(22_050.0, 100.0).with_seed(2);
        flute.note_on(440.0, 0.8);
        let held: f32 = (0..4_000).map(|_| flute.tick().powi(2)).sum();
        assert!(held > 0.0);

        flute.note_off(0.0);
        for _ in 0..22_050 {
            flute.tick();
        }
        assert_eq!(flute.adsr.last_out(), 0.0);
        let late: f32 = (0..4_000).map(|_| flute.tick().powi(2)).sum();
        assert!(late < held * 1e-3, "late={late}, held={held}");
    }

    #[test]
    fn stop_blowing_with_zero_rate_releases() {
        let mut flute = Flute::new(22_050.0, 100.0);
        flute.start_blowing(1.0, 0.01);
        for _ in 0..1_000 {
            flute.tick();
        }
        flute.stop_blowing(0.0);
        for _ in 0..22_050 {
            flute.tick();
        }
        assert_eq!(flute.adsr.last_out(), 0.0);
    }

    #[test]
    fn jet_delay_tracks_bore() {
        let mut flute = Flute::new(22_050.0, 100.0);
        flute.set_frequency(330.0);
        flute.control_change(control::JET_DELAY, 64.0);
        let expected = flute.bore_delay.delay() * 0.32;
        assert!((flute.jet_delay.delay() - expected).abs() < 1e-3);
    }

    #[test]
    fn breath_pressure_control_sets_envelope_target() {
        let mut flute = Flute::new(22_050.0, 100.0);
        flute.control_change(control::BREATH_PRESSURE, 96.0);
        assert!((flute.adsr.target() - 0.75).abs() < 1e-6);
    }
}
