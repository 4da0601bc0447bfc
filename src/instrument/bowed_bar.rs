//! Banded waveguide bar, bowl and glass models.
//!
//! Each vibrational mode of the object gets its own band: a delay line one
//! mode-period long in a loop with a resonant bandpass tuned to that mode.
//! The bands share one excitation, either an initial pluck loaded into the
//! delay lines or a bow whose friction depends on the velocity difference
//! between bow and bar.
//!
//! ```text
//!                    ┌─→ [BP mode 0] ─→ [delay 0] ─┐
//! bow ─→ [friction] ─┼─→ [BP mode 1] ─→ [delay 1] ─┼──→ Σ ─→ out
//!           ↑        └─→ ...                       │
//!           └──────────── velocity feedback ←──────┘
//! ```

use std::f32::consts::PI;

use crate::dsp::delay::DelayN;
use crate::dsp::envelope::Adsr;
use crate::dsp::filter::BiQuad;
use crate::dsp::table::BowTable;
use crate::instrument::{checked_frequency, clamp_amplitude, control, normalize_control, Instrument};
use crate::rate_at;

pub const MAX_MODES: usize = 12;
const MAX_FREQUENCY: f32 = 1568.0;
const MAX_GAIN: f32 = 0.99999;
/// Slowest bow attack or release at the reference rate.
const MIN_BOW_RATE: f32 = 0.0001;

/// Mode sets for the banded models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BarPreset {
    #[default]
    UniformBar,
    TunedBar,
    GlassHarmonica,
    TibetanBowl,
}

impl BarPreset {
    /// Preset by number; unknown numbers fall back to the uniform bar.
    pub fn from_index(index: usize) -> Self {
        match index {
            1 => BarPreset::TunedBar,
            2 => BarPreset::GlassHarmonica,
            3 => BarPreset::TibetanBowl,
            _ => BarPreset::UniformBar,
        }
    }

    /// Mode frequency ratios, per-mode loop gains and excitation levels.
    fn modes(self) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
        match self {
            BarPreset::UniformBar => {
                let ratios = vec![1.0, 2.756, 5.404, 8.933];
                let gains = (1..=4).map(|i| 0.9f32.powi(i)).collect();
                (ratios, gains, vec![1.0; 4])
            }
            BarPreset::TunedBar => {
                let ratios = vec![1.0, 4.019_839_1, 10.718_499, 18.069_705];
                let gains = (1..=4).map(|i| 0.999f32.powi(i)).collect();
                (ratios, gains, vec![1.0; 4])
            }
            BarPreset::GlassHarmonica => {
                let ratios = vec![1.0, 2.32, 4.25, 6.63, 9.38];
                let gains = (1..=5).map(|i| 0.999f32.powi(i)).collect();
                (ratios, gains, vec![1.0; 5])
            }
            BarPreset::TibetanBowl => {
                let ratios = vec![
                    0.996_108_34,
                    1.003_891_7,
                    2.979_178,
                    2.993_297_7,
                    5.704_452,
                    5.704_452,
                    8.9982,
                    9.015_497,
                    12.833_03,
                    12.807_382,
                    17.280_822,
                    21.976_027,
                ];
                let gains = vec![
                    0.999_925_96,
                    0.999_925_96,
                    0.999_982_8,
                    0.999_982_8,
                    1.0,
                    1.0,
                    1.0,
                    1.0,
                    1.0,
                    1.0,
                    1.0,
                    1.0,
                ];
                let excitation = [
                    11.900_357, 11.900_357, 10.914_886, 10.914_886, 42.995_041, 42.995_041,
                    40.063_034, 40.063_034, 7.063_034, 7.063_034, 57.063_034, 57.063_034,
                ]
                .iter()
                .map(|x| x / 10.0)
                .collect();
                (ratios, gains, excitation)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct BowedBar {
    sample_rate: f32,
    preset: BarPreset,
    delays: Vec<DelayN>,
    bandpass: Vec<BiQuad>,
    ratios: Vec<f32>,
    base_gains: Vec<f32>,
    gains: Vec<f32>,
    excitation: Vec<f32>,
    preset_modes: usize,
    n_modes: usize,
    bow_table: BowTable,
    adsr: Adsr,
    frequency: f32,
    base_gain: f32,
    integration_constant: f32,
    velocity_input: f32,
    bow_velocity: f32,
    bow_target: f32,
    bow_position: f32,
    max_velocity: f32,
    strike_position: f32,
    do_pluck: bool,
    track_velocity: bool,
    last_out: f32,
}

impl BowedBar {
    pub fn new(sample_rate: f32, lowest_frequency: f32) -> Self {
        let lowest = checked_frequency("BowedBar", lowest_frequency);
        // The lowest Tibetan bowl mode sits just below the fundamental.
        let capacity = (sample_rate / lowest / 0.99) as usize + 2;

        let mut bow_table = BowTable::new();
        bow_table.set_slope(3.0);

        let mut adsr = Adsr::new(sample_rate);
        adsr.set_all_times(0.02, 0.005, 0.9, 0.01);

        let mut bar = Self {
            sample_rate,
            preset: BarPreset::UniformBar,
            delays: (0..MAX_MODES).map(|_| DelayN::new(capacity)).collect(),
            bandpass: (0..MAX_MODES).map(|_| BiQuad::new()).collect(),
            ratios: Vec::new(),
            base_gains: Vec::new(),
            gains: vec![0.0; MAX_MODES],
            excitation: Vec::new(),
            preset_modes: 0,
            n_modes: 0,
            bow_table,
            adsr,
            frequency: 220.0,
            base_gain: 0.999,
            integration_constant: 0.0,
            velocity_input: 0.0,
            bow_velocity: 0.0,
            bow_target: 0.0,
            bow_position: 0.0,
            max_velocity: 0.0,
            strike_position: 0.0,
            do_pluck: true,
            track_velocity: false,
            last_out: 0.0,
        };
        bar.set_preset(BarPreset::UniformBar);
        bar
    }

    pub fn preset(&self) -> BarPreset {
        self.preset
    }

    /// Active bands at the current frequency (modes above Nyquist drop out).
    pub fn mode_count(&self) -> usize {
        self.n_modes
    }

    pub fn is_plucked(&self) -> bool {
        self.do_pluck
    }

    pub fn set_preset(&mut self, preset: BarPreset) {
        let (ratios, base_gains, excitation) = preset.modes();
        log::debug!("BowedBar: preset {preset:?} with {} modes", ratios.len());
        self.preset = preset;
        self.preset_modes = ratios.len();
        self.ratios = ratios;
        self.base_gains = base_gains;
        self.excitation = excitation;
        self.set_frequency(self.frequency);
    }

    /// Strike point as a fraction of the bar; weights the pluck per mode.
    pub fn set_strike_position(&mut self, position: f32) {
        if !(0.0..=1.0).contains(&position) {
            log::warn!("BowedBar: strike position {position} outside [0, 1]; clamping");
        }
        self.strike_position = position.clamp(0.0, 1.0);
    }

    /// Scale applied to every mode's loop gain.
    pub fn set_base_gain(&mut self, gain: f32) {
        self.base_gain = gain;
        self.update_gains();
    }

    fn update_gains(&mut self) {
        for (gain, base) in self.gains.iter_mut().zip(&self.base_gains) {
            *gain = (base * self.base_gain).min(MAX_GAIN);
        }
    }

    pub fn start_bowing(&mut self, amplitude: f32, rate: f32) {
        self.adsr.set_attack_rate(rate);
        self.adsr.key_on();
        self.max_velocity = 0.03 + 0.1 * amplitude;
    }

    pub fn stop_bowing(&mut self, rate: f32) {
        self.adsr.set_release_rate(rate);
        self.adsr.key_off();
    }

    /// Load every band with an impulse train sized to its period.
    pub fn pluck(&mut self, amplitude: f32) {
        if self.n_modes == 0 {
            return;
        }
        let amplitude = clamp_amplitude("BowedBar", amplitude);
        let shortest = self.delays[self.n_modes - 1].delay().max(1);
        for i in 0..self.n_modes {
            let weight = if self.strike_position > 0.0 {
                (PI * (i + 1) as f32 * self.strike_position).sin().abs()
            } else {
                1.0
            };
            let level = weight * self.excitation[i] * amplitude / self.n_modes as f32;
            for _ in 0..self.delays[i].delay() / shortest {
                self.delays[i].tick(level);
            }
        }
    }

    pub fn clear(&mut self) {
        for (delay, filter) in self.delays.iter_mut().zip(self.bandpass.iter_mut()) {
            delay.clear();
            filter.clear();
        }
        self.velocity_input = 0.0;
        self.last_out = 0.0;
    }

    fn bow_input(&mut self) -> f32 {
        self.velocity_input *= self.integration_constant;
        for delay in &self.delays[..self.n_modes] {
            self.velocity_input += self.base_gain * delay.last_out();
        }

        if self.track_velocity {
            self.bow_velocity = self.bow_velocity * 0.9995 + self.bow_target;
            self.bow_target *= 0.995;
        } else {
            self.bow_velocity = self.adsr.tick() * self.max_velocity;
        }

        let relative = self.bow_velocity - self.velocity_input;
        relative * self.bow_table.lookup(relative) / self.n_modes as f32
    }
}

impl Instrument for BowedBar {
    fn set_frequency(&mut self, frequency: f32) {
        let mut frequency = checked_frequency("BowedBar", frequency);
        if frequency > MAX_FREQUENCY {
            log::warn!("BowedBar: frequency {frequency} above {MAX_FREQUENCY}; clamping");
            frequency = MAX_FREQUENCY;
        }
        self.frequency = frequency;

        let base = self.sample_rate / frequency;
        let radius = 1.0 - PI * 32.0 / self.sample_rate;
        self.n_modes = self.preset_modes;
        for i in 0..self.preset_modes {
            let length = (base / self.ratios[i]) as usize;
            if length <= 2 {
                self.n_modes = i;
                break;
            }
            self.delays[i].set_delay(length);
            self.bandpass[i].set_resonance(frequency * self.ratios[i], radius, true, self.sample_rate);
            self.delays[i].clear();
            self.bandpass[i].clear();
        }
        self.update_gains();
    }

    fn note_on(&mut self, frequency: f32, amplitude: f32) {
        self.set_frequency(frequency);
        if self.do_pluck {
            self.pluck(amplitude);
        } else {
            let amplitude = clamp_amplitude("BowedBar", amplitude);
            let rate = (amplitude * 0.001).max(MIN_BOW_RATE);
            self.start_bowing(amplitude, rate_at(rate, self.sample_rate));
        }
    }

    fn note_off(&mut self, amplitude: f32) {
        if !self.do_pluck {
            let amplitude = clamp_amplitude("BowedBar", amplitude);
            let rate = ((1.0 - amplitude) * 0.005).max(MIN_BOW_RATE);
            self.stop_bowing(rate_at(rate, self.sample_rate));
        }
    }

    fn control_change(&mut self, number: u16, value: f32) {
        let norm = normalize_control("BowedBar", value);
        match number {
            control::BOW_PRESSURE => {
                if norm == 0.0 {
                    self.do_pluck = true;
                } else {
                    self.do_pluck = false;
                    self.bow_table.set_slope(10.0 - 9.0 * norm);
                }
            }
            control::BOW_MOTION => {
                self.track_velocity = true;
                self.bow_target += 0.005 * (norm - self.bow_position);
                self.bow_position = norm;
            }
            control::STRIKE_POSITION => self.set_strike_position(norm),
            control::BOW_VELOCITY => {
                self.track_velocity = false;
                self.max_velocity = 0.13 * norm;
                self.adsr.set_target(norm);
            }
            control::MODE_GAIN => self.set_base_gain(0.9 + 0.1 * norm),
            control::INTEGRATION => self.integration_constant = norm,
            control::SUSTAIN => self.do_pluck = value < 65.0,
            control::PORTAMENTO => self.track_velocity = value >= 65.0,
            control::BAR_PRESET => self.set_preset(BarPreset::from_index(value.max(0.0) as usize)),
            _ => log::warn!("BowedBar: undefined control number {number}"),
        }
    }

    #[inline]
    fn tick(&mut self) -> f32 {
        if self.n_modes == 0 {
            self.last_out = 0.0;
            return 0.0;
        }
        let input = if self.do_pluck { 0.0 } else { self.bow_input() };

        let mut sum = 0.0;
        for k in 0..self.n_modes {
            let band = self.bandpass[k].tick(input + self.gains[k] * self.delays[k].last_out());
            self.delays[k].tick(band);
            sum += band;
        }
        self.last_out = 4.0 * sum;
        self.last_out
    }

    fn last_out(&self) -> f32 {
        self.last_out
    }
}
