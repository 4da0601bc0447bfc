//! Karplus-Strong plucked strings.
//!
//! ```text
//!            ┌────────────── loop gain ←──────────────┐
//!            ↓                                        │
//! pluck ──→ (+) ──→ [DelayA: N - ½] ──→ [OneZero] ────┴──→ out
//! ```
//!
//! The one-zero loop filter averages adjacent samples, which both damps high
//! harmonics faster than low ones and adds half a sample of delay. The
//! allpass delay supplies the rest of the period with sub-sample accuracy.

use crate::dsp::delay::{DelayA, DelayL};
use crate::dsp::filter::{OnePole, OneZero};
use crate::dsp::noise::Noise;
use crate::instrument::{checked_frequency, clamp_amplitude, control, normalize_control, Instrument};

const MAX_LOOP_GAIN: f32 = 0.99999;
const DEFAULT_FREQUENCY: f32 = 220.0;

/// Loop gain that keeps decay times roughly even across the keyboard.
pub fn loop_gain_for(frequency: f32) -> f32 {
    let gain = 0.995 + frequency * 0.000005;
    if gain >= 1.0 {
        MAX_LOOP_GAIN
    } else {
        gain
    }
}

fn string_capacity(sample_rate: f32, lowest_frequency: f32) -> usize {
    let lowest = checked_frequency("Plucked", lowest_frequency);
    (sample_rate / lowest) as usize + 1
}

/// Single-string Karplus-Strong model.
#[derive(Debug, Clone)]
pub struct Plucked {
    sample_rate: f32,
    delay: DelayA,
    loop_filter: OneZero,
    pick_filter: OnePole,
    noise: Noise,
    loop_gain: f32,
    frequency: f32,
    last_out: f32,
}

impl Plucked {
    /// `lowest_frequency` fixes the delay-line capacity.
    pub fn new(sample_rate: f32, lowest_frequency: f32) -> Self {
        let mut plucked = Self {
            sample_rate,
            delay: DelayA::new(string_capacity(sample_rate, lowest_frequency)),
            loop_filter: OneZero::new(),
            pick_filter: OnePole::new(),
            noise: Noise::new(),
            loop_gain: 0.0,
            frequency: DEFAULT_FREQUENCY,
            last_out: 0.0,
        };
        plucked.set_frequency(DEFAULT_FREQUENCY);
        plucked
    }

    /// Reseed the pluck noise for reproducible output.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.noise.reseed(seed);
        self
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn loop_gain(&self) -> f32 {
        self.loop_gain
    }

    /// Excite the string with a burst of filtered noise.
    ///
    /// Fills one period of the delay line, so the pluck is audible on the
    /// very next tick.
    pub fn pluck(&mut self, amplitude: f32) {
        let amplitude = clamp_amplitude("Plucked", amplitude);
        self.pick_filter.set_pole(0.999 - amplitude * 0.15);
        self.pick_filter.set_gain(amplitude * 0.5);
        let length = self.delay.delay() as usize;
        for _ in 0..length {
            let excitation = self.pick_filter.tick(self.noise.tick());
            self.delay.tick(0.6 * self.delay.last_out() + excitation);
        }
    }

    pub fn clear(&mut self) {
        self.delay.clear();
        self.loop_filter.clear();
        self.pick_filter.clear();
        self.last_out = 0.0;
    }
}

impl Instrument for Plucked {
    fn set_frequency(&mut self, frequency: f32) {
        let frequency = checked_frequency("Plucked", frequency);
        self.frequency = frequency;
        // The loop filter contributes half a sample.
        self.delay.set_delay(self.sample_rate / frequency - 0.5);
        self.loop_gain = loop_gain_for(frequency);
    }

    fn note_on(&mut self, frequency: f32, amplitude: f32) {
        self.set_frequency(frequency);
        self.pluck(amplitude);
    }

    fn note_off(&mut self, amplitude: f32) {
        let amplitude = clamp_amplitude("Plucked", amplitude);
        self.loop_gain = (1.0 - amplitude).clamp(0.0, MAX_LOOP_GAIN);
    }

    fn control_change(&mut self, number: u16, _value: f32) {
        log::warn!("Plucked: undefined control number {number}");
    }

    #[inline]
    fn tick(&mut self) -> f32 {
        let feedback = self.loop_filter.tick(self.delay.last_out() * self.loop_gain);
        self.last_out = 3.0 * self.delay.tick(feedback);
        self.last_out
    }

    fn last_out(&self) -> f32 {
        self.last_out
    }
}

/// Two detuned strings sharing one excitation.
///
/// The excitation passes through a comb filter whose delay is set by the
/// pluck position, notching out the harmonics that have a node there. On its
/// own the model plucks with filtered noise; [`crate::instrument::Mandolin`]
/// drives it with a body response instead.
#[derive(Debug, Clone)]
pub struct Plucked2 {
    sample_rate: f32,
    strings: [DelayA; 2],
    filters: [OneZero; 2],
    comb: DelayL,
    pick_filter: OnePole,
    noise: Noise,
    base_loop_gain: f32,
    loop_gain: f32,
    detuning: f32,
    pluck_position: f32,
    pluck_amplitude: f32,
    frequency: f32,
    length: f32,
    damp_time: i64,
    excite_remaining: usize,
    last_out: f32,
}

impl Plucked2 {
    pub fn new(sample_rate: f32, lowest_frequency: f32) -> Self {
        // Detuning can stretch one string past a full period.
        let capacity = 2 * string_capacity(sample_rate, lowest_frequency);
        let mut plucked = Self {
            sample_rate,
            strings: [DelayA::new(capacity), DelayA::new(capacity)],
            filters: [OneZero::new(), OneZero::new()],
            comb: DelayL::new(capacity),
            pick_filter: OnePole::new(),
            noise: Noise::new(),
            base_loop_gain: 0.995,
            loop_gain: 0.999,
            detuning: 0.995,
            pluck_position: 0.4,
            pluck_amplitude: 0.3,
            frequency: DEFAULT_FREQUENCY,
            length: 0.0,
            damp_time: 0,
            excite_remaining: 0,
            last_out: 0.0,
        };
        plucked.set_frequency(DEFAULT_FREQUENCY);
        plucked
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.noise.reseed(seed);
        self
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn loop_gain(&self) -> f32 {
        self.loop_gain
    }

    /// Samples per period at the current frequency.
    pub fn period(&self) -> f32 {
        self.length
    }

    /// Ratio between the two string lengths; 1 is unison.
    pub fn set_detune(&mut self, detune: f32) {
        if detune <= 0.0 || !detune.is_finite() {
            log::warn!("Plucked2: detune {detune} must be positive; using 0.1");
            self.detuning = 0.1;
        } else {
            self.detuning = detune;
        }
        self.retune();
    }

    pub fn set_base_loop_gain(&mut self, gain: f32) {
        self.base_loop_gain = gain;
        self.loop_gain = (self.base_loop_gain + self.frequency * 0.000005).min(MAX_LOOP_GAIN);
    }

    /// Pluck point as a fraction of the string length.
    pub fn set_pluck_position(&mut self, position: f32) {
        if !(0.0..=1.0).contains(&position) {
            log::warn!("Plucked2: pluck position {position} outside [0, 1]; clamping");
        }
        self.pluck_position = position.clamp(0.0, 1.0);
    }

    pub fn pluck_amplitude(&self) -> f32 {
        self.pluck_amplitude
    }

    /// Arm a pluck: set its amplitude, place the comb zeros and damp the loop
    /// for one period so re-plucks do not pile up on the ringing string.
    pub(crate) fn prepare_pluck(&mut self, amplitude: f32) {
        self.pluck_amplitude = clamp_amplitude("Plucked2", amplitude);
        self.comb.set_delay(0.5 * self.pluck_position * self.length);
        self.damp_time = self.length as i64;
    }

    /// Start a noise-excited pluck lasting one period.
    pub fn pluck(&mut self, amplitude: f32) {
        self.prepare_pluck(amplitude);
        self.pick_filter.set_pole(0.999 - self.pluck_amplitude * 0.15);
        self.pick_filter.set_gain(0.5);
        self.excite_remaining = self.length as usize;
    }

    /// Advance both strings with `excitation` added at the pluck point.
    #[inline]
    pub(crate) fn tick_strings(&mut self, excitation: f32) -> f32 {
        let excitation = excitation - self.comb.tick(excitation);
        let gain = if self.damp_time >= 0 {
            self.damp_time -= 1;
            0.7
        } else {
            self.loop_gain
        };

        let mut out = 0.0;
        for (string, filter) in self.strings.iter_mut().zip(self.filters.iter_mut()) {
            let feedback = filter.tick(excitation + string.last_out() * gain);
            out += string.tick(feedback);
        }
        self.last_out = 0.3 * out;
        self.last_out
    }

    pub(crate) fn set_loop_gain(&mut self, gain: f32) {
        self.loop_gain = gain;
    }

    pub(crate) fn handle_string_control(&mut self, name: &str, number: u16, value: f32) -> bool {
        let norm = normalize_control(name, value);
        match number {
            control::DETUNE => self.set_detune(1.0 - norm * 0.1),
            control::PLUCK_POSITION => self.set_pluck_position(norm),
            control::STRING_DAMPING => self.set_base_loop_gain(0.97 + norm * 0.03),
            _ => return false,
        }
        true
    }

    fn retune(&mut self) {
        self.length = self.sample_rate / self.frequency;
        self.strings[0].set_delay(self.length / self.detuning - 0.5);
        self.strings[1].set_delay(self.length * self.detuning - 0.5);
        self.loop_gain = (self.base_loop_gain + self.frequency * 0.000005).min(MAX_LOOP_GAIN);
    }

    pub fn clear(&mut self) {
        for string in &mut self.strings {
            string.clear();
        }
        for filter in &mut self.filters {
            filter.clear();
        }
        self.comb.clear();
        self.pick_filter.clear();
        self.excite_remaining = 0;
        self.last_out = 0.0;
    }
}

impl Instrument for Plucked2 {
    fn set_frequency(&mut self, frequency: f32) {
        self.frequency = checked_frequency("Plucked2", frequency);
        self.retune();
    }

    fn note_on(&mut self, frequency: f32, amplitude: f32) {
        self.set_frequency(frequency);
        self.pluck(amplitude);
    }

    fn note_off(&mut self, amplitude: f32) {
        let amplitude = clamp_amplitude("Plucked2", amplitude);
        self.loop_gain = (1.0 - amplitude) * 0.5;
    }

    fn control_change(&mut self, number: u16, value: f32) {
        if !self.handle_string_control("Plucked2", number, value) {
            log::warn!("Plucked2: undefined control number {number}");
        }
    }

    #[inline]
    fn tick(&mut self) -> f32 {
        let excitation = if self.excite_remaining > 0 {
            self.excite_remaining -= 1;
            self.pluck_amplitude * self.pick_filter.tick(self.noise.tick())
        } else {
            0.0
        };
        self.tick_strings(excitation)
    }

    fn last_out(&self) -> f32 {
        self.last_out
    }
}
