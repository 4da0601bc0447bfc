//! JCRev - Chowning's Reverberator
//!
//! Three series allpass sections diffuse the input, four parallel feedback
//! combs build the tail, and two output delays decorrelate the left and right
//! channels.
//!
//! ```text
//!                       ┌──→ [Comb 1] ──┐
//!                       ├──→ [Comb 2] ──┤        ┌──→ [Out L] ──→ left
//! Input ──→ [AP 1..3] ──┼──→ [Comb 3] ──┼──→ Σ ──┤
//!                       └──→ [Comb 4] ──┘        └──→ [Out R] ──→ right
//! ```
//!
//! ## Allpass sections
//!
//! ```text
//! v[n] = x[n] + g * v[n - D]
//! y[n] = v[n - D] - g * v[n]          g = 0.7
//! ```
//!
//! ## Comb sections
//!
//! Each comb's feedback coefficient is chosen so its loop loses 60 dB in
//! `T60` seconds:
//!
//! ```text
//! g_i = 10^(-3 * D_i / (T60 * fs))
//! ```
//!
//! Delay lengths are given at 44.1 kHz. At any other rate they are scaled and
//! bumped up to the next odd prime so the sections stay mutually prime.

use crate::dsp::delay::DelayN;

/// Allpass (3), comb (4) and output (2) delay lengths at 44.1 kHz.
const LENGTHS: [usize; 9] = [389, 127, 43, 1777, 1847, 1993, 2137, 211, 179];
const LENGTH_RATE: f32 = 44_100.0;

const ALLPASS_COEFFICIENT: f32 = 0.7;
const DEFAULT_EFFECT_MIX: f32 = 0.3;

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut i = 3;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}

/// Scale a 44.1 kHz length to `sample_rate`, moving to the next odd prime.
fn scaled_length(length: usize, sample_rate: f32) -> usize {
    if sample_rate == LENGTH_RATE {
        return length;
    }
    let mut delay = ((sample_rate / LENGTH_RATE) * length as f32).floor() as usize;
    if delay % 2 == 0 {
        delay += 1;
    }
    while !is_prime(delay) {
        delay += 2;
    }
    delay
}

/// Chowning-style reverberator with stereo output.
#[derive(Debug, Clone)]
pub struct JcRev {
    sample_rate: f32,
    allpasses: [DelayN; 3],
    combs: [DelayN; 4],
    comb_coefficients: [f32; 4],
    out_left: DelayN,
    out_right: DelayN,
    effect_mix: f32,
    t60: f32,
    last_left: f32,
    last_right: f32,
}

impl JcRev {
    /// Create a reverberator with the given decay time in seconds.
    pub fn new(t60: f32, sample_rate: f32) -> Self {
        let lengths = LENGTHS.map(|length| scaled_length(length, sample_rate));

        let mut reverb = Self {
            sample_rate,
            allpasses: [
                DelayN::with_delay(lengths[0]),
                DelayN::with_delay(lengths[1]),
                DelayN::with_delay(lengths[2]),
            ],
            combs: [
                DelayN::with_delay(lengths[3]),
                DelayN::with_delay(lengths[4]),
                DelayN::with_delay(lengths[5]),
                DelayN::with_delay(lengths[6]),
            ],
            comb_coefficients: [0.0; 4],
            out_left: DelayN::with_delay(lengths[7]),
            out_right: DelayN::with_delay(lengths[8]),
            effect_mix: DEFAULT_EFFECT_MIX,
            t60: 1.0,
            last_left: 0.0,
            last_right: 0.0,
        };
        reverb.set_t60(t60);
        reverb
    }

    /// Set the time in seconds for the tail to decay by 60 dB.
    pub fn set_t60(&mut self, t60: f32) {
        if t60 <= 0.0 || !t60.is_finite() {
            log::warn!("JcRev: T60 must be positive, got {t60}; keeping {}", self.t60);
            return;
        }
        self.t60 = t60;
        for (coefficient, comb) in self.comb_coefficients.iter_mut().zip(&self.combs) {
            *coefficient = 10f32.powf(-3.0 * comb.delay() as f32 / (t60 * self.sample_rate));
        }
    }

    pub fn t60(&self) -> f32 {
        self.t60
    }

    /// Wet/dry balance; 0 is dry only, 1 is reverb only.
    pub fn set_effect_mix(&mut self, mix: f32) {
        if !(0.0..=1.0).contains(&mix) {
            log::warn!("JcRev: effect mix {mix} out of [0, 1]; clamping");
        }
        self.effect_mix = mix.clamp(0.0, 1.0);
    }

    pub fn effect_mix(&self) -> f32 {
        self.effect_mix
    }

    /// Process one sample, returning the average of both output channels.
    #[inline]
    pub fn tick(&mut self, input: f32) -> f32 {
        let mut diffused = input;
        for allpass in &mut self.allpasses {
            let delayed = allpass.last_out();
            let v = diffused + ALLPASS_COEFFICIENT * delayed;
            allpass.tick(v);
            diffused = delayed - ALLPASS_COEFFICIENT * v;
        }

        let mut sum = 0.0;
        for (comb, coefficient) in self.combs.iter_mut().zip(&self.comb_coefficients) {
            let value = diffused + coefficient * comb.last_out();
            comb.tick(value);
            sum += value;
        }

        let dry = (1.0 - self.effect_mix) * input;
        self.last_left = self.effect_mix * self.out_left.tick(sum) + dry;
        self.last_right = self.effect_mix * self.out_right.tick(sum) + dry;
        0.5 * (self.last_left + self.last_right)
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.tick(*sample);
        }
    }

    #[inline]
    pub fn last_out_left(&self) -> f32 {
        self.last_left
    }

    #[inline]
    pub fn last_out_right(&self) -> f32 {
        self.last_right
    }

    /// Silence the tail.
    pub fn clear(&mut self) {
        for line in self
            .allpasses
            .iter_mut()
            .chain(self.combs.iter_mut())
            .chain([&mut self.out_left, &mut self.out_right])
        {
            line.clear();
        }
        self.last_left = 0.0;
        self.last_right = 0.0;
    }
}
