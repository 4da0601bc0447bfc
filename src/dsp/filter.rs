use std::f32::consts::TAU;

use crate::dsp::delay::RingBuffer;

/*
Single-Sample Filters
=====================

The loop filters inside the physical models are tiny: one or two coefficients
and one or two memory registers. They are kept as separate types instead of
one general biquad so that each model reads like its block diagram.

| type      | difference equation                                      |
| --------- | -------------------------------------------------------- |
| OneZero   | y[t] = b0 x[t] + b1 x[t-1]                               |
| OnePole   | y[t] = b0 x[t] - a1 y[t-1]                               |
| DcBlock   | y[t] = x[t] - x[t-1] + p y[t-1]                          |
| BiQuad    | y[t] = b0 x[t] + b1 x[t-1] + b2 x[t-2] - a1 y[t-1] - a2 y[t-2] |
| Fir       | y[t] = sum(c[k] x[t-k])                                  |

Gain normalisation
------------------

OneZero and OnePole keep a `gain`: the peak magnitude of the response. Moving
the zero or the pole rescales b0 (and b1) so the peak stays at `gain`, which
is what keeps a Karplus-Strong loop from changing loudness (or stability) when
its brightness is adjusted.

    one-zero peak = |b0| + |b1|
    one-pole peak = |b0| / (1 - |pole|)

Coefficients only change through explicit setters.
*/

/// Largest pole radius accepted by the recursive filters.
const MAX_RADIUS: f32 = 0.99999;

fn clamp_radius(radius: f32, who: &str) -> f32 {
    if !(0.0..=MAX_RADIUS).contains(&radius) {
        let clamped = radius.clamp(0.0, MAX_RADIUS);
        log::warn!("{who}: pole radius {radius} is unstable; clamping to {clamped}");
        clamped
    } else {
        radius
    }
}

/// One-zero filter.
#[derive(Debug, Clone)]
pub struct OneZero {
    b0: f32,
    b1: f32,
    gain: f32,
    last_in: f32,
    last_out: f32,
}

impl OneZero {
    /// Two-point average: zero at Nyquist, unity gain at DC.
    pub fn new() -> Self {
        let mut filter = Self {
            b0: 0.0,
            b1: 0.0,
            gain: 1.0,
            last_in: 0.0,
            last_out: 0.0,
        };
        filter.set_zero(-1.0);
        filter
    }

    /// Place the zero at `zero` on the real axis, keeping the peak gain.
    pub fn set_zero(&mut self, zero: f32) {
        self.b0 = self.gain / (1.0 + zero.abs());
        self.b1 = -zero * self.b0;
    }

    pub fn set_coefficients(&mut self, b0: f32, b1: f32) {
        self.b0 = b0;
        self.b1 = b1;
        self.gain = b0.abs() + b1.abs();
    }

    /// Rescale the coefficients so the peak gain equals `gain`.
    pub fn set_gain(&mut self, gain: f32) {
        let peak = self.b0.abs() + self.b1.abs();
        if peak > 0.0 {
            let scale = gain.abs() / peak;
            self.b0 *= scale.copysign(gain);
            self.b1 *= scale.copysign(gain);
        }
        self.gain = gain;
    }

    pub fn coefficients(&self) -> (f32, f32) {
        (self.b0, self.b1)
    }

    #[inline]
    pub fn tick(&mut self, sample: f32) -> f32 {
        self.last_out = self.b0 * sample + self.b1 * self.last_in;
        self.last_in = sample;
        self.last_out
    }

    #[inline]
    pub fn last_out(&self) -> f32 {
        self.last_out
    }

    pub fn clear(&mut self) {
        self.last_in = 0.0;
        self.last_out = 0.0;
    }
}

impl Default for OneZero {
    fn default() -> Self {
        Self::new()
    }
}

/// One-pole filter.
#[derive(Debug, Clone)]
pub struct OnePole {
    b0: f32,
    a1: f32,
    gain: f32,
    last_out: f32,
}

impl OnePole {
    /// Gentle low-pass with the pole at 0.9.
    pub fn new() -> Self {
        Self::with_pole(0.9)
    }

    pub fn with_pole(pole: f32) -> Self {
        let mut filter = Self {
            b0: 0.0,
            a1: 0.0,
            gain: 1.0,
            last_out: 0.0,
        };
        filter.set_pole(pole);
        filter
    }

    /// Place the pole at `pole`, keeping the peak gain.
    pub fn set_pole(&mut self, pole: f32) {
        let radius = clamp_radius(pole.abs(), "OnePole");
        let pole = radius.copysign(pole);
        self.a1 = -pole;
        self.b0 = self.gain * (1.0 - radius);
    }

    pub fn set_coefficients(&mut self, b0: f32, a1: f32) {
        let radius = clamp_radius(a1.abs(), "OnePole");
        self.b0 = b0;
        self.a1 = radius.copysign(a1);
        self.gain = b0 / (1.0 - radius);
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
        self.b0 = gain * (1.0 - self.a1.abs());
    }

    pub fn coefficients(&self) -> (f32, f32) {
        (self.b0, self.a1)
    }

    #[inline]
    pub fn tick(&mut self, sample: f32) -> f32 {
        self.last_out = self.b0 * sample - self.a1 * self.last_out;
        self.last_out
    }

    #[inline]
    pub fn last_out(&self) -> f32 {
        self.last_out
    }

    pub fn clear(&mut self) {
        self.last_out = 0.0;
    }
}

impl Default for OnePole {
    fn default() -> Self {
        Self::new()
    }
}

/// Pole-zero DC blocker: a zero at DC and a pole just inside it.
#[derive(Debug, Clone)]
pub struct DcBlock {
    pole: f32,
    last_in: f32,
    last_out: f32,
}

impl DcBlock {
    pub fn new(pole: f32) -> Self {
        Self {
            pole: clamp_radius(pole, "DcBlock"),
            last_in: 0.0,
            last_out: 0.0,
        }
    }

    #[inline]
    pub fn tick(&mut self, sample: f32) -> f32 {
        self.last_out = sample - self.last_in + self.pole * self.last_out;
        self.last_in = sample;
        self.last_out
    }

    #[inline]
    pub fn last_out(&self) -> f32 {
        self.last_out
    }

    pub fn clear(&mut self) {
        self.last_in = 0.0;
        self.last_out = 0.0;
    }
}

impl Default for DcBlock {
    fn default() -> Self {
        Self::new(0.99)
    }
}

/// Two-pole, two-zero filter section.
#[derive(Debug, Clone)]
pub struct BiQuad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    gain: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl BiQuad {
    /// Identity filter.
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            gain: 1.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    pub fn set_coefficients(&mut self, b0: f32, b1: f32, b2: f32, a1: f32, a2: f32) {
        self.b0 = b0;
        self.b1 = b1;
        self.b2 = b2;
        self.a1 = a1;
        self.a2 = a2;
    }

    /// Place a complex-conjugate pole pair at `frequency` with pole `radius`.
    ///
    /// With `normalize`, zeros go to DC and Nyquist and b0 is scaled so the
    /// peak gain sits near 1 regardless of the radius.
    pub fn set_resonance(&mut self, frequency: f32, radius: f32, normalize: bool, sample_rate: f32) {
        let radius = clamp_radius(radius, "BiQuad");
        self.a2 = radius * radius;
        self.a1 = -2.0 * radius * (TAU * frequency / sample_rate).cos();
        if normalize {
            self.b0 = 0.5 - 0.5 * self.a2;
            self.b1 = 0.0;
            self.b2 = -self.b0;
        }
    }

    /// Place a complex-conjugate zero pair at `frequency` with `radius`.
    pub fn set_notch(&mut self, frequency: f32, radius: f32, sample_rate: f32) {
        self.b0 = 1.0;
        self.b2 = radius * radius;
        self.b1 = -2.0 * radius * (TAU * frequency / sample_rate).cos();
    }

    /// Zeros at DC and Nyquist with equal gain at both band edges.
    pub fn set_equal_gain_zeros(&mut self) {
        self.b0 = 1.0;
        self.b1 = 0.0;
        self.b2 = -1.0;
    }

    /// Input gain applied before the section.
    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    #[inline]
    pub fn tick(&mut self, sample: f32) -> f32 {
        let x0 = self.gain * sample;
        let y0 = self.b0 * x0 + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x0;
        self.y2 = self.y1;
        self.y1 = y0;
        y0
    }

    #[inline]
    pub fn last_out(&self) -> f32 {
        self.y1
    }

    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for BiQuad {
    fn default() -> Self {
        Self::new()
    }
}

/// Direct-form FIR filter over a caller-supplied coefficient vector.
#[derive(Debug, Clone)]
pub struct Fir {
    coefficients: Vec<f32>,
    history: RingBuffer,
    gain: f32,
    last_out: f32,
}

impl Fir {
    pub fn new(coefficients: Vec<f32>) -> Self {
        let coefficients = if coefficients.is_empty() {
            log::warn!("Fir: empty coefficient vector; using identity");
            vec![1.0]
        } else {
            coefficients
        };
        let history = RingBuffer::new(coefficients.len());
        Self {
            coefficients,
            history,
            gain: 1.0,
            last_out: 0.0,
        }
    }

    pub fn order(&self) -> usize {
        self.coefficients.len() - 1
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    #[inline]
    pub fn tick(&mut self, sample: f32) -> f32 {
        self.history.push(self.gain * sample);
        self.last_out = self
            .coefficients
            .iter()
            .enumerate()
            .map(|(k, c)| c * self.history.read(k))
            .sum();
        self.last_out
    }

    #[inline]
    pub fn last_out(&self) -> f32 {
        self.last_out
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.last_out = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn sine(frequency: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| (TAU * frequency * n as f32 / SAMPLE_RATE).sin())
            .collect()
    }

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len() / 2;
        buffer[skip..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn one_zero_default_is_unity_at_dc() {
        let mut filter = OneZero::new();
        filter.tick(1.0);
        assert!((filter.tick(1.0) - 1.0).abs() < 1e-6);
        // Nyquist is cancelled
        filter.clear();
        filter.tick(1.0);
        assert!(filter.tick(-1.0).abs() < 1e-6);
    }

    #[test]
    fn one_zero_gain_independent_of_zero() {
        let mut filter = OneZero::new();
        filter.set_gain(0.5);
        for zero in [-1.0, -0.3, 0.2, 0.9] {
            filter.set_zero(zero);
            let (b0, b1) = filter.coefficients();
            assert!((b0.abs() + b1.abs() - 0.5).abs() < 1e-6, "zero {zero}");
        }
    }

    #[test]
    fn one_pole_settles_to_gain() {
        let mut filter = OnePole::with_pole(0.9);
        filter.set_gain(2.0);
        let mut out = 0.0;
        for _ in 0..500 {
            out = filter.tick(1.0);
        }
        assert!((out - 2.0).abs() < 1e-3, "got {out}");
    }

    #[test]
    fn one_pole_rejects_unstable_pole() {
        let mut filter = OnePole::new();
        filter.set_pole(1.5);
        let (_, a1) = filter.coefficients();
        assert!(a1.abs() < 1.0);
    }

    #[test]
    fn dc_block_removes_offset() {
        let mut filter = DcBlock::default();
        let mut out = 1.0;
        for _ in 0..2000 {
            out = filter.tick(1.0);
        }
        assert!(out.abs() < 1e-3, "got {out}");
    }

    #[test]
    fn biquad_resonance_emphasizes_center() {
        let mut filter = BiQuad::new();
        filter.set_resonance(1_000.0, 0.99, true, SAMPLE_RATE);

        let mut center = sine(1_000.0, 4096);
        for s in center.iter_mut() {
            *s = filter.tick(*s);
        }
        filter.clear();
        let mut off = sine(200.0, 4096);
        for s in off.iter_mut() {
            *s = filter.tick(*s);
        }

        let center_peak = peak_after_transient(&center);
        let off_peak = peak_after_transient(&off);
        assert!(
            center_peak > off_peak * 4.0,
            "center_peak={center_peak}, off_peak={off_peak}"
        );
        assert!(center_peak < 1.2, "normalized peak gain should be near 1");
    }

    #[test]
    fn biquad_notch_rejects_center() {
        let mut filter = BiQuad::new();
        filter.set_notch(1_000.0, 1.0, SAMPLE_RATE);
        let mut center = sine(1_000.0, 1024);
        for s in center.iter_mut() {
            *s = filter.tick(*s);
        }
        assert!(peak_after_transient(&center) < 1e-3);
    }

    #[test]
    fn equal_gain_zeros_block_dc() {
        let mut filter = BiQuad::new();
        filter.set_resonance(500.0, 0.9, false, SAMPLE_RATE);
        filter.set_equal_gain_zeros();
        let out: Vec<f32> = (0..2048).map(|_| filter.tick(1.0)).collect();
        assert!(out[2047].abs() < 1e-4);
    }

    #[test]
    fn fir_impulse_response_is_coefficients() {
        let taps = vec![0.5, 0.25, -0.125];
        let mut filter = Fir::new(taps.clone());
        let response: Vec<f32> = (0..5)
            .map(|i| filter.tick(if i == 0 { 1.0 } else { 0.0 }))
            .collect();
        assert_eq!(&response[..3], &taps[..]);
        assert_eq!(response[3], 0.0);
        assert_eq!(filter.order(), 2);
    }
}
