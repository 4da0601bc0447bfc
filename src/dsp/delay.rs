//! Delay lines - circular buffers with a settable delay.
//!
//! Every variant writes the incoming sample first and then reads behind the
//! write head, so a delay of `d` returns the sample that was pushed `d` ticks
//! ago and a delay of 0 returns the input itself.
//!
//! ```text
//!            write head
//!                ↓
//! [ . . . . . . x . . . . ]   capacity = N, max delay = N - 1
//!          ↑
//!     read = write - d (mod N)
//! ```
//!
//! # Variants
//!
//! - [`DelayN`]: integer delay, no interpolation. Exact and cheap.
//! - [`DelayL`]: linear interpolation between two neighbouring taps. Cheap,
//!   but the interpolation is a gentle low-pass that damps high partials.
//! - [`DelayA`]: first-order allpass interpolation. Flat magnitude response,
//!   which is what a tuned feedback loop wants.
//!
//! Buffers are allocated once at construction. Size them for the longest
//! delay the caller will ever ask for (usually one period of the lowest
//! note): asking for more afterwards is a configuration error.

use crate::error::DelayError;

/// Smallest delay the allpass line accepts.
pub const ALLPASS_MIN_DELAY: f32 = 0.1;

/// Fixed-capacity circular sample buffer shared by the delay-line variants.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            write_pos: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn push(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = wrap(self.write_pos + 1, self.buffer.len());
    }

    /// Sample pushed `age` ticks ago; `age == 0` is the most recent push.
    ///
    /// Ages at or beyond the capacity wrap around.
    #[inline]
    pub fn read(&self, age: usize) -> f32 {
        let len = self.buffer.len();
        let newest = self.write_pos + len - 1;
        self.buffer[wrap(newest - age % len, len)]
    }

    /// Sum of squares of every stored sample.
    pub fn energy(&self) -> f32 {
        self.buffer.iter().map(|s| s * s).sum()
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

#[inline]
fn wrap(index: usize, len: usize) -> usize {
    if index >= len {
        index % len
    } else {
        index
    }
}

fn check_fractional(delay: f32, min: f32, max: f32) -> Result<(), DelayError> {
    if !delay.is_finite() {
        return Err(DelayError::NotFinite);
    }
    if delay < min {
        return Err(DelayError::TooShort {
            requested: delay,
            min,
        });
    }
    if delay > max {
        return Err(DelayError::ExceedsCapacity {
            requested: delay,
            max,
        });
    }
    Ok(())
}

fn clamp_fractional(delay: f32, min: f32, max: f32) -> f32 {
    if delay.is_finite() {
        delay.clamp(min, max)
    } else {
        min
    }
}

/// Non-interpolating delay line.
#[derive(Debug, Clone)]
pub struct DelayN {
    ring: RingBuffer,
    delay: usize,
    last_out: f32,
}

impl DelayN {
    /// Create a line holding `capacity` samples (maximum delay `capacity - 1`).
    pub fn new(capacity: usize) -> Self {
        let ring = RingBuffer::new(capacity);
        let delay = ring.capacity() / 2;
        Self {
            ring,
            delay,
            last_out: 0.0,
        }
    }

    /// Create a line already set to `delay` samples, sized to fit it.
    pub fn with_delay(delay: usize) -> Self {
        let mut line = Self::new(delay + 1);
        line.delay = delay;
        line
    }

    pub fn max_delay(&self) -> usize {
        self.ring.capacity() - 1
    }

    pub fn delay(&self) -> usize {
        self.delay
    }

    /// Set the delay, reporting requests that do not fit the buffer.
    ///
    /// On error the previous delay is kept.
    pub fn try_set_delay(&mut self, delay: usize) -> Result<(), DelayError> {
        if delay > self.max_delay() {
            return Err(DelayError::ExceedsCapacity {
                requested: delay as f32,
                max: self.max_delay() as f32,
            });
        }
        self.delay = delay;
        Ok(())
    }

    /// Set the delay, clamping to the buffer capacity with a warning.
    pub fn set_delay(&mut self, delay: usize) {
        if let Err(err) = self.try_set_delay(delay) {
            log::warn!("DelayN: {err}; clamping to {}", self.max_delay());
            self.delay = self.max_delay();
        }
    }

    #[inline]
    pub fn tick(&mut self, sample: f32) -> f32 {
        self.ring.push(sample);
        self.last_out = self.ring.read(self.delay);
        self.last_out
    }

    /// Read the sample written `age` ticks ago without advancing.
    #[inline]
    pub fn tap_out(&self, age: usize) -> f32 {
        self.ring.read(age)
    }

    #[inline]
    pub fn last_out(&self) -> f32 {
        self.last_out
    }

    pub fn energy(&self) -> f32 {
        self.ring.energy()
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.tick(*sample);
        }
    }

    pub fn clear(&mut self) {
        self.ring.clear();
        self.last_out = 0.0;
    }
}

/// Linearly interpolating delay line.
#[derive(Debug, Clone)]
pub struct DelayL {
    ring: RingBuffer,
    delay: f32,
    whole: usize,
    alpha: f32,
    last_out: f32,
}

impl DelayL {
    pub fn new(capacity: usize) -> Self {
        let mut line = Self {
            ring: RingBuffer::new(capacity),
            delay: 0.0,
            whole: 0,
            alpha: 0.0,
            last_out: 0.0,
        };
        line.configure(0.5 * line.max_delay());
        line
    }

    pub fn max_delay(&self) -> f32 {
        (self.ring.capacity() - 1) as f32
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    fn configure(&mut self, delay: f32) {
        self.delay = delay;
        self.whole = delay.floor() as usize;
        self.alpha = delay - self.whole as f32;
    }

    pub fn try_set_delay(&mut self, delay: f32) -> Result<(), DelayError> {
        check_fractional(delay, 0.0, self.max_delay())?;
        self.configure(delay);
        Ok(())
    }

    pub fn set_delay(&mut self, delay: f32) {
        if let Err(err) = self.try_set_delay(delay) {
            let clamped = clamp_fractional(delay, 0.0, self.max_delay());
            log::warn!("DelayL: {err}; clamping to {clamped}");
            self.configure(clamped);
        }
    }

    #[inline]
    pub fn tick(&mut self, sample: f32) -> f32 {
        self.ring.push(sample);
        let older = self.ring.read(self.whole);
        let newer = self.ring.read(self.whole + 1);
        // `whole + 1` wraps onto the newest sample only when alpha is 0
        self.last_out = older * (1.0 - self.alpha) + newer * self.alpha;
        self.last_out
    }

    #[inline]
    pub fn last_out(&self) -> f32 {
        self.last_out
    }

    pub fn energy(&self) -> f32 {
        self.ring.energy()
    }

    pub fn clear(&mut self) {
        self.ring.clear();
        self.last_out = 0.0;
    }
}

/// Allpass-interpolating delay line.
///
/// The requested delay `d` is split into an integer buffer delay `n` and an
/// allpass section contributing `α = d - n` samples at low frequencies, with
/// coefficient `c = (1 - α) / (1 + α)`:
///
/// ```text
/// y[t] = c * (x_d[t] - y[t-1]) + x_d[t-1]
/// ```
///
/// As `α` approaches 0 the pole at `-c` approaches the unit circle and the
/// pole/zero pair nearly cancels, so a fraction below 0.1 is moved into the
/// allpass: one sample is taken from the buffer and `α` lands in
/// `[1.0, 1.1)`. An exact integer delay therefore reads one bin early with
/// `α = 1` (a pure one-sample allpass). This keeps `α` in `[0.1, 1.1)` at
/// the cost of a small phase-delay error at high frequencies.
#[derive(Debug, Clone)]
pub struct DelayA {
    ring: RingBuffer,
    delay: f32,
    whole: usize,
    alpha: f32,
    coeff: f32,
    last_in: f32,
    last_out: f32,
}

impl DelayA {
    pub fn new(capacity: usize) -> Self {
        let mut line = Self {
            ring: RingBuffer::new(capacity.max(2)),
            delay: 0.0,
            whole: 0,
            alpha: 0.0,
            coeff: 0.0,
            last_in: 0.0,
            last_out: 0.0,
        };
        line.configure(0.5 * line.max_delay());
        line
    }

    pub fn max_delay(&self) -> f32 {
        (self.ring.capacity() - 1) as f32
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// Allpass coefficient currently in use.
    pub fn coefficient(&self) -> f32 {
        self.coeff
    }

    fn configure(&mut self, delay: f32) {
        let mut whole = delay.floor();
        let mut alpha = delay - whole;
        if alpha < 0.1 {
            whole -= 1.0;
            alpha += 1.0;
        }
        self.delay = delay;
        self.whole = whole.max(0.0) as usize;
        self.alpha = alpha;
        self.coeff = (1.0 - alpha) / (1.0 + alpha);
    }

    pub fn try_set_delay(&mut self, delay: f32) -> Result<(), DelayError> {
        check_fractional(delay, ALLPASS_MIN_DELAY, self.max_delay())?;
        self.configure(delay);
        Ok(())
    }

    pub fn set_delay(&mut self, delay: f32) {
        if let Err(err) = self.try_set_delay(delay) {
            let clamped = clamp_fractional(delay, ALLPASS_MIN_DELAY, self.max_delay());
            log::warn!("DelayA: {err}; clamping to {clamped}");
            self.configure(clamped);
        }
    }

    #[inline]
    pub fn tick(&mut self, sample: f32) -> f32 {
        self.ring.push(sample);
        let delayed = self.ring.read(self.whole);
        self.last_out = self.coeff * (delayed - self.last_out) + self.last_in;
        self.last_in = delayed;
        self.last_out
    }

    #[inline]
    pub fn last_out(&self) -> f32 {
        self.last_out
    }

    pub fn energy(&self) -> f32 {
        self.ring.energy()
    }

    pub fn clear(&mut self) {
        self.ring.clear();
        self.last_in = 0.0;
        self.last_out = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::noise::Noise;

    fn impulse_response(mut tick: impl FnMut(f32) -> f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| tick(if i == 0 { 1.0 } else { 0.0 }))
            .collect()
    }

    #[test]
    fn delay_n_scenario() {
        let mut line = DelayN::new(10);
        line.set_delay(5);
        let out = impulse_response(|x| line.tick(x), 10);
        assert_eq!(out, vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn delay_n_is_exact_for_every_delay() {
        for d in 0..=15 {
            let mut line = DelayN::new(16);
            line.try_set_delay(d).unwrap();
            let out = impulse_response(|x| line.tick(x), 40);
            for (t, y) in out.iter().enumerate() {
                let expected = if t == d { 1.0 } else { 0.0 };
                assert_eq!(*y, expected, "delay {d}, t {t}");
            }
        }
    }

    #[test]
    fn delay_n_clamps_oversized_request() {
        let mut line = DelayN::new(8);
        line.set_delay(100);
        assert_eq!(line.delay(), 7);
    }

    #[test]
    fn try_set_delay_reports_and_keeps_previous() {
        let mut line = DelayN::new(8);
        line.set_delay(3);
        let err = line.try_set_delay(9).unwrap_err();
        assert!(matches!(err, DelayError::ExceedsCapacity { .. }));
        assert_eq!(line.delay(), 3);

        let mut line = DelayA::new(8);
        line.set_delay(2.5);
        assert!(matches!(
            line.try_set_delay(0.01),
            Err(DelayError::TooShort { .. })
        ));
        assert!(matches!(
            line.try_set_delay(f32::NAN),
            Err(DelayError::NotFinite)
        ));
        assert_eq!(line.delay(), 2.5);
    }

    #[test]
    fn tap_out_reads_history() {
        let mut line = DelayN::new(8);
        for x in [1.0, 2.0, 3.0] {
            line.tick(x);
        }
        assert_eq!(line.tap_out(0), 3.0);
        assert_eq!(line.tap_out(2), 1.0);
    }

    #[test]
    fn delay_l_splits_fraction() {
        let mut line = DelayL::new(16);
        line.set_delay(2.25);
        let out = impulse_response(|x| line.tick(x), 6);
        assert!((out[2] - 0.75).abs() < 1e-6);
        assert!((out[3] - 0.25).abs() < 1e-6);
        assert_eq!(out[4], 0.0);
    }

    #[test]
    fn delay_l_at_capacity_stays_in_bounds() {
        let mut line = DelayL::new(8);
        line.set_delay(7.0);
        let out = impulse_response(|x| line.tick(x), 10);
        assert_eq!(out[7], 1.0);
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn delay_a_integer_delay_is_exact() {
        let mut line = DelayA::new(16);
        line.set_delay(4.0);
        assert_eq!(line.coefficient(), 0.0);
        let out = impulse_response(|x| line.tick(x), 10);
        assert_eq!(out[4], 1.0);
        assert!(out.iter().enumerate().all(|(t, y)| t == 4 || *y == 0.0));
    }

    #[test]
    fn delay_a_keeps_alpha_away_from_zero() {
        let mut line = DelayA::new(64);
        for delay in [1.02, 5.0, 9.09, 30.001] {
            line.set_delay(delay);
            assert!(line.coefficient() <= (1.0 - 0.1) / 1.1 + 1e-6);
            assert!(line.coefficient() > -0.05);
        }
    }

    #[test]
    fn delay_a_preserves_energy() {
        let capacity = 64;
        let delays = [0.1, 0.5, 1.05, 3.3, 7.95, 20.5, capacity as f32 - 1.1];
        for &delay in &delays {
            let mut line = DelayA::new(capacity);
            line.try_set_delay(delay).unwrap();
            let mut noise = Noise::with_seed(7);
            let mut energy_in = 0.0f64;
            let mut energy_out = 0.0f64;
            for i in 0..20_000 + capacity + 400 {
                let x = if i < 20_000 { noise.tick() } else { 0.0 };
                let y = line.tick(x);
                energy_in += (x * x) as f64;
                energy_out += (y * y) as f64;
            }
            let ratio = energy_out / energy_in;
            assert!((ratio - 1.0).abs() < 0.01, "delay {delay}: ratio {ratio}");
        }
    }

    #[test]
    fn clear_zeroes_state() {
        let mut line = DelayL::new(8);
        line.tick(1.0);
        line.tick(0.5);
        line.clear();
        assert_eq!(line.energy(), 0.0);
        assert_eq!(line.last_out(), 0.0);
    }
}
