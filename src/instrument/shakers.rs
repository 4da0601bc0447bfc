//! PhISEM - Physically Informed Stochastic Event Modeling
//!
//! A shaker is a pile of small objects colliding inside (or against) a
//! resonant body. Rather than simulating each collision, PhISEM keeps two
//! decaying energies:
//!
//! ```text
//! shake energy ──×system decay──→  each sample, with probability ∝ objects,
//!                                  a collision adds the shake energy to
//! sound level  ──×sound decay───→  the sound level
//!
//! sound level × noise ──→ [2-pole resonators] ──→ Σ gains ──→ [zeros] ──→ out
//! ```
//!
//! Presets differ in object count, decay rates, resonator tuning and the
//! final shaping zeros. A few have their own excitation: the guiro and
//! wrench scrape a ratchet, and water drops sweep their resonances upward
//! as each bubble closes.

use std::f32::consts::TAU;

use crate::dsp::noise::Noise;
use crate::instrument::{clamp_amplitude, control, normalize_control, Instrument};

const MAX_SHAKE: f32 = 2000.0;
const MIN_ENERGY: f32 = 0.3;
const MAX_FREQS: usize = 8;
const OUTPUT_LIMIT: f32 = 10_000.0;
const OUTPUT_SCALE: f32 = 0.0001;
const WATER_SWEEP: f32 = 1.0001;
const WATER_BASE_FREQUENCY: f32 = 600.0;
const RATCHET_DELTA: f32 = 0.0005;

/// The 22 built-in shaker models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShakerPreset {
    #[default]
    Maraca,
    Cabasa,
    Sekere,
    Guiro,
    WaterDrops,
    BambooChimes,
    Tambourine,
    SleighBells,
    Sticks,
    Crunch,
    Wrench,
    SandPaper,
    CokeCan,
    NextMug,
    MugPenny,
    MugNickel,
    MugDime,
    MugQuarter,
    MugFranc,
    MugPeso,
    BigRocks,
    LittleRocks,
}

impl ShakerPreset {
    pub const ALL: [ShakerPreset; 22] = [
        ShakerPreset::Maraca,
        ShakerPreset::Cabasa,
        ShakerPreset::Sekere,
        ShakerPreset::Guiro,
        ShakerPreset::WaterDrops,
        ShakerPreset::BambooChimes,
        ShakerPreset::Tambourine,
        ShakerPreset::SleighBells,
        ShakerPreset::Sticks,
        ShakerPreset::Crunch,
        ShakerPreset::Wrench,
        ShakerPreset::SandPaper,
        ShakerPreset::CokeCan,
        ShakerPreset::NextMug,
        ShakerPreset::MugPenny,
        ShakerPreset::MugNickel,
        ShakerPreset::MugDime,
        ShakerPreset::MugQuarter,
        ShakerPreset::MugFranc,
        ShakerPreset::MugPeso,
        ShakerPreset::BigRocks,
        ShakerPreset::LittleRocks,
    ];

    /// Preset by number; out-of-range numbers select the maraca.
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ShakerPreset::Maraca => "Maraca",
            ShakerPreset::Cabasa => "Cabasa",
            ShakerPreset::Sekere => "Sekere",
            ShakerPreset::Guiro => "Guiro",
            ShakerPreset::WaterDrops => "Water Drops",
            ShakerPreset::BambooChimes => "Bamboo Chimes",
            ShakerPreset::Tambourine => "Tambourine",
            ShakerPreset::SleighBells => "Sleigh Bells",
            ShakerPreset::Sticks => "Sticks",
            ShakerPreset::Crunch => "Crunch",
            ShakerPreset::Wrench => "Wrench",
            ShakerPreset::SandPaper => "Sand Paper",
            ShakerPreset::CokeCan => "Coke Can",
            ShakerPreset::NextMug => "Next Mug",
            ShakerPreset::MugPenny => "Penny + Mug",
            ShakerPreset::MugNickel => "Nickel + Mug",
            ShakerPreset::MugDime => "Dime + Mug",
            ShakerPreset::MugQuarter => "Quarter + Mug",
            ShakerPreset::MugFranc => "Franc + Mug",
            ShakerPreset::MugPeso => "Peso + Mug",
            ShakerPreset::BigRocks => "Big Rocks",
            ShakerPreset::LittleRocks => "Little Rocks",
        }
    }

    /// Case-insensitive lookup ignoring spaces and punctuation.
    pub fn from_name(name: &str) -> Option<Self> {
        fn key(name: &str) -> String {
            name.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .map(|c| c.to_ascii_lowercase())
                .collect()
        }
        let wanted = key(name);
        if wanted == "nicklemug" {
            return Some(ShakerPreset::MugNickel);
        }
        Self::ALL.iter().copied().find(|preset| key(preset.name()) == wanted)
    }

    fn is_ratchet(self) -> bool {
        matches!(self, ShakerPreset::Guiro | ShakerPreset::Wrench)
    }

    fn params(self) -> PresetParams {
        use ShakerPreset::*;
        match self {
            Maraca => PresetParams::simple(0.95, 0.999, 0.9, 20.0, 25.0, [1.0, -1.0, 0.0], MARACA),
            Cabasa => PresetParams::simple(0.96, 0.997, 0.97, 40.0, 512.0, [1.0, -1.0, 0.0], CABASA),
            Sekere => PresetParams::simple(0.96, 0.999, 0.94, 20.0, 64.0, [1.0, 0.0, -1.0], SEKERE),
            Guiro => PresetParams {
                default_decay: 0.9999,
                ..PresetParams::simple(0.95, 1.0, 1.0, 10.0, 128.0, [1.0, 0.0, -1.0], GUIRO)
            },
            WaterDrops => PresetParams::simple(0.95, 0.996, 0.8, 1.0, 10.0, [1.0, 0.0, 0.0], WATER),
            BambooChimes => PresetParams::simple(0.95, 0.9999, 0.7, 2.0, 1.25, [1.0, 0.0, 0.0], BAMBOO),
            Tambourine => {
                PresetParams::simple(0.95, 0.9985, 0.95, 5.0, 32.0, [1.0, 0.0, -1.0], TAMBOURINE)
            }
            SleighBells => PresetParams::simple(0.97, 0.9994, 0.9, 1.0, 32.0, [1.0, 0.0, -1.0], SLEIGH),
            Sticks => PresetParams::simple(0.96, 0.998, 0.96, 30.0, 2.0, [1.0, 0.0, -1.0], STICKS),
            Crunch => PresetParams::simple(0.95, 0.99806, 0.96, 20.0, 7.0, [1.0, -1.0, 0.0], CRUNCH),
            Wrench => PresetParams {
                default_decay: 0.9999,
                ..PresetParams::simple(0.95, 1.0, 0.98, 5.0, 128.0, [1.0, 0.0, -1.0], WRENCH)
            },
            SandPaper => PresetParams::simple(0.999, 0.999, 0.97, 0.5, 128.0, [1.0, 0.0, -1.0], SANDPAPER),
            CokeCan => PresetParams::simple(0.97, 0.999, 0.95, 0.8, 48.0, [1.0, 0.0, -1.0], COKE_CAN),
            NextMug => mug(MUG),
            MugPenny => mug(MUG_PENNY),
            MugNickel => mug(MUG_NICKEL),
            MugDime => mug(MUG_DIME),
            MugQuarter => mug(MUG_QUARTER),
            MugFranc => mug(MUG_FRANC),
            MugPeso => mug(MUG_PESO),
            BigRocks => PresetParams::simple(0.98, 0.9965, 0.95, 20.0, 23.0, [1.0, 0.0, -1.0], BIG_ROCKS),
            LittleRocks => {
                PresetParams::simple(0.98, 0.99586, 0.95, 20.0, 1600.0, [1.0, 0.0, -1.0], LITTLE_ROCKS)
            }
        }
    }
}

fn mug(resonances: &'static [Resonance]) -> PresetParams {
    PresetParams::simple(0.95, 0.9994, 0.95, 0.8, 3.0, [1.0, 0.0, -1.0], resonances)
}

/// One resonator of a preset.
#[derive(Debug, Clone, Copy)]
struct Resonance {
    frequency: f32,
    radius: f32,
    /// Multiplier on the object-count gain.
    gain: f32,
    /// Relative frequency jitter applied on each collision.
    randomness: f32,
}

const fn res(frequency: f32, radius: f32, gain: f32, randomness: f32) -> Resonance {
    Resonance {
        frequency,
        radius,
        gain,
        randomness,
    }
}

const MARACA: &[Resonance] = &[res(3200.0, 0.96, 1.0, 0.0)];
const CABASA: &[Resonance] = &[res(3000.0, 0.7, 1.0, 0.0)];
const SEKERE: &[Resonance] = &[res(5500.0, 0.6, 1.0, 0.0)];
const GUIRO: &[Resonance] = &[res(2500.0, 0.97, 1.0, 0.0), res(4000.0, 0.97, 1.0, 0.0)];
const WATER: &[Resonance] = &[
    res(450.0, 0.9985, 1.0, 0.0),
    res(600.0, 0.9985, 1.0, 0.0),
    res(750.0, 0.9985, 1.0, 0.0),
];
const BAMBOO: &[Resonance] = &[
    res(2800.0, 0.995, 1.0, 0.2),
    res(2240.0, 0.995, 1.0, 0.2),
    res(3360.0, 0.995, 1.0, 0.2),
];
const TAMBOURINE: &[Resonance] = &[
    res(2300.0, 0.96, 0.1, 0.0),
    res(5600.0, 0.99, 0.8, 0.05),
    res(8100.0, 0.99, 1.0, 0.05),
];
const SLEIGH: &[Resonance] = &[
    res(2500.0, 0.99, 1.0, 0.03),
    res(5300.0, 0.99, 1.0, 0.03),
    res(6500.0, 0.99, 1.0, 0.03),
    res(8300.0, 0.99, 0.5, 0.03),
    res(9800.0, 0.99, 0.3, 0.03),
];
const STICKS: &[Resonance] = &[res(5500.0, 0.6, 1.0, 0.0)];
const CRUNCH: &[Resonance] = &[res(800.0, 0.95, 1.0, 0.0)];
const WRENCH: &[Resonance] = &[res(3200.0, 0.99, 1.0, 0.0), res(8000.0, 0.992, 1.0, 0.0)];
const SANDPAPER: &[Resonance] = &[res(4500.0, 0.6, 1.0, 0.0)];
const COKE_CAN: &[Resonance] = &[
    res(370.0, 0.99, 1.0, 0.0),
    res(1025.0, 0.992, 1.8, 0.0),
    res(1424.0, 0.992, 1.8, 0.0),
    res(2149.0, 0.992, 1.8, 0.0),
    res(3596.0, 0.992, 1.8, 0.0),
];
const BIG_ROCKS: &[Resonance] = &[res(6460.0, 0.932, 1.0, 0.11)];
const LITTLE_ROCKS: &[Resonance] = &[res(9000.0, 0.843, 1.0, 0.18)];

macro_rules! mug_with {
    ($([$f:expr, $r:expr, $g:expr]),*) => {
        &[
            res(2123.0, 0.997, 1.0, 0.0),
            res(4518.0, 0.997, 0.8, 0.0),
            res(8856.0, 0.997, 0.6, 0.0),
            res(10753.0, 0.997, 0.4, 0.0),
            $(res($f, $r, $g, 0.0)),*
        ]
    };
}

const MUG: &[Resonance] = mug_with!();
const MUG_PENNY: &[Resonance] = mug_with!([11000.0, 0.999, 1.0], [5200.0, 0.999, 0.8], [3835.0, 0.999, 0.5]);
const MUG_NICKEL: &[Resonance] = mug_with!([5583.0, 0.9992, 1.0], [9255.0, 0.9992, 0.8], [9805.0, 0.9992, 0.5]);
const MUG_DIME: &[Resonance] = mug_with!([4450.0, 0.9993, 1.0], [4974.0, 0.9993, 0.8], [9945.0, 0.9993, 0.5]);
const MUG_QUARTER: &[Resonance] = mug_with!([1708.0, 0.9995, 1.3], [8863.0, 0.9995, 0.8], [9045.0, 0.9995, 0.5]);
const MUG_FRANC: &[Resonance] = mug_with!([5583.0, 0.9995, 0.7], [11010.0, 0.9995, 0.4], [1917.0, 0.9995, 0.3]);
const MUG_PESO: &[Resonance] = mug_with!([7250.0, 0.9996, 1.0], [8150.0, 0.9996, 1.2], [10060.0, 0.9996, 0.7]);

#[derive(Debug, Clone, Copy)]
struct PresetParams {
    sound_decay: f32,
    system_decay: f32,
    /// Centre of the system-decay control range.
    default_decay: f32,
    decay_scale: f32,
    base_gain: f32,
    objects: f32,
    final_z: [f32; 3],
    resonances: &'static [Resonance],
}

impl PresetParams {
    const fn simple(
        sound_decay: f32,
        system_decay: f32,
        decay_scale: f32,
        base_gain: f32,
        objects: f32,
        final_z: [f32; 3],
        resonances: &'static [Resonance],
    ) -> Self {
        Self {
            sound_decay,
            system_decay,
            default_decay: system_decay,
            decay_scale,
            base_gain,
            objects,
            final_z,
            resonances,
        }
    }
}

/// Two-pole resonator state for one frequency band.
#[derive(Debug, Clone, Copy, Default)]
struct Band {
    center: f32,
    tuned_center: f32,
    radius: f32,
    randomness: f32,
    gain_scale: f32,
    gain: f32,
    coeffs: [f32; 2],
    outputs: [f32; 2],
}

impl Band {
    fn tune(&mut self, frequency: f32, sample_rate: f32) {
        self.coeffs[0] = -self.radius * 2.0 * (frequency * TAU / sample_rate).cos();
    }

    #[inline]
    fn filter(&mut self, input: f32) -> f32 {
        let y = input - self.outputs[0] * self.coeffs[0] - self.outputs[1] * self.coeffs[1];
        self.outputs[1] = self.outputs[0];
        self.outputs[0] = y;
        y
    }
}

#[derive(Debug, Clone)]
pub struct Shakers {
    sample_rate: f32,
    preset: ShakerPreset,
    noise: Noise,
    bands: [Band; MAX_FREQS],
    n_bands: usize,
    shake_energy: f32,
    sound_level: f32,
    sound_decay: f32,
    system_decay: f32,
    default_decay: f32,
    decay_scale: f32,
    base_gain: f32,
    objects: f32,
    default_objects: f32,
    final_z: [f32; 3],
    final_z_coeffs: [f32; 3],
    ratchet: f32,
    ratchet_delta: f32,
    ratchet_pos: i32,
    last_ratchet_pos: i32,
    total_energy: f32,
    last_out: f32,
}

impl Shakers {
    pub fn new(sample_rate: f32) -> Self {
        let mut shakers = Self {
            sample_rate,
            preset: ShakerPreset::Maraca,
            noise: Noise::new(),
            bands: [Band::default(); MAX_FREQS],
            n_bands: 0,
            shake_energy: 0.0,
            sound_level: 0.0,
            sound_decay: 0.0,
            system_decay: 0.0,
            default_decay: 0.0,
            decay_scale: 0.0,
            base_gain: 0.0,
            objects: 0.0,
            default_objects: 0.0,
            final_z: [0.0; 3],
            final_z_coeffs: [1.0, 0.0, 0.0],
            ratchet: 0.0,
            ratchet_delta: RATCHET_DELTA,
            ratchet_pos: 0,
            last_ratchet_pos: 0,
            total_energy: 0.0,
            last_out: 0.0,
        };
        shakers.setup(ShakerPreset::Maraca);
        shakers
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.noise.reseed(seed);
        self
    }

    pub fn preset(&self) -> ShakerPreset {
        self.preset
    }

    pub fn shake_energy(&self) -> f32 {
        self.shake_energy
    }

    pub fn system_decay(&self) -> f32 {
        self.system_decay
    }

    pub fn objects(&self) -> f32 {
        self.objects
    }

    /// Select a preset by number.
    pub fn setup_num(&mut self, index: usize) -> ShakerPreset {
        if index >= ShakerPreset::ALL.len() {
            log::warn!("Shakers: no preset {index}; using Maraca");
        }
        self.setup(ShakerPreset::from_index(index));
        self.preset
    }

    /// Select a preset by (case-insensitive) name; unknown names select the maraca.
    pub fn setup_name(&mut self, name: &str) -> ShakerPreset {
        let preset = ShakerPreset::from_name(name).unwrap_or_else(|| {
            log::warn!("Shakers: unknown preset name {name:?}; using Maraca");
            ShakerPreset::Maraca
        });
        self.setup(preset);
        self.preset
    }

    pub fn setup(&mut self, preset: ShakerPreset) {
        let params = preset.params();
        log::debug!("Shakers: preset {}", preset.name());

        self.preset = preset;
        self.sound_decay = params.sound_decay;
        self.system_decay = params.system_decay;
        self.default_decay = params.default_decay;
        self.decay_scale = params.decay_scale;
        self.base_gain = params.base_gain;
        self.objects = params.objects;
        self.default_objects = params.objects;
        self.final_z_coeffs = params.final_z;
        self.final_z = [0.0; 3];
        self.n_bands = params.resonances.len().min(MAX_FREQS);

        let base = self.object_gain();
        for (band, resonance) in self.bands.iter_mut().zip(params.resonances) {
            *band = Band {
                center: resonance.frequency,
                tuned_center: resonance.frequency,
                radius: resonance.radius,
                randomness: resonance.randomness,
                gain_scale: resonance.gain,
                gain: base * resonance.gain,
                coeffs: [0.0, resonance.radius * resonance.radius],
                outputs: [0.0; 2],
            };
            band.tune(resonance.frequency, self.sample_rate);
        }

        if preset.is_ratchet() {
            self.ratchet = 0.0;
            self.ratchet_pos = 10;
        }
    }

    /// Per-band gain before the preset's multiplier.
    fn object_gain(&self) -> f32 {
        self.objects.ln() * self.base_gain / self.objects
    }

    fn add_energy(&mut self, amount: f32) {
        self.shake_energy = (self.shake_energy + amount).min(MAX_SHAKE);
    }

    #[inline]
    fn generic_tick(&mut self) -> f32 {
        if self.shake_energy <= MIN_ENERGY {
            return 0.0;
        }
        self.shake_energy *= self.system_decay;
        if self.noise.uniform(1024.0) < self.objects {
            self.sound_level += self.shake_energy;
            for band in &mut self.bands[..self.n_bands] {
                if band.randomness != 0.0 {
                    let jittered = band.tuned_center * (1.0 + band.randomness * self.noise.tick());
                    band.tune(jittered, self.sample_rate);
                }
            }
        }
        let input = self.sound_level * self.noise.tick();
        self.sound_level *= self.sound_decay;

        self.final_z[2] = self.final_z[1];
        self.final_z[1] = self.final_z[0];
        self.final_z[0] = 0.0;
        for band in &mut self.bands[..self.n_bands] {
            let previous = band.outputs[0];
            band.filter(input);
            self.final_z[0] += band.gain * previous;
        }

        let data: f32 = self
            .final_z_coeffs
            .iter()
            .zip(&self.final_z)
            .map(|(c, z)| c * z)
            .sum();
        data.clamp(-OUTPUT_LIMIT, OUTPUT_LIMIT) * OUTPUT_SCALE
    }

    #[inline]
    fn ratchet_tick(&mut self) -> f32 {
        if self.ratchet_pos <= 0 {
            return 0.0;
        }
        self.ratchet -= self.ratchet_delta + 0.002 * self.total_energy;
        if self.ratchet < 0.0 {
            self.ratchet = 1.0;
            self.ratchet_pos -= 1;
        }
        self.total_energy = self.ratchet;

        if self.noise.uniform(1024.0) < self.objects {
            self.sound_level += 512.0 * self.ratchet * self.total_energy;
        }
        let input = self.sound_level * self.noise.tick() * self.ratchet;
        self.sound_level *= self.sound_decay;

        let mut sum = 0.0;
        for band in &mut self.bands[..self.n_bands.min(2)] {
            let previous = band.outputs[0];
            band.filter(input);
            sum += band.gain * previous;
        }
        self.final_z[2] = self.final_z[1];
        self.final_z[1] = self.final_z[0];
        self.final_z[0] = sum;
        (self.final_z[0] - self.final_z[2]).clamp(-OUTPUT_LIMIT, OUTPUT_LIMIT) * OUTPUT_SCALE
    }

    #[inline]
    fn water_tick(&mut self) -> f32 {
        if self.shake_energy <= MIN_ENERGY {
            return 0.0;
        }
        self.shake_energy *= self.system_decay;
        if self.noise.uniform(32_767.0) < self.objects {
            self.sound_level = self.shake_energy;
            let which = self.noise.below(3) as usize;
            let offset = [0.75, 1.0, 1.25][which];
            let center = WATER_BASE_FREQUENCY * (offset + 0.25 * self.noise.tick());
            let gain = self.noise.tick().abs();
            let band = &mut self.bands[which];
            band.center = center;
            band.gain = gain;
        }

        for band in &mut self.bands[..3] {
            band.gain *= band.radius;
            if band.gain > 0.001 {
                band.center *= WATER_SWEEP;
                band.tune(band.center, self.sample_rate);
            }
        }

        self.sound_level *= self.sound_decay;
        let excitation = self.sound_level * self.noise.tick();
        let mut data = 0.0;
        for band in &mut self.bands[..3] {
            data += band.gain * band.filter(excitation * band.gain);
        }

        self.final_z[2] = self.final_z[1];
        self.final_z[1] = self.final_z[0];
        self.final_z[0] = 4.0 * data;
        (self.final_z[2] - self.final_z[0]).clamp(-OUTPUT_LIMIT, OUTPUT_LIMIT) * OUTPUT_SCALE
    }

    /// Recompute band gains for the current object count, scaled by `factor`.
    fn rescale_gains(&mut self, factor: f32) {
        let base = self.object_gain();
        for band in &mut self.bands[..self.n_bands] {
            band.gain = base * band.gain_scale * factor;
        }
    }

    pub fn clear(&mut self) {
        self.shake_energy = 0.0;
        self.sound_level = 0.0;
        self.final_z = [0.0; 3];
        for band in &mut self.bands {
            band.outputs = [0.0; 2];
        }
        self.last_out = 0.0;
    }
}

impl Instrument for Shakers {
    /// Shakers are unpitched; frequency only selects the preset on note-on.
    fn set_frequency(&mut self, _frequency: f32) {}

    fn note_on(&mut self, frequency: f32, amplitude: f32) {
        let amplitude = clamp_amplitude("Shakers", amplitude);
        if frequency > 0.0 && frequency.is_finite() {
            let note = (12.0 * (frequency / 220.0).log2() + 57.01).max(0.0) as usize;
            let preset = ShakerPreset::from_index(note % 32);
            if preset != self.preset {
                self.setup(preset);
            }
        } else {
            log::warn!("Shakers: frequency {frequency} must be positive; keeping preset");
        }
        self.add_energy(amplitude * MAX_SHAKE * 0.1);
        if self.preset.is_ratchet() {
            self.ratchet_pos += 1;
        }
    }

    fn note_off(&mut self, _amplitude: f32) {
        self.shake_energy = 0.0;
        if self.preset.is_ratchet() {
            self.ratchet_pos = 0;
        }
    }

    fn control_change(&mut self, number: u16, value: f32) {
        if number == control::SHAKER_PRESET {
            self.setup_num((value + 0.5).max(0.0) as usize);
            return;
        }
        let norm = normalize_control("Shakers", value);
        let value = norm * 128.0;
        match number {
            control::SHAKE_ENERGY | control::AFTERTOUCH => {
                self.add_energy(norm * MAX_SHAKE * 0.1);
                if self.preset.is_ratchet() {
                    self.ratchet_pos = (value as i32 - self.last_ratchet_pos).abs();
                    self.ratchet_delta = 0.0002 * self.ratchet_pos as f32;
                    self.last_ratchet_pos = value as i32;
                }
            }
            control::OBJECT_COUNT => {
                self.objects = value * self.default_objects / 64.0 + 0.3;
                self.rescale_gains((128.0 - value) / 100.0 + 0.36);
            }
            control::SYSTEM_DECAY => {
                self.system_decay = self.default_decay
                    + (value - 64.0) * self.decay_scale * (1.0 - self.default_decay) / 64.0;
            }
            control::RESONANCE_FREQUENCY => {
                let step: f32 = match self.preset {
                    ShakerPreset::Tambourine | ShakerPreset::Sekere | ShakerPreset::SleighBells => 1.008,
                    _ => 1.015,
                };
                for band in &mut self.bands[..self.n_bands] {
                    band.tuned_center = band.center * step.powf(value - 64.0);
                    band.tune(band.tuned_center, self.sample_rate);
                }
            }
            _ => log::warn!("Shakers: undefined control number {number}"),
        }
    }

    #[inline]
    fn tick(&mut self) -> f32 {
        self.last_out = match self.preset {
            ShakerPreset::WaterDrops => self.water_tick(),
            ShakerPreset::Guiro | ShakerPreset::Wrench => self.ratchet_tick(),
            _ => self.generic_tick(),
        };
        self.last_out
    }

    fn last_out(&self) -> f32 {
        self.last_out
    }
}
