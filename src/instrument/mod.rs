//! Physical-model instruments.
//!
//! Every instrument produces one sample per [`Instrument::tick`] and reacts to
//! note and control events. Amplitudes are normalized to `[0, 1]`; control
//! values arrive in MIDI range `0..=128` (see [`control`]).
//!
//! Use the [`Instrument`] trait when writing code generic over a model, or
//! [`AnyInstrument`] to hold a mix of models in one slice without boxing.

pub mod bowed_bar;
pub mod control;
pub mod drone;
pub mod flute;
pub mod mandolin;
pub mod plucked;
pub mod shakers;
pub mod sitar;

pub use bowed_bar::{BarPreset, BowedBar};
pub use drone::Drone;
pub use flute::Flute;
pub use mandolin::Mandolin;
pub use plucked::{Plucked, Plucked2};
pub use shakers::{ShakerPreset, Shakers};
pub use sitar::Sitar;

use crate::NORM_7;

/// A note or control event for a single instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlEvent {
    NoteOn { frequency: f32, amplitude: f32 },
    NoteOff { amplitude: f32 },
    ControlChange { number: u16, value: f32 },
    SetFrequency { frequency: f32 },
    /// Bend relative to `frequency`, in semitones.
    PitchBend { frequency: f32, semitones: f32 },
}

/// Core trait for sound-producing models.
pub trait Instrument: Send {
    fn set_frequency(&mut self, frequency: f32);

    /// Start a note. `amplitude` is in `[0, 1]`.
    fn note_on(&mut self, frequency: f32, amplitude: f32);

    /// Release the current note.
    fn note_off(&mut self, amplitude: f32);

    /// React to a control change. Unknown numbers are ignored with a warning.
    fn control_change(&mut self, number: u16, value: f32);

    fn tick(&mut self) -> f32;

    fn last_out(&self) -> f32;

    fn handle_event(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::NoteOn {
                frequency,
                amplitude,
            } => self.note_on(frequency, amplitude),
            ControlEvent::NoteOff { amplitude } => self.note_off(amplitude),
            ControlEvent::ControlChange { number, value } => self.control_change(number, value),
            ControlEvent::SetFrequency { frequency } => self.set_frequency(frequency),
            ControlEvent::PitchBend {
                frequency,
                semitones,
            } => self.set_frequency(frequency * 2f32.powf(semitones / 12.0)),
        }
    }

    /// Fill `out` with consecutive samples.
    fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.tick();
        }
    }
}

impl Instrument for Box<dyn Instrument> {
    fn set_frequency(&mut self, frequency: f32) {
        (**self).set_frequency(frequency)
    }

    fn note_on(&mut self, frequency: f32, amplitude: f32) {
        (**self).note_on(frequency, amplitude)
    }

    fn note_off(&mut self, amplitude: f32) {
        (**self).note_off(amplitude)
    }

    fn control_change(&mut self, number: u16, value: f32) {
        (**self).control_change(number, value)
    }

    fn tick(&mut self) -> f32 {
        (**self).tick()
    }

    fn last_out(&self) -> f32 {
        (**self).last_out()
    }
}

/// Normalize a MIDI-range control value to `[0, 1]`, warning when it is out of range.
pub(crate) fn normalize_control(name: &str, value: f32) -> f32 {
    let norm = value * NORM_7;
    if !(0.0..=1.0).contains(&norm) {
        log::warn!("{name}: control value {value} outside 0..=128; clamping");
    }
    norm.clamp(0.0, 1.0)
}

/// Clamp an amplitude to `[0, 1]`, warning when it is out of range.
pub(crate) fn clamp_amplitude(name: &str, amplitude: f32) -> f32 {
    if !(0.0..=1.0).contains(&amplitude) {
        log::warn!("{name}: amplitude {amplitude} outside [0, 1]; clamping");
    }
    amplitude.clamp(0.0, 1.0)
}

/// Replace a non-positive frequency with 220 Hz, warning about it.
pub(crate) fn checked_frequency(name: &str, frequency: f32) -> f32 {
    if frequency <= 0.0 || !frequency.is_finite() {
        log::warn!("{name}: frequency {frequency} must be positive; using 220 Hz");
        220.0
    } else {
        frequency
    }
}

/// Closed set of models with static dispatch.
#[derive(Debug, Clone)]
pub enum AnyInstrument {
    Plucked(Plucked),
    Plucked2(Plucked2),
    Mandolin(Mandolin),
    Sitar(Sitar),
    Drone(Drone),
    Flute(Flute),
    BowedBar(BowedBar),
    Shakers(Shakers),
}

macro_rules! dispatch {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            AnyInstrument::Plucked($inner) => $body,
            AnyInstrument::Plucked2($inner) => $body,
            AnyInstrument::Mandolin($inner) => $body,
            AnyInstrument::Sitar($inner) => $body,
            AnyInstrument::Drone($inner) => $body,
            AnyInstrument::Flute($inner) => $body,
            AnyInstrument::BowedBar($inner) => $body,
            AnyInstrument::Shakers($inner) => $body,
        }
    };
}

impl Instrument for AnyInstrument {
    fn set_frequency(&mut self, frequency: f32) {
        dispatch!(self, inner => inner.set_frequency(frequency))
    }

    fn note_on(&mut self, frequency: f32, amplitude: f32) {
        dispatch!(self, inner => inner.note_on(frequency, amplitude))
    }

    fn note_off(&mut self, amplitude: f32) {
        dispatch!(self, inner => inner.note_off(amplitude))
    }

    fn control_change(&mut self, number: u16, value: f32) {
        dispatch!(self, inner => inner.control_change(number, value))
    }

    #[inline]
    fn tick(&mut self) -> f32 {
        dispatch!(self, inner => inner.tick())
    }

    fn last_out(&self) -> f32 {
        dispatch!(self, inner => inner.last_out())
    }
}

macro_rules! impl_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for AnyInstrument {
                fn from(instrument: $variant) -> Self {
                    AnyInstrument::$variant(instrument)
                }
            }
        )*
    };
}

impl_from!(Plucked, Plucked2, Mandolin, Sitar, Drone, Flute, BowedBar, Shakers);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_bend_event_shifts_frequency() {
        let mut plucked = Plucked::new(44_100.0, 50.0);
        plucked.handle_event(ControlEvent::PitchBend {
            frequency: 220.0,
            semitones: 12.0,
        });
        assert!((plucked.frequency() - 440.0).abs() < 1e-3);
    }

    #[test]
    fn any_instrument_dispatches() {
        let mut instruments: Vec<AnyInstrument> = vec![
            Plucked::new(22_050.0, 50.0).into(),
            Sitar::new(22_050.0, 50.0).into(),
            Shakers::new(22_050.0).into(),
        ];
        for instrument in &mut instruments {
            instrument.handle_event(ControlEvent::NoteOn {
                frequency: 220.0,
                amplitude: 0.8,
            });
            let mut out = [0.0; 256];
            instrument.render(&mut out);
            assert!(out.iter().all(|x| x.is_finite()));
            assert_eq!(instrument.last_out(), out[255]);
        }
    }

    #[test]
    fn boxed_instruments_work() {
        let mut boxed: Box<dyn Instrument> = Box::new(Drone::new(22_050.0, 50.0));
        boxed.note_on(110.0, 1.0);
        let energy: f32 = (0..4_000).map(|_| boxed.tick().powi(2)).sum();
        assert!(energy > 0.0);
    }

    #[test]
    fn control_normalization_clamps() {
        assert_eq!(normalize_control("test", 64.0), 0.5);
        assert_eq!(normalize_control("test", 200.0), 1.0);
        assert_eq!(normalize_control("test", -3.0), 0.0);
        assert_eq!(clamp_amplitude("test", 1.5), 1.0);
        assert_eq!(checked_frequency("test", -1.0), 220.0);
    }
}
