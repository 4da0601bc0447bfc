use crate::instrument::control;
use crate::io::midi::{MidiEvent, PITCH_BEND_CENTER};
use crate::synth::message::SynthMessage;

/// Pitch-bend wheel range in semitones either side of centre.
pub const PITCH_BEND_RANGE: f32 = 12.0;

/// Translate a MIDI event into a [`SynthMessage`] on `channel_filter`.
///
/// Events on other channels and program changes are dropped. Channel
/// pressure becomes an aftertouch control change.
pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    if midi.channel() != channel_filter {
        return None;
    }
    let channel = channel_filter;
    match midi {
        MidiEvent::NoteOn { key, velocity, .. } => Some(SynthMessage::NoteOn {
            note: key as f32,
            velocity: velocity as f32,
            channel,
        }),
        MidiEvent::NoteOff { key, velocity, .. } => Some(SynthMessage::NoteOff {
            note: key as f32,
            velocity: velocity as f32,
            channel,
        }),
        MidiEvent::ControlChange { controller, value, .. } => Some(SynthMessage::ControlChange {
            number: controller as u16,
            value: value as f32,
            channel,
        }),
        MidiEvent::ChannelPressure { value, .. } => Some(SynthMessage::ControlChange {
            number: control::AFTERTOUCH,
            value: value as f32,
            channel,
        }),
        MidiEvent::PitchBend { value, .. } => Some(SynthMessage::PitchBend {
            semitones: pitch_bend_semitones(value),
            channel,
        }),
        MidiEvent::ProgramChange { program, .. } => {
            log::debug!("midi_to_synth: ignoring program change {program}");
            None
        }
    }
}

/// Map a 14-bit bend value onto `±PITCH_BEND_RANGE` semitones.
pub fn pitch_bend_semitones(value: u16) -> f32 {
    (value.min(16383) as f32 - PITCH_BEND_CENTER as f32) / PITCH_BEND_CENTER as f32 * PITCH_BEND_RANGE
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
