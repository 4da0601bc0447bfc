//! waveguide - plays a mandolin arpeggio through a JC reverb
//!
//! Run with: cargo run --bin waveguide
//! Set `RUST_LOG=debug` to watch voice allocation.

mod app;

use std::time::Duration;

use app::App;
use tracing_subscriber::EnvFilter;
use waveguide_synth::synth::SynthMessage;

const ARPEGGIO: [f32; 8] = [55.0, 59.0, 62.0, 67.0, 71.0, 67.0, 62.0, 59.0];

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut app = App::start(4)?;
    let step = Duration::from_millis(180);

    for round in 0..4 {
        for &note in &ARPEGGIO {
            let note = note + if round % 2 == 1 { 5.0 } else { 0.0 };
            app.send(SynthMessage::NoteOn {
                note,
                velocity: 100.0,
                channel: 0,
            });
            std::thread::sleep(step);
            app.send(SynthMessage::NoteOff {
                note,
                velocity: 64.0,
                channel: 0,
            });
        }
    }

    app.send(SynthMessage::AllNotesOff);
    // Let the reverb tail ring out.
    std::thread::sleep(Duration::from_secs(3));
    Ok(())
}
