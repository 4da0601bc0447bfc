// Purpose: voice management and polyphony
// This layer sits above the instruments and routes notes to them

pub mod manager;
pub mod message;
pub mod voice;

pub use manager::{VoiceManager, NO_VOICE};
pub use message::{MessageReceiver, SynthMessage};
pub use voice::{Voice, VoiceState};
