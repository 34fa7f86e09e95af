//! Tone synthesis for the extracted notes.
//!
//! The control thread owns a [`VoiceControl`] and the audio callback owns
//! the matching [`VoiceRenderer`]. Voice changes travel as commands through
//! a wait-free single-producer/single-consumer ring buffer, so the voice
//! set is only ever touched by the thread that renders it.

pub mod voice;
pub mod voices;
pub mod wav;

pub use voice::ToneVoice;
pub use voices::{voice_channel, VoiceCommand, VoiceControl, VoiceId, VoiceRenderer};
