//! Polyphonic note tracking for live display and resynthesis.
//!
//! [`analysis::FrequencyEngine`] keeps one incremental analysis state per
//! musical note and refreshes a strength histogram as a cursor moves over
//! the audio. [`interpret::Interpreter`] turns that histogram into a short
//! list of notes, and [`tracker::NoteTracker`] runs both once per frame.

pub mod analysis;
pub mod audio;
pub mod interpret;
pub mod sort;
pub mod synth;
pub mod tracker;
