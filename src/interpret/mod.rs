//! Turns a strength histogram into a short list of notes.

pub mod interpreter;
pub mod loudness;

pub use interpreter::{Interpreter, Note};
