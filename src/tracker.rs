//! Frame-by-frame note tracking over a whole audio source.

use serde::Serialize;

use crate::analysis::{EngineSettings, FrequencyEngine};
use crate::audio::AudioSource;
use crate::interpret::{Interpreter, Note};

#[derive(Clone, Debug)]
pub struct TrackSettings {
    pub min_freq: f32,
    pub max_freq: f32,
    /// Analysis window, seconds
    pub window: f32,
    pub fps: u32,
    pub max_notes: usize,
    pub keep_harmony: bool,
    pub phase_align: bool,
    pub channel: usize,
    /// Attach the raw histogram to every frame
    pub record_histogram: bool,
}

impl Default for TrackSettings {
    fn default() -> Self {
        Self {
            min_freq: 20.0,
            max_freq: 5000.0,
            window: 0.125,
            fps: 12,
            max_notes: 4,
            keep_harmony: false,
            phase_align: false,
            channel: 0,
            record_histogram: false,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct NoteFrame {
    /// Seconds from the start of the audio
    pub time: f32,
    pub notes: Vec<Note>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram: Option<Vec<f32>>,
}

/// Yields one [`NoteFrame`] per `1 / fps` seconds of audio.
///
/// Each frame works on a copy of the engine's histogram, so the loudness
/// correction is applied exactly once per frame and the engine keeps raw
/// strengths for bands that do not move between frames.
pub struct NoteTracker<'a> {
    engine: FrequencyEngine<'a>,
    interpreter: Interpreter,
    settings: TrackSettings,
    step: i64,
}

impl<'a> NoteTracker<'a> {
    pub fn new(audio: &'a AudioSource, settings: TrackSettings) -> Self {
        let mut engine = FrequencyEngine::new(
            audio,
            EngineSettings {
                channel: settings.channel,
                phase_align: settings.phase_align,
            },
        );
        engine.configure(settings.min_freq, settings.max_freq, settings.window);
        engine.seek(0.0);

        let fps = settings.fps.max(1);
        let step = ((audio.sample_rate() as f64 / fps as f64).round() as i64).max(1);

        Self {
            engine,
            interpreter: Interpreter::new(),
            settings,
            step,
        }
    }

    /// Samples between two frames
    pub fn step(&self) -> i64 {
        self.step
    }

    /// Total number of frames the tracker yields from the start.
    pub fn frame_count(&self) -> usize {
        let len = self.engine.sample_count() as i64;
        ((len + self.step - 1) / self.step) as usize
    }
}

impl Iterator for NoteTracker<'_> {
    type Item = NoteFrame;

    fn next(&mut self) -> Option<NoteFrame> {
        if self.engine.is_finished() {
            return None;
        }

        let mut histogram = self.engine.histogram().clone();
        self.interpreter.adjust_to_human_hear(&mut histogram);
        if self.settings.keep_harmony {
            self.interpreter.keep_harmony(&mut histogram);
        }
        let notes = self
            .interpreter
            .extract_notes(&histogram, self.settings.max_notes);

        let frame = NoteFrame {
            time: self.engine.cursor_seconds(),
            notes,
            histogram: self
                .settings
                .record_histogram
                .then(|| self.engine.histogram().values().collect()),
        };

        self.engine.advance_samples(self.step);
        Some(frame)
    }
}
