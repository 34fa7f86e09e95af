use crate::audio::AudioSource;

use super::band::FrequencyBand;
use super::histogram::Histogram;
use super::notes::notes_in_domain;

#[derive(Clone, Copy, Debug, Default)]
pub struct EngineSettings {
    /// Channel of the audio source to analyze
    pub channel: usize,
    /// Rotate each stored period by the accumulated phase drift before
    /// summing it, so slightly bent notes stay coherent across the window.
    ///
    /// Drift is measured against the first period analyzed after a rebase,
    /// so aligned strengths depend on where the last rebase happened. A
    /// `seek` that rebases discards that history.
    pub phase_align: bool,
}

/// Tracks the strength of every note in a frequency domain while a cursor
/// moves over the audio.
pub struct FrequencyEngine<'a> {
    audio: &'a AudioSource,
    settings: EngineSettings,
    min_freq: f32,
    max_freq: f32,
    window_width: f32,
    bands: Vec<FrequencyBand>,
    histogram: Histogram,
    generation: u64,
    cursor: i64,
}

impl<'a> FrequencyEngine<'a> {
    /// An engine with no tracked bands; call [`configure`](Self::configure) next.
    pub fn new(audio: &'a AudioSource, settings: EngineSettings) -> Self {
        Self {
            audio,
            settings,
            min_freq: 0.0,
            max_freq: 0.0,
            window_width: 0.0,
            bands: Vec::new(),
            histogram: Histogram::default(),
            generation: 0,
            cursor: 0,
        }
    }

    /// Track every note with its mid frequency in `[min_freq, max_freq]`
    /// over windows of `window_width` seconds, and rewind to the start.
    pub fn configure(&mut self, min_freq: f32, max_freq: f32, window_width: f32) {
        self.min_freq = min_freq;
        self.max_freq = max_freq;
        self.window_width = window_width;
        self.cursor = 0;
        self.rebuild();
    }

    pub fn set_freq_domain(&mut self, min_freq: f32, max_freq: f32) {
        if min_freq != self.min_freq || max_freq != self.max_freq {
            self.min_freq = min_freq;
            self.max_freq = max_freq;
            self.rebuild();
        }
    }

    pub fn set_window_width(&mut self, seconds: f32) {
        if seconds != self.window_width {
            self.window_width = seconds;
            self.rebuild();
        }
    }

    fn rebuild(&mut self) {
        let rate = self.audio.sample_rate();
        let audio_len = self.sample_count() as u64;
        let window_len = (self.window_width.max(0.0) as f64 * rate as f64).round() as i64;

        self.bands = notes_in_domain(self.min_freq, self.max_freq)
            .into_iter()
            .map(|note| FrequencyBand::new(note, rate, window_len, audio_len))
            .collect();

        self.generation += 1;
        self.histogram = Histogram::new(self.bands.iter().map(FrequencyBand::freq), self.generation);

        let inert = self.bands.iter().filter(|b| b.is_inert()).count();
        log::info!(
            "Tracking {} bands in {:.2}-{:.2}Hz, window {:.3}s ({} inert)",
            self.bands.len(),
            self.min_freq,
            self.max_freq,
            self.window_width,
            inert
        );
    }

    /// Jump to `time` seconds from the start of the audio.
    pub fn seek(&mut self, time: f32) {
        self.seek_samples(self.seconds_to_samples(time));
    }

    /// Positions outside the audio are clamped to `[0, len]`.
    pub fn seek_samples(&mut self, position: i64) {
        self.cursor = self.clamp_cursor(position);
        self.update_all();
    }

    /// Move forward by `duration` seconds.
    pub fn advance(&mut self, duration: f32) {
        self.advance_samples(self.seconds_to_samples(duration));
    }

    pub fn advance_samples(&mut self, count: i64) {
        self.cursor = self.clamp_cursor(self.cursor.saturating_add(count));
        self.update_all();
    }

    fn clamp_cursor(&self, position: i64) -> i64 {
        position.clamp(0, self.sample_count() as i64)
    }

    fn update_all(&mut self) {
        let samples = self.samples();
        let cursor = self.cursor;
        let phase_align = self.settings.phase_align;
        for (i, band) in self.bands.iter_mut().enumerate() {
            if let Some(strength) = band.update(samples, cursor, phase_align) {
                self.histogram.set_value(i, strength);
            }
        }
    }

    fn samples(&self) -> &'a [f32] {
        self.audio.read(self.settings.channel).unwrap_or(&[])
    }

    fn seconds_to_samples(&self, seconds: f32) -> i64 {
        (seconds as f64 * self.audio.sample_rate() as f64).round() as i64
    }

    /// Current position in samples
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn cursor_seconds(&self) -> f32 {
        let rate = self.audio.sample_rate();
        if rate == 0 {
            return 0.0;
        }
        self.cursor as f32 / rate as f32
    }

    /// Length of the analyzed channel; 0 when the channel does not exist.
    pub fn sample_count(&self) -> usize {
        self.samples().len()
    }

    /// True once the cursor moved past the last sample.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.sample_count() as i64
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub fn bands(&self) -> &[FrequencyBand] {
        &self.bands
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }
}
