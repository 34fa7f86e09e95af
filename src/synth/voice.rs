use std::f32::consts::TAU;

/// Voices at or below this frequency are silent.
pub const MIN_AUDIBLE_FREQ: f32 = 10.0;

/// A sine oscillator with an optional lifetime.
#[derive(Clone, Debug)]
pub struct ToneVoice {
    frequency: f32,
    volume: f32,
    phase: f32,
    /// Samples left before the voice retires itself, `None` = until removed
    remaining: Option<u64>,
}

impl ToneVoice {
    pub fn new(frequency: f32, volume: f32, remaining: Option<u64>) -> Self {
        Self {
            frequency,
            volume,
            phase: 0.0,
            remaining,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Retune without resetting the phase, so the waveform stays continuous.
    pub fn set_tone(&mut self, frequency: f32, volume: f32) {
        self.frequency = frequency;
        self.volume = volume;
    }

    pub fn is_audible(&self) -> bool {
        self.frequency > MIN_AUDIBLE_FREQ
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Add this voice's next `out.len()` samples into `out`.
    pub fn mix_into(&mut self, out: &mut [f32], sample_rate: u32) {
        let increment = self.frequency / sample_rate as f32;
        let mut frames = out.len() as u64;
        if let Some(remaining) = self.remaining.as_mut() {
            frames = frames.min(*remaining);
            *remaining -= frames;
        }

        if !self.is_audible() {
            return;
        }

        for sample in out.iter_mut().take(frames as usize) {
            *sample += (TAU * self.phase).sin() * self.volume;
            self.phase = (self.phase + increment).fract();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_sine() {
        let mut voice = ToneVoice::new(1000.0, 0.5, None);
        let mut out = vec![0.0; 8];
        voice.mix_into(&mut out, 8000);
        assert!(out[0].abs() < 1e-6);
        assert!((out[2] - 0.5).abs() < 1e-5);
        assert!((out[6] + 0.5).abs() < 1e-5);
    }

    #[test]
    fn low_frequencies_are_silent() {
        let mut voice = ToneVoice::new(5.0, 1.0, None);
        let mut out = vec![0.0; 16];
        voice.mix_into(&mut out, 8000);
        assert!(out.iter().all(|&s| s == 0.0));
        assert!(!voice.is_audible());
    }

    #[test]
    fn expires_after_duration() {
        let mut voice = ToneVoice::new(440.0, 1.0, Some(10));
        let mut out = vec![0.0; 16];
        voice.mix_into(&mut out, 8000);
        assert!(voice.is_expired());
        assert!(out[10..].iter().all(|&s| s == 0.0));
        assert!(out[1] != 0.0);
    }
}
