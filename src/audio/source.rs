use super::error::{AudioError, AudioResult};

/// Decoded audio held in memory, one sample buffer per channel.
///
/// Samples are normalized to `[-1, 1]`. The source is immutable once built;
/// analysis borrows it for as long as it runs.
#[derive(Clone, Debug)]
pub struct AudioSource {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioSource {
    /// Build a source from per-channel buffers. Channels longer than the
    /// shortest one are truncated so every channel has the same length.
    pub fn new(sample_rate: u32, mut channels: Vec<Vec<f32>>) -> Self {
        let len = channels.iter().map(Vec::len).min().unwrap_or(0);
        for channel in &mut channels {
            channel.truncate(len);
        }
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self::new(sample_rate, vec![samples])
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples per channel
    pub fn len(&self) -> u64 {
        self.channels.first().map_or(0, |c| c.len() as u64)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn read(&self, channel: usize) -> Option<&[f32]> {
        self.channels.get(channel).map(Vec::as_slice)
    }

    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.len() as f32 / self.sample_rate as f32
    }

    /// Average every channel into a single one.
    pub fn downmix(&self) -> AudioSource {
        if self.channels.len() <= 1 {
            return self.clone();
        }
        let scale = 1.0 / self.channels.len() as f32;
        let mono = (0..self.len() as usize)
            .map(|i| self.channels.iter().map(|c| c[i]).sum::<f32>() * scale)
            .collect();
        AudioSource::mono(self.sample_rate, mono)
    }

    /// Keep a single channel.
    pub fn select_channel(&self, index: usize) -> AudioResult<AudioSource> {
        let samples = self.read(index).ok_or(AudioError::ChannelOutOfRange {
            index,
            count: self.channels.len(),
        })?;
        Ok(AudioSource::mono(self.sample_rate, samples.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_to_shortest_channel() {
        let audio = AudioSource::new(8000, vec![vec![0.1; 10], vec![0.2; 7]]);
        assert_eq!(audio.len(), 7);
        assert_eq!(audio.read(0).unwrap().len(), 7);
        assert_eq!(audio.channel_count(), 2);
    }

    #[test]
    fn downmix_averages_channels() {
        let audio = AudioSource::new(8000, vec![vec![1.0, 0.5], vec![0.0, -0.5]]);
        let mono = audio.downmix();
        assert_eq!(mono.channel_count(), 1);
        assert_eq!(mono.read(0).unwrap(), &[0.5, 0.0]);
    }

    #[test]
    fn select_channel_out_of_range() {
        let audio = AudioSource::mono(8000, vec![0.0; 4]);
        assert!(audio.select_channel(0).is_ok());
        assert!(matches!(
            audio.select_channel(2),
            Err(AudioError::ChannelOutOfRange { index: 2, count: 1 })
        ));
    }

    #[test]
    fn empty_source() {
        let audio = AudioSource::new(44100, Vec::new());
        assert!(audio.is_empty());
        assert_eq!(audio.duration(), 0.0);
        assert!(audio.read(0).is_none());
    }
}
