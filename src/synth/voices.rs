use rtrb::{Consumer, Producer, RingBuffer};

use super::voice::ToneVoice;

const COMMAND_QUEUE_CAPACITY: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VoiceId(u32);

/// Changes to the voice set, sent from the control thread
#[derive(Clone, Debug, PartialEq)]
pub enum VoiceCommand {
    Create {
        id: VoiceId,
        frequency: f32,
        volume: f32,
        /// Lifetime in samples, `None` = until removed
        duration: Option<u64>,
    },
    SetTone {
        id: VoiceId,
        frequency: f32,
        volume: f32,
    },
    Remove {
        id: VoiceId,
    },
}

/// Control-thread handle for creating, retuning and removing voices.
pub struct VoiceControl {
    producer: Producer<VoiceCommand>,
    next_id: u32,
    sample_rate: u32,
}

/// Callback-side owner of the voices.
pub struct VoiceRenderer {
    consumer: Consumer<VoiceCommand>,
    voices: Vec<(VoiceId, ToneVoice)>,
    max_voices: usize,
    sample_rate: u32,
}

/// Create the two ends of a voice set rendering at `sample_rate`.
pub fn voice_channel(sample_rate: u32, max_voices: usize) -> (VoiceControl, VoiceRenderer) {
    let (producer, consumer) = RingBuffer::new(COMMAND_QUEUE_CAPACITY);
    (
        VoiceControl {
            producer,
            next_id: 0,
            sample_rate,
        },
        VoiceRenderer {
            consumer,
            voices: Vec::with_capacity(max_voices),
            max_voices,
            sample_rate,
        },
    )
}

impl VoiceControl {
    /// Queue a new voice. `duration` is in seconds; `None` keeps it until
    /// [`remove_voice`](Self::remove_voice). Returns `None` when the command
    /// queue is full.
    pub fn create_voice(&mut self, frequency: f32, volume: f32, duration: Option<f32>) -> Option<VoiceId> {
        let id = VoiceId(self.next_id);
        let duration = duration.map(|secs| (secs.max(0.0) as f64 * self.sample_rate as f64).round() as u64);
        if !self.send(VoiceCommand::Create {
            id,
            frequency,
            volume,
            duration,
        }) {
            return None;
        }
        self.next_id = self.next_id.wrapping_add(1);
        Some(id)
    }

    pub fn set_tone(&mut self, id: VoiceId, frequency: f32, volume: f32) -> bool {
        self.send(VoiceCommand::SetTone {
            id,
            frequency,
            volume,
        })
    }

    pub fn remove_voice(&mut self, id: VoiceId) -> bool {
        self.send(VoiceCommand::Remove { id })
    }

    fn send(&mut self, command: VoiceCommand) -> bool {
        match self.producer.push(command) {
            Ok(()) => true,
            Err(_) => {
                log::warn!("Voice command queue full, dropping command");
                false
            }
        }
    }
}

impl VoiceRenderer {
    /// Apply pending commands, then overwrite `out` with the mix of every
    /// audible voice. The mix is divided by the number of audible voices.
    pub fn render(&mut self, out: &mut [f32]) {
        self.apply_commands();

        out.fill(0.0);
        let mut audible = 0;
        for (_, voice) in self.voices.iter_mut() {
            if voice.is_audible() {
                audible += 1;
            }
            voice.mix_into(out, self.sample_rate);
        }

        if audible > 1 {
            let scale = 1.0 / audible as f32;
            for sample in out.iter_mut() {
                *sample *= scale;
            }
        }

        self.voices.retain(|(_, voice)| !voice.is_expired());
    }

    fn apply_commands(&mut self) {
        while let Ok(command) = self.consumer.pop() {
            match command {
                VoiceCommand::Create {
                    id,
                    frequency,
                    volume,
                    duration,
                } => {
                    // Never grow past the capacity reserved up front.
                    if self.voices.len() < self.max_voices {
                        self.voices.push((id, ToneVoice::new(frequency, volume, duration)));
                    }
                }
                VoiceCommand::SetTone {
                    id,
                    frequency,
                    volume,
                } => {
                    if let Some((_, voice)) = self.voices.iter_mut().find(|(v, _)| *v == id) {
                        voice.set_tone(frequency, volume);
                    }
                }
                VoiceCommand::Remove { id } => {
                    self.voices.retain(|(v, _)| *v != id);
                }
            }
        }
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
