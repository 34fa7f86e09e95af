//! Audio loading error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while turning a file into an [`AudioSource`](super::AudioSource)
#[derive(Error, Debug)]
pub enum AudioError {
    /// The file could not be opened
    #[error("Failed to open audio file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No demuxer recognized the container
    #[error("Failed to probe audio format: {0}")]
    Probe(String),

    /// The container holds no decodable track
    #[error("No audio tracks found")]
    NoTrack,

    /// The track does not declare its sample rate
    #[error("Unknown sample rate")]
    UnknownSampleRate,

    /// No decoder is available for the track's codec
    #[error("Failed to create audio decoder: {0}")]
    Decoder(String),

    /// A packet could not be read or decoded
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// A channel index past the last channel was requested
    #[error("Channel {index} out of range ({count} channels)")]
    ChannelOutOfRange { index: usize, count: usize },
}

/// Result type for audio loading
pub type AudioResult<T> = Result<T, AudioError>;
