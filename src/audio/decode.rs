use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::error::{AudioError, AudioResult};
use super::source::AudioSource;

/// Decode an audio file (WAV, MP3, FLAC, OGG, AAC) into per-channel buffers.
pub fn decode_file(path: &Path) -> AudioResult<AudioSource> {
    let file = std::fs::File::open(path).map_err(|source| AudioError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AudioError::Probe(e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AudioError::NoTrack)?;

    let track_id = track.id;
    let declared_channels = track.codec_params.channels.map_or(1, |c| c.count());
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(AudioError::UnknownSampleRate)?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decoder(e.to_string()))?;

    let mut channels: Vec<Vec<f32>> = vec![Vec::new(); declared_channels];

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::debug!("Skipping undecodable packet: {}", msg);
                continue;
            }
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        let spec = *decoded.spec();
        let count = spec.channels.count().max(1);
        if count != channels.len() {
            log::warn!("Channel count changed mid-stream: {} -> {}", channels.len(), count);
        }

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.frames() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        append_frames(&mut channels, sample_buf.samples(), count);
    }

    let audio = AudioSource::new(sample_rate, channels);

    log::info!(
        "Decoded audio: {} samples x {} channels, {}Hz, {:.1}s",
        audio.len(),
        audio.channel_count(),
        sample_rate,
        audio.duration()
    );

    Ok(audio)
}

/// Deinterleave `count`-channel frames onto `channels`. Channels that appear
/// or go missing mid-stream are padded with silence so all stay aligned.
fn append_frames(channels: &mut Vec<Vec<f32>>, interleaved: &[f32], count: usize) {
    if count > channels.len() {
        let len = channels.iter().map(Vec::len).max().unwrap_or(0);
        channels.resize(count, vec![0.0; len]);
    }

    for frame in interleaved.chunks(count) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample.clamp(-1.0, 1.0));
        }
    }

    let len = channels.iter().map(Vec::len).max().unwrap_or(0);
    for channel in channels.iter_mut() {
        channel.resize(len, 0.0);
    }
}
