use anyhow::{Context, Result};
use std::path::Path;

/// Write mono samples as 16-bit PCM.
pub fn write_wav(path: &Path, sample_rate: u32, samples: &[f32]) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    for &sample in samples {
        let scaled = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(scaled).context("Failed to write sample")?;
    }

    writer.finalize().context("Failed to finalize WAV")?;

    log::info!(
        "Wrote {} samples ({:.1}s) to {}",
        samples.len(),
        samples.len() as f32 / sample_rate as f32,
        path.display()
    );
    Ok(())
}
