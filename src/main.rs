mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::BufWriter;
use std::path::Path;

use cli::Cli;
use config::SynthConfig;
use notewise::audio::{decode, AudioSource};
use notewise::synth::{self, voice_channel, VoiceId};
use notewise::tracker::{NoteFrame, NoteTracker, TrackSettings};

#[derive(Serialize)]
struct Report<'a> {
    input: String,
    sample_rate: u32,
    duration: f32,
    fps: u32,
    window: f32,
    frames: &'a [NoteFrame],
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect notewise.toml / global config
    let config_path = cli.config.clone().or_else(|| {
        let local = std::path::PathBuf::from("notewise.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("notewise").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("notewise").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });

    let mut synth_config = SynthConfig::default();
    if let Some(ref path) = config_path {
        if let Some(cfg) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            // Merge: config values apply only when CLI is at its default
            let analysis = cfg.analysis;
            if cli.min_freq == config::default_min_freq() { cli.min_freq = analysis.min_freq; }
            if cli.max_freq == config::default_max_freq() { cli.max_freq = analysis.max_freq; }
            if cli.window == config::default_window() { cli.window = analysis.window; }
            if cli.fps == config::default_fps() { cli.fps = analysis.fps; }
            if cli.max_notes == config::default_max_notes() { cli.max_notes = analysis.max_notes; }
            cli.keep_harmony |= analysis.keep_harmony;
            cli.phase_align |= analysis.phase_align;
            synth_config = cfg.synth;
        }
    }

    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }

    log::info!("notewise - note tracker");
    log::info!("Input: {}", cli.input.display());
    log::info!("Output: {}", cli.output.display());
    log::info!(
        "Domain: {:.1}-{:.1}Hz, window {:.3}s @ {}fps, up to {} notes",
        cli.min_freq, cli.max_freq, cli.window, cli.fps, cli.max_notes
    );

    // 1. Decode audio
    log::info!("Decoding audio...");
    let decoded = decode::decode_file(&cli.input)
        .with_context(|| format!("Failed to decode {}", cli.input.display()))?;
    let source = match cli.channel {
        Some(index) => decoded.select_channel(index)?,
        None => decoded.downmix(),
    };

    // 2. Track notes frame by frame
    let settings = TrackSettings {
        min_freq: cli.min_freq,
        max_freq: cli.max_freq,
        window: cli.window,
        fps: cli.fps,
        max_notes: cli.max_notes,
        keep_harmony: cli.keep_harmony,
        phase_align: cli.phase_align,
        channel: 0,
        record_histogram: cli.histogram,
    };
    let frames = track(&source, settings)?;

    let voiced = frames.iter().filter(|f| !f.notes.is_empty()).count();
    log::info!("Tracked {} frames, {} with notes", frames.len(), voiced);

    // 3. Write report
    write_report(&cli, &source, &frames)?;

    // 4. Resynthesize
    if let Some(ref path) = cli.synth {
        log::info!("Synthesizing tones...");
        let samples = synthesize(&frames, cli.max_notes, cli.fps, &synth_config);
        synth::wav::write_wav(path, synth_config.sample_rate, &samples)?;
    }

    log::info!("Done! Output: {}", cli.output.display());
    Ok(())
}

fn track(source: &AudioSource, settings: TrackSettings) -> Result<Vec<NoteFrame>> {
    let tracker = NoteTracker::new(source, settings);

    let pb = ProgressBar::new(tracker.frame_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")?
            .progress_chars("=>-"),
    );

    let mut frames = Vec::with_capacity(tracker.frame_count());
    for frame in tracker {
        log::debug!("{:8.3}s  {}", frame.time, describe(&frame));
        frames.push(frame);
        pb.inc(1);
    }

    pb.finish_with_message("Tracking complete");
    Ok(frames)
}

fn describe(frame: &NoteFrame) -> String {
    if frame.notes.is_empty() {
        return "-".into();
    }
    frame
        .notes
        .iter()
        .map(|n| format!("{} ({:.1}Hz, {:.4})", n.name(), n.freq, n.strength))
        .collect::<Vec<_>>()
        .join("  ")
}

fn write_report(cli: &Cli, source: &AudioSource, frames: &[NoteFrame]) -> Result<()> {
    let report = Report {
        input: cli.input.display().to_string(),
        sample_rate: source.sample_rate(),
        duration: source.duration(),
        fps: cli.fps,
        window: cli.window,
        frames,
    };

    let path: &Path = &cli.output;
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report: {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &report)
        .context("Failed to write report")?;

    log::info!("Wrote report to {}", path.display());
    Ok(())
}

/// One voice per note slot; slots without a note this frame fall silent.
fn synthesize(frames: &[NoteFrame], slots: usize, fps: u32, cfg: &SynthConfig) -> Vec<f32> {
    let (mut control, mut renderer) = voice_channel(cfg.sample_rate, slots);
    let voices: Vec<VoiceId> = (0..slots)
        .filter_map(|_| control.create_voice(0.0, 0.0, None))
        .collect();

    let frame_len = ((cfg.sample_rate as f64 / fps.max(1) as f64).round() as usize).max(1);
    let mut out = vec![0.0f32; frames.len() * frame_len];

    for (frame, chunk) in frames.iter().zip(out.chunks_mut(frame_len)) {
        for (slot, &id) in voices.iter().enumerate() {
            match frame.notes.get(slot) {
                Some(note) => {
                    control.set_tone(id, note.freq, (note.strength * cfg.gain).min(cfg.max_volume))
                }
                None => control.set_tone(id, 0.0, 0.0),
            };
        }
        renderer.render(chunk);
    }

    out
}
