use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub synth: SynthConfig,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_min_freq")]
    pub min_freq: f32,
    #[serde(default = "default_max_freq")]
    pub max_freq: f32,
    #[serde(default = "default_window")]
    pub window: f32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_max_notes")]
    pub max_notes: usize,
    #[serde(default)]
    pub keep_harmony: bool,
    #[serde(default)]
    pub phase_align: bool,
}

#[derive(Debug, Deserialize)]
pub struct SynthConfig {
    /// Multiplier from note strength to voice volume
    #[serde(default = "default_gain")]
    pub gain: f32,
    #[serde(default = "default_max_volume")]
    pub max_volume: f32,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_freq: default_min_freq(),
            max_freq: default_max_freq(),
            window: default_window(),
            fps: default_fps(),
            max_notes: default_max_notes(),
            keep_harmony: false,
            phase_align: false,
        }
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            gain: default_gain(),
            max_volume: default_max_volume(),
            sample_rate: default_sample_rate(),
        }
    }
}

pub fn default_min_freq() -> f32 { 20.0 }
pub fn default_max_freq() -> f32 { 5000.0 }
pub fn default_window() -> f32 { 0.125 }
pub fn default_fps() -> u32 { 12 }
pub fn default_max_notes() -> usize { 4 }
pub fn default_gain() -> f32 { 20.0 }
pub fn default_max_volume() -> f32 { 0.8 }
pub fn default_sample_rate() -> u32 { 44100 }

pub fn read_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
}

/// Config at `path`, or `None` after a single warning when it cannot be used.
pub fn load_config(path: &Path) -> Option<Config> {
    match read_config(path) {
        Ok(config) => Some(config),
        Err(err) => {
            log::warn!("{:#}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.analysis.min_freq, 20.0);
        assert_eq!(config.analysis.max_freq, 5000.0);
        assert_eq!(config.analysis.fps, 12);
        assert_eq!(config.analysis.max_notes, 4);
        assert!(!config.analysis.keep_harmony);
        assert_eq!(config.synth.sample_rate, 44100);
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            max_freq = 2000.0
            keep_harmony = true

            [synth]
            gain = 10.0
            "#,
        )
        .unwrap();
        assert_eq!(config.analysis.max_freq, 2000.0);
        assert_eq!(config.analysis.window, 0.125);
        assert!(config.analysis.keep_harmony);
        assert_eq!(config.synth.gain, 10.0);
        assert_eq!(config.synth.max_volume, 0.8);
    }

    #[test]
    fn unreadable_or_invalid_files_are_ignored() {
        assert!(load_config(Path::new("/no/such/notewise.toml")).is_none());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[analysis]\nfps = \"fast\"\n").unwrap();
        assert!(load_config(&path).is_none());
    }

    #[test]
    fn read_errors_name_the_file() {
        let missing = read_config(Path::new("/no/such/notewise.toml")).unwrap_err();
        assert!(format!("{:#}", missing).contains("/no/such/notewise.toml"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[synth]\ngain = [1, 2]\n").unwrap();
        let invalid = read_config(&path).unwrap_err();
        let message = format!("{:#}", invalid);
        assert!(message.starts_with("Invalid config"));
        assert!(message.contains("bad.toml"));
    }
}
