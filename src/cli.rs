use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "notewise", about = "Track the notes sounding in an audio file, frame by frame")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG)
    pub input: PathBuf,

    /// Output JSON report of the notes of every frame
    #[arg(short, long, default_value = "notes.json")]
    pub output: PathBuf,

    /// Lowest tracked frequency (Hz)
    #[arg(long, default_value_t = 20.0)]
    pub min_freq: f32,

    /// Highest tracked frequency (Hz)
    #[arg(long, default_value_t = 5000.0)]
    pub max_freq: f32,

    /// Analysis window width in seconds
    #[arg(short, long, default_value_t = 0.125)]
    pub window: f32,

    /// Analysis frames per second
    #[arg(long, default_value_t = 12)]
    pub fps: u32,

    /// Maximum number of simultaneous notes
    #[arg(short = 'n', long, default_value_t = 4)]
    pub max_notes: usize,

    /// Lower the neighbours of strong notes before extraction
    #[arg(long)]
    pub keep_harmony: bool,

    /// Compensate small pitch bends by realigning the phase of each period
    #[arg(long)]
    pub phase_align: bool,

    /// Analyze a single channel instead of the mono downmix
    #[arg(long)]
    pub channel: Option<usize>,

    /// Render the extracted notes as tones into this WAV file
    #[arg(long)]
    pub synth: Option<PathBuf>,

    /// Include the raw strength histogram of every frame in the report
    #[arg(long)]
    pub histogram: bool,

    /// Config file (default: ./notewise.toml or ~/.config/notewise/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
