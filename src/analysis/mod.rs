pub mod band;
pub mod engine;
pub mod histogram;
pub mod notes;

pub use band::FrequencyBand;
pub use engine::{EngineSettings, FrequencyEngine};
pub use histogram::{Histogram, HistogramEntry};
pub use notes::NoteRange;
