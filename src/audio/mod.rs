pub mod decode;
pub mod error;
pub mod source;

pub use error::{AudioError, AudioResult};
pub use source::AudioSource;
