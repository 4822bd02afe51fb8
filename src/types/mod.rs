pub mod config;
pub mod sample;
pub mod status;

// Re-export commonly used types
pub use config::{defaults, ResamplerConfig};
pub use sample::Sample;
pub use status::{ResampleError, Status};
