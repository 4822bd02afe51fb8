pub mod allpass;
pub mod clock;
pub mod coefficients;
pub mod emqf;
pub mod interpolate;
pub mod resampler;

// Re-export commonly used types
pub use clock::RATIO_LIMIT;
pub use coefficients::{EmqfPrototype, DEFAULT_PROTOTYPE};
pub use emqf::AllpassFilterBank;
pub use interpolate::Interpolation;
pub use resampler::ResamplePlan;
