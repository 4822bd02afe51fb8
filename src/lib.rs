//! Streaming arbitrary-ratio sample-rate conversion
//!
//! Blocks of any length go in, blocks of any length come out, and the
//! fractional position between the two sample grids is carried across calls
//! without drift. Downsampling runs an elliptic minimal Q-factor (EMQF) IIR
//! lowpass built from two parallel allpass chains ahead of a polynomial
//! interpolator; upsampling interpolates directly. No FFT and no long sinc
//! tables are involved.
//!
//! ```
//! use emqf_resampler::{Interpolation, ResamplePlan, Status};
//!
//! let mut plan = ResamplePlan::<f32>::new(Interpolation::BSpline, 44_100.0 / 48_000.0)?;
//! let mut input = vec![0.0f32; 480];
//! let mut output = vec![0.0f32; plan.next_output_len(input.len())];
//! assert_eq!(plan.execute(&mut input, &mut output), Status::Ok);
//! # Ok::<(), emqf_resampler::ResampleError>(())
//! ```

pub mod dsp;
pub mod ffi;
pub mod types;

pub use dsp::{
    AllpassFilterBank, EmqfPrototype, Interpolation, ResamplePlan, DEFAULT_PROTOTYPE, RATIO_LIMIT,
};
pub use types::{defaults, ResampleError, ResamplerConfig, Sample, Status};
