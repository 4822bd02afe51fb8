use crate::dsp::coefficients::{EmqfPrototype, DEFAULT_PROTOTYPE};
use crate::dsp::Interpolation;
use super::ResampleError;

/// Default resampler configuration values
pub mod defaults {
    use crate::dsp::Interpolation;

    /// Interpolation used when none is given
    pub const INTERPOLATION: Interpolation = Interpolation::BSpline;

    /// Anti-aliasing passband edge as a fraction of the target Nyquist frequency
    pub const PASSBAND_FRACTION: f64 = 0.92;

    /// Ratios below this engage the anti-aliasing filter
    pub const DOWNSAMPLING_THRESHOLD: f64 = 0.95;
}

/// Resampling plan configuration
#[derive(Debug, Clone)]
pub struct ResamplerConfig {
    /// Polynomial interpolation strategy
    pub interpolation: Interpolation,
    /// Passband edge of the anti-aliasing filter relative to the target Nyquist
    pub passband_fraction: f64,
    /// Ratio below which the anti-aliasing filter is used
    pub downsampling_threshold: f64,
    /// Output samples that may be held back for the next call.
    /// `None` sizes it from the ratio and the kernel support.
    pub holdover_capacity: Option<usize>,
    /// Halfband prototype the filter bank is derived from
    pub prototype: &'static EmqfPrototype,
}

impl Default for ResamplerConfig {
    fn default() -> Self {
        Self {
            interpolation: defaults::INTERPOLATION,
            passband_fraction: defaults::PASSBAND_FRACTION,
            downsampling_threshold: defaults::DOWNSAMPLING_THRESHOLD,
            holdover_capacity: None,
            prototype: &DEFAULT_PROTOTYPE,
        }
    }
}

impl ResamplerConfig {
    pub fn with_interpolation(interpolation: Interpolation) -> Self {
        Self {
            interpolation,
            ..Self::default()
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ResampleError> {
        if !(self.passband_fraction > 0.0 && self.passband_fraction <= 1.0) {
            return Err(ResampleError::InvalidConfig(format!(
                "passband fraction {} is outside (0, 1]",
                self.passband_fraction
            )));
        }

        if !(self.downsampling_threshold.is_finite() && self.downsampling_threshold >= 0.0) {
            return Err(ResampleError::InvalidConfig(format!(
                "downsampling threshold {} must be finite and non-negative",
                self.downsampling_threshold
            )));
        }

        // A filter engaged at the threshold would put its edge at or above Nyquist
        if self.downsampling_threshold * self.passband_fraction > 1.0 {
            log::warn!(
                "Downsampling threshold {} with passband fraction {} can place the filter edge above Nyquist",
                self.downsampling_threshold,
                self.passband_fraction
            );
        }

        self.prototype
            .validate()
            .map_err(ResampleError::InvalidConfig)?;

        Ok(())
    }
}
