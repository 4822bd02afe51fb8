use num_complex::Complex;
use std::ops::{Add, Sub};

/// A value carried through the resampler.
///
/// Filtering and interpolation only ever form linear combinations of
/// samples with real weights, so a sample type needs addition, subtraction
/// and scaling by an `f64`. Complex samples are processed component-wise,
/// which is what the allpass structure does for split real/imaginary data.
pub trait Sample:
    Copy + Default + PartialEq + Add<Output = Self> + Sub<Output = Self> + Send + 'static
{
    /// Multiply by a real weight
    fn scale(self, gain: f64) -> Self;

    /// The additive identity
    #[inline]
    fn zero() -> Self {
        Self::default()
    }
}

impl Sample for f32 {
    #[inline]
    fn scale(self, gain: f64) -> Self {
        self * gain as f32
    }
}

impl Sample for f64 {
    #[inline]
    fn scale(self, gain: f64) -> Self {
        self * gain
    }
}

impl Sample for Complex<f32> {
    #[inline]
    fn scale(self, gain: f64) -> Self {
        Complex::new(self.re.scale(gain), self.im.scale(gain))
    }
}

impl Sample for Complex<f64> {
    #[inline]
    fn scale(self, gain: f64) -> Self {
        Complex::new(self.re * gain, self.im * gain)
    }
}
