use crate::types::{ResampleError, Sample};
use std::str::FromStr;

/// Polynomial interpolation strategies
///
/// Every kernel reads a window of `support()` consecutive input samples and
/// an offset `x` in `(0, 1]` measured from window element `support() / 2 - 1`.
/// At `x == 1` the kernels evaluate at window element `support() / 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// Straight line between the two nearest samples
    Linear,
    /// Degree 5 Lagrange polynomial through six samples
    Lagrange,
    /// Degree 5 B-spline reconstruction from six control points
    BSpline,
}

impl Interpolation {
    /// Number of input samples the kernel reads (K)
    pub fn support(&self) -> usize {
        match self {
            Interpolation::Linear => 2,
            Interpolation::Lagrange | Interpolation::BSpline => 6,
        }
    }

    /// Delay of the kernel in input samples
    pub fn delay(&self) -> usize {
        self.support() / 2 - 1
    }

    /// Get human-readable name for the strategy
    pub fn name(&self) -> &'static str {
        match self {
            Interpolation::Linear => "linear",
            Interpolation::Lagrange => "lagrange",
            Interpolation::BSpline => "bspline",
        }
    }

    /// Get all available strategies
    pub fn all() -> &'static [Interpolation] {
        &[
            Interpolation::Linear,
            Interpolation::Lagrange,
            Interpolation::BSpline,
        ]
    }

    /// Evaluate the kernel
    ///
    /// `window` must hold exactly `support()` samples, oldest first.
    #[inline]
    pub fn interpolate<S: Sample>(&self, x: f64, window: &[S]) -> S {
        debug_assert_eq!(window.len(), self.support());
        match self {
            Interpolation::Linear => linear(x, window),
            Interpolation::Lagrange => lagrange(x, window),
            Interpolation::BSpline => bspline(x, window),
        }
    }
}

impl Default for Interpolation {
    fn default() -> Self {
        Interpolation::BSpline
    }
}

impl FromStr for Interpolation {
    type Err = ResampleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(Interpolation::Linear),
            "lagrange" => Ok(Interpolation::Lagrange),
            "bspline" | "b-spline" => Ok(Interpolation::BSpline),
            _ => Err(ResampleError::UnknownInterpolation(s.to_string())),
        }
    }
}

impl std::fmt::Display for Interpolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Written as a weighted sum so that `x == 1` returns `w[1]` bit for bit.
#[inline]
fn linear<S: Sample>(x: f64, w: &[S]) -> S {
    w[0].scale(1.0 - x) + w[1].scale(x)
}

#[inline]
fn horner<S: Sample>(x: f64, c: [S; 6]) -> S {
    ((((c[5].scale(x) + c[4]).scale(x) + c[3]).scale(x) + c[2]).scale(x) + c[1]).scale(x) + c[0]
}

// Six point kernels below use the window as y[-2] .. y[3] with x measured
// from y[0].

fn lagrange<S: Sample>(x: f64, w: &[S]) -> S {
    let (ym2, ym1, y0, y1, y2, y3) = (w[0], w[1], w[2], w[3], w[4], w[5]);
    let ym2py2 = ym2 + y2;
    let ym1py1 = ym1 + y1;

    let c0 = y0;
    let c1 = ym2.scale(1.0 / 20.0) - ym1.scale(0.5) - y0.scale(1.0 / 3.0) + y1
        - y2.scale(0.25)
        + y3.scale(1.0 / 30.0);
    let c2 = ym1py1.scale(2.0 / 3.0) - ym2py2.scale(1.0 / 24.0) - y0.scale(1.25);
    let c3 = y0.scale(5.0 / 12.0) - y1.scale(7.0 / 12.0) + y2.scale(7.0 / 24.0)
        - (ym2 + ym1 + y3).scale(1.0 / 24.0);
    let c4 = ym2py2.scale(1.0 / 24.0) - ym1py1.scale(1.0 / 6.0) + y0.scale(0.25);
    let c5 = (y3 - ym2).scale(1.0 / 120.0) + (ym1 - y2).scale(1.0 / 24.0)
        + (y1 - y0).scale(1.0 / 12.0);

    horner(x, [c0, c1, c2, c3, c4, c5])
}

fn bspline<S: Sample>(x: f64, w: &[S]) -> S {
    let (ym2, ym1, y0, y1, y2, y3) = (w[0], w[1], w[2], w[3], w[4], w[5]);
    let ym2py2 = ym2 + y2;
    let ym1py1 = ym1 + y1;
    let y2mym2 = y2 - ym2;
    let y1mym1 = y1 - ym1;
    let sixth_ym1py1 = ym1py1.scale(1.0 / 6.0);

    let c0 = ym2py2.scale(1.0 / 120.0) + ym1py1.scale(13.0 / 60.0) + y0.scale(11.0 / 20.0);
    let c1 = y2mym2.scale(1.0 / 24.0) + y1mym1.scale(5.0 / 12.0);
    let c2 = ym2py2.scale(1.0 / 12.0) + sixth_ym1py1 - y0.scale(0.5);
    let c3 = y2mym2.scale(1.0 / 12.0) - y1mym1.scale(1.0 / 6.0);
    let c4 = ym2py2.scale(1.0 / 24.0) - sixth_ym1py1 + y0.scale(0.25);
    let c5 = (y3 - ym2).scale(1.0 / 120.0) + (ym1 - y2).scale(1.0 / 24.0)
        + (y1 - y0).scale(1.0 / 12.0);

    horner(x, [c0, c1, c2, c3, c4, c5])
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: [f64; 6] = [0.3, -1.2, 2.5, 0.7, -0.4, 1.9];

    #[test]
    fn test_support_and_delay() {
        assert_eq!(Interpolation::Linear.support(), 2);
        assert_eq!(Interpolation::Linear.delay(), 0);
        assert_eq!(Interpolation::Lagrange.support(), 6);
        assert_eq!(Interpolation::BSpline.delay(), 2);
        assert_eq!(Interpolation::default(), Interpolation::BSpline);
    }

    #[test]
    fn test_linear() {
        let w = [1.0f64, 3.0];
        assert_eq!(Interpolation::Linear.interpolate(1.0, &w), 3.0);
        assert!((Interpolation::Linear.interpolate(0.25, &w) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_lagrange_hits_nodes() {
        let lagrange = Interpolation::Lagrange;
        assert!((lagrange.interpolate(1.0, &WINDOW) - WINDOW[3]).abs() < 1e-12);
        assert!((lagrange.interpolate(1e-15, &WINDOW) - WINDOW[2]).abs() < 1e-12);
    }

    #[test]
    fn test_lagrange_reproduces_quintic() {
        let p = |t: f64| 0.5 - t + 0.25 * t.powi(2) + 0.1 * t.powi(3) - 0.02 * t.powi(5);
        let window: Vec<f64> = (-2..=3).map(|t| p(t as f64)).collect();
        for x in [0.1, 0.37, 0.5, 0.9] {
            let y = Interpolation::Lagrange.interpolate(x, &window);
            assert!((y - p(x)).abs() < 1e-9, "x = {}", x);
        }
    }

    #[test]
    fn test_bspline_partition_of_unity() {
        let ones = [1.0f64; 6];
        for x in [0.05, 0.5, 0.75, 1.0] {
            let y = Interpolation::BSpline.interpolate(x, &ones);
            assert!((y - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_bspline_reproduces_lines() {
        // B-splines are not interpolating but reproduce linear ramps exactly
        let ramp: Vec<f64> = (-2..=3).map(|t| 2.0 * t as f64 + 1.0).collect();
        for x in [0.2, 0.6, 1.0] {
            let y = Interpolation::BSpline.interpolate(x, &ramp);
            assert!((y - (2.0 * x + 1.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_bspline_smooths_impulse() {
        let impulse = [0.0f64, 0.0, 1.0, 0.0, 0.0, 0.0];
        let y = Interpolation::BSpline.interpolate(1e-12, &impulse);
        assert!((y - 11.0 / 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("linear".parse::<Interpolation>(), Ok(Interpolation::Linear));
        assert_eq!("LAGRANGE".parse::<Interpolation>(), Ok(Interpolation::Lagrange));
        assert_eq!("b-spline".parse::<Interpolation>(), Ok(Interpolation::BSpline));
        assert!("sinc".parse::<Interpolation>().is_err());
    }
}
