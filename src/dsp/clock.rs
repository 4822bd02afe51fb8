//! Input/output position bookkeeping
//!
//! Output sample `m` sits at input time `m / ratio`. Rather than summing
//! `1 / ratio` into a floating phase, the clock counts consumed inputs and
//! produced outputs and derives every position from the two counters. When
//! the ratio is an exact fraction `num / den` all position arithmetic is done
//! in integers and the counters are folded back by whole periods each call,
//! so nothing drifts no matter how the stream is cut.

/// Largest denominator tried when recognising a ratio as a fraction
const MAX_DENOMINATOR: u64 = 1 << 24;

/// Ratios must lie in `[1 / RATIO_LIMIT, RATIO_LIMIT]`
pub const RATIO_LIMIT: f64 = (1u64 << 32) as f64;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    /// `ratio == num / den` exactly
    Exact { num: u64, den: u64 },
    Approx(f64),
}

#[derive(Debug, Clone)]
pub struct SampleClock {
    ratio: f64,
    step: Step,
    consumed: u64,
    produced: u64,
    /// Running totals, never folded
    total_consumed: u64,
    total_produced: u64,
}

impl SampleClock {
    /// `ratio` must be positive and finite
    pub fn new(ratio: f64) -> Self {
        let step = match as_fraction(ratio) {
            Some((num, den)) => Step::Exact { num, den },
            None => Step::Approx(ratio),
        };
        Self {
            ratio,
            step,
            consumed: 0,
            produced: 0,
            total_consumed: 0,
            total_produced: 0,
        }
    }

    /// Clock for a conversion between two integer rates, both nonzero
    pub fn from_rates(source: u64, target: u64) -> Self {
        let g = gcd(source, target);
        let (num, den) = (target / g, source / g);
        Self {
            ratio: num as f64 / den as f64,
            step: Step::Exact { num, den },
            consumed: 0,
            produced: 0,
            total_consumed: 0,
            total_produced: 0,
        }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// `(num, den)` when the ratio is tracked as an exact fraction
    pub fn fraction(&self) -> Option<(u64, u64)> {
        match self.step {
            Step::Exact { num, den } => Some((num, den)),
            Step::Approx(_) => None,
        }
    }

    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn produced(&self) -> u64 {
        self.produced
    }

    /// Inputs consumed since creation or the last reset
    pub fn total_consumed(&self) -> u64 {
        self.total_consumed
    }

    /// Outputs computed since creation or the last reset
    pub fn total_produced(&self) -> u64 {
        self.total_produced
    }

    /// Input time of the next output relative to the next input
    pub fn phase(&self) -> f64 {
        match self.step {
            Step::Exact { num, den } => {
                let t = self.produced as i128 * den as i128 - self.consumed as i128 * num as i128;
                t as f64 / num as f64
            }
            Step::Approx(ratio) => self.produced as f64 / ratio - self.consumed as f64,
        }
    }

    /// Number of outputs whose newest input has an index below `inputs`
    ///
    /// Output `m` needs input `ceil(m / ratio)`, so this is
    /// `floor((inputs - 1) * ratio) + 1`.
    fn span(&self, inputs: u64) -> u64 {
        if inputs == 0 {
            return 0;
        }
        match self.step {
            Step::Exact { num, den } => {
                clamp_u64((inputs - 1) as u128 * num as u128 / den as u128).saturating_add(1)
            }
            Step::Approx(ratio) => (((inputs - 1) as f64 * ratio).floor() as u64).saturating_add(1),
        }
    }

    /// Outputs that become computable once `lin` more inputs are consumed
    pub fn outputs_for(&self, lin: u64) -> u64 {
        self.span(self.consumed.saturating_add(lin))
            .saturating_sub(self.produced)
    }

    /// Fewest further inputs that make `lout` more outputs computable
    pub fn inputs_for(&self, lout: u64) -> u64 {
        if lout == 0 {
            return 0;
        }
        let target = self.produced.saturating_add(lout);
        let total = match self.step {
            Step::Exact { num, den } => {
                let scaled = (target - 1) as u128 * den as u128;
                clamp_u64(scaled.div_ceil(num as u128)).saturating_add(1)
            }
            Step::Approx(ratio) => {
                // Float-to-int casts saturate, so the estimate is at most u64::MAX
                let mut total = (((target - 1) as f64 / ratio).ceil() as u64).saturating_add(1);
                while total > 1 && self.span(total - 1) >= target {
                    total -= 1;
                }
                while total < u64::MAX && self.span(total) < target {
                    total += 1;
                }
                total
            }
        };
        total.saturating_sub(self.consumed)
    }

    /// Locate output `m`
    ///
    /// Returns the index of the newest input it depends on, `ceil(m / ratio)`,
    /// and the offset `x` in `(0, 1]` of `m / ratio` past the input before it.
    pub fn locate(&self, m: u64) -> (u64, f64) {
        match self.step {
            Step::Exact { num, den } => {
                let t = m as u128 * den as u128;
                let newest = t.div_ceil(num as u128);
                // t - (newest - 1) * num, always in (0, num]
                let rem = t + num as u128 - newest * num as u128;
                (newest as u64, rem as f64 / num as f64)
            }
            Step::Approx(ratio) => {
                let t = m as f64 / ratio;
                let newest = t.ceil();
                (newest as u64, t - (newest - 1.0))
            }
        }
    }

    pub fn advance(&mut self, lin: u64, lout: u64) {
        self.consumed += lin;
        self.produced += lout;
        self.total_consumed = self.total_consumed.saturating_add(lin);
        self.total_produced = self.total_produced.saturating_add(lout);
        self.renormalize();
    }

    /// Fold whole periods out of both counters
    ///
    /// Keeps at least one consumed input so `span` is never asked about an
    /// empty stream that is not actually empty.
    fn renormalize(&mut self) {
        if let Step::Exact { num, den } = self.step {
            if self.consumed == 0 {
                return;
            }
            let periods = ((self.consumed - 1) / den).min(self.produced / num);
            self.consumed -= periods * den;
            self.produced -= periods * num;
        }
    }

    pub fn reset(&mut self) {
        self.consumed = 0;
        self.produced = 0;
        self.total_consumed = 0;
        self.total_produced = 0;
    }
}

fn clamp_u64(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Recognise `ratio` as `num / den` via continued fraction convergents
fn as_fraction(ratio: f64) -> Option<(u64, u64)> {
    let (mut p0, mut q0, mut p1, mut q1) = (0u64, 1u64, 1u64, 0u64);
    let mut rest = ratio;

    for _ in 0..64 {
        let a = rest.floor();
        if a > u32::MAX as f64 {
            return None;
        }
        let a = a as u64;
        let p2 = a.checked_mul(p1)?.checked_add(p0)?;
        let q2 = a.checked_mul(q1)?.checked_add(q0)?;
        if q2 > MAX_DENOMINATOR {
            return None;
        }
        if p2 > 0 && p2 as f64 / q2 as f64 == ratio {
            return Some((p2, q2));
        }

        let frac = rest - a as f64;
        if frac == 0.0 {
            return None;
        }
        rest = 1.0 / frac;
        (p0, q0, p1, q1) = (p1, q1, p2, q2);
    }
    None
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_detection() {
        assert_eq!(as_fraction(1.0), Some((1, 1)));
        assert_eq!(as_fraction(0.5), Some((1, 2)));
        assert_eq!(as_fraction(44100.0 / 48000.0), Some((147, 160)));
        assert_eq!(as_fraction(0.3), Some((3, 10)));
        assert_eq!(as_fraction(std::f64::consts::PI), None);
    }

    #[test]
    fn test_from_rates_reduces() {
        let clock = SampleClock::from_rates(48_000, 44_100);
        assert_eq!(clock.fraction(), Some((147, 160)));
        assert!((clock.ratio() - 0.91875).abs() < 1e-12);
    }

    #[test]
    fn test_unit_ratio_counts() {
        let clock = SampleClock::new(1.0);
        assert_eq!(clock.outputs_for(0), 0);
        assert_eq!(clock.outputs_for(10), 10);
        assert_eq!(clock.inputs_for(10), 10);
        assert_eq!(clock.locate(7), (7, 1.0));
    }

    #[test]
    fn test_upsampling_counts() {
        // outputs 0..=2 * (n - 1) fit into n inputs
        let clock = SampleClock::new(2.0);
        assert_eq!(clock.outputs_for(1), 1);
        assert_eq!(clock.outputs_for(4), 7);
        assert_eq!(clock.inputs_for(7), 4);
        assert_eq!(clock.inputs_for(8), 5);
        assert_eq!(clock.locate(3), (2, 0.5));
    }

    #[test]
    fn test_locate_exact_and_approx_agree() {
        let exact = SampleClock::new(0.3);
        let approx = SampleClock {
            step: Step::Approx(0.3),
            ..exact.clone()
        };
        for m in 0..200 {
            let (ne, xe) = exact.locate(m);
            let (na, xa) = approx.locate(m);
            if ne == na {
                assert!((xe - xa).abs() < 1e-9, "m = {}", m);
            } else {
                // Rounding may only flip an exact integer position
                assert!((xe - 1.0).abs() < 1e-9 || (xa - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_inputs_for_is_minimal() {
        for ratio in [0.3, 0.91875, 1.0, 1.7, 2.0, std::f64::consts::E] {
            let mut clock = SampleClock::new(ratio);
            clock.advance(13, clock.outputs_for(13));
            for lout in 1..40 {
                let lin = clock.inputs_for(lout);
                assert!(clock.outputs_for(lin) >= lout, "ratio {} lout {}", ratio, lout);
                if lin > 0 {
                    assert!(clock.outputs_for(lin - 1) < lout, "ratio {} lout {}", ratio, lout);
                }
            }
        }
    }

    #[test]
    fn test_renormalize_preserves_phase() {
        let mut clock = SampleClock::new(0.75);
        let mut total_out = 0;
        for _ in 0..1000 {
            let n = clock.outputs_for(7);
            total_out += n;
            clock.advance(7, n);
            assert!(clock.consumed() < 8);
        }
        // 7000 inputs give floor(6999 * 0.75) + 1 outputs
        assert_eq!(total_out, 5250);
        assert!((clock.phase() - (clock.produced() as f64 / 0.75 - clock.consumed() as f64)).abs() < 1e-12);
    }

    #[test]
    fn test_huge_lengths_saturate() {
        let fine = SampleClock::new(1e-6);
        assert_eq!(fine.outputs_for(u64::MAX), fine.span(u64::MAX));
        assert_eq!(fine.inputs_for(u64::MAX), u64::MAX);

        let coarse = SampleClock::new(RATIO_LIMIT);
        assert_eq!(coarse.outputs_for(u64::MAX), u64::MAX);
        assert_eq!(coarse.inputs_for(3), 2);

        let large = SampleClock::new(std::f64::consts::PI * 1e6);
        assert_eq!(large.outputs_for(u64::MAX), u64::MAX);
        assert!(large.inputs_for(u64::MAX) > 0);
    }

    #[test]
    fn test_totals_survive_renormalization() {
        let mut clock = SampleClock::new(0.75);
        for _ in 0..100 {
            let n = clock.outputs_for(7);
            clock.advance(7, n);
        }
        assert_eq!(clock.total_consumed(), 700);
        assert_eq!(clock.total_produced(), 525);
        assert!(clock.consumed() < 8);

        clock.reset();
        assert_eq!(clock.total_consumed(), 0);
    }

    #[test]
    fn test_reset() {
        let mut clock = SampleClock::new(1.5);
        clock.advance(10, 14);
        clock.reset();
        assert_eq!(clock.consumed(), 0);
        assert_eq!(clock.produced(), 0);
        assert_eq!(clock.phase(), 0.0);
    }
}
