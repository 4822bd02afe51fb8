//! Elliptic minimal Q-factor (EMQF) anti-aliasing lowpass
//!
//! Two parallel chains of allpass sections whose average is a lowpass. The
//! chains come from a fixed halfband prototype and are moved to an arbitrary
//! passband edge with the classic lowpass-to-lowpass substitution, which keeps
//! the two-branch allpass structure intact. State persists across calls, so a
//! stream may be cut into blocks of any length.

use super::allpass::{FirstOrderAllpass, SecondOrderAllpass};
use super::coefficients::{EmqfPrototype, DEFAULT_PROTOTYPE};
use crate::types::{ResampleError, Sample};
use std::f64::consts::PI;

/// One branch of the bank
#[derive(Debug, Clone)]
struct Branch<S: Sample> {
    /// Transformed unit delay, lower branch only
    head: Option<FirstOrderAllpass<S>>,
    sections: Vec<SecondOrderAllpass<S>>,
}

impl<S: Sample> Branch<S> {
    #[inline]
    fn process(&mut self, x: S) -> S {
        let mut y = match self.head.as_mut() {
            Some(head) => head.process(x),
            None => x,
        };
        for section in self.sections.iter_mut() {
            y = section.process(y);
        }
        y
    }

    fn reset(&mut self) {
        if let Some(head) = self.head.as_mut() {
            head.reset();
        }
        for section in self.sections.iter_mut() {
            section.reset();
        }
    }
}

/// Streaming EMQF lowpass with passband edge `fc` (fraction of Nyquist)
#[derive(Debug, Clone)]
pub struct AllpassFilterBank<S: Sample = f64> {
    passband_edge: f64,
    upper: Branch<S>,
    lower: Branch<S>,
}

impl<S: Sample> AllpassFilterBank<S> {
    /// Create a bank from the default prototype
    pub fn new(passband_edge: f64) -> Result<Self, ResampleError> {
        Self::with_prototype(passband_edge, &DEFAULT_PROTOTYPE)
    }

    /// Create a bank with passband edge `fc` in the open interval (0, 1)
    pub fn with_prototype(
        passband_edge: f64,
        prototype: &'static EmqfPrototype,
    ) -> Result<Self, ResampleError> {
        if !(passband_edge > 0.0 && passband_edge < 1.0) {
            return Err(ResampleError::InvalidPassbandEdge(passband_edge));
        }
        prototype.validate().map_err(ResampleError::InvalidConfig)?;

        let a = warp_coefficient(prototype.passband_edge, passband_edge);

        let upper = Branch {
            head: None,
            sections: prototype
                .upper_betas()
                .map(|beta| SecondOrderAllpass::transformed(beta, a))
                .collect(),
        };
        let lower = Branch {
            head: Some(FirstOrderAllpass::new(a)),
            sections: prototype
                .lower_betas()
                .map(|beta| SecondOrderAllpass::transformed(beta, a))
                .collect(),
        };

        log::debug!(
            "EMQF bank: fc = {:.4}, order {}, warp a = {:.6}",
            passband_edge,
            prototype.order(),
            a
        );

        Ok(Self {
            passband_edge,
            upper,
            lower,
        })
    }

    /// Filter one sample
    #[inline]
    pub fn process(&mut self, x: S) -> S {
        let upper = self.upper.process(x);
        let lower = self.lower.process(x);
        (upper + lower).scale(0.5)
    }

    /// Filter `input` into `output`
    ///
    /// Both slices are expected to have the same length; extra samples in the
    /// longer one are left alone.
    pub fn filter(&mut self, input: &[S], output: &mut [S]) {
        debug_assert_eq!(input.len(), output.len());
        for (x, y) in input.iter().zip(output.iter_mut()) {
            *y = self.process(*x);
        }
    }

    /// Filter a buffer in place
    pub fn filter_in_place(&mut self, buffer: &mut [S]) {
        for x in buffer.iter_mut() {
            *x = self.process(*x);
        }
    }

    /// Zero every delay tap
    pub fn reset(&mut self) {
        self.upper.reset();
        self.lower.reset();
    }

    /// Release the bank
    pub fn done(self) {
        log::debug!("EMQF bank released (fc = {:.4})", self.passband_edge);
    }

    pub fn passband_edge(&self) -> f64 {
        self.passband_edge
    }

    /// Order of the transformed lowpass
    pub fn order(&self) -> usize {
        let sections = self.upper.sections.len() + self.lower.sections.len();
        2 * sections + 1
    }
}

/// Coefficient `a` of `z^-1 -> (z^-1 - a) / (1 - a z^-1)` moving the
/// prototype edge to the requested one (both as fractions of Nyquist)
fn warp_coefficient(prototype_edge: f64, target_edge: f64) -> f64 {
    let theta = prototype_edge * PI;
    let omega = target_edge * PI;
    ((theta - omega) / 2.0).sin() / ((theta + omega) / 2.0).sin()
}
