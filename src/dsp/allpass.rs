use crate::types::Sample;

/// Second order allpass section
///
/// `H(z) = (b + g z^-1 + z^-2) / (1 + g z^-1 + b z^-2)`, run in transposed
/// direct form II so the whole memory is two delay taps.
#[derive(Debug, Clone)]
pub struct SecondOrderAllpass<S: Sample> {
    b: f64,
    g: f64,
    state: [S; 2],
}

impl<S: Sample> SecondOrderAllpass<S> {
    pub fn new(b: f64, g: f64) -> Self {
        Self {
            b,
            g,
            state: [S::zero(); 2],
        }
    }

    /// Map a prototype section `(beta + z^-2) / (1 + beta z^-2)` through the
    /// lowpass substitution `z^-1 -> (z^-1 - a) / (1 - a z^-1)`
    pub fn transformed(beta: f64, a: f64) -> Self {
        let a2 = a * a;
        let norm = 1.0 + beta * a2;
        Self::new((beta + a2) / norm, -2.0 * a * (1.0 + beta) / norm)
    }

    #[inline]
    pub fn process(&mut self, x: S) -> S {
        let [s1, s2] = self.state;
        let y = x.scale(self.b) + s1;
        self.state = [(x - y).scale(self.g) + s2, x - y.scale(self.b)];
        y
    }

    pub fn coefficients(&self) -> (f64, f64) {
        (self.b, self.g)
    }

    pub fn reset(&mut self) {
        self.state = [S::zero(); 2];
    }
}

/// First order allpass section `(-a + z^-1) / (1 - a z^-1)`
///
/// This is what the unit delay of the prototype's lower branch turns into
/// under the lowpass substitution.
#[derive(Debug, Clone)]
pub struct FirstOrderAllpass<S: Sample> {
    a: f64,
    state: S,
}

impl<S: Sample> FirstOrderAllpass<S> {
    pub fn new(a: f64) -> Self {
        Self {
            a,
            state: S::zero(),
        }
    }

    #[inline]
    pub fn process(&mut self, x: S) -> S {
        let y = self.state - x.scale(self.a);
        self.state = x + y.scale(self.a);
        y
    }

    pub fn reset(&mut self) {
        self.state = S::zero();
    }
}
