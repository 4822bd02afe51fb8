/// Halfband EMQF prototype shared by every filter bank
///
/// The prototype lowpass is the parallel connection of two allpass branches,
/// `H(z) = 1/2 [A0(z^2) + z^-1 A1(z^2)]`, where every factor of `A0` and `A1`
/// is a second order section `(beta + z^-2) / (1 + beta z^-2)`. Even-indexed
/// betas (ascending order) belong to `A0`, odd-indexed betas to `A1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmqfPrototype {
    /// Section coefficients in ascending order
    pub betas: &'static [f64],
    /// Passband edge as a fraction of the Nyquist frequency
    pub passband_edge: f64,
}

/// Default prototype: 80 dB stopband, transition width 0.0132 fs
///
/// Nineteenth order elliptic halfband. The stopband to passband edge ratio
/// survives the lowpass frequency transformation, which keeps the first alias
/// image below the target Nyquist frequency for `passband_fraction` up to 0.92.
pub static DEFAULT_PROTOTYPE: EmqfPrototype = EmqfPrototype {
    betas: &[
        0.055721749548178656,
        0.20006556213360827,
        0.3823921874965523,
        0.5568713376221813,
        0.6995277436111279,
        0.8059151670369976,
        0.881962730745892,
        0.9369040038220651,
        0.9800613836776457,
    ],
    passband_edge: 0.4868,
};

impl EmqfPrototype {
    /// Coefficients of the branch without the extra delay
    pub fn upper_betas(&self) -> impl Iterator<Item = f64> + '_ {
        self.betas.iter().copied().step_by(2)
    }

    /// Coefficients of the delayed branch
    pub fn lower_betas(&self) -> impl Iterator<Item = f64> + '_ {
        self.betas.iter().copied().skip(1).step_by(2)
    }

    /// Overall order of the prototype lowpass
    pub fn order(&self) -> usize {
        2 * self.betas.len() + 1
    }

    /// Check that the table describes a stable prototype
    pub fn validate(&self) -> Result<(), String> {
        if self.betas.is_empty() {
            return Err("prototype has no allpass sections".to_string());
        }

        if let Some(beta) = self.betas.iter().find(|b| !(**b > 0.0 && **b < 1.0)) {
            return Err(format!(
                "prototype coefficient {} is outside (0, 1)",
                beta
            ));
        }

        if !(self.passband_edge > 0.0 && self.passband_edge < 1.0) {
            return Err(format!(
                "prototype passband edge {} is outside (0, 1)",
                self.passband_edge
            ));
        }

        Ok(())
    }
}
