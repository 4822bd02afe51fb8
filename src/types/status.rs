use thiserror::Error;

/// Outcome of a streaming call
///
/// The discriminants are part of the C interface and must not change.
#[must_use]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Exactly the expected number of samples was consumed and produced
    Ok = 0,
    /// A required handle or buffer was missing
    NullPointer,
    /// More output was available than the caller had room for
    Overflow,
    /// The input could not fill the requested output
    Underflow,
}

impl Status {
    pub fn is_ok(&self) -> bool {
        *self == Status::Ok
    }

    /// Get human-readable name for the status
    pub fn name(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::NullPointer => "NULLPOINTER",
            Status::Overflow => "OVERFLOW",
            Status::Underflow => "UNDERFLOW",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while building a plan or a filter bank
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResampleError {
    #[error("resampling ratio must lie between 2^-32 and 2^32, got {0}")]
    InvalidRatio(f64),

    #[error("sample rates must be nonzero, got {from} Hz -> {to} Hz")]
    InvalidSampleRates { from: u32, to: u32 },

    #[error("passband edge must lie strictly between 0 and 1, got {0}")]
    InvalidPassbandEdge(f64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown interpolation '{0}' (expected linear, lagrange or bspline)")]
    UnknownInterpolation(String),
}
