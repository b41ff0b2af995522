use core::fmt;

/// All errors returned by `spectral-core`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Operand shapes do not match the required layout.
    DimensionMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// A shape or stride specification is invalid.
    InvalidShape {
        shape: Vec<usize>,
        reason: &'static str,
    },

    /// A flat or multi-dimensional index is out of bounds.
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    /// The operation is not supported for the given input.
    InvalidArgument { reason: &'static str },

    /// Matrix is singular and cannot be inverted / decomposed.
    ///
    /// During eigenvector recovery this is fatal: a singular
    /// back-substitution system aborts the whole decomposition.
    SingularMatrix,

    /// QR iteration exceeded its step cap before isolating an eigenvalue.
    ConvergenceFailed { steps: usize },

    /// A non-finite value appeared on the working diagonal during iteration.
    NonFiniteValue,

    /// Eigenvectors were requested from a decomposition that did not
    /// compute them.
    VectorsNotComputed,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { expected, got } => {
                write!(f, "dimension mismatch: expected {expected:?}, got {got:?}")
            }
            Self::InvalidShape { shape, reason } => {
                write!(f, "invalid shape {shape:?}: {reason}")
            }
            Self::IndexOutOfBounds { index, shape } => {
                write!(f, "index {index:?} out of bounds for shape {shape:?}")
            }
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::SingularMatrix => write!(f, "singular matrix"),
            Self::ConvergenceFailed { steps } => {
                write!(f, "QR iteration did not converge within {steps} steps")
            }
            Self::NonFiniteValue => {
                write!(f, "non-finite value encountered during QR iteration")
            }
            Self::VectorsNotComputed => {
                write!(f, "eigenvectors were not computed for this decomposition")
            }
        }
    }
}

impl std::error::Error for CoreError {}

/// Convenience alias used throughout `spectral-core`.
pub type Result<T> = std::result::Result<T, CoreError>;
