//! `spectral-core` — Dense real eigendecomposition, implemented from scratch.
//!
//! Computes the eigenvalues (and optionally the eigenvectors) of an arbitrary
//! real square matrix with the implicit double-shift QR algorithm (Francis
//! iteration) applied to a Hessenberg-reduced form. Supporting machinery —
//! dense tensors, BLAS-style kernels, LU and Hessenberg decompositions, and a
//! PRNG for the exceptional-shift strategy and randomized tests — lives in
//! this crate as well.
//!
//! # Design
//!
//! - **Zero external dependencies** for math — everything is from scratch.
//! - Generic over numeric types via the [`Scalar`] / [`Float`] / [`Real`]
//!   trait hierarchy.
//! - Every decomposition owns its working state for the duration of one call;
//!   nothing is shared, nothing is `static`.

pub mod dtype;
pub mod error;
pub mod linalg;
pub mod random;
pub mod tensor;

// Re-export key types at crate root for convenience.
pub use dtype::{Float, Real, Scalar};
pub use error::{CoreError, Result};

/// Items intended for glob-import: `use spectral_core::prelude::*;`
pub mod prelude {
    pub use crate::dtype::{Float, Real, Scalar};
    pub use crate::error::{CoreError, Result};
    pub use crate::linalg::decomp::{EigDecomposition, Eigenvalue};
    pub use crate::tensor::Tensor;
}
