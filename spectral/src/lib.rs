//! # Spectral
//!
//! Eigenvalues and eigenvectors of arbitrary real square matrices in pure
//! Rust, via the implicit double-shift QR (Francis) algorithm.
//!
//! One `use spectral::prelude::*;` gives you the dense tensor type, the
//! eigendecomposition entry point, and the supporting linear algebra — all
//! implemented from scratch.
//!
//! ## Feature Flags
//!
//! | Feature | Enables |
//! |---------|---------|
//! | `core` *(default)* | Tensors, BLAS kernels, LU/Hessenberg/eigen decompositions |
//!
//! Additional sub-crates will be gated behind their own feature flags as
//! development progresses.

pub use spectral_core as core;

/// Glob-import convenience: `use spectral::prelude::*;`
pub mod prelude {
    pub use spectral_core::prelude::*;
}
