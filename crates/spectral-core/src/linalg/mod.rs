//! Linear algebra operations.
//!
//! All routines are implemented from scratch — no external BLAS/LAPACK
//! bindings. The API is split into three BLAS levels plus matrix
//! decompositions:
//!
//! | Level | Operations | Complexity |
//! |-------|-----------|------------|
//! | L1 | `dot`, `axpy`, `nrm2`, `scal` | O(n) |
//! | L2 | `gemv` (matrix-vector multiply) | O(n^2) |
//! | L3 | `gemm` (matrix-matrix multiply) | O(n^3) |
//!
//! Decompositions: [`LuDecomposition`], [`HessenbergDecomposition`],
//! [`EigDecomposition`]

pub mod blas;
pub mod decomp;

pub use blas::{axpy, dot, gemm, gemv, nrm2, scal};
pub use decomp::EigDecomposition;
pub use decomp::Eigenvalue;
pub use decomp::HessenbergDecomposition;
pub use decomp::LuDecomposition;
pub use decomp::solve_upper;

use crate::error::Result;
use crate::tensor::Tensor;
use crate::Float;

/// Solve the linear system `Ax = b` for a square matrix `A`.
///
/// Uses LU decomposition with partial pivoting internally.
///
/// ```
/// # use spectral_core::tensor::Tensor;
/// # use spectral_core::linalg;
/// let a = Tensor::from_vec(vec![2.0_f64, 1.0, 1.0, 4.0], vec![2, 2]).unwrap();
/// let b = Tensor::from_vec(vec![5.0_f64, 6.0], vec![2]).unwrap();
/// let x = linalg::solve(&a, &b).unwrap();
/// assert!((x.as_slice()[0] - 2.0).abs() < 1e-10);
/// assert!((x.as_slice()[1] - 1.0).abs() < 1e-10);
/// ```
pub fn solve<T: Float>(a: &Tensor<T>, b: &Tensor<T>) -> Result<Tensor<T>> {
    LuDecomposition::decompose(a)?.solve(b)
}

/// Compute the determinant of a square matrix.
///
/// Uses LU decomposition with partial pivoting internally.
///
/// ```
/// # use spectral_core::tensor::Tensor;
/// # use spectral_core::linalg;
/// let a = Tensor::from_vec(vec![2.0_f64, 1.0, 1.0, 4.0], vec![2, 2]).unwrap();
/// let det = linalg::det(&a).unwrap();
/// assert!((det - 7.0).abs() < 1e-10);
/// ```
pub fn det<T: Float>(a: &Tensor<T>) -> Result<T> {
    Ok(LuDecomposition::decompose(a)?.det())
}
