//! BLAS Level 1–3 operations on [`Tensor`].
//!
//! All functions operate on tensors and validate shapes, returning
//! [`Result`] on dimension mismatches.

use crate::error::{CoreError, Result};
use crate::tensor::Tensor;
use crate::{Float, Scalar};

// ======================================================================
// BLAS Level 1 — vector operations, O(n)
// ======================================================================

/// Inner (dot) product of two 1-D tensors: `sum(x_i * y_i)`.
///
/// Both tensors must be 1-D with the same length.
///
/// ```
/// # use spectral_core::tensor::Tensor;
/// # use spectral_core::linalg::dot;
/// let x = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0], vec![3]).unwrap();
/// let y = Tensor::from_vec(vec![4.0_f64, 5.0, 6.0], vec![3]).unwrap();
/// let d = dot(&x, &y).unwrap();
/// assert!((d - 32.0).abs() < 1e-10);
/// ```
pub fn dot<T: Scalar>(x: &Tensor<T>, y: &Tensor<T>) -> Result<T> {
    check_vectors(x, y, "dot")?;
    let result = x
        .as_slice()
        .iter()
        .zip(y.as_slice().iter())
        .fold(T::zero(), |acc, (&a, &b)| acc + a * b);
    Ok(result)
}

/// `y = alpha * x + y` (in-place update of `y`).
///
/// Both tensors must be 1-D with the same length.
///
/// ```
/// # use spectral_core::tensor::Tensor;
/// # use spectral_core::linalg::axpy;
/// let x = Tensor::from_vec(vec![1.0, 2.0, 3.0], vec![3]).unwrap();
/// let mut y = Tensor::from_vec(vec![10.0, 20.0, 30.0], vec![3]).unwrap();
/// axpy(2.0, &x, &mut y).unwrap();
/// assert_eq!(y.as_slice(), &[12.0, 24.0, 36.0]);
/// ```
pub fn axpy<T: Scalar>(alpha: T, x: &Tensor<T>, y: &mut Tensor<T>) -> Result<()> {
    check_vectors(x, y, "axpy")?;
    let xs = x.as_slice();
    let ys = y.as_mut_slice();
    for (yi, &xi) in ys.iter_mut().zip(xs.iter()) {
        *yi += alpha * xi;
    }
    Ok(())
}

/// Euclidean norm (L2 norm) of a 1-D tensor: `sqrt(sum(x_i^2))`.
///
/// ```
/// # use spectral_core::tensor::Tensor;
/// # use spectral_core::linalg::nrm2;
/// let x = Tensor::from_vec(vec![3.0_f64, 4.0], vec![2]).unwrap();
/// let n = nrm2(&x).unwrap();
/// assert!((n - 5.0).abs() < 1e-10);
/// ```
pub fn nrm2<T: Float>(x: &Tensor<T>) -> Result<T> {
    check_vector(x, "nrm2")?;
    let sum_sq = x.as_slice().iter().fold(T::zero(), |acc, &v| acc + v * v);
    Ok(sum_sq.sqrt())
}

/// Scale a vector in place: `x = alpha * x`.
///
/// ```
/// # use spectral_core::tensor::Tensor;
/// # use spectral_core::linalg::scal;
/// let mut x = Tensor::from_vec(vec![1.0, 2.0, 3.0], vec![3]).unwrap();
/// scal(10.0, &mut x).unwrap();
/// assert_eq!(x.as_slice(), &[10.0, 20.0, 30.0]);
/// ```
pub fn scal<T: Scalar>(alpha: T, x: &mut Tensor<T>) -> Result<()> {
    check_vector(x, "scal")?;
    for v in x.as_mut_slice() {
        *v *= alpha;
    }
    Ok(())
}

// ======================================================================
// BLAS Level 2 — matrix-vector operations, O(n^2)
// ======================================================================

/// General matrix-vector multiply: `y = alpha * A * x + beta * y`.
///
/// - `a` must be 2-D with shape `[m, n]`.
/// - `x` must be 1-D with length `n`.
/// - `y` must be 1-D with length `m`.
///
/// If `beta` is zero, `y` is overwritten (not read).
///
/// ```
/// # use spectral_core::tensor::Tensor;
/// # use spectral_core::linalg::gemv;
/// // A = [[1, 2], [3, 4]], x = [5, 6]
/// let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
/// let x = Tensor::from_vec(vec![5.0, 6.0], vec![2]).unwrap();
/// let mut y = Tensor::<f64>::zeros(vec![2]);
/// gemv(1.0, &a, &x, 0.0, &mut y).unwrap();
/// assert_eq!(y.as_slice(), &[17.0, 39.0]);
/// ```
#[allow(clippy::many_single_char_names)]
pub fn gemv<T: Scalar>(
    alpha: T,
    a: &Tensor<T>,
    x: &Tensor<T>,
    beta: T,
    y: &mut Tensor<T>,
) -> Result<()> {
    if a.ndim() != 2 {
        return Err(CoreError::InvalidArgument {
            reason: "gemv: `a` must be a 2-D tensor (matrix)",
        });
    }
    if x.ndim() != 1 {
        return Err(CoreError::InvalidArgument {
            reason: "gemv: `x` must be a 1-D tensor (vector)",
        });
    }
    if y.ndim() != 1 {
        return Err(CoreError::InvalidArgument {
            reason: "gemv: `y` must be a 1-D tensor (vector)",
        });
    }

    let m = a.shape()[0];
    let n = a.shape()[1];

    if x.numel() != n {
        return Err(CoreError::DimensionMismatch {
            expected: vec![n],
            got: x.shape().to_vec(),
        });
    }
    if y.numel() != m {
        return Err(CoreError::DimensionMismatch {
            expected: vec![m],
            got: y.shape().to_vec(),
        });
    }

    let a_data = a.as_slice();
    let x_data = x.as_slice();
    let y_data = y.as_mut_slice();

    for (i, yi) in y_data.iter_mut().enumerate().take(m) {
        let mut sum = T::zero();
        let row_offset = i * n;
        for j in 0..n {
            sum += a_data[row_offset + j] * x_data[j];
        }
        *yi = alpha * sum + beta * *yi;
    }

    Ok(())
}

// ======================================================================
// BLAS Level 3 — matrix-matrix operations, O(n^3)
// ======================================================================

/// General matrix-matrix multiply: `C = alpha * A * B + beta * C`.
///
/// - `a` must be 2-D with shape `[m, k]`.
/// - `b` must be 2-D with shape `[k, n]`.
/// - `c` must be 2-D with shape `[m, n]`.
///
/// If `beta` is zero, `c` is overwritten (not read).
///
/// ```
/// # use spectral_core::tensor::Tensor;
/// # use spectral_core::linalg::gemm;
/// let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
/// let b = Tensor::from_vec(vec![5.0, 6.0, 7.0, 8.0], vec![2, 2]).unwrap();
/// let mut c = Tensor::<f64>::zeros(vec![2, 2]);
/// gemm(1.0, &a, &b, 0.0, &mut c).unwrap();
/// assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0]);
/// ```
#[allow(clippy::many_single_char_names)]
pub fn gemm<T: Scalar>(
    alpha: T,
    a: &Tensor<T>,
    b: &Tensor<T>,
    beta: T,
    c: &mut Tensor<T>,
) -> Result<()> {
    if a.ndim() != 2 || b.ndim() != 2 || c.ndim() != 2 {
        return Err(CoreError::InvalidArgument {
            reason: "gemm: all arguments must be 2-D tensors (matrices)",
        });
    }

    let m = a.shape()[0];
    let k = a.shape()[1];
    let n = b.shape()[1];

    if b.shape()[0] != k {
        return Err(CoreError::DimensionMismatch {
            expected: vec![k, n],
            got: b.shape().to_vec(),
        });
    }
    if c.shape()[0] != m || c.shape()[1] != n {
        return Err(CoreError::DimensionMismatch {
            expected: vec![m, n],
            got: c.shape().to_vec(),
        });
    }

    let a_data = a.as_slice();
    let b_data = b.as_slice();
    let c_data = c.as_mut_slice();

    // ijk loop order (row-major friendly for A and C)
    for i in 0..m {
        for j in 0..n {
            let mut sum = T::zero();
            let a_row = i * k;
            for p in 0..k {
                sum += a_data[a_row + p] * b_data[p * n + j];
            }
            let c_idx = i * n + j;
            c_data[c_idx] = alpha * sum + beta * c_data[c_idx];
        }
    }

    Ok(())
}

// ======================================================================
// Convenience methods on Tensor
// ======================================================================

impl<T: Scalar> Tensor<T> {
    /// Matrix-vector multiply: returns `A @ x` as a new 1-D tensor.
    ///
    /// `self` must be 2-D `[m, n]`, `x` must be 1-D `[n]`.
    pub fn matvec(&self, x: &Tensor<T>) -> Result<Tensor<T>> {
        let m = self.shape().first().copied().unwrap_or(0);
        let mut y = Tensor::zeros(vec![m]);
        gemv(T::one(), self, x, T::zero(), &mut y)?;
        Ok(y)
    }

    /// Matrix-matrix multiply: returns `self @ other` as a new 2-D tensor.
    ///
    /// `self` must be 2-D `[m, k]`, `other` must be 2-D `[k, n]`.
    pub fn matmul(&self, other: &Tensor<T>) -> Result<Tensor<T>> {
        let m = self.shape().first().copied().unwrap_or(0);
        let n = other.shape().get(1).copied().unwrap_or(0);
        let mut c = Tensor::zeros(vec![m, n]);
        gemm(T::one(), self, other, T::zero(), &mut c)?;
        Ok(c)
    }

    /// Dot product with another 1-D tensor.
    pub fn dot(&self, other: &Tensor<T>) -> Result<T> {
        dot(self, other)
    }
}

impl<T: Float> Tensor<T> {
    /// Euclidean (L2) norm of a 1-D tensor.
    pub fn norm(&self) -> Result<T> {
        nrm2(self)
    }

    /// Solve the linear system `self * x = b` for a square matrix `self`.
    ///
    /// Uses LU decomposition with partial pivoting.
    pub fn solve(&self, b: &Tensor<T>) -> Result<Tensor<T>> {
        crate::linalg::solve(self, b)
    }

    /// Compute the determinant of a square matrix.
    ///
    /// Uses LU decomposition with partial pivoting.
    pub fn det(&self) -> Result<T> {
        crate::linalg::det(self)
    }
}

// ======================================================================
// Internal helpers
// ======================================================================

fn check_vector<T: Scalar>(x: &Tensor<T>, name: &'static str) -> Result<()> {
    if x.ndim() != 1 {
        return Err(CoreError::InvalidArgument {
            reason: match name {
                "nrm2" => "nrm2: expected a 1-D tensor",
                "scal" => "scal: expected a 1-D tensor",
                _ => "expected a 1-D tensor",
            },
        });
    }
    Ok(())
}

fn check_vectors<T: Scalar>(x: &Tensor<T>, y: &Tensor<T>, name: &'static str) -> Result<()> {
    if x.ndim() != 1 || y.ndim() != 1 {
        return Err(CoreError::InvalidArgument {
            reason: match name {
                "dot" => "dot: expected 1-D tensors",
                "axpy" => "axpy: expected 1-D tensors",
                _ => "expected 1-D tensors",
            },
        });
    }
    if x.numel() != y.numel() {
        return Err(CoreError::DimensionMismatch {
            expected: x.shape().to_vec(),
            got: y.shape().to_vec(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_dot() {
        let x = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0], vec![3]).unwrap();
        let y = Tensor::from_vec(vec![4.0_f64, 5.0, 6.0], vec![3]).unwrap();
        assert!((dot(&x, &y).unwrap() - 32.0).abs() < 1e-12);
    }

    #[test]
    fn test_dot_mismatch() {
        let x = Tensor::from_vec(vec![1.0_f64, 2.0], vec![2]).unwrap();
        let y = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0], vec![3]).unwrap();
        assert!(dot(&x, &y).is_err());
    }

    #[test]
    fn test_axpy() {
        let x = Tensor::from_vec(vec![1.0, 2.0, 3.0], vec![3]).unwrap();
        let mut y = Tensor::from_vec(vec![10.0, 20.0, 30.0], vec![3]).unwrap();
        axpy(2.0, &x, &mut y).unwrap();
        assert_eq!(y.as_slice(), &[12.0, 24.0, 36.0]);
    }

    #[test]
    fn test_nrm2() {
        let x = Tensor::from_vec(vec![3.0_f64, 4.0], vec![2]).unwrap();
        assert!((nrm2(&x).unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_scal() {
        let mut x = Tensor::from_vec(vec![1.0, 2.0, 3.0], vec![3]).unwrap();
        scal(0.5, &mut x).unwrap();
        assert_eq!(x.as_slice(), &[0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_gemv() {
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
        let x = Tensor::from_vec(vec![1.0, 1.0, 1.0], vec![3]).unwrap();
        let mut y = Tensor::from_vec(vec![100.0, 100.0], vec![2]).unwrap();
        gemv(1.0, &a, &x, 0.5, &mut y).unwrap();
        assert_eq!(y.as_slice(), &[56.0, 65.0]);
    }

    #[test]
    fn test_gemm_known() {
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        let b = Tensor::from_vec(vec![5.0, 6.0, 7.0, 8.0], vec![2, 2]).unwrap();
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_gemm_rectangular() {
        // (2x3) @ (3x2) -> (2x2)
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
        let b = Tensor::from_vec(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0], vec![3, 2]).unwrap();
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.as_slice(), &[58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_gemm_mismatch() {
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        let b = Tensor::from_vec(vec![1.0, 2.0, 3.0], vec![3, 1]).unwrap();
        assert!(a.matmul(&b).is_err());
    }

    #[test]
    fn test_matvec() {
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        let x = Tensor::from_vec(vec![5.0, 6.0], vec![2]).unwrap();
        let y = a.matvec(&x).unwrap();
        assert_eq!(y.as_slice(), &[17.0, 39.0]);
    }

    #[test]
    fn test_norm_method() {
        let x = Tensor::from_vec(vec![1.0_f64, 2.0, 2.0], vec![3]).unwrap();
        assert!((x.norm().unwrap() - 3.0).abs() < 1e-12);
    }
}
