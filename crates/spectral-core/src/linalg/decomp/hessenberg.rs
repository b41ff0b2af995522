//! Hessenberg reduction via Householder similarity transforms.
//!
//! Reduces a square matrix `A` to upper Hessenberg form `H` (all entries
//! below the first subdiagonal zero) with an orthogonal `Q` such that
//! `A = Q H Qᵀ`. This is the cheap precursor the QR eigenvalue iteration
//! works on: it preserves the spectrum while leaving only one subdiagonal
//! to chase bulges along.

use crate::error::{CoreError, Result};
use crate::tensor::Tensor;
use crate::Float;

/// Result of a Hessenberg reduction `A = Q H Qᵀ`.
///
/// Stores the factorization in compact form: the upper Hessenberg part of the
/// working matrix holds `H`, the columns below the first subdiagonal hold the
/// Householder vectors (without their leading 1), and the reflection
/// coefficients are kept separately.
#[derive(Debug, Clone)]
pub struct HessenbergDecomposition<T: Float> {
    /// Working matrix: Hessenberg part plus packed Householder vectors.
    qh: Vec<T>,
    /// Reflection coefficient for each of the first `n - 2` columns.
    gammas: Vec<T>,
    /// Matrix dimension (n x n).
    n: usize,
}

#[allow(clippy::many_single_char_names)]
impl<T: Float> HessenbergDecomposition<T> {
    /// Reduce a square matrix to upper Hessenberg form.
    ///
    /// Uses Householder reflections applied as similarity transforms, with
    /// max-abs column scaling so that extreme magnitudes (say, a matrix
    /// scaled by 1e100) survive the squared intermediates.
    ///
    /// ```
    /// # use spectral_core::tensor::Tensor;
    /// # use spectral_core::linalg::decomp::HessenbergDecomposition;
    /// let a = Tensor::from_vec(
    ///     vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0],
    ///     vec![3, 3],
    /// ).unwrap();
    /// let hess = HessenbergDecomposition::decompose(&a).unwrap();
    /// let h = hess.h();
    /// // Below the first subdiagonal everything is exactly zero
    /// assert_eq!(*h.get(&[2, 0]).unwrap(), 0.0);
    /// ```
    pub fn decompose(a: &Tensor<T>) -> Result<Self> {
        if a.ndim() != 2 {
            return Err(CoreError::InvalidArgument {
                reason: "Hessenberg reduction requires a 2-D tensor (matrix)",
            });
        }
        let n = a.shape()[0];
        if a.shape()[1] != n {
            return Err(CoreError::InvalidArgument {
                reason: "Hessenberg reduction requires a square matrix",
            });
        }
        if n == 0 {
            return Err(CoreError::InvalidArgument {
                reason: "Hessenberg reduction requires a non-empty matrix",
            });
        }

        let mut qh: Vec<T> = a.as_slice().to_vec();
        let mut gammas = vec![T::zero(); n];
        let mut u = vec![T::zero(); n];

        for k in 0..n.saturating_sub(2) {
            // Anything to annihilate below the subdiagonal?
            let mut max = T::zero();
            for i in (k + 2)..n {
                max = max.max(qh[i * n + k].abs());
            }
            if max == T::zero() {
                // Column already reduced
                gammas[k] = T::zero();
                continue;
            }
            // Scale the reflector by the largest magnitude in the column,
            // subdiagonal entry included
            let max = max.max(qh[(k + 1) * n + k].abs());

            let mut norm_sq = T::zero();
            for i in (k + 1)..n {
                let v = qh[i * n + k] / max;
                u[i] = v;
                norm_sq += v * v;
            }
            let mut tau = norm_sq.sqrt();
            // Choose sign to avoid cancellation
            if u[k + 1] < T::zero() {
                tau = -tau;
            }

            let div = u[k + 1] + tau;
            let gamma = div / tau;
            u[k + 1] = T::one();
            for i in (k + 2)..n {
                u[i] /= div;
            }

            // Similarity transform with P = I - gamma * u * uᵀ.
            // Left side: rows k+1..n over columns k+1..n (column k is
            // annihilated and written explicitly below).
            for j in (k + 1)..n {
                let mut s = T::zero();
                for i in (k + 1)..n {
                    s += u[i] * qh[i * n + j];
                }
                s *= gamma;
                for i in (k + 1)..n {
                    qh[i * n + j] -= s * u[i];
                }
            }
            // Right side: columns k+1..n over every row.
            for i in 0..n {
                let mut s = T::zero();
                for j in (k + 1)..n {
                    s += qh[i * n + j] * u[j];
                }
                s *= gamma;
                for j in (k + 1)..n {
                    qh[i * n + j] -= s * u[j];
                }
            }

            // Store the annihilated column: the new subdiagonal entry and the
            // Householder vector in the zeroed slots below it.
            qh[(k + 1) * n + k] = -tau * max;
            for i in (k + 2)..n {
                qh[i * n + k] = u[i];
            }
            gammas[k] = gamma;
        }

        Ok(Self { qh, gammas, n })
    }

    /// Extract the upper Hessenberg matrix `H`.
    ///
    /// Entries below the first subdiagonal are exactly zero.
    pub fn h(&self) -> Tensor<T> {
        let n = self.n;
        let mut data = vec![T::zero(); n * n];
        for i in 0..n {
            let lo = i.saturating_sub(1);
            for j in lo..n {
                data[i * n + j] = self.qh[i * n + j];
            }
        }
        Tensor::from_vec(data, vec![n, n]).expect("square shape matches buffer")
    }

    /// Extract the orthogonal matrix `Q` with `A = Q H Qᵀ`.
    pub fn q(&self) -> Tensor<T> {
        let n = self.n;
        // Start with identity, apply reflections in reverse order
        let mut q = vec![T::zero(); n * n];
        for i in 0..n {
            q[i * n + i] = T::one();
        }

        for k in (0..n.saturating_sub(2)).rev() {
            let gamma = self.gammas[k];
            if gamma == T::zero() {
                continue;
            }
            for j in 0..n {
                // u[k+1] = 1 is implicit
                let mut s = q[(k + 1) * n + j];
                for i in (k + 2)..n {
                    s += self.qh[i * n + k] * q[i * n + j];
                }
                s *= gamma;
                q[(k + 1) * n + j] -= s;
                for i in (k + 2)..n {
                    q[i * n + j] -= s * self.qh[i * n + k];
                }
            }
        }

        Tensor::from_vec(q, vec![n, n]).expect("square shape matches buffer")
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::random::{uniform_range, Rng};

    fn approx_eq(a: &[f64], b: &[f64], tol: f64) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| (x - y).abs() < tol)
    }

    fn check_reconstruction(a: &Tensor<f64>, tol: f64) {
        let hess = HessenbergDecomposition::decompose(a).unwrap();
        let h = hess.h();
        let q = hess.q();
        let qt = q.transpose().unwrap();

        // A = Q H Qᵀ
        let qh = q.matmul(&h).unwrap();
        let back = qh.matmul(&qt).unwrap();
        assert!(approx_eq(back.as_slice(), a.as_slice(), tol));

        // Q orthogonal
        let qtq = qt.matmul(&q).unwrap();
        let eye = Tensor::<f64>::eye(a.shape()[0]);
        assert!(approx_eq(qtq.as_slice(), eye.as_slice(), 1e-12));

        // H upper Hessenberg
        let n = a.shape()[0];
        for i in 2..n {
            for j in 0..(i - 1) {
                assert_eq!(*h.get(&[i, j]).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn test_hessenberg_3x3() {
        let a = Tensor::from_vec(
            vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0],
            vec![3, 3],
        )
        .unwrap();
        check_reconstruction(&a, 1e-12);
    }

    #[test]
    fn test_hessenberg_4x4() {
        let a = Tensor::from_vec(
            vec![
                4.0_f64, 1.0, -2.0, 2.0, 1.0, 2.0, 0.0, 1.0, -2.0, 0.0, 3.0, -2.0, 2.0, 1.0, -2.0,
                -1.0,
            ],
            vec![4, 4],
        )
        .unwrap();
        check_reconstruction(&a, 1e-12);
    }

    #[test]
    fn test_hessenberg_random() {
        let mut rng = Rng::new(31);
        for n in [2usize, 3, 5, 8, 12] {
            let a = uniform_range::<f64>(&mut rng, vec![n, n], -1.0, 1.0).unwrap();
            check_reconstruction(&a, 1e-11);
        }
    }

    #[test]
    fn test_hessenberg_large_scale() {
        // Entries around 1e100 must not overflow the squared intermediates
        let mut rng = Rng::new(77);
        let a = uniform_range::<f64>(&mut rng, vec![4, 4], -1e100, 1e100).unwrap();
        let hess = HessenbergDecomposition::decompose(&a).unwrap();
        assert!(hess.h().iter().all(|v| v.is_finite()));
        assert!(hess.q().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_hessenberg_already_hessenberg() {
        // Zero column below the subdiagonal: the reflection is skipped
        let a = Tensor::from_vec(
            vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0, 0.0, 7.0, 8.0],
            vec![3, 3],
        )
        .unwrap();
        let hess = HessenbergDecomposition::decompose(&a).unwrap();
        assert!(approx_eq(hess.h().as_slice(), a.as_slice(), 1e-15));
        assert_eq!(hess.q(), Tensor::<f64>::eye(3));
    }

    #[test]
    fn test_hessenberg_small_sizes() {
        // 1x1 and 2x2 are already Hessenberg
        let a = Tensor::from_vec(vec![3.0_f64], vec![1, 1]).unwrap();
        let hess = HessenbergDecomposition::decompose(&a).unwrap();
        assert_eq!(hess.h().as_slice(), &[3.0]);

        let b = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        let hess = HessenbergDecomposition::decompose(&b).unwrap();
        assert_eq!(hess.h().as_slice(), b.as_slice());
        assert_eq!(hess.q(), Tensor::<f64>::eye(2));
    }

    #[test]
    fn test_hessenberg_not_square() {
        let a = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
        assert!(HessenbergDecomposition::decompose(&a).is_err());
    }

    #[test]
    fn test_hessenberg_empty() {
        let a = Tensor::<f64>::zeros(vec![0, 0]);
        assert!(HessenbergDecomposition::decompose(&a).is_err());
    }
}
