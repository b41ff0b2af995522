//! Eigendecomposition of arbitrary real square matrices.
//!
//! Computes all eigenvalues — and, on request, the eigenvectors belonging to
//! the real ones — of a general (nonsymmetric) real matrix. The matrix is
//! first reduced to upper Hessenberg form, then the implicit double-shift QR
//! algorithm deflates eigenvalues off the bottom of an active window one at a
//! time (or two at a time for complex-conjugate pairs). Eigenvector recovery
//! re-runs the iteration with an accumulated orthogonal transform and
//! back-substitutes in the resulting quasi-triangular (Schur) form; see
//! [`super::eigvec`].
//!
//! Eigenvalues are reported in discovery order, not sorted by magnitude.
//! Eigenvectors for complex-conjugate eigenvalues are not computed and stay
//! `None`.

use super::eigvec::EigenvectorExtractor;
use super::francis::{ActiveWindow, FrancisQr, EXCEPTIONAL_THRESHOLD, MAX_ITERATIONS};
use super::hessenberg::HessenbergDecomposition;
use crate::error::{CoreError, Result};
use crate::tensor::Tensor;
use crate::{Float, Real};

/// One eigenvalue as a (real, imaginary) pair of the matrix element type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eigenvalue<T: Float> {
    /// Real part.
    pub re: T,
    /// Imaginary part; exactly zero for real eigenvalues.
    pub im: T,
}

impl<T: Float> Eigenvalue<T> {
    /// A purely real eigenvalue.
    #[inline]
    pub fn real(re: T) -> Self {
        Self { re, im: T::zero() }
    }

    /// A complex eigenvalue.
    #[inline]
    pub fn complex(re: T, im: T) -> Self {
        Self { re, im }
    }

    /// Whether the imaginary part is exactly zero.
    #[inline]
    pub fn is_real(&self) -> bool {
        self.im == T::zero()
    }
}

/// Result of an eigendecomposition of a real square matrix.
///
/// Immutable once constructed. Holds the N eigenvalue pairs in the order the
/// iteration deflated them, and — when requested — one optional unit-norm
/// eigenvector per eigenvalue, expressed in the original basis. Entries for
/// complex eigenvalues are `None`.
#[derive(Debug, Clone)]
pub struct EigDecomposition<T: Real> {
    eigenvalues: Vec<Eigenvalue<T>>,
    eigenvectors: Option<Vec<Option<Tensor<T>>>>,
}

impl<T: Real> EigDecomposition<T> {
    /// Decompose a square matrix, optionally computing eigenvectors.
    ///
    /// The input is not modified; the iteration works on a private
    /// Hessenberg-reduced copy. Failure to converge within the per-eigenvalue
    /// step cap surfaces as [`CoreError::ConvergenceFailed`] (or
    /// [`CoreError::NonFiniteValue`] when the iteration blew up); no partial
    /// results are ever returned.
    ///
    /// ```
    /// # use spectral_core::tensor::Tensor;
    /// # use spectral_core::linalg::decomp::EigDecomposition;
    /// let a = Tensor::from_vec(vec![2.0_f64, 0.0, 0.0, 3.0], vec![2, 2]).unwrap();
    /// let eig = EigDecomposition::decompose(&a, true).unwrap();
    /// let mut values: Vec<f64> = eig.eigenvalues().iter().map(|c| c.re).collect();
    /// values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    /// assert!((values[0] - 2.0).abs() < 1e-12);
    /// assert!((values[1] - 3.0).abs() < 1e-12);
    /// ```
    pub fn decompose(a: &Tensor<T>, compute_vectors: bool) -> Result<Self> {
        let hessenberg = HessenbergDecomposition::decompose(a)?;
        let h = hessenberg.h();

        let mut qr = FrancisQr::new(&h)?;
        find_eigenvalues(&mut qr)?;

        let eigenvectors = if compute_vectors {
            let qh = hessenberg.q();
            Some(EigenvectorExtractor::process(&mut qr, &h, &qh)?)
        } else {
            None
        };

        Ok(Self {
            eigenvalues: qr.eigenvalues().to_vec(),
            eigenvectors,
        })
    }

    /// Number of eigenvalues (the matrix dimension).
    pub fn order(&self) -> usize {
        self.eigenvalues.len()
    }

    /// All eigenvalue pairs, in discovery order.
    pub fn eigenvalues(&self) -> &[Eigenvalue<T>] {
        &self.eigenvalues
    }

    /// The `index`-th eigenvalue pair.
    pub fn eigenvalue(&self, index: usize) -> Eigenvalue<T> {
        self.eigenvalues[index]
    }

    /// All eigenvector slots, aligned with [`Self::eigenvalues`].
    ///
    /// `None` entries belong to complex eigenvalues, whose vectors this
    /// engine does not compute. Returns [`CoreError::VectorsNotComputed`]
    /// when the decomposition was run without eigenvectors.
    pub fn eigenvectors(&self) -> Result<&[Option<Tensor<T>>]> {
        self.eigenvectors
            .as_deref()
            .ok_or(CoreError::VectorsNotComputed)
    }

    /// The eigenvector for the `index`-th eigenvalue, if it is real.
    ///
    /// Returns [`CoreError::VectorsNotComputed`] when the decomposition was
    /// run without eigenvectors.
    pub fn eigenvector(&self, index: usize) -> Result<Option<&Tensor<T>>> {
        Ok(self.eigenvectors()?[index].as_ref())
    }
}

/// Drive the deflation state machine until every eigenvalue is recorded.
///
/// Re-evaluates the active window once per step: pop an exhausted split,
/// deflate a single entry or a trailing 2x2 block, force an exceptional
/// shift after prolonged stagnation (failing on a non-finite diagonal),
/// deflate a converged bottom row, and otherwise search for a split before
/// performing an implicit double-shift step.
fn find_eigenvalues<T: Real>(qr: &mut FrancisQr<T>) -> Result<()> {
    let n = qr.order();
    let mut win = ActiveWindow::new(n);

    while qr.found() < n {
        if qr.steps() > MAX_ITERATIONS {
            return Err(CoreError::ConvergenceFailed { steps: qr.steps() });
        }
        qr.increment_steps();

        if win.x2 < win.x1 {
            win.pop_split();
        } else if win.x2 == win.x1 {
            qr.record_real(win.x1 as usize);
            win.x2 -= 1;
        } else if win.x2 - win.x1 == 1 {
            qr.record_quadratic(win.x1 as usize, win.x2 as usize);
            win.x2 -= 2;
        } else if qr.steps() - qr.last_exceptional() > EXCEPTIONAL_THRESHOLD {
            let x2 = win.x2 as usize;
            // See if the iteration blew up
            if !qr.at(x2, x2).is_finite() {
                return Err(CoreError::NonFiniteValue);
            }
            qr.exceptional_shift(win.x1 as usize, x2);
        } else if qr.is_negligible(win.x2 as usize, win.x2 as usize - 1) {
            qr.record_real(win.x2 as usize);
            win.x2 -= 1;
        } else {
            let (x1, x2) = (win.x1 as usize, win.x2 as usize);
            // Greedy bottom-up split search; the first negligible entry wins
            let split = (x1 + 1..=x2).rev().find(|&i| qr.is_negligible(i, i - 1));
            match split {
                Some(i) => win.push_split(i - 1),
                None => qr.double_shift_step(x1, x2),
            }
        }
    }

    Ok(())
}
