//! Eigenvector recovery from the Schur form.
//!
//! The eigenvalue pass throws the orthogonal transform away, so this module
//! re-runs the same deflation state machine a second time with accumulation
//! switched on — reusing the already-known eigenvalues as shifts to converge
//! in very few steps ("on-script" mode). Should the script stop matching the
//! iteration's behavior, it falls back permanently to ordinary shifted
//! iteration ("off-script"). Real 2x2 blocks are iterated all the way to
//! triangular here, so back substitution can recover one eigenvector per real
//! eigenvalue; complex pairs keep their 2x2 blocks and get no vectors.
//!
//! Back substitution walks the Schur diagonal from the last-found eigenvalue
//! to the first, solves the leading block against the pivot column (fast
//! triangular path while everything processed so far is real, LU fallback
//! otherwise), hands the same solved head to every duplicate of the pivot
//! value, and maps each vector through `Qᵀ` and the Hessenberg transform into
//! the caller's basis.

use super::eig::Eigenvalue;
use super::francis::{ActiveWindow, FrancisQr, EXCEPTIONAL_THRESHOLD, MAX_ITERATIONS};
use super::lu::{solve_upper, LuDecomposition};
use crate::error::{CoreError, Result};
use crate::linalg::blas::{nrm2, scal};
use crate::tensor::Tensor;
use crate::Real;

/// State of one eigenvector-recovery run.
///
/// Owns the window/split context and the on-script flag explicitly; the
/// kernel holds the working matrix and the accumulating transform.
pub(crate) struct EigenvectorExtractor<'a, T: Real> {
    qr: &'a mut FrancisQr<T>,
    win: ActiveWindow,
    /// Immutable snapshot of the eigenvalues found by the first pass, in
    /// discovery order. Never mutated after capture.
    origin: Vec<Eigenvalue<T>>,
    /// Discovery index of the eigenvalue currently being re-found.
    index: usize,
    /// Whether shifts still come from the origin snapshot.
    on_script: bool,
    /// One slot per eigenvalue; complex pairs stay `None`.
    vectors: Vec<Option<Tensor<T>>>,
    /// Scratch column for back substitution.
    scratch: Vec<T>,
}

#[allow(clippy::many_single_char_names)]
impl<'a, T: Real> EigenvectorExtractor<'a, T> {
    /// Re-derive the Schur form of `h` while accumulating `Q`, then recover
    /// the eigenvectors for every real eigenvalue, expressed in the original
    /// basis (`qh` being the Hessenberg transform) and unit-normalized.
    ///
    /// `qr` must have completed an eigenvalue pass over `h`; its eigenvalue
    /// list seeds the on-script shifts.
    pub fn process(
        qr: &'a mut FrancisQr<T>,
        h: &Tensor<T>,
        qh: &Tensor<T>,
    ) -> Result<Vec<Option<Tensor<T>>>> {
        let n = qr.order();
        let origin = qr.eigenvalues().to_vec();
        debug_assert_eq!(origin.len(), n);

        qr.setup(h);
        qr.begin_accumulation();

        let mut extractor = Self {
            qr,
            win: ActiveWindow::new(n),
            origin,
            index: 0,
            on_script: true,
            vectors: vec![None; n],
            scratch: vec![T::zero(); n],
        };
        extractor.schur_pass()?;
        extractor.extract_vectors(qh)?;
        Ok(extractor.vectors)
    }

    // ------------------------------------------------------------------
    // Phase A — Schur form with accumulated Q
    // ------------------------------------------------------------------

    fn schur_pass(&mut self) -> Result<()> {
        let n = self.qr.order();
        while self.index < n {
            if !self.find_next_eigenvalue() {
                return Err(CoreError::ConvergenceFailed {
                    steps: self.qr.steps(),
                });
            }
        }
        Ok(())
    }

    /// One deflation: the same state machine as the eigenvalue pass, except
    /// that 2x2 blocks deflate only when complex (real pairs iterate on
    /// until the form is triangular) and shifts follow the origin snapshot
    /// while on-script.
    fn find_next_eigenvalue(&mut self) -> bool {
        let mut found = false;
        while !found && self.qr.steps() < MAX_ITERATIONS {
            self.qr.increment_steps();

            if self.win.x2 < self.win.x1 {
                self.win.pop_split();
                continue;
            }
            let (x1, x2) = (self.win.x1 as usize, self.win.x2 as usize);

            if x2 == x1 {
                self.qr.record_real(x1);
                self.win.x2 -= 1;
                self.index += 1;
                found = true;
            } else if x2 - x1 == 1 && !self.qr.is_real_2x2(x1, x2) {
                self.qr.record_quadratic(x1, x2);
                self.win.x2 -= 2;
                self.index += 2;
                found = true;
            } else if self.qr.steps() - self.qr.last_exceptional() > EXCEPTIONAL_THRESHOLD {
                self.qr.exceptional_shift(x1, x2);
            } else if self.qr.is_negligible(x2, x2 - 1) {
                self.qr.record_real(x2);
                self.win.x2 -= 1;
                self.index += 1;
                found = true;
            } else {
                self.split_or_shift(x1, x2);
            }
        }
        found
    }

    /// Split search first; failing that, one shifted step — scripted from
    /// the origin eigenvalues while the script holds, generic otherwise.
    fn split_or_shift(&mut self, x1: usize, x2: usize) {
        for i in ((x1 + 1)..=x2).rev() {
            if self.qr.is_negligible(i, i - 1) {
                self.win.push_split(i - 1);
                return;
            }
        }

        let n = self.qr.order();
        if self.on_script {
            if self.qr.steps() > EXCEPTIONAL_THRESHOLD / 2 {
                // The script stopped predicting this matrix; abandon it
                self.on_script = false;
            } else {
                let ev = self.origin[self.index];
                if ev.is_real() {
                    self.qr.single_shift_step(x1, x2, ev.re);
                } else if x2 - x1 >= 2 && x2 + 2 < n {
                    self.qr.double_shift_with(x1, x2, ev.re, ev.im);
                } else {
                    self.on_script = false;
                }
            }
        } else if x2 - x1 >= 2 && x2 + 2 < n {
            self.qr.double_shift_step(x1, x2);
        } else {
            let shift = self.qr.at(x2, x2);
            self.qr.single_shift_step(x1, x2, shift);
        }
    }

    // ------------------------------------------------------------------
    // Phase B + C — back substitution and basis translation
    // ------------------------------------------------------------------

    fn extract_vectors(&mut self, qh: &Tensor<T>) -> Result<()> {
        let n = self.qr.order();

        // Last-found eigenvalue first: its pivot sits in the top-left corner
        // of the Schur matrix
        let mut triangular = true;
        for i in 0..n {
            let ev = self.qr.eigenvalues()[n - i - 1];
            if triangular && !ev.is_real() {
                triangular = false;
            }
            if ev.is_real() && self.vectors[n - i - 1].is_none() {
                self.solve_with_duplicates(ev.re, i, triangular)?;
            }
        }

        // Translate out of the Hessenberg basis
        for slot in self.vectors.iter_mut() {
            if let Some(v) = slot.take() {
                *slot = Some(qh.matvec(&v)?);
            }
        }
        Ok(())
    }

    /// Solve for the eigenvector with pivot row `first`, then hand the same
    /// solved head to every duplicate of `real` at or below the pivot,
    /// marking each as resolved so it is never solved again.
    fn solve_with_duplicates(&mut self, real: T, first: usize, triangular: bool) -> Result<()> {
        let n = self.qr.order();
        let mut scale = real.abs();
        if scale == T::zero() {
            scale = T::one();
        }

        for s in self.scratch.iter_mut() {
            *s = T::zero();
        }
        if first > 0 {
            if triangular {
                self.solve_triangular(real, first);
            } else {
                self.solve_general(real, first)?;
            }
        }

        let tol = T::from_f64(100.0) * T::epsilon();
        for i in first..n {
            let ev = self.qr.eigenvalues()[n - i - 1];
            if !ev.is_real() || (ev.re - real).abs() / scale >= tol {
                continue;
            }

            self.scratch[i] = T::one();

            // Out of the Schur basis: v = Qᵀ * scratch
            let q = self
                .qr
                .accumulated()
                .expect("vector pass accumulates the transform");
            let mut data = vec![T::zero(); n];
            for (r, &s) in self.scratch.iter().enumerate() {
                for (c, out) in data.iter_mut().enumerate() {
                    *out += q[r * n + c] * s;
                }
            }
            let mut v = Tensor::from_vec(data, vec![n])?;
            let norm = nrm2(&v)?;
            scal(T::one() / norm, &mut v)?;
            self.vectors[n - i - 1] = Some(v);

            self.scratch[i] = T::zero();
        }
        Ok(())
    }

    /// Fast path: the leading `first x first` block is upper triangular.
    /// Shifts its diagonal by `-real` in place, back-substitutes against the
    /// pivot column, and restores the diagonal.
    fn solve_triangular(&mut self, real: T, first: usize) {
        let n = self.qr.order();
        let a = self.qr.matrix_mut();
        for i in 0..first {
            a[i * n + i] -= real;
        }
        for i in 0..first {
            self.scratch[i] = -a[i * n + first];
        }
        solve_upper(a, &mut self.scratch[..first], n, 0, first);
        for i in 0..first {
            a[i * n + i] += real;
        }
    }

    /// Fallback: LU-solve the shifted leading block. A singular system is
    /// fatal to the whole decomposition and aborts recovery.
    fn solve_general(&mut self, real: T, first: usize) -> Result<()> {
        let n = self.qr.order();
        let a = self.qr.matrix();

        let mut block = Vec::with_capacity(first * first);
        for i in 0..first {
            block.extend_from_slice(&a[i * n..i * n + first]);
        }
        let mut block = Tensor::from_vec(block, vec![first, first])?;
        let data = block.as_mut_slice();
        for i in 0..first {
            data[i * first + i] -= real;
        }

        let mut rhs = Vec::with_capacity(first);
        for i in 0..first {
            rhs.push(-a[i * n + first]);
        }
        let rhs = Tensor::from_vec(rhs, vec![first])?;

        let lu = LuDecomposition::decompose(&block)?;
        let x = lu.solve(&rhs)?;
        self.scratch[..first].copy_from_slice(x.as_slice());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::linalg::decomp::EigDecomposition;
    use crate::tensor::Tensor;

    fn mat(data: &[f64], n: usize) -> Tensor<f64> {
        Tensor::from_vec(data.to_vec(), vec![n, n]).unwrap()
    }

    #[test]
    fn test_triangular_input_uses_fast_path() {
        // Upper triangular input: eigenvalues on the diagonal, vectors via
        // pure back substitution.
        let a = mat(
            &[
                1.0, 2.0, 3.0, //
                0.0, 4.0, 5.0, //
                0.0, 0.0, 6.0,
            ],
            3,
        );
        let eig = EigDecomposition::decompose(&a, true).unwrap();
        let vectors = eig.eigenvectors().unwrap();

        for (i, c) in eig.eigenvalues().iter().enumerate() {
            assert!(c.is_real());
            let v = vectors[i].as_ref().unwrap();
            let av = a.matvec(v).unwrap();
            let lv = v * c.re;
            assert!((&av - &lv).norm().unwrap() < 1e-12);
        }
    }

    #[test]
    fn test_complex_block_forces_lu_fallback() {
        // Rotation block on top, real eigenvalue at the bottom: the pivot
        // for λ = 2 sits below a complex 2x2 block, so its leading block is
        // not triangular and must go through the LU solver.
        let a = mat(
            &[
                0.0, -1.0, 0.0, //
                1.0, 0.0, 0.0, //
                0.0, 0.0, 2.0,
            ],
            3,
        );
        let eig = EigDecomposition::decompose(&a, true).unwrap();
        let vectors = eig.eigenvectors().unwrap();

        let mut real_seen = 0;
        for (i, c) in eig.eigenvalues().iter().enumerate() {
            if c.is_real() {
                real_seen += 1;
                assert!((c.re - 2.0).abs() < 1e-10);
                let v = vectors[i].as_ref().unwrap();
                // Up to sign, the vector is e3
                assert!(v.as_slice()[0].abs() < 1e-10);
                assert!(v.as_slice()[1].abs() < 1e-10);
                assert!((v.as_slice()[2].abs() - 1.0).abs() < 1e-10);
            } else {
                assert!((c.re - 0.0).abs() < 1e-10);
                assert!((c.im.abs() - 1.0).abs() < 1e-10);
                assert!(vectors[i].is_none());
            }
        }
        assert_eq!(real_seen, 1);
    }

    #[test]
    fn test_duplicates_share_one_solve() {
        // Two equal diagonal entries below a distinct one: the duplicate
        // pass must assign both vectors for λ = 5 from a single solve.
        let a = mat(
            &[
                7.0, 1.0, 1.0, //
                0.0, 5.0, 0.0, //
                0.0, 0.0, 5.0,
            ],
            3,
        );
        let eig = EigDecomposition::decompose(&a, true).unwrap();
        let vectors = eig.eigenvectors().unwrap();

        let mut fives = 0;
        for (i, c) in eig.eigenvalues().iter().enumerate() {
            assert!(c.is_real());
            let v = vectors[i].as_ref().unwrap();
            let av = a.matvec(v).unwrap();
            let lv = v * c.re;
            assert!((&av - &lv).norm().unwrap() < 1e-12);
            if (c.re - 5.0).abs() < 1e-10 {
                fives += 1;
            }
        }
        assert_eq!(fives, 2);
    }
}
