//! Implicit double-shift QR kernel.
//!
//! [`FrancisQr`] owns every piece of mutable state one QR iteration run needs:
//! the packed working copy of the Hessenberg matrix, the optional accumulated
//! orthogonal transform, the eigenvalues found so far, and the step counters
//! that drive the exceptional-shift stagnation guard. The deflation state
//! machines in [`super::eig`] and [`super::eigvec`] call into this kernel one
//! step at a time.
//!
//! The bulge-chasing steps follow the description in David S. Watkins,
//! "Fundamentals of Matrix Computations", 2nd ed.: a shift (or conjugate
//! shift pair) determines the first column of the shifted matrix, a
//! Householder reflector turns that column into a bulge at the top of the
//! active window, and further reflectors chase the bulge off the bottom,
//! restoring Hessenberg form while performing one (or two) QR steps
//! implicitly.

use super::eig::Eigenvalue;
use crate::random::Rng;
use crate::tensor::Tensor;
use crate::error::{CoreError, Result};
use crate::Real;

/// Steps without progress before an exceptional shift is forced.
pub(crate) const EXCEPTIONAL_THRESHOLD: usize = 20;

/// Step cap per eigenvalue; exceeding it is a convergence failure.
pub(crate) const MAX_ITERATIONS: usize = 20 * EXCEPTIONAL_THRESHOLD;

// ---------------------------------------------------------------------------
// Active window + split stack
// ---------------------------------------------------------------------------

/// The currently-unsolved sub-block `(x1, x2)` and the stack of block
/// boundaries detected by split searches but not yet resolved.
///
/// Indices are signed because `x2` walks one past the top of a block (to
/// `x1 - 1`, possibly `-1`) before the next pending block is popped. Stack
/// entries are strictly increasing from bottom to top and always below the
/// current `x1`.
pub(crate) struct ActiveWindow {
    pub x1: isize,
    pub x2: isize,
    splits: Vec<usize>,
}

impl ActiveWindow {
    pub fn new(n: usize) -> Self {
        Self {
            x1: 0,
            x2: n as isize - 1,
            splits: Vec::with_capacity(n),
        }
    }

    /// Narrow the window to `[boundary + 1, x2]`, remembering the block that
    /// ends at `boundary` for later.
    pub fn push_split(&mut self, boundary: usize) {
        self.splits.push(boundary);
        self.x1 = boundary as isize + 1;
    }

    /// Restore the most recently recorded pending block.
    ///
    /// Panics if no split is pending: the caller only reaches this state
    /// when the window is exhausted before all eigenvalues were found, which
    /// is an algorithm bug rather than a data-dependent condition.
    pub fn pop_split(&mut self) {
        let boundary = self
            .splits
            .pop()
            .expect("split stack underflow: window exhausted with no pending block");
        self.x2 = boundary as isize;
        self.x1 = self.splits.last().map_or(0, |&b| b as isize + 1);
    }
}

// ---------------------------------------------------------------------------
// Kernel
// ---------------------------------------------------------------------------

/// Working state of one implicit QR run over an upper Hessenberg matrix.
pub(crate) struct FrancisQr<T: Real> {
    /// Packed row-major working matrix, mutated in place by every step.
    a: Vec<T>,
    n: usize,
    /// Accumulated orthogonal transform; `None` in the value-only pass.
    /// When present, the Schur-basis vector `x` maps back to the Hessenberg
    /// basis as `Qᵀ x`.
    q: Option<Vec<T>>,
    /// Eigenvalues in discovery order.
    eigenvalues: Vec<Eigenvalue<T>>,
    /// Steps taken towards the eigenvalue currently being isolated.
    steps: usize,
    /// Step index of the most recent exceptional shift.
    last_exceptional: usize,
    /// How many exceptional shifts this run has taken in total.
    num_exceptional: usize,
    rng: Rng,
}

#[allow(clippy::many_single_char_names)]
impl<T: Real> FrancisQr<T> {
    /// Create a kernel over a working copy of `h` (must be square 2-D).
    pub fn new(h: &Tensor<T>) -> Result<Self> {
        if h.ndim() != 2 || h.shape()[0] != h.shape()[1] {
            return Err(CoreError::InvalidArgument {
                reason: "QR iteration requires a square 2-D matrix",
            });
        }
        let n = h.shape()[0];
        let mut kernel = Self {
            a: Vec::new(),
            n,
            q: None,
            eigenvalues: Vec::with_capacity(n),
            steps: 0,
            last_exceptional: 0,
            num_exceptional: 0,
            rng: Rng::new(7919),
        };
        kernel.setup(h);
        Ok(kernel)
    }

    /// Reset to a fresh copy of `h`, discarding found eigenvalues, counters,
    /// and any accumulated transform. `h` must have the construction size.
    pub fn setup(&mut self, h: &Tensor<T>) {
        let n = self.n;
        self.a.clear();
        self.a.extend_from_slice(h.as_slice());
        // Enforce the Hessenberg structure the iteration relies on
        for i in 2..n {
            for j in 0..(i - 1) {
                self.a[i * n + j] = T::zero();
            }
        }
        self.q = None;
        self.eigenvalues.clear();
        self.steps = 0;
        self.last_exceptional = 0;
        self.num_exceptional = 0;
    }

    /// Start accumulating the orthogonal transform (identity-initialized).
    pub fn begin_accumulation(&mut self) {
        let n = self.n;
        let mut q = vec![T::zero(); n * n];
        for i in 0..n {
            q[i * n + i] = T::one();
        }
        self.q = Some(q);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[inline]
    pub fn order(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn found(&self) -> usize {
        self.eigenvalues.len()
    }

    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    #[inline]
    pub fn last_exceptional(&self) -> usize {
        self.last_exceptional
    }

    #[inline]
    pub fn increment_steps(&mut self) {
        self.steps += 1;
    }

    #[inline]
    pub fn at(&self, i: usize, j: usize) -> T {
        self.a[i * self.n + j]
    }

    pub fn eigenvalues(&self) -> &[Eigenvalue<T>] {
        &self.eigenvalues
    }

    /// The packed working matrix (quasi-triangular once iteration finishes).
    pub fn matrix(&self) -> &[T] {
        &self.a
    }

    /// Mutable access for the eigenvector back-substitution, which shifts
    /// the diagonal in place and restores it afterwards.
    pub fn matrix_mut(&mut self) -> &mut [T] {
        &mut self.a
    }

    /// The accumulated transform, when [`Self::begin_accumulation`] was used.
    pub fn accumulated(&self) -> Option<&[T]> {
        self.q.as_deref()
    }

    // ------------------------------------------------------------------
    // Deflation predicates and eigenvalue recording
    // ------------------------------------------------------------------

    /// Whether the subdiagonal entry at `(r, r - 1)` is negligible relative
    /// to its two diagonal neighbors. Scale-invariant; exact zeros are
    /// required when both neighbors vanish.
    pub fn is_negligible(&self, r: usize, c: usize) -> bool {
        let target = self.at(r, c).abs();
        let above = self.at(r - 1, c).abs();
        let right = self.at(r, c + 1).abs();
        target <= T::from_f64(0.5) * T::epsilon() * (above + right)
    }

    /// Record the diagonal entry at `i` as a real eigenvalue.
    pub fn record_real(&mut self, i: usize) {
        let value = Eigenvalue::real(self.at(i, i));
        self.push_eigenvalue(value);
    }

    /// Record both characteristic roots of the trailing 2x2 block
    /// `[x1..=x2, x1..=x2]` (a conjugate pair when the discriminant is
    /// negative, two reals otherwise).
    pub fn record_quadratic(&mut self, x1: usize, x2: usize) {
        let (first, second) = quadratic_roots(
            self.at(x1, x1),
            self.at(x1, x2),
            self.at(x2, x1),
            self.at(x2, x2),
        );
        self.push_eigenvalue(first);
        self.push_eigenvalue(second);
    }

    /// Whether the 2x2 block `[x1..=x2, x1..=x2]` has real eigenvalues.
    pub fn is_real_2x2(&self, x1: usize, x2: usize) -> bool {
        let a11 = self.at(x1, x1);
        let a12 = self.at(x1, x2);
        let a21 = self.at(x2, x1);
        let a22 = self.at(x2, x2);
        let half_trace = (a11 + a22) / T::from_f64(2.0);
        half_trace * half_trace - (a11 * a22 - a12 * a21) >= T::zero()
    }

    fn push_eigenvalue(&mut self, value: Eigenvalue<T>) {
        self.eigenvalues.push(value);
        // The step budget is per eigenvalue
        self.steps = 0;
        self.last_exceptional = 0;
    }

    // ------------------------------------------------------------------
    // Shift steps
    // ------------------------------------------------------------------

    /// One implicit single-shift QR step on the window `[x1, x2]`.
    pub fn single_shift_step(&mut self, x1: usize, x2: usize, shift: T) {
        let n = self.n;
        let p0 = self.at(x1, x1) - shift;
        let p1 = self.at(x1 + 1, x1);

        for k in x1..x2 {
            let (v0, v1) = if k == x1 {
                (p0, p1)
            } else {
                (self.at(k, k - 1), self.at(k + 1, k - 1))
            };
            let Some((u1, gamma, alpha)) = reflector2(v0, v1) else {
                continue;
            };
            if k > x1 {
                self.a[k * n + (k - 1)] = alpha;
                self.a[(k + 1) * n + (k - 1)] = T::zero();
            }

            // Rows k, k+1 from the left
            for j in k..n {
                let s = gamma * (self.a[k * n + j] + u1 * self.a[(k + 1) * n + j]);
                self.a[k * n + j] -= s;
                self.a[(k + 1) * n + j] -= s * u1;
            }
            // Columns k, k+1 from the right; the bulge reaches row k+2
            let row_end = usize::min(k + 2, x2);
            for i in 0..=row_end {
                let s = gamma * (self.a[i * n + k] + u1 * self.a[i * n + k + 1]);
                self.a[i * n + k] -= s;
                self.a[i * n + k + 1] -= s * u1;
            }
            if let Some(q) = &mut self.q {
                for j in 0..n {
                    let s = gamma * (q[k * n + j] + u1 * q[(k + 1) * n + j]);
                    q[k * n + j] -= s;
                    q[(k + 1) * n + j] -= s * u1;
                }
            }
        }
    }

    /// One implicit double-shift QR step on `[x1, x2]` using the trailing
    /// 2x2 block's eigenvalues as the shift pair. Handles complex shifts
    /// without complex arithmetic. Requires `x2 - x1 >= 2`.
    pub fn double_shift_step(&mut self, x1: usize, x2: usize) {
        debug_assert!(x2 - x1 >= 2);
        let z11 = self.at(x2 - 1, x2 - 1);
        let z12 = self.at(x2 - 1, x2);
        let z21 = self.at(x2, x2 - 1);
        let z22 = self.at(x2, x2);

        let a11 = self.at(x1, x1);
        let a21 = self.at(x1 + 1, x1);
        let a12 = self.at(x1, x1 + 1);
        let a22 = self.at(x1 + 1, x1 + 1);
        let a32 = self.at(x1 + 2, x1 + 1);

        // Normalize every participant so the products below stay in range
        let mut max = a11.abs();
        for v in [a21, a12, a22, a32, z11, z12, z21, z22] {
            max = max.max(v.abs());
        }
        if max == T::zero() {
            return;
        }
        let (a11, a21, a12, a22, a32) = (a11 / max, a21 / max, a12 / max, a22 / max, a32 / max);
        let (z11, z12, z21, z22) = (z11 / max, z12 / max, z21 / max, z22 / max);

        // First column of (H - s1 I)(H - s2 I) where s1, s2 are the trailing
        // block's eigenvalues; see Watkins 2nd ed., p. 388
        let b11 = (a11 - z11) * (a11 - z22) - z21 * z12 + a12 * a21;
        let b21 = a21 * (a11 + a22 - z11 - z22);
        let b31 = a32 * a21;

        self.double_shift_chase(x1, x2, b11, b21, b31);
    }

    /// One implicit double-shift QR step on `[x1, x2]` for the explicit
    /// conjugate shift pair `re ± i·im`. Requires `x2 - x1 >= 2`.
    pub fn double_shift_with(&mut self, x1: usize, x2: usize, re: T, im: T) {
        debug_assert!(x2 - x1 >= 2);
        let a11 = self.at(x1, x1);
        let a21 = self.at(x1 + 1, x1);
        let a12 = self.at(x1, x1 + 1);
        let a22 = self.at(x1 + 1, x1 + 1);
        let a32 = self.at(x1 + 2, x1 + 1);

        let mut max = a11.abs();
        for v in [a21, a12, a22, a32, re, im] {
            max = max.max(v.abs());
        }
        if max == T::zero() {
            return;
        }
        let (a11, a21, a12, a22, a32) = (a11 / max, a21 / max, a12 / max, a22 / max, a32 / max);
        let (re, im) = (re / max, im / max);

        // First column of (H - λI)(H - λ̄I): shift sum 2·re, product re²+im²
        let two = T::from_f64(2.0);
        let b11 = a11 * a11 + a12 * a21 - two * re * a11 + re * re + im * im;
        let b21 = a21 * (a11 + a22 - two * re);
        let b31 = a32 * a21;

        self.double_shift_chase(x1, x2, b11, b21, b31);
    }

    /// Shift of last resort: a pseudo-random magnitude on the order of the
    /// trailing diagonal entry, intended to knock the iteration out of a
    /// cycle. The spread widens with each exceptional shift taken.
    pub fn exceptional_shift(&mut self, x1: usize, x2: usize) {
        let mut magnitude = self.at(x2, x2).abs();
        if magnitude == T::zero() {
            magnitude = T::one();
        }

        self.num_exceptional += 1;
        let p = 1.0 - 0.1f64.powi(self.num_exceptional as i32);
        let spread = p + 2.0 * (1.0 - p) * (self.rng.next_f64() - 0.5);
        let mut shift = magnitude * T::from_f64(spread);
        if self.rng.next_bool() {
            shift = -shift;
        }

        self.single_shift_step(x1, x2, shift);
        self.last_exceptional = self.steps;
    }

    // ------------------------------------------------------------------
    // Bulge chase
    // ------------------------------------------------------------------

    /// Chase the 3-row bulge seeded by the column direction `(p0, p1, p2)`
    /// down the window, then flush the final 2-row bulge.
    fn double_shift_chase(&mut self, x1: usize, x2: usize, p0: T, p1: T, p2: T) {
        let n = self.n;

        for k in x1..(x2 - 1) {
            let (v0, v1, v2) = if k == x1 {
                (p0, p1, p2)
            } else {
                (
                    self.at(k, k - 1),
                    self.at(k + 1, k - 1),
                    self.at(k + 2, k - 1),
                )
            };
            let Some((u1, u2, gamma, alpha)) = reflector3(v0, v1, v2) else {
                continue;
            };
            if k > x1 {
                self.a[k * n + (k - 1)] = alpha;
                self.a[(k + 1) * n + (k - 1)] = T::zero();
                self.a[(k + 2) * n + (k - 1)] = T::zero();
            }

            // Rows k..k+2 from the left
            for j in k..n {
                let s = gamma
                    * (self.a[k * n + j]
                        + u1 * self.a[(k + 1) * n + j]
                        + u2 * self.a[(k + 2) * n + j]);
                self.a[k * n + j] -= s;
                self.a[(k + 1) * n + j] -= s * u1;
                self.a[(k + 2) * n + j] -= s * u2;
            }
            // Columns k..k+2 from the right; the bulge reaches row k+3
            let row_end = usize::min(k + 3, x2);
            for i in 0..=row_end {
                let s = gamma
                    * (self.a[i * n + k] + u1 * self.a[i * n + k + 1] + u2 * self.a[i * n + k + 2]);
                self.a[i * n + k] -= s;
                self.a[i * n + k + 1] -= s * u1;
                self.a[i * n + k + 2] -= s * u2;
            }
            if let Some(q) = &mut self.q {
                for j in 0..n {
                    let s = gamma
                        * (q[k * n + j] + u1 * q[(k + 1) * n + j] + u2 * q[(k + 2) * n + j]);
                    q[k * n + j] -= s;
                    q[(k + 1) * n + j] -= s * u1;
                    q[(k + 2) * n + j] -= s * u2;
                }
            }
        }

        // Final 2-row reflector flushes the bulge off the bottom
        let (v0, v1) = (self.at(x2 - 1, x2 - 2), self.at(x2, x2 - 2));
        if let Some((u1, gamma, alpha)) = reflector2(v0, v1) {
            self.a[(x2 - 1) * n + (x2 - 2)] = alpha;
            self.a[x2 * n + (x2 - 2)] = T::zero();

            for j in (x2 - 1)..n {
                let s = gamma * (self.a[(x2 - 1) * n + j] + u1 * self.a[x2 * n + j]);
                self.a[(x2 - 1) * n + j] -= s;
                self.a[x2 * n + j] -= s * u1;
            }
            for i in 0..=x2 {
                let s = gamma * (self.a[i * n + x2 - 1] + u1 * self.a[i * n + x2]);
                self.a[i * n + x2 - 1] -= s;
                self.a[i * n + x2] -= s * u1;
            }
            if let Some(q) = &mut self.q {
                for j in 0..n {
                    let s = gamma * (q[(x2 - 1) * n + j] + u1 * q[x2 * n + j]);
                    q[(x2 - 1) * n + j] -= s;
                    q[x2 * n + j] -= s * u1;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Free helpers
// ---------------------------------------------------------------------------

/// Characteristic roots of `[[a11, a12], [a21, a22]]` via the half-trace
/// and discriminant. Returns a conjugate pair (positive imaginary part
/// first) when the discriminant is negative.
pub(crate) fn quadratic_roots<T: Real>(
    a11: T,
    a12: T,
    a21: T,
    a22: T,
) -> (Eigenvalue<T>, Eigenvalue<T>) {
    let half_trace = (a11 + a22) / T::from_f64(2.0);
    let inside = half_trace * half_trace - (a11 * a22 - a12 * a21);
    if inside < T::zero() {
        let im = (-inside).sqrt();
        (
            Eigenvalue::complex(half_trace, im),
            Eigenvalue::complex(half_trace, -im),
        )
    } else {
        let root = inside.sqrt();
        (
            Eigenvalue::real(half_trace + root),
            Eigenvalue::real(half_trace - root),
        )
    }
}

/// Householder reflector annihilating the second component of `(v0, v1)`:
/// returns `(u1, gamma, alpha)` with implicit leading `u0 = 1`, such that
/// applying `I - gamma·u·uᵀ` sends the vector to `(alpha, 0)`. `None` when
/// the vector is exactly zero.
fn reflector2<T: Real>(v0: T, v1: T) -> Option<(T, T, T)> {
    let max = v0.abs().max(v1.abs());
    if max == T::zero() {
        return None;
    }
    let (v0, v1) = (v0 / max, v1 / max);
    let mut tau = (v0 * v0 + v1 * v1).sqrt();
    if v0 < T::zero() {
        tau = -tau;
    }
    let div = v0 + tau;
    Some((v1 / div, div / tau, -tau * max))
}

/// Three-component analogue of [`reflector2`]: `(u1, u2, gamma, alpha)`.
fn reflector3<T: Real>(v0: T, v1: T, v2: T) -> Option<(T, T, T, T)> {
    let max = v0.abs().max(v1.abs()).max(v2.abs());
    if max == T::zero() {
        return None;
    }
    let (v0, v1, v2) = (v0 / max, v1 / max, v2 / max);
    let mut tau = (v0 * v0 + v1 * v1 + v2 * v2).sqrt();
    if v0 < T::zero() {
        tau = -tau;
    }
    let div = v0 + tau;
    Some((v1 / div, v2 / div, div / tau, -tau * max))
}
