//! Matrix decompositions.
//!
//! | Decomposition | Module         | Factorization             |
//! |---------------|----------------|---------------------------|
//! | LU            | [`lu`]         | `PA = LU`                 |
//! | Hessenberg    | [`hessenberg`] | `A = Q H Qᵀ`              |
//! | Eigen         | [`eig`]        | `A v = λ v` (real, general) |
//!
//! The eigendecomposition is the implicit double-shift QR (Francis)
//! algorithm: [`eig`] drives the deflation state machine over the kernel in
//! [`francis`], and [`eigvec`] recovers real eigenvectors from the Schur
//! form with a second, eigenvalue-guided pass.

pub mod eig;
mod eigvec;
mod francis;
pub mod hessenberg;
pub mod lu;

pub use eig::{EigDecomposition, Eigenvalue};
pub use hessenberg::HessenbergDecomposition;
pub use lu::{solve_upper, LuDecomposition};
