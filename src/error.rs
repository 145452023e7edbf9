//! Error taxonomy shared by every analysis routine.
//!
//! All variants are precondition violations detected at the start of a call
//! and returned immediately; nothing is retried or recovered internally.
//! Numerical caveats such as the exact-zero controllability test or the
//! component-sum observability heuristic are *not* errors.

use ndarray_linalg::error::LinalgError;
use num_complex::Complex64;
use thiserror::Error;

/// Errors raised by the analysis routines.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A has (numerically) repeated eigenvalues, so pole-vector based
    /// controllability/observability results would be unreliable.
    #[error("A has a repeated eigenvalue near {eigenvalue}; repeated-pole systems are not supported")]
    UnsupportedSystem { eigenvalue: Complex64 },

    /// Matrix dimensions are inconsistent.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A matrix handed to exact arithmetic holds NaN or an infinity.
    #[error("matrix {0} contains a non-finite entry")]
    NonFinite(&'static str),

    /// The transfer function was evaluated at (or returned garbage near) a
    /// singular point.
    #[error("transfer function is singular at s = {at}")]
    SingularEvaluation { at: Complex64 },

    /// det(z·Ig − M) vanishes for every z.
    #[error("Rosenbrock pencil determinant is identically zero; every z would be a zero")]
    DegenerateZeroPencil,

    /// A decomposition provider returned an incomplete result.
    #[error("decomposition failed: {0}")]
    Decomposition(String),

    /// LAPACK reported a failure.
    #[error("LAPACK failure: {0}")]
    Linalg(#[from] LinalgError),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AnalysisError>;
