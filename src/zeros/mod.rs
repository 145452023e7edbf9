//! Transmission Zeros
//!
//! Zeros of a square system (A, B, C, D) are the values of `z` at which the
//! Rosenbrock system matrix loses rank. With
//!
//! ```text
//! M  = [ A  B ]        Ig = [ Iₙ  0 ]
//!      [ C  D ]             [ 0   0 ]
//! ```
//!
//! they are the roots of `det(z·Ig − M)`. The determinant is expanded in
//! exact rational arithmetic; floating-point inputs are converted without
//! rounding (every finite `f64` is a dyadic rational), so the polynomial
//! handed to the root solver is exactly the one defined by the caller's
//! matrices.
//!
//! Roots are not filtered: if the structure of D makes the degree collapse,
//! whatever roots the determinant has are reported.

use ndarray::Array2;
use num_rational::BigRational;
use num_traits::One;
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::poly::{determinant, ExactRootSolver, Polynomial, RootSolver};
use crate::system::check_system;

pub use crate::poly::PolynomialRoot as TransmissionZero;

/// Exact copy of a floating-point matrix.
fn to_exact(m: &Array2<f64>, name: &'static str) -> Result<Array2<BigRational>> {
    let values = m
        .iter()
        .map(|&x| BigRational::from_float(x).ok_or(AnalysisError::NonFinite(name)))
        .collect::<Result<Vec<_>>>()?;
    Array2::from_shape_vec(m.raw_dim(), values).map_err(|e| AnalysisError::ShapeMismatch(e.to_string()))
}

/// The polynomial matrix `z·Ig − M` of a square system.
///
/// # Errors
///
/// - [`AnalysisError::ShapeMismatch`] if the quadruple is inconsistent or the
///   system is not square (`p ≠ m`), in which case the pencil has no
///   determinant.
pub fn system_matrix_pencil(
    a: &Array2<BigRational>,
    b: &Array2<BigRational>,
    c: &Array2<BigRational>,
    d: &Array2<BigRational>,
) -> Result<Array2<Polynomial>> {
    let (n, m, p) = check_system(a, b, c, d)?;
    if p != m {
        return Err(AnalysisError::ShapeMismatch(format!(
            "system matrix is {}×{}; transmission zeros need as many outputs ({}) as inputs ({})",
            n + p,
            n + m,
            p,
            m
        )));
    }

    Ok(Array2::from_shape_fn((n + p, n + m), |(i, j)| {
        let entry = match (i < n, j < n) {
            (true, true) => &a[(i, j)],
            (true, false) => &b[(i, j - n)],
            (false, true) => &c[(i - n, j)],
            (false, false) => &d[(i - n, j - n)],
        };

        let mut coeffs = vec![-entry];
        if i == j && i < n {
            coeffs.push(BigRational::one());
        }
        Polynomial::new(coeffs)
    }))
}

/// `det(z·Ig − M)` as an exact polynomial in `z`.
pub fn zero_polynomial(
    a: &Array2<BigRational>,
    b: &Array2<BigRational>,
    c: &Array2<BigRational>,
    d: &Array2<BigRational>,
) -> Result<Polynomial> {
    determinant(&system_matrix_pencil(a, b, c, d)?)
}

/// Transmission zeros of (A, B, C, D).
///
/// Returns every distinct root of `det(z·Ig − M)` with its multiplicity,
/// ordered by real part and then imaginary part. An empty vector means the
/// determinant is a nonzero constant (no finite zeros).
///
/// # Examples
///
/// ```
/// use linsys_rs::zeros::zero;
/// use ndarray::arr2;
/// use num_rational::BigRational;
///
/// // G(s) = (1 − s)/(1 + s): a right-half-plane zero at s = 1
/// let a = arr2(&[[-1.0]]);
/// let b = arr2(&[[1.0]]);
/// let c = arr2(&[[2.0]]);
/// let d = arr2(&[[-1.0]]);
///
/// let zeros = zero(&a, &b, &c, &d).unwrap();
/// assert_eq!(zeros.len(), 1);
/// assert_eq!(zeros[0].root.as_rational(), Some(&BigRational::from_integer(1.into())));
/// ```
///
/// # Errors
///
/// - [`AnalysisError::ShapeMismatch`] for inconsistent or non-square systems
/// - [`AnalysisError::NonFinite`] if any matrix holds NaN or ∞
/// - [`AnalysisError::DegenerateZeroPencil`] if the determinant vanishes identically
pub fn zero(
    a: &Array2<f64>,
    b: &Array2<f64>,
    c: &Array2<f64>,
    d: &Array2<f64>,
) -> Result<Vec<TransmissionZero>> {
    zero_with(a, b, c, d, &ExactRootSolver)
}

/// [`zero`] with an explicit root solver.
pub fn zero_with<R: RootSolver + ?Sized>(
    a: &Array2<f64>,
    b: &Array2<f64>,
    c: &Array2<f64>,
    d: &Array2<f64>,
    solver: &R,
) -> Result<Vec<TransmissionZero>> {
    check_system(a, b, c, d)?;
    zero_rational_with(
        &to_exact(a, "A")?,
        &to_exact(b, "B")?,
        &to_exact(c, "C")?,
        &to_exact(d, "D")?,
        solver,
    )
}

/// Transmission zeros of a system given with exact rational entries.
pub fn zero_rational(
    a: &Array2<BigRational>,
    b: &Array2<BigRational>,
    c: &Array2<BigRational>,
    d: &Array2<BigRational>,
) -> Result<Vec<TransmissionZero>> {
    zero_rational_with(a, b, c, d, &ExactRootSolver)
}

/// [`zero_rational`] with an explicit root solver.
pub fn zero_rational_with<R: RootSolver + ?Sized>(
    a: &Array2<BigRational>,
    b: &Array2<BigRational>,
    c: &Array2<BigRational>,
    d: &Array2<BigRational>,
    solver: &R,
) -> Result<Vec<TransmissionZero>> {
    let det = zero_polynomial(a, b, c, d)?;
    if det.is_zero() {
        return Err(AnalysisError::DegenerateZeroPencil);
    }

    let zeros = solver.solve(&det)?;
    debug!(
        states = a.nrows(),
        degree = det.degree().unwrap_or(0),
        zeros = zeros.len(),
        "transmission zeros"
    );
    Ok(zeros)
}
