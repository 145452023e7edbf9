//! Linear Algebra Capabilities
//!
//! Narrow single-method interfaces over the numeric kernels the analyses
//! consume (eigen-decomposition, singular value decomposition), their
//! LAPACK-backed default implementations, and a handful of small helpers
//! shared across modules.
//!
//! The traits exist so that the analysis routines can be driven by
//! deterministic stubs in tests instead of a full LAPACK backend.

use ndarray::{Array1, Array2};
use ndarray_linalg::{Eig, SVD};
use num_complex::Complex64;

use crate::error::{AnalysisError, Result};

/// Eigen-decomposition of a real square matrix.
pub trait EigenProvider {
    /// Eigenvalues and right eigenvectors of `a`.
    ///
    /// Column `i` of the returned matrix is the eigenvector belonging to
    /// eigenvalue `i`, i.e. `a · v_i = λ_i · v_i`.
    fn right_eigen(&self, a: &Array2<f64>) -> Result<(Array1<Complex64>, Array2<Complex64>)>;

    /// Eigenvalues and left eigenvectors of `a`.
    ///
    /// Column `i` satisfies `v_iᴴ · a = λ_i · v_iᴴ`. Derived from the right
    /// eigenvectors of `aᵀ`: if `aᵀ w = λ w` then `w̄ᴴ a = λ w̄ᴴ` for real `a`.
    fn left_eigen(&self, a: &Array2<f64>) -> Result<(Array1<Complex64>, Array2<Complex64>)> {
        let (eigenvalues, w) = self.right_eigen(&a.t().to_owned())?;
        Ok((eigenvalues, w.mapv(|x| x.conj())))
    }
}

/// Singular value decomposition of a complex matrix.
pub trait SvdProvider {
    /// Returns `(U, Σ, V)` with `m = U · diag(Σ) · Vᴴ`.
    ///
    /// `V` is returned un-transposed so that its columns are the input
    /// singular directions. Singular values are in non-increasing order.
    fn decompose(&self, m: &Array2<Complex64>) -> Result<(Array2<Complex64>, Array1<f64>, Array2<Complex64>)>;
}

/// Eigen-decomposition through LAPACK `DGEEV` (via ndarray-linalg).
#[derive(Clone, Copy, Debug, Default)]
pub struct LapackEigen;

impl EigenProvider for LapackEigen {
    fn right_eigen(&self, a: &Array2<f64>) -> Result<(Array1<Complex64>, Array2<Complex64>)> {
        if a.is_empty() {
            return Ok((Array1::zeros(0), Array2::zeros((0, 0))));
        }
        Ok(a.eig()?)
    }
}

/// Full singular value decomposition through LAPACK `ZGESVD` (via ndarray-linalg).
#[derive(Clone, Copy, Debug, Default)]
pub struct LapackSvd;

impl SvdProvider for LapackSvd {
    fn decompose(&self, m: &Array2<Complex64>) -> Result<(Array2<Complex64>, Array1<f64>, Array2<Complex64>)> {
        let (u, sigma, vt) = m.svd(true, true)?;
        let u = u.ok_or_else(|| AnalysisError::Decomposition("SVD did not return U".to_string()))?;
        let vt = vt.ok_or_else(|| AnalysisError::Decomposition("SVD did not return Vᴴ".to_string()))?;

        // V = (Vᴴ)ᴴ
        let v = vt.t().mapv(|x| x.conj());
        Ok((u, sigma, v))
    }
}

/// Numerical rank by singular value thresholding.
///
/// Counts singular values strictly greater than `tol`. When `tol` is `None`
/// the usual default `max(rows, cols) · ε · σ_max` is used.
///
/// # Examples
///
/// ```
/// use linsys_rs::linalg::matrix_rank;
/// use ndarray::arr2;
///
/// let m = arr2(&[[1.0, 2.0], [2.0, 4.0]]);
/// assert_eq!(matrix_rank(&m, None).unwrap(), 1);
/// ```
pub fn matrix_rank(m: &Array2<f64>, tol: Option<f64>) -> Result<usize> {
    if m.is_empty() {
        return Ok(0);
    }

    let (_, singular_values, _) = m.svd(false, false)?;
    let sigma_max = singular_values.iter().cloned().fold(0.0, f64::max);
    let tol = tol.unwrap_or_else(|| (m.nrows().max(m.ncols()) as f64) * f64::EPSILON * sigma_max);

    Ok(singular_values.iter().filter(|&&s| s > tol).count())
}

/// Lift a real matrix into the complex field.
pub fn to_complex(m: &Array2<f64>) -> Array2<Complex64> {
    m.mapv(|x| Complex64::new(x, 0.0))
}

/// Round real and imaginary parts to `decimals` places, ties to even.
pub fn round_complex(z: Complex64, decimals: u32) -> Complex64 {
    let scale = 10f64.powi(decimals as i32);
    Complex64::new(
        (z.re * scale).round_ties_even() / scale,
        (z.im * scale).round_ties_even() / scale,
    )
}

/// First eigenvalue that lies within a relative distance `rel_tol` of an
/// earlier one, if any.
///
/// Two eigenvalues λ, μ are treated as repeated when
/// `|λ − μ| ≤ rel_tol · max(1, |λ|, |μ|)`.
pub fn find_repeated_eigenvalue(eigenvalues: &Array1<Complex64>, rel_tol: f64) -> Option<Complex64> {
    for (i, lambda) in eigenvalues.iter().enumerate() {
        for mu in eigenvalues.iter().skip(i + 1) {
            let scale = 1.0f64.max(lambda.norm()).max(mu.norm());
            if (lambda - mu).norm() <= rel_tol * scale {
                return Some(*lambda);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr2;

    #[test]
    fn test_matrix_rank_full() {
        let m = arr2(&[[1.0, 0.0], [0.0, 3.0]]);
        assert_eq!(matrix_rank(&m, None).unwrap(), 2);
    }

    #[test]
    fn test_matrix_rank_wide() {
        // Controllability matrix of an uncontrollable pair
        let m = arr2(&[[1.0, 1.0, 1.0, 1.0], [0.0, 0.0, 0.0, 0.0]]);
        assert_eq!(matrix_rank(&m, None).unwrap(), 1);
    }

    #[test]
    fn test_matrix_rank_explicit_tolerance() {
        let m = arr2(&[[1.0, 0.0], [0.0, 1e-6]]);
        assert_eq!(matrix_rank(&m, None).unwrap(), 2);
        assert_eq!(matrix_rank(&m, Some(1e-3)).unwrap(), 1);
    }

    #[test]
    fn test_matrix_rank_empty() {
        let m: Array2<f64> = Array2::zeros((0, 3));
        assert_eq!(matrix_rank(&m, None).unwrap(), 0);
    }

    #[test]
    fn test_round_complex_half_even() {
        let z = round_complex(Complex64::new(0.0625, -1.23456), 3);
        assert_relative_eq!(z.re, 0.062);
        assert_relative_eq!(z.im, -1.235);
    }

    #[test]
    fn test_round_complex_zero_decimals() {
        let z = round_complex(Complex64::new(2.5, 3.5), 0);
        assert_eq!(z, Complex64::new(2.0, 4.0));
    }

    #[test]
    fn test_find_repeated_eigenvalue() {
        let distinct = Array1::from(vec![Complex64::new(-1.0, 0.0), Complex64::new(-2.0, 0.0)]);
        assert_eq!(find_repeated_eigenvalue(&distinct, 1e-9), None);

        let repeated = Array1::from(vec![
            Complex64::new(-1.0, 0.0),
            Complex64::new(3.0, 0.0),
            Complex64::new(-1.0 + 1e-12, 0.0),
        ]);
        assert_eq!(
            find_repeated_eigenvalue(&repeated, 1e-9),
            Some(Complex64::new(-1.0, 0.0))
        );
    }

    #[test]
    fn test_lapack_eigen_diagonal() {
        let a = arr2(&[[-1.0, 0.0], [0.0, -3.0]]);
        let (eigs, vecs) = LapackEigen.right_eigen(&a).unwrap();
        assert_eq!(eigs.len(), 2);

        // a · v = λ · v for every pair
        let ac = to_complex(&a);
        for i in 0..2 {
            let v = vecs.column(i);
            let lhs = ac.dot(&v);
            for k in 0..2 {
                assert!((lhs[k] - eigs[i] * v[k]).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn test_lapack_eigen_left_vectors() {
        let a = arr2(&[[1.0, 2.0], [0.0, 3.0]]);
        let (eigs, vl) = LapackEigen.left_eigen(&a).unwrap();
        let ac = to_complex(&a);

        // vᴴ · a = λ · vᴴ
        for i in 0..2 {
            let vh = vl.column(i).mapv(|x| x.conj());
            let lhs = vh.dot(&ac);
            for k in 0..2 {
                assert!((lhs[k] - eigs[i] * vh[k]).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn test_lapack_svd_reconstructs() {
        let m = arr2(&[
            [Complex64::new(1.0, 1.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(2.0, 0.0), Complex64::new(0.5, -1.0)],
        ]);
        let (u, sigma, v) = LapackSvd.decompose(&m).unwrap();
        assert!(sigma[0] >= sigma[1]);

        let mut s = Array2::zeros((2, 2));
        s[(0, 0)] = Complex64::new(sigma[0], 0.0);
        s[(1, 1)] = Complex64::new(sigma[1], 0.0);
        let vh = v.t().mapv(|x| x.conj());
        let rebuilt = u.dot(&s).dot(&vh);

        for i in 0..2 {
            for j in 0..2 {
                assert!((rebuilt[(i, j)] - m[(i, j)]).norm() < 1e-12);
            }
        }
    }
}
