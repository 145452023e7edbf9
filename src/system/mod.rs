//! State-Space Systems
//!
//! This module holds the validated `(A, B, C, D)` container, the shape
//! checks every analysis routine performs before touching a decomposition,
//! and the transfer-function evaluator interface consumed by the pole/zero
//! direction extractor.

use ndarray::{Array1, Array2};
use ndarray_linalg::Inverse;
use num_complex::Complex64;

use crate::analysis;
use crate::error::{AnalysisError, Result};
use crate::linalg::{to_complex, EigenProvider, LapackEigen};
use crate::zeros::{self, TransmissionZero};

/// Check that `a` is square and return its order.
pub(crate) fn check_square<T>(a: &Array2<T>) -> Result<usize> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(AnalysisError::ShapeMismatch(format!(
            "A must be square, got {}×{}",
            n,
            a.ncols()
        )));
    }
    Ok(n)
}

/// Check the (A, B) pair and return `(n, m)`.
pub(crate) fn check_input_pair<T>(a: &Array2<T>, b: &Array2<T>) -> Result<(usize, usize)> {
    let n = check_square(a)?;
    if b.nrows() != n {
        return Err(AnalysisError::ShapeMismatch(format!(
            "B rows ({}) must match A dimension ({})",
            b.nrows(),
            n
        )));
    }
    Ok((n, b.ncols()))
}

/// Check the (A, C) pair and return `(n, p)`.
pub(crate) fn check_output_pair<T>(a: &Array2<T>, c: &Array2<T>) -> Result<(usize, usize)> {
    let n = check_square(a)?;
    if c.ncols() != n {
        return Err(AnalysisError::ShapeMismatch(format!(
            "C columns ({}) must match A dimension ({})",
            c.ncols(),
            n
        )));
    }
    Ok((n, c.nrows()))
}

/// Reject NaN or infinite entries, naming the offending matrix.
pub(crate) fn check_finite(m: &Array2<f64>, name: &'static str) -> Result<()> {
    if m.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(AnalysisError::NonFinite(name))
    }
}

/// Check a full (A, B, C, D) quadruple and return `(n, m, p)`.
pub(crate) fn check_system<T>(
    a: &Array2<T>,
    b: &Array2<T>,
    c: &Array2<T>,
    d: &Array2<T>,
) -> Result<(usize, usize, usize)> {
    let (n, m) = check_input_pair(a, b)?;
    let (_, p) = check_output_pair(a, c)?;
    if d.nrows() != p {
        return Err(AnalysisError::ShapeMismatch(format!(
            "D rows ({}) must match C rows ({})",
            d.nrows(),
            p
        )));
    }
    if d.ncols() != m {
        return Err(AnalysisError::ShapeMismatch(format!(
            "D columns ({}) must match B columns ({})",
            d.ncols(),
            m
        )));
    }
    Ok((n, m, p))
}

/// A transfer function `G(s)` that can be evaluated at a complex frequency.
///
/// Any closure `Fn(Complex64) -> Array2<Complex64>` qualifies, as does a
/// [`StateSpace`] realization.
pub trait TransferFunction {
    /// Evaluate `G(s)`, a `p × m` complex matrix.
    fn evaluate(&self, s: Complex64) -> Result<Array2<Complex64>>;
}

impl<F> TransferFunction for F
where
    F: Fn(Complex64) -> Array2<Complex64>,
{
    fn evaluate(&self, s: Complex64) -> Result<Array2<Complex64>> {
        Ok(self(s))
    }
}

/// Continuous-time state-space realization
///
/// ```text
/// dx/dt = A x + B u
///     y = C x + D u
/// ```
///
/// Construction validates the shapes once; the matrices are never mutated
/// afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct StateSpace {
    a: Array2<f64>,
    b: Array2<f64>,
    c: Array2<f64>,
    d: Array2<f64>,
}

impl StateSpace {
    /// Build a realization, defaulting `D` to a `p × m` zero matrix.
    ///
    /// # Examples
    ///
    /// ```
    /// use linsys_rs::system::StateSpace;
    /// use ndarray::arr2;
    ///
    /// let sys = StateSpace::new(
    ///     arr2(&[[-1.0, 0.0], [0.0, -2.0]]),
    ///     arr2(&[[1.0], [1.0]]),
    ///     arr2(&[[1.0, 1.0]]),
    ///     None,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(sys.states(), 2);
    /// assert_eq!(sys.d().shape(), &[1, 1]);
    /// ```
    pub fn new(
        a: Array2<f64>,
        b: Array2<f64>,
        c: Array2<f64>,
        d: Option<Array2<f64>>,
    ) -> Result<Self> {
        let d = d.unwrap_or_else(|| Array2::zeros((c.nrows(), b.ncols())));
        check_system(&a, &b, &c, &d)?;
        Ok(StateSpace { a, b, c, d })
    }

    pub fn a(&self) -> &Array2<f64> {
        &self.a
    }

    pub fn b(&self) -> &Array2<f64> {
        &self.b
    }

    pub fn c(&self) -> &Array2<f64> {
        &self.c
    }

    pub fn d(&self) -> &Array2<f64> {
        &self.d
    }

    /// State dimension `n`.
    pub fn states(&self) -> usize {
        self.a.nrows()
    }

    /// Input dimension `m`.
    pub fn inputs(&self) -> usize {
        self.b.ncols()
    }

    /// Output dimension `p`.
    pub fn outputs(&self) -> usize {
        self.c.nrows()
    }

    /// Poles of the realization (eigenvalues of A).
    pub fn poles(&self) -> Result<Array1<Complex64>> {
        let (eigenvalues, _) = LapackEigen.right_eigen(&self.a)?;
        Ok(eigenvalues)
    }

    /// See [`analysis::is_minimal_realization`].
    pub fn is_minimal_realization(&self) -> Result<bool> {
        analysis::is_minimal_realization(&self.a, &self.b, &self.c)
    }

    /// See [`zeros::zero`].
    pub fn zeros(&self) -> Result<Vec<TransmissionZero>> {
        zeros::zero(&self.a, &self.b, &self.c, &self.d)
    }
}

impl TransferFunction for StateSpace {
    /// `G(s) = C (sI − A)⁻¹ B + D`
    fn evaluate(&self, s: Complex64) -> Result<Array2<Complex64>> {
        let n = self.states();

        let mut resolvent = to_complex(&self.a).mapv(|x| -x);
        for i in 0..n {
            resolvent[(i, i)] += s;
        }

        let g = if n == 0 {
            to_complex(&self.d)
        } else {
            let inv = resolvent
                .inv()
                .map_err(|_| AnalysisError::SingularEvaluation { at: s })?;
            to_complex(&self.c).dot(&inv).dot(&to_complex(&self.b)) + to_complex(&self.d)
        };

        if g.iter().any(|x| !x.re.is_finite() || !x.im.is_finite()) {
            return Err(AnalysisError::SingularEvaluation { at: s });
        }
        Ok(g)
    }
}
