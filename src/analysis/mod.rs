//! Structural Analysis Routines
//!
//! State controllability, state observability and minimal-realization
//! checks for continuous-time systems in state-space form, following the
//! pole-vector criteria of Skogestad & Postlethwaite (section 4.2):
//!
//! - the input pole vector of mode `i` is `u_p_i = Bᴴ · q_i`, where `q_i`
//!   is the left eigenvector of A belonging to pole `p_i`; the mode is
//!   uncontrollable when `u_p_i` vanishes,
//! - the output pole vector of mode `i` is `y_p_i = C · t_i`, where `t_i`
//!   is the right eigenvector; the mode is unobservable when `y_p_i`
//!   vanishes.
//!
//! The controllability and observability matrices are returned alongside
//! each decision so callers can cross-check with a rank test, but the
//! decision itself is pole-vector based.
//!
//! # Caveats
//!
//! - Repeated eigenvalues of A are not supported. By default they are
//!   detected and reported as [`AnalysisError::UnsupportedSystem`].
//! - The default controllability test is an exact `‖u_p_i‖ == 0.0`
//!   comparison; set [`AnalysisOptions::pole_vector_tolerance`] to loosen it.
//! - The default observability test rounds `y_p_i` to three decimals and
//!   flags a mode when the *sum* of its components is zero. A vector such as
//!   `[1, −1]` is therefore reported as unobservable even though the mode is
//!   clearly visible. [`ObservabilityTest::Norm`] replaces the sum with the
//!   Euclidean norm.

use ndarray::{s, Array1, Array2};
use num_complex::Complex64;
use tracing::{debug, warn};

use crate::error::{AnalysisError, Result};
use crate::linalg::{find_repeated_eigenvalue, matrix_rank, round_complex, to_complex, EigenProvider, LapackEigen};
use crate::system::{check_finite, check_input_pair, check_output_pair};

/// How an output pole vector is judged to vanish.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ObservabilityTest {
    /// `|Σ_k y_k| ≤ tol` (reference behavior, weak)
    #[default]
    ComponentSum,
    /// `‖y‖₂ ≤ tol`
    Norm,
}

/// Tunables for the pole-vector tests.
///
/// The defaults reproduce the reference decisions exactly: exact-zero
/// controllability test, three-decimal rounding and component-sum test for
/// observability. Only the repeated-eigenvalue guard is on by default.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisOptions {
    /// A mode is uncontrollable when `‖u_p_i‖ ≤ pole_vector_tolerance`.
    pub pole_vector_tolerance: f64,
    /// Decimal places `y_p_i` is rounded to before testing.
    pub output_rounding_decimals: u32,
    /// Criterion applied to the rounded `y_p_i`.
    pub observability_test: ObservabilityTest,
    /// Threshold used by `observability_test`.
    pub observability_tolerance: f64,
    /// Relative gap under which two eigenvalues count as repeated.
    /// `None` disables the check.
    pub repeated_eigenvalue_tolerance: Option<f64>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            pole_vector_tolerance: 0.0,
            output_rounding_decimals: 3,
            observability_test: ObservabilityTest::ComponentSum,
            observability_tolerance: 0.0,
            repeated_eigenvalue_tolerance: Some(1e-9),
        }
    }
}

impl AnalysisOptions {
    pub fn with_pole_vector_tolerance(mut self, tol: f64) -> Self {
        self.pole_vector_tolerance = tol;
        self
    }

    pub fn with_output_rounding_decimals(mut self, decimals: u32) -> Self {
        self.output_rounding_decimals = decimals;
        self
    }

    pub fn with_observability_test(mut self, test: ObservabilityTest) -> Self {
        self.observability_test = test;
        self
    }

    pub fn with_observability_tolerance(mut self, tol: f64) -> Self {
        self.observability_tolerance = tol;
        self
    }

    pub fn with_repeated_eigenvalue_tolerance(mut self, tol: Option<f64>) -> Self {
        self.repeated_eigenvalue_tolerance = tol;
        self
    }
}

/// Pole vector of a single mode.
#[derive(Clone, Debug, PartialEq)]
pub struct PoleVector {
    /// Pole (eigenvalue of A) the vector belongs to
    pub eigenvalue: Complex64,
    /// `Bᴴ · q_i` (input) or `round(C · t_i)` (output)
    pub direction: Array1<Complex64>,
}

impl PoleVector {
    /// Euclidean norm of the direction.
    pub fn norm(&self) -> f64 {
        self.direction.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt()
    }

    /// Plain (complex) sum of the components.
    pub fn component_sum(&self) -> Complex64 {
        self.direction.sum()
    }
}

/// Result of [`state_controllability`].
#[derive(Clone, Debug)]
pub struct ControllabilityReport {
    /// True when no input pole vector vanishes
    pub controllable: bool,
    /// One input pole vector `u_p_i` per eigenvalue of A
    pub input_pole_vectors: Vec<PoleVector>,
    /// Indices into `input_pole_vectors` of the uncontrollable modes
    pub uncontrollable_modes: Vec<usize>,
    /// `[B, AB, A²B, …, Aⁿ⁻¹B]`, n × (n·m)
    pub controllability_matrix: Array2<f64>,
}

impl ControllabilityReport {
    /// Rank of the controllability matrix (see [`matrix_rank`]).
    pub fn matrix_rank(&self, tol: Option<f64>) -> Result<usize> {
        matrix_rank(&self.controllability_matrix, tol)
    }
}

/// Result of [`state_observability`].
#[derive(Clone, Debug)]
pub struct ObservabilityReport {
    /// True when no output pole vector vanishes under the configured test
    pub observable: bool,
    /// One rounded output pole vector `y_p_i` per eigenvalue of A
    pub output_pole_vectors: Vec<PoleVector>,
    /// Indices into `output_pole_vectors` of the unobservable modes
    pub unobservable_modes: Vec<usize>,
    /// `[C; CA; CA²; …; CAⁿ⁻¹]`, (n·p) × n
    pub observability_matrix: Array2<f64>,
}

impl ObservabilityReport {
    /// Rank of the observability matrix (see [`matrix_rank`]).
    pub fn matrix_rank(&self, tol: Option<f64>) -> Result<usize> {
        matrix_rank(&self.observability_matrix, tol)
    }
}

/// Controllability matrix `[B, AB, A²B, …, Aⁿ⁻¹B]`.
///
/// Needs no eigen-analysis, so it is also defined for systems with repeated
/// poles.
///
/// # Examples
///
/// ```
/// use linsys_rs::analysis::controllability_matrix;
/// use ndarray::arr2;
///
/// // Double integrator
/// let a = arr2(&[[0.0, 1.0], [0.0, 0.0]]);
/// let b = arr2(&[[0.0], [1.0]]);
///
/// let cm = controllability_matrix(&a, &b).unwrap();
/// assert_eq!(cm, arr2(&[[0.0, 1.0], [1.0, 0.0]]));
/// ```
pub fn controllability_matrix(a: &Array2<f64>, b: &Array2<f64>) -> Result<Array2<f64>> {
    let (n, m) = check_input_pair(a, b)?;

    let mut matrix = Array2::zeros((n, n * m));
    let mut a_power_b = b.clone();
    for k in 0..n {
        if k > 0 {
            a_power_b = a.dot(&a_power_b);
        }
        matrix.slice_mut(s![.., k * m..(k + 1) * m]).assign(&a_power_b);
    }

    Ok(matrix)
}

/// Observability matrix `[C; CA; CA²; …; CAⁿ⁻¹]`.
pub fn observability_matrix(a: &Array2<f64>, c: &Array2<f64>) -> Result<Array2<f64>> {
    let (n, p) = check_output_pair(a, c)?;

    let mut matrix = Array2::zeros((n * p, n));
    let mut c_a_power = c.clone();
    for k in 0..n {
        if k > 0 {
            c_a_power = c_a_power.dot(a);
        }
        matrix.slice_mut(s![k * p..(k + 1) * p, ..]).assign(&c_a_power);
    }

    Ok(matrix)
}

fn guard_repeated_eigenvalues(eigenvalues: &Array1<Complex64>, options: &AnalysisOptions) -> Result<()> {
    if let Some(tol) = options.repeated_eigenvalue_tolerance {
        if let Some(eigenvalue) = find_repeated_eigenvalue(eigenvalues, tol) {
            return Err(AnalysisError::UnsupportedSystem { eigenvalue });
        }
    }
    Ok(())
}

/// State controllability of the pair (A, B) with default options.
///
/// # Examples
///
/// ```
/// use linsys_rs::analysis::state_controllability;
/// use ndarray::arr2;
///
/// let a = arr2(&[[-1.0, 0.0], [0.0, -2.0]]);
/// let b = arr2(&[[1.0], [1.0]]);
///
/// let report = state_controllability(&a, &b).unwrap();
/// assert!(report.controllable);
/// assert_eq!(report.input_pole_vectors.len(), 2);
/// assert_eq!(report.controllability_matrix.shape(), &[2, 2]);
/// ```
///
/// # Errors
///
/// - [`AnalysisError::ShapeMismatch`] if A is not square or B's row count differs
/// - [`AnalysisError::NonFinite`] if A or B holds NaN or ∞
/// - [`AnalysisError::UnsupportedSystem`] if A has repeated eigenvalues
pub fn state_controllability(a: &Array2<f64>, b: &Array2<f64>) -> Result<ControllabilityReport> {
    state_controllability_with(a, b, &AnalysisOptions::default(), &LapackEigen)
}

/// State controllability of (A, B) with explicit options and eigen provider.
pub fn state_controllability_with<E: EigenProvider + ?Sized>(
    a: &Array2<f64>,
    b: &Array2<f64>,
    options: &AnalysisOptions,
    eigen: &E,
) -> Result<ControllabilityReport> {
    let (n, m) = check_input_pair(a, b)?;
    check_finite(a, "A")?;
    check_finite(b, "B")?;

    let (eigenvalues, left_vectors) = eigen.left_eigen(a)?;
    guard_repeated_eigenvalues(&eigenvalues, options)?;

    // Bᴴ is just Bᵀ for real B
    let b_h = to_complex(b).reversed_axes();

    let input_pole_vectors: Vec<PoleVector> = eigenvalues
        .iter()
        .zip(left_vectors.columns())
        .map(|(&eigenvalue, q)| PoleVector {
            eigenvalue,
            direction: b_h.dot(&q),
        })
        .collect();

    let uncontrollable_modes: Vec<usize> = input_pole_vectors
        .iter()
        .enumerate()
        .filter(|(_, u)| u.norm() <= options.pole_vector_tolerance)
        .map(|(i, _)| i)
        .collect();

    let controllable = uncontrollable_modes.is_empty();
    debug!(
        n,
        m,
        controllable,
        uncontrollable = uncontrollable_modes.len(),
        "state controllability"
    );

    Ok(ControllabilityReport {
        controllable,
        input_pole_vectors,
        uncontrollable_modes,
        controllability_matrix: controllability_matrix(a, b)?,
    })
}

/// State observability of the pair (A, C) with default options.
///
/// # Examples
///
/// ```
/// use linsys_rs::analysis::state_observability;
/// use ndarray::arr2;
///
/// let a = arr2(&[[-1.0, 0.0], [0.0, -2.0]]);
/// let c = arr2(&[[1.0, 0.0], [0.0, 1.0]]);
///
/// let report = state_observability(&a, &c).unwrap();
/// assert!(report.observable);
/// assert_eq!(report.observability_matrix.shape(), &[4, 2]);
/// ```
///
/// # Errors
///
/// - [`AnalysisError::ShapeMismatch`] if A is not square or C's column count differs
/// - [`AnalysisError::NonFinite`] if A or C holds NaN or ∞
/// - [`AnalysisError::UnsupportedSystem`] if A has repeated eigenvalues
pub fn state_observability(a: &Array2<f64>, c: &Array2<f64>) -> Result<ObservabilityReport> {
    state_observability_with(a, c, &AnalysisOptions::default(), &LapackEigen)
}

/// State observability of (A, C) with explicit options and eigen provider.
pub fn state_observability_with<E: EigenProvider + ?Sized>(
    a: &Array2<f64>,
    c: &Array2<f64>,
    options: &AnalysisOptions,
    eigen: &E,
) -> Result<ObservabilityReport> {
    let (n, p) = check_output_pair(a, c)?;
    check_finite(a, "A")?;
    check_finite(c, "C")?;

    let (eigenvalues, right_vectors) = eigen.right_eigen(a)?;
    guard_repeated_eigenvalues(&eigenvalues, options)?;

    let c_complex = to_complex(c);
    let decimals = options.output_rounding_decimals;

    let output_pole_vectors: Vec<PoleVector> = eigenvalues
        .iter()
        .zip(right_vectors.columns())
        .map(|(&eigenvalue, t)| PoleVector {
            eigenvalue,
            direction: c_complex.dot(&t).mapv(|y| round_complex(y, decimals)),
        })
        .collect();

    let tol = options.observability_tolerance;
    let mut unobservable_modes = Vec::new();
    for (i, y) in output_pole_vectors.iter().enumerate() {
        let vanishes = match options.observability_test {
            ObservabilityTest::ComponentSum => y.component_sum().norm() <= tol,
            ObservabilityTest::Norm => y.norm() <= tol,
        };
        if vanishes {
            if options.observability_test == ObservabilityTest::ComponentSum && y.norm() > tol {
                warn!(
                    mode = i,
                    eigenvalue = %y.eigenvalue,
                    norm = y.norm(),
                    "output pole vector sums to zero but is nonzero; component-sum test reports the mode unobservable"
                );
            }
            unobservable_modes.push(i);
        }
    }

    let observable = unobservable_modes.is_empty();
    debug!(
        n,
        p,
        observable,
        unobservable = unobservable_modes.len(),
        "state observability"
    );

    Ok(ObservabilityReport {
        observable,
        output_pole_vectors,
        unobservable_modes,
        observability_matrix: observability_matrix(a, c)?,
    })
}

/// True when (A, B, C) is both state controllable and state observable.
///
/// # Examples
///
/// ```
/// use linsys_rs::analysis::is_minimal_realization;
/// use ndarray::arr2;
///
/// let a = arr2(&[[-1.0, 0.0], [0.0, -2.0]]);
/// let b = arr2(&[[1.0], [1.0]]);
/// let c = arr2(&[[1.0, 2.0]]);
///
/// assert!(is_minimal_realization(&a, &b, &c).unwrap());
/// ```
pub fn is_minimal_realization(a: &Array2<f64>, b: &Array2<f64>, c: &Array2<f64>) -> Result<bool> {
    is_minimal_realization_with(a, b, c, &AnalysisOptions::default(), &LapackEigen)
}

/// Minimal-realization check with explicit options and eigen provider.
pub fn is_minimal_realization_with<E: EigenProvider + ?Sized>(
    a: &Array2<f64>,
    b: &Array2<f64>,
    c: &Array2<f64>,
    options: &AnalysisOptions,
    eigen: &E,
) -> Result<bool> {
    let observability = state_observability_with(a, c, options, eigen)?;
    let controllability = state_controllability_with(a, b, options, eigen)?;

    Ok(controllability.controllable && observability.observable)
}
