//! Pole and Zero Directions
//!
//! Input and output directions of a transfer function at its poles and
//! zeros, read off the singular value decomposition `G(d) = U Σ Vᴴ`:
//!
//! - near a pole the gain is large in the dominant direction, so the first
//!   columns of V (input) and U (output) are taken,
//! - at a zero the gain collapses in the weakest direction, so the last
//!   columns are taken.
//!
//! Poles cannot be evaluated exactly; `G` is sampled at `d + ε` instead.
//! Zeros are evaluated at `d` itself.
//!
//! # Limitations
//!
//! Only the transfer function is consulted. If `G` has a pole-zero
//! cancellation the hidden mode is invisible to it and the directions
//! returned for that location are wrong; the state-space realization is
//! needed to treat such systems correctly. No attempt is made to detect
//! cancellations.

use ndarray::Array1;
use num_complex::Complex64;
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::linalg::{LapackSvd, SvdProvider};
use crate::system::TransferFunction;

/// Default offset added to a pole before `G` is evaluated.
pub const DEFAULT_POLE_EPSILON: f64 = 1e-5;

/// Whether the locations are poles or zeros of `G`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoleZeroKind {
    Pole,
    Zero,
}

/// What is returned for each location.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DirectionDisplay {
    Input,
    Output,
    #[default]
    All,
}

/// Direction(s) at a single pole or zero.
#[derive(Clone, Debug, PartialEq)]
pub enum PoleZeroDirection {
    /// Column of V, length `m`
    Input(Array1<Complex64>),
    /// Column of U, length `p`
    Output(Array1<Complex64>),
    /// Location with both directions
    Full {
        location: Complex64,
        input: Array1<Complex64>,
        output: Array1<Complex64>,
    },
}

impl PoleZeroDirection {
    /// Input direction, when present.
    pub fn input(&self) -> Option<&Array1<Complex64>> {
        match self {
            PoleZeroDirection::Input(u) | PoleZeroDirection::Full { input: u, .. } => Some(u),
            PoleZeroDirection::Output(_) => None,
        }
    }

    /// Output direction, when present.
    pub fn output(&self) -> Option<&Array1<Complex64>> {
        match self {
            PoleZeroDirection::Output(y) | PoleZeroDirection::Full { output: y, .. } => Some(y),
            PoleZeroDirection::Input(_) => None,
        }
    }
}

/// Input/output directions of `g` at each of `locations`.
///
/// The result has one entry per location, in the same order; `display`
/// only changes what each entry holds.
///
/// # Arguments
///
/// * `g` - Transfer function (closure or [`crate::system::StateSpace`])
/// * `locations` - Pole or zero locations
/// * `kind` - Whether `locations` are poles or zeros
/// * `display` - Input direction, output direction, or both with the location
/// * `epsilon` - Offset for poles, typically [`DEFAULT_POLE_EPSILON`];
///   ignored for zeros
///
/// # Errors
///
/// - [`AnalysisError::SingularEvaluation`] when poles are requested with
///   `epsilon == 0`, or when `g` fails or returns non-finite entries
/// - [`AnalysisError::ShapeMismatch`] when `g` evaluates to an empty matrix
///
/// # Examples
///
/// ```
/// use linsys_rs::directions::{pole_zero_directions, DirectionDisplay, PoleZeroKind};
/// use ndarray::arr2;
/// use num_complex::Complex64;
///
/// // G(s) = diag(1/(s + 1), (s − 1)/(s + 2)) has a zero at s = 1 in output 2
/// let g = |s: Complex64| {
///     let zero = Complex64::new(0.0, 0.0);
///     arr2(&[[1.0 / (s + 1.0), zero], [zero, (s - 1.0) / (s + 2.0)]])
/// };
///
/// let dirs = pole_zero_directions(
///     &g,
///     &[Complex64::new(1.0, 0.0)],
///     PoleZeroKind::Zero,
///     DirectionDisplay::Output,
///     0.0,
/// )
/// .unwrap();
///
/// let y = dirs[0].output().unwrap();
/// assert!(y[0].norm() < 1e-12);
/// assert!((y[1].norm() - 1.0).abs() < 1e-12);
/// ```
pub fn pole_zero_directions<G: TransferFunction + ?Sized>(
    g: &G,
    locations: &[Complex64],
    kind: PoleZeroKind,
    display: DirectionDisplay,
    epsilon: f64,
) -> Result<Vec<PoleZeroDirection>> {
    pole_zero_directions_with(g, locations, kind, display, epsilon, &LapackSvd)
}

/// [`pole_zero_directions`] with an explicit SVD provider.
pub fn pole_zero_directions_with<G, S>(
    g: &G,
    locations: &[Complex64],
    kind: PoleZeroKind,
    display: DirectionDisplay,
    epsilon: f64,
    svd: &S,
) -> Result<Vec<PoleZeroDirection>>
where
    G: TransferFunction + ?Sized,
    S: SvdProvider + ?Sized,
{
    let epsilon = match kind {
        PoleZeroKind::Pole => epsilon,
        PoleZeroKind::Zero => 0.0,
    };

    let mut directions = Vec::with_capacity(locations.len());
    for &location in locations {
        if kind == PoleZeroKind::Pole && epsilon == 0.0 {
            return Err(AnalysisError::SingularEvaluation { at: location });
        }

        let s = location + epsilon;
        let value = g.evaluate(s)?;
        if value.iter().any(|x| !x.re.is_finite() || !x.im.is_finite()) {
            return Err(AnalysisError::SingularEvaluation { at: s });
        }
        if value.is_empty() {
            return Err(AnalysisError::ShapeMismatch(format!(
                "G({}) is {}×{}; no direction to read",
                s,
                value.nrows(),
                value.ncols()
            )));
        }

        let (u, _, v) = svd.decompose(&value)?;
        if u.ncols() == 0 || v.ncols() == 0 {
            return Err(AnalysisError::Decomposition(format!(
                "SVD of a {}×{} matrix returned U with {} and V with {} columns",
                value.nrows(),
                value.ncols(),
                u.ncols(),
                v.ncols()
            )));
        }

        let (iu, iv) = match kind {
            PoleZeroKind::Pole => (0, 0),
            PoleZeroKind::Zero => (u.ncols() - 1, v.ncols() - 1),
        };
        let output = u.column(iu).to_owned();
        let input = v.column(iv).to_owned();

        directions.push(match display {
            DirectionDisplay::Input => PoleZeroDirection::Input(input),
            DirectionDisplay::Output => PoleZeroDirection::Output(output),
            DirectionDisplay::All => PoleZeroDirection::Full {
                location,
                input,
                output,
            },
        });
    }

    debug!(
        locations = locations.len(),
        kind = ?kind,
        epsilon,
        "pole/zero directions"
    );
    Ok(directions)
}
