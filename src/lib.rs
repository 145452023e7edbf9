//! linsys-rs: structural analysis of continuous-time linear systems
//!
//! Answers the classical questions asked of a state-space realization
//! `(A, B, C, D)` and its transfer function `G(s)`:
//!
//! - is the system state controllable, is it state observable
//!   (pole-vector criteria),
//! - is the realization minimal,
//! - in which input and output directions do its poles and zeros act
//!   (singular value decomposition of `G` near each location),
//! - where are its transmission zeros (exact roots of the Rosenbrock
//!   determinant).
//!
//! # Organization
//!
//! - `analysis`: controllability, observability and minimal-realization checks
//! - `directions`: pole/zero input and output directions
//! - `zeros`: Rosenbrock pencil and transmission zeros
//! - `system`: the `StateSpace` container and the `TransferFunction` interface
//! - `linalg`: eigen/SVD capability traits with LAPACK-backed defaults
//! - `poly`: exact rational polynomials, determinants and root solving
//! - `error`: the shared error type
//!
//! # Example
//!
//! ```
//! use linsys_rs::analysis::{is_minimal_realization, state_controllability};
//! use ndarray::arr2;
//!
//! let a = arr2(&[[-1.0, 0.0], [0.0, -2.0]]);
//! let b = arr2(&[[1.0], [0.0]]);
//! let c = arr2(&[[1.0, 1.0]]);
//!
//! // The second mode is not driven by the input
//! let report = state_controllability(&a, &b).unwrap();
//! assert!(!report.controllable);
//! assert_eq!(report.uncontrollable_modes.len(), 1);
//! assert!(!is_minimal_realization(&a, &b, &c).unwrap());
//! ```

pub mod analysis;
pub mod directions;
pub mod error;
pub mod linalg;
pub mod poly;
pub mod system;
pub mod zeros;

pub use error::{AnalysisError, Result};
