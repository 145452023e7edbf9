//! Exact Polynomial Routines
//!
//! Univariate polynomials with arbitrary-precision rational coefficients,
//! a fraction-free determinant for matrices of such polynomials, and an
//! exact root solver. These back the transmission-zero computation, where
//! floating-point expansion of the system-matrix determinant is not
//! acceptable.
//!
//! Coefficients are stored in **increasing** powers of the variable `z`:
//!
//! ```text
//! P(z) = p[0] + p[1]*z + p[2]*z² + ... + p[n]*zⁿ
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use ndarray::Array2;
use ndarray_linalg::Eig;
use num_bigint::BigInt;
use num_complex::{Complex, Complex64};
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::error::{AnalysisError, Result};

/// Bits of working precision kept beyond what exact reconstruction needs.
const GUARD_BITS: u64 = 64;

/// Upper limit on exact Newton steps when refining a root estimate.
const MAX_REFINEMENT_STEPS: usize = 32;

/// Newton steps used to polish companion-matrix root estimates.
const NEWTON_STEPS: usize = 3;

/// Polynomial in one variable with exact rational coefficients.
///
/// The coefficient vector never carries trailing (highest-power) zeros, so
/// the zero polynomial has no coefficients at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynomial {
    coeffs: Vec<BigRational>,
}

impl Polynomial {
    /// Build from coefficients in increasing powers.
    pub fn new(mut coeffs: Vec<BigRational>) -> Self {
        while coeffs.last().map_or(false, |c| c.is_zero()) {
            coeffs.pop();
        }
        Polynomial { coeffs }
    }

    /// Build from integer coefficients in increasing powers.
    ///
    /// ```
    /// use linsys_rs::poly::Polynomial;
    ///
    /// // z² − 1
    /// let p = Polynomial::from_integers(&[-1, 0, 1]);
    /// assert_eq!(p.degree(), Some(2));
    /// assert_eq!(p.to_string(), "z^2 - 1");
    /// ```
    pub fn from_integers(coeffs: &[i64]) -> Self {
        Polynomial::new(coeffs.iter().map(|&c| BigRational::from_integer(BigInt::from(c))).collect())
    }

    pub fn zero() -> Self {
        Polynomial { coeffs: Vec::new() }
    }

    pub fn one() -> Self {
        Polynomial::constant(BigRational::one())
    }

    pub fn constant(c: BigRational) -> Self {
        Polynomial::new(vec![c])
    }

    /// The monomial `z`.
    pub fn variable() -> Self {
        Polynomial::new(vec![BigRational::zero(), BigRational::one()])
    }

    pub fn coeffs(&self) -> &[BigRational] {
        &self.coeffs
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree, or `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    pub fn leading_coefficient(&self) -> Option<&BigRational> {
        self.coeffs.last()
    }

    /// Exact evaluation (Horner).
    pub fn eval(&self, x: &BigRational) -> BigRational {
        self.coeffs
            .iter()
            .rev()
            .fold(BigRational::zero(), |acc, c| acc * x + c)
    }

    /// Exact evaluation at a complex point with rational parts.
    fn eval_exact_complex(&self, z: &Complex<BigRational>) -> Complex<BigRational> {
        self.coeffs.iter().rev().fold(Complex::zero(), |acc, c| {
            acc * z.clone() + Complex::new(c.clone(), BigRational::zero())
        })
    }

    /// Floating-point evaluation at a complex point.
    pub fn eval_complex(&self, z: Complex64) -> Complex64 {
        self.coeffs.iter().rev().fold(Complex64::zero(), |acc, c| {
            acc * z + c.to_f64().unwrap_or(f64::NAN)
        })
    }

    pub fn derivative(&self) -> Self {
        Polynomial::new(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(k, c)| c * BigRational::from_integer(BigInt::from(k)))
                .collect(),
        )
    }

    pub fn scale(&self, k: &BigRational) -> Self {
        Polynomial::new(self.coeffs.iter().map(|c| c * k).collect())
    }

    /// Scale to a unit leading coefficient (the zero polynomial stays zero).
    pub fn monic(&self) -> Self {
        match self.leading_coefficient() {
            Some(lead) => self.scale(&lead.recip()),
            None => Polynomial::zero(),
        }
    }

    /// Euclidean division `self = q · divisor + r` with `deg r < deg divisor`.
    ///
    /// Returns `None` when `divisor` is the zero polynomial.
    pub fn div_rem(&self, divisor: &Polynomial) -> Option<(Polynomial, Polynomial)> {
        let d = divisor.degree()?;
        let n = match self.degree() {
            Some(n) if n >= d => n,
            _ => return Some((Polynomial::zero(), self.clone())),
        };

        let lead = &divisor.coeffs[d];
        let mut rem = self.coeffs.clone();
        let mut quot = vec![BigRational::zero(); n - d + 1];

        for k in (0..=n - d).rev() {
            let coef = &rem[k + d] / lead;
            if !coef.is_zero() {
                for (j, dc) in divisor.coeffs.iter().enumerate() {
                    rem[k + j] -= &coef * dc;
                }
            }
            quot[k] = coef;
        }

        rem.truncate(d);
        Some((Polynomial::new(quot), Polynomial::new(rem)))
    }

    /// Quotient of a division known to be exact.
    fn exact_div(&self, divisor: &Polynomial) -> Polynomial {
        self.div_rem(divisor)
            .map(|(q, _)| q)
            .unwrap_or_else(Polynomial::zero)
    }

    /// Monic greatest common divisor.
    ///
    /// ```
    /// use linsys_rs::poly::Polynomial;
    ///
    /// let a = Polynomial::from_integers(&[-1, 0, 1]); // (z − 1)(z + 1)
    /// let b = Polynomial::from_integers(&[-2, 1, 1]); // (z − 1)(z + 2)
    /// assert_eq!(a.gcd(&b), Polynomial::from_integers(&[-1, 1]));
    /// ```
    pub fn gcd(&self, other: &Polynomial) -> Polynomial {
        let mut a = self.clone();
        let mut b = other.clone();
        while let Some((_, r)) = a.div_rem(&b) {
            a = b;
            b = r;
        }
        a.monic()
    }

    /// Squarefree decomposition `P = c · Π fᵢⁱ`.
    ///
    /// Returns the non-constant monic factors `fᵢ`, pairwise coprime and each
    /// without repeated roots, together with their multiplicity `i`.
    pub fn squarefree_factors(&self) -> Vec<(Polynomial, usize)> {
        let mut factors = Vec::new();
        if self.degree().unwrap_or(0) == 0 {
            return factors;
        }

        let f = self.monic();
        let mut c = f.gcd(&f.derivative());
        let mut w = f.exact_div(&c);
        let mut multiplicity = 1;

        while w.degree().map_or(false, |d| d > 0) {
            let y = w.gcd(&c);
            let z = w.exact_div(&y);
            if z.degree().map_or(false, |d| d > 0) {
                factors.push((z, multiplicity));
            }
            c = c.exact_div(&y);
            w = y;
            multiplicity += 1;
        }

        factors
    }
}

impl<'a, 'b> Add<&'b Polynomial> for &'a Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &'b Polynomial) -> Polynomial {
        let len = self.coeffs.len().max(rhs.coeffs.len());
        let zero = BigRational::zero();
        Polynomial::new(
            (0..len)
                .map(|k| self.coeffs.get(k).unwrap_or(&zero) + rhs.coeffs.get(k).unwrap_or(&zero))
                .collect(),
        )
    }
}

impl<'a, 'b> Sub<&'b Polynomial> for &'a Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &'b Polynomial) -> Polynomial {
        self + &(-rhs)
    }
}

impl<'a, 'b> Mul<&'b Polynomial> for &'a Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &'b Polynomial) -> Polynomial {
        if self.is_zero() || rhs.is_zero() {
            return Polynomial::zero();
        }
        let mut coeffs = vec![BigRational::zero(); self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Polynomial::new(coeffs)
    }
}

impl<'a> Neg for &'a Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        Polynomial {
            coeffs: self.coeffs.iter().map(|c| -c).collect(),
        }
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }

        let mut first = true;
        for (power, c) in self.coeffs.iter().enumerate().rev() {
            if c.is_zero() {
                continue;
            }
            let magnitude = c.abs();
            match (first, c.is_negative()) {
                (true, true) => write!(f, "-")?,
                (true, false) => {}
                (false, true) => write!(f, " - ")?,
                (false, false) => write!(f, " + ")?,
            }
            first = false;

            if power == 0 {
                write!(f, "{}", magnitude)?;
                continue;
            }
            if !magnitude.is_one() {
                write!(f, "{}*", magnitude)?;
            }
            write!(f, "z")?;
            if power > 1 {
                write!(f, "^{}", power)?;
            }
        }
        Ok(())
    }
}

/// Determinant of a square matrix of polynomials.
///
/// Uses fraction-free (Bareiss) elimination with row pivoting: every
/// intermediate division is exact, so no rational functions appear.
///
/// # Errors
///
/// [`AnalysisError::ShapeMismatch`] if the matrix is not square.
pub fn determinant(m: &Array2<Polynomial>) -> Result<Polynomial> {
    let n = m.nrows();
    if m.ncols() != n {
        return Err(AnalysisError::ShapeMismatch(format!(
            "determinant needs a square matrix, got {}×{}",
            n,
            m.ncols()
        )));
    }
    if n == 0 {
        return Ok(Polynomial::one());
    }

    let mut work = m.clone();
    let mut negate = false;
    let mut prev = Polynomial::one();

    for k in 0..n - 1 {
        if work[(k, k)].is_zero() {
            match (k + 1..n).find(|&i| !work[(i, k)].is_zero()) {
                Some(i) => {
                    for j in 0..n {
                        work.swap((k, j), (i, j));
                    }
                    negate = !negate;
                }
                None => return Ok(Polynomial::zero()),
            }
        }

        for i in k + 1..n {
            for j in k + 1..n {
                let num = &(&work[(i, j)] * &work[(k, k)]) - &(&work[(i, k)] * &work[(k, j)]);
                work[(i, j)] = num.exact_div(&prev);
            }
        }
        prev = work[(k, k)].clone();
    }

    let det = work[(n - 1, n - 1)].clone();
    Ok(if negate { -&det } else { det })
}

/// A root of a rational polynomial, kept in exact form where possible.
#[derive(Clone, Debug, PartialEq)]
pub enum ExactRoot {
    /// A rational root.
    Rational(BigRational),
    /// `center ± √radicand` where `radicand` is not the square of a
    /// rational. A negative radicand denotes `center ± i·√(−radicand)`.
    Quadratic {
        center: BigRational,
        radicand: BigRational,
        /// Selects the `−` branch.
        negative_branch: bool,
    },
    /// A root of an exact factor of degree three or more that has neither
    /// rational roots nor rational quadratic factors, with a floating-point
    /// estimate that tells the roots of `factor` apart.
    Algebraic {
        factor: Polynomial,
        approximation: Complex64,
    },
}

impl ExactRoot {
    /// Floating-point value of the root.
    pub fn to_complex(&self) -> Complex64 {
        match self {
            ExactRoot::Rational(q) => Complex64::new(q.to_f64().unwrap_or(f64::NAN), 0.0),
            ExactRoot::Quadratic {
                center,
                radicand,
                negative_branch,
            } => {
                let c = center.to_f64().unwrap_or(f64::NAN);
                let r = radicand.to_f64().unwrap_or(f64::NAN);
                let sign = if *negative_branch { -1.0 } else { 1.0 };
                if r >= 0.0 {
                    Complex64::new(c + sign * r.sqrt(), 0.0)
                } else {
                    Complex64::new(c, sign * (-r).sqrt())
                }
            }
            ExactRoot::Algebraic { approximation, .. } => *approximation,
        }
    }

    /// The root as a rational number, if it is one.
    pub fn as_rational(&self) -> Option<&BigRational> {
        match self {
            ExactRoot::Rational(q) => Some(q),
            _ => None,
        }
    }

    /// True for roots on the real axis.
    pub fn is_real(&self) -> bool {
        match self {
            ExactRoot::Rational(_) => true,
            ExactRoot::Quadratic { radicand, .. } => !radicand.is_negative(),
            ExactRoot::Algebraic { approximation, .. } => approximation.im == 0.0,
        }
    }
}

impl fmt::Display for ExactRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExactRoot::Rational(q) => write!(f, "{}", q),
            ExactRoot::Quadratic {
                center,
                radicand,
                negative_branch,
            } => {
                let sign = if *negative_branch { "-" } else { "+" };
                if !center.is_zero() {
                    write!(f, "{} {} ", center, sign)?;
                } else if *negative_branch {
                    write!(f, "-")?;
                }
                if radicand.is_negative() {
                    match rational_sqrt(&-radicand) {
                        Some(r) if r.is_one() => write!(f, "I"),
                        Some(r) => write!(f, "{}*I", r),
                        None => write!(f, "I*sqrt({})", -radicand),
                    }
                } else {
                    write!(f, "sqrt({})", radicand)
                }
            }
            ExactRoot::Algebraic {
                factor,
                approximation,
            } => write!(f, "root of {} near {}", factor, approximation),
        }
    }
}

/// A distinct root together with its multiplicity.
#[derive(Clone, Debug, PartialEq)]
pub struct PolynomialRoot {
    pub root: ExactRoot,
    pub multiplicity: usize,
}

/// Symbolic root-solving capability.
pub trait RootSolver {
    /// All distinct roots of `p`, each with its multiplicity.
    fn solve(&self, p: &Polynomial) -> Result<Vec<PolynomialRoot>>;
}

/// Default [`RootSolver`].
///
/// 1. Squarefree decomposition over ℚ separates multiplicities.
/// 2. Linear factors give rational roots, quadratic factors give
///    `center ± √radicand` (collapsing to rationals when the discriminant
///    is a rational square).
/// 3. Higher-degree factors: floating-point estimates from the companion
///    matrix are polished by Newton's method in exact dyadic arithmetic
///    until they pin down any rational whose denominator could divide the
///    factor's leading coefficient (once cleared to integers). Candidate
///    rational roots, and quadratics built from pairs of roots, are verified
///    exactly and divided out. Whatever remains with degree ≥ 3 is reported
///    as [`ExactRoot::Algebraic`].
///
/// Roots are ordered by real part, then imaginary part.
///
/// # Examples
///
/// ```
/// use linsys_rs::poly::{ExactRootSolver, Polynomial, RootSolver};
/// use num_rational::BigRational;
///
/// // (z − 2)²(2z + 1)
/// let p = Polynomial::from_integers(&[4, -4, 1]);
/// let p = &p * &Polynomial::from_integers(&[1, 2]);
///
/// let roots = ExactRootSolver.solve(&p).unwrap();
/// assert_eq!(roots.len(), 2);
/// assert_eq!(roots[0].root.as_rational(), Some(&BigRational::new((-1).into(), 2.into())));
/// assert_eq!(roots[1].multiplicity, 2);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ExactRootSolver;

impl RootSolver for ExactRootSolver {
    fn solve(&self, p: &Polynomial) -> Result<Vec<PolynomialRoot>> {
        if p.is_zero() {
            return Err(AnalysisError::DegenerateZeroPencil);
        }

        let mut roots = Vec::new();
        for (factor, multiplicity) in p.squarefree_factors() {
            for root in solve_squarefree(&factor)? {
                roots.push(PolynomialRoot { root, multiplicity });
            }
        }

        roots.sort_by(|a, b| compare_roots(&a.root, &b.root));
        Ok(roots)
    }
}

/// Roots of a squarefree polynomial.
fn solve_squarefree(f: &Polynomial) -> Result<Vec<ExactRoot>> {
    let mut roots = Vec::new();
    let mut rest = f.monic();

    loop {
        let degree = match rest.degree() {
            None | Some(0) => break,
            Some(1) => {
                roots.push(ExactRoot::Rational(-&rest.coeffs[0]));
                break;
            }
            Some(2) => {
                roots.extend(solve_monic_quadratic(&rest));
                break;
            }
            Some(d) => d,
        };

        let estimates = numeric_roots(&rest)?;
        let bound = denominator_bound_bits(&rest);
        let refined: Vec<Complex<BigRational>> = estimates
            .iter()
            .filter_map(|&z| refine_root(&rest, z, 2 * bound + GUARD_BITS))
            .collect();

        if let Some(q) = find_rational_root(&rest, &refined, bound) {
            let linear = Polynomial::new(vec![-&q, BigRational::one()]);
            rest = rest.exact_div(&linear);
            roots.push(ExactRoot::Rational(q));
            continue;
        }

        // Without rational roots a cubic is irreducible
        if degree >= 4 {
            if let Some(quadratic) = find_quadratic_factor(&rest, &refined, bound) {
                rest = rest.exact_div(&quadratic);
                roots.extend(solve_monic_quadratic(&quadratic));
                continue;
            }
        }

        roots.extend(estimates.into_iter().map(|approximation| ExactRoot::Algebraic {
            factor: rest.clone(),
            approximation,
        }));
        break;
    }

    Ok(roots)
}

/// Roots of `z² + b z + c`.
fn solve_monic_quadratic(p: &Polynomial) -> Vec<ExactRoot> {
    let two = BigRational::from_integer(BigInt::from(2));
    let four = BigRational::from_integer(BigInt::from(4));
    let b = &p.coeffs[1];
    let c = &p.coeffs[0];

    let center = -(b / &two);
    let radicand = b * b / four - c;

    match rational_sqrt(&radicand) {
        Some(r) => vec![
            ExactRoot::Rational(&center - &r),
            ExactRoot::Rational(&center + &r),
        ],
        None => vec![
            ExactRoot::Quadratic {
                center: center.clone(),
                radicand: radicand.clone(),
                negative_branch: true,
            },
            ExactRoot::Quadratic {
                center,
                radicand,
                negative_branch: false,
            },
        ],
    }
}

/// `√q` when `q` is the square of a rational.
fn rational_sqrt(q: &BigRational) -> Option<BigRational> {
    if q.is_negative() {
        return None;
    }
    let numer = q.numer().sqrt();
    let denom = q.denom().sqrt();
    if &(&numer * &numer) == q.numer() && &(&denom * &denom) == q.denom() {
        Some(BigRational::new(numer, denom))
    } else {
        None
    }
}

/// Floating-point roots of a monic polynomial via its companion matrix.
fn numeric_roots(p: &Polynomial) -> Result<Vec<Complex64>> {
    let n = match p.degree() {
        Some(n) if n > 0 => n,
        _ => return Ok(Vec::new()),
    };

    let coeffs: Vec<f64> = p
        .coeffs
        .iter()
        .map(|c| c.to_f64().filter(|x| x.is_finite()))
        .collect::<Option<Vec<f64>>>()
        .ok_or(AnalysisError::NonFinite("polynomial coefficients"))?;
    let lead = coeffs[n];

    let mut companion = Array2::<f64>::zeros((n, n));
    for i in 1..n {
        companion[(i, i - 1)] = 1.0;
    }
    for i in 0..n {
        companion[(i, n - 1)] = -coeffs[i] / lead;
    }

    let (eigenvalues, _) = companion.eig()?;
    let derivative = p.derivative();

    Ok(eigenvalues
        .iter()
        .map(|&z0| {
            let mut z = z0;
            for _ in 0..NEWTON_STEPS {
                let slope = derivative.eval_complex(z);
                if slope.norm() == 0.0 {
                    break;
                }
                let step = p.eval_complex(z) / slope;
                if !step.re.is_finite() || !step.im.is_finite() {
                    break;
                }
                z -= step;
            }
            z
        })
        .collect())
}

/// Bits of an upper bound `L` on the leading coefficient of the primitive
/// integer multiple of a monic `p`.
///
/// Every rational root of `p`, and every coefficient of a monic rational
/// factor of `p`, has a denominator dividing `L`. The product of the
/// coefficient denominators is such a bound.
fn denominator_bound_bits(p: &Polynomial) -> u64 {
    p.coeffs.iter().map(|c| c.denom().bits()).sum::<u64>().max(1)
}

/// `2^-bits` as a rational.
fn power_of_half(bits: u64) -> BigRational {
    BigRational::new(BigInt::one(), BigInt::one() << bits as usize)
}

/// Nearest multiple of `2^-bits`.
fn round_dyadic(x: &BigRational, bits: u64) -> BigRational {
    let scale = BigInt::one() << bits as usize;
    let scaled = (x * BigRational::from_integer(scale.clone())).round().to_integer();
    BigRational::new(scaled, scale)
}

/// Radius within which a refined value is matched to a rational whose
/// denominator is at most `2^bound_bits`.
///
/// Two distinct such rationals are at least `2^-2·bound_bits` apart, so an
/// interval of half-width `2^-(2·bound_bits + 2)` holds at most one of them.
fn reconstruction_radius(bound_bits: u64) -> BigRational {
    power_of_half(2 * bound_bits + 2)
}

/// Polish a root estimate by Newton's method in exact dyadic arithmetic,
/// keeping `precision` fractional bits.
///
/// Estimates close to the real axis are refined as real numbers.
fn refine_root(p: &Polynomial, estimate: Complex64, precision: u64) -> Option<Complex<BigRational>> {
    let near_real = estimate.im.abs() <= 1e-6 * estimate.norm().max(1.0);
    let re = BigRational::from_float(estimate.re)?;
    let im = if near_real {
        BigRational::zero()
    } else {
        BigRational::from_float(estimate.im)?
    };

    let derivative = p.derivative();
    let tiny = power_of_half(precision);
    let mut z = Complex::new(re, im);

    for _ in 0..MAX_REFINEMENT_STEPS {
        let slope = derivative.eval_exact_complex(&z);
        if slope.is_zero() {
            break;
        }
        let step = p.eval_exact_complex(&z) / slope;
        z = Complex::new(
            round_dyadic(&(&z.re - &step.re), precision),
            round_dyadic(&(&z.im - &step.im), precision),
        );
        if step.re.abs() <= tiny && step.im.abs() <= tiny {
            break;
        }
    }

    Some(z)
}

/// Rational with the smallest denominator in `[lo, hi]`.
fn simplest_between(lo: &BigRational, hi: &BigRational) -> BigRational {
    if !lo.is_positive() && !hi.is_negative() {
        return BigRational::zero();
    }
    if hi.is_negative() {
        return -simplest_between(&-hi, &-lo);
    }

    // Walk the shared continued-fraction prefix; the Möbius map
    // x ↦ (a·x + b)/(c·x + d) carries the tail back to [lo, hi].
    let (mut lo, mut hi) = (lo.clone(), hi.clone());
    let (mut a, mut b) = (BigRational::one(), BigRational::zero());
    let (mut c, mut d) = (BigRational::zero(), BigRational::one());

    let tail = loop {
        let floor = lo.floor();
        if floor == lo {
            break floor;
        }
        let next = &floor + BigRational::one();
        if next <= hi {
            break next;
        }

        (a, b) = (&a * &floor + &b, a);
        (c, d) = (&c * &floor + &d, c);
        (lo, hi) = ((&hi - &floor).recip(), (&lo - &floor).recip());
    };

    (a * &tail + b) / (c * tail + d)
}

/// Rational in the reconstruction radius around `x`.
fn reconstruct(x: &BigRational, radius: &BigRational) -> BigRational {
    simplest_between(&(x - radius), &(x + radius))
}

/// First refined real value that reconstructs to an exact root of `p`.
fn find_rational_root(p: &Polynomial, refined: &[Complex<BigRational>], bound_bits: u64) -> Option<BigRational> {
    let radius = reconstruction_radius(bound_bits);
    refined
        .iter()
        .filter(|z| z.im.is_zero())
        .map(|z| reconstruct(&z.re, &radius))
        .find(|q| p.eval(q).is_zero())
}

/// A monic rational quadratic dividing `p`, built from a pair of refined
/// roots whose sum and product are real.
fn find_quadratic_factor(p: &Polynomial, refined: &[Complex<BigRational>], bound_bits: u64) -> Option<Polynomial> {
    let radius = reconstruction_radius(bound_bits);

    for (i, r1) in refined.iter().enumerate() {
        for r2 in refined.iter().skip(i + 1) {
            let sum = r1 + r2;
            let product = r1 * r2;
            if sum.im.abs() > radius || product.im.abs() > radius {
                continue;
            }

            let quadratic = Polynomial::new(vec![
                reconstruct(&product.re, &radius),
                -reconstruct(&sum.re, &radius),
                BigRational::one(),
            ]);
            if let Some((_, remainder)) = p.div_rem(&quadratic) {
                if remainder.is_zero() {
                    return Some(quadratic);
                }
            }
        }
    }
    None
}

/// Order two roots by real part, then imaginary part.
pub fn compare_roots(a: &ExactRoot, b: &ExactRoot) -> Ordering {
    let (za, zb) = (a.to_complex(), b.to_complex());
    za.re.total_cmp(&zb.re).then_with(|| za.im.total_cmp(&zb.im))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    fn poly(coeffs: &[i64]) -> Polynomial {
        Polynomial::from_integers(coeffs)
    }

    fn constant(n: i64) -> Polynomial {
        Polynomial::constant(q(n, 1))
    }

    #[test]
    fn test_new_trims_leading_zeros() {
        let p = poly(&[1, 2, 0, 0]);
        assert_eq!(p.degree(), Some(1));
        assert_eq!(poly(&[0, 0]).degree(), None);
        assert!(poly(&[0]).is_zero());
    }

    #[test]
    fn test_arithmetic() {
        let a = poly(&[1, 1]); // z + 1
        let b = poly(&[-1, 1]); // z − 1
        assert_eq!(&a * &b, poly(&[-1, 0, 1]));
        assert_eq!(&a + &b, poly(&[0, 2]));
        assert_eq!(&a - &a, Polynomial::zero());
        assert_eq!(-&a, poly(&[-1, -1]));
    }

    #[test]
    fn test_eval_exact() {
        let p = poly(&[1, -3, 2]); // 2z² − 3z + 1 = (2z − 1)(z − 1)
        assert!(p.eval(&q(1, 2)).is_zero());
        assert_eq!(p.eval(&q(3, 1)), q(10, 1));
    }

    #[test]
    fn test_div_rem() {
        let p = poly(&[-4, 0, 0, 1]); // z³ − 4
        let d = poly(&[-2, 1]); // z − 2
        let (quot, rem) = p.div_rem(&d).unwrap();
        assert_eq!(quot, poly(&[4, 2, 1]));
        assert_eq!(rem, constant(4));
        assert!(p.div_rem(&Polynomial::zero()).is_none());
    }

    #[test]
    fn test_gcd_coprime() {
        assert_eq!(poly(&[1, 1]).gcd(&poly(&[2, 1])), Polynomial::one());
    }

    #[test]
    fn test_squarefree_factors() {
        // (z − 1)² (z + 3)
        let p = &(&poly(&[-1, 1]) * &poly(&[-1, 1])) * &poly(&[3, 1]);
        let factors = p.squarefree_factors();
        assert_eq!(
            factors,
            vec![(poly(&[3, 1]), 1), (poly(&[-1, 1]), 2)]
        );
    }

    #[test]
    fn test_squarefree_scales_to_monic() {
        let p = poly(&[-6, 3]); // 3z − 6
        assert_eq!(p.squarefree_factors(), vec![(poly(&[-2, 1]), 1)]);
        assert!(constant(5).squarefree_factors().is_empty());
    }

    #[test]
    fn test_display() {
        let p = Polynomial::new(vec![q(1, 2), q(-2, 1), q(0, 1), q(1, 1)]);
        assert_eq!(p.to_string(), "z^3 - 2*z + 1/2");
        assert_eq!(poly(&[0, -1]).to_string(), "-z");
        assert_eq!(Polynomial::zero().to_string(), "0");
    }

    #[test]
    fn test_determinant_2x2() {
        // [[z + 1, −1], [−2, 1]] → z − 1
        let m = Array2::from_shape_vec(
            (2, 2),
            vec![poly(&[1, 1]), constant(-1), constant(-2), constant(1)],
        )
        .unwrap();
        assert_eq!(determinant(&m).unwrap(), poly(&[-1, 1]));
    }

    #[test]
    fn test_determinant_needs_pivot() {
        // [[0, 1, 0], [1, 0, 0], [0, 0, z]] → −z
        let m = Array2::from_shape_vec(
            (3, 3),
            vec![
                Polynomial::zero(),
                constant(1),
                Polynomial::zero(),
                constant(1),
                Polynomial::zero(),
                Polynomial::zero(),
                Polynomial::zero(),
                Polynomial::zero(),
                Polynomial::variable(),
            ],
        )
        .unwrap();
        assert_eq!(determinant(&m).unwrap(), poly(&[0, -1]));
    }

    #[test]
    fn test_determinant_3x3_polynomial() {
        // z·I − diag(1, 2, 3) → (z − 1)(z − 2)(z − 3)
        let m = Array2::from_shape_fn((3, 3), |(i, j)| {
            if i == j {
                poly(&[-(i as i64 + 1), 1])
            } else {
                Polynomial::zero()
            }
        });
        assert_eq!(determinant(&m).unwrap(), poly(&[-6, 11, -6, 1]));
    }

    #[test]
    fn test_determinant_singular_and_empty() {
        let m = Array2::from_shape_vec(
            (2, 2),
            vec![poly(&[0, 1]), poly(&[0, 2]), poly(&[0, 1]), poly(&[0, 2])],
        )
        .unwrap();
        assert!(determinant(&m).unwrap().is_zero());

        let empty: Array2<Polynomial> = Array2::from_shape_vec((0, 0), vec![]).unwrap();
        assert_eq!(determinant(&empty).unwrap(), Polynomial::one());
    }

    #[test]
    fn test_determinant_rejects_non_square() {
        let m = Array2::from_shape_vec((1, 2), vec![constant(1), constant(2)]).unwrap();
        assert!(matches!(determinant(&m), Err(AnalysisError::ShapeMismatch(_))));
    }

    #[test]
    fn test_solve_linear_and_constant() {
        let roots = ExactRootSolver.solve(&poly(&[3, -6])).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].root, ExactRoot::Rational(q(1, 2)));

        assert!(ExactRootSolver.solve(&constant(-1)).unwrap().is_empty());
        assert!(matches!(
            ExactRootSolver.solve(&Polynomial::zero()),
            Err(AnalysisError::DegenerateZeroPencil)
        ));
    }

    #[test]
    fn test_solve_quadratic_rational() {
        // 4z² − 1
        let roots = ExactRootSolver.solve(&poly(&[-1, 0, 4])).unwrap();
        let values: Vec<_> = roots.iter().map(|r| r.root.clone()).collect();
        assert_eq!(
            values,
            vec![ExactRoot::Rational(q(-1, 2)), ExactRoot::Rational(q(1, 2))]
        );
    }

    #[test]
    fn test_solve_quadratic_irrational() {
        // z² − 2
        let roots = ExactRootSolver.solve(&poly(&[-2, 0, 1])).unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(
            roots[1].root,
            ExactRoot::Quadratic {
                center: q(0, 1),
                radicand: q(2, 1),
                negative_branch: false
            }
        );
        assert_relative_eq!(roots[0].root.to_complex().re, -std::f64::consts::SQRT_2, epsilon = 1e-15);
        assert_eq!(roots[1].root.to_string(), "sqrt(2)");
        assert_eq!(roots[0].root.to_string(), "-sqrt(2)");
    }

    #[test]
    fn test_solve_quadratic_complex() {
        // z² + 2z + 5 → −1 ± 2i
        let roots = ExactRootSolver.solve(&poly(&[5, 2, 1])).unwrap();
        assert_eq!(roots.len(), 2);
        assert!(!roots[0].root.is_real());
        assert_eq!(roots[0].root.to_complex(), Complex64::new(-1.0, -2.0));
        assert_eq!(roots[1].root.to_string(), "-1 + 2*I");
    }

    #[test]
    fn test_solve_cubic_rational_roots() {
        // (z − 1)(z − 2)(2z + 1)
        let p = &(&poly(&[-1, 1]) * &poly(&[-2, 1])) * &poly(&[1, 2]);
        let roots = ExactRootSolver.solve(&p).unwrap();
        let values: Vec<_> = roots.iter().filter_map(|r| r.root.as_rational().cloned()).collect();
        assert_eq!(values, vec![q(-1, 2), q(1, 1), q(2, 1)]);
    }

    #[test]
    fn test_solve_cubic_mixed() {
        // (z − 3)(z² + 1)
        let p = &poly(&[-3, 1]) * &poly(&[1, 0, 1]);
        let roots = ExactRootSolver.solve(&p).unwrap();
        assert_eq!(roots.len(), 3);
        assert_eq!(roots[2].root, ExactRoot::Rational(q(3, 1)));
        assert_eq!(roots[0].root.to_string(), "-I");
        assert_eq!(roots[1].root.to_string(), "I");
    }

    #[test]
    fn test_solve_irreducible_cubic() {
        // z³ − 2 has no rational roots
        let p = poly(&[-2, 0, 0, 1]);
        let roots = ExactRootSolver.solve(&p).unwrap();
        assert_eq!(roots.len(), 3);
        for r in &roots {
            match &r.root {
                ExactRoot::Algebraic { factor, approximation } => {
                    assert_eq!(factor, &p);
                    assert!(approximation.powi(3).re - 2.0 < 1e-10);
                }
                other => panic!("expected algebraic root, got {}", other),
            }
        }
        let real: Vec<_> = roots
            .iter()
            .map(|r| r.root.to_complex())
            .filter(|z| z.im.abs() < 1e-10)
            .collect();
        assert_eq!(real.len(), 1);
        assert_relative_eq!(real[0].re, 2f64.powf(1.0 / 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_solve_reports_multiplicity() {
        // z³ (z + 1)
        let p = poly(&[0, 0, 0, 1, 1]);
        let roots = ExactRootSolver.solve(&p).unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].root, ExactRoot::Rational(q(-1, 1)));
        assert_eq!(roots[0].multiplicity, 1);
        assert_eq!(roots[1].root, ExactRoot::Rational(q(0, 1)));
        assert_eq!(roots[1].multiplicity, 3);
    }

    #[test]
    fn test_simplest_between() {
        assert_eq!(simplest_between(&q(-76, 100), &q(-74, 100)), q(-3, 4));
        assert_eq!(simplest_between(&q(-1, 1), &q(2, 1)), q(0, 1));
        assert_eq!(simplest_between(&q(7, 3), &q(7, 3)), q(7, 3));
        assert_eq!(simplest_between(&q(5, 2), &q(3, 1)), q(3, 1));

        let third = q(1, 3);
        let radius = power_of_half(40);
        assert_eq!(simplest_between(&(&third - &radius), &(&third + &radius)), third);
    }

    #[test]
    fn test_round_dyadic() {
        assert_eq!(round_dyadic(&q(1, 3), 4), q(5, 16));
        assert_eq!(round_dyadic(&q(-3, 4), 1), q(-1, 1));
    }

    #[test]
    fn test_solve_cubic_large_denominator() {
        // (q·z − 1)(z² + 1) with q = 2⁶¹ − 1: the rational root is 1/q
        let big = 2_305_843_009_213_693_951;
        let p = &poly(&[-1, big]) * &poly(&[1, 0, 1]);
        let roots = ExactRootSolver.solve(&p).unwrap();

        assert_eq!(roots.len(), 3);
        assert_eq!(roots[0].root.to_string(), "-I");
        assert_eq!(roots[1].root.to_string(), "I");
        assert_eq!(roots[2].root, ExactRoot::Rational(q(1, big)));
    }

    #[test]
    fn test_solve_dyadic_rational_roots() {
        // Roots at the exact binary values of −1.1, −1.2, −1.3
        let r: Vec<BigRational> = [-1.1, -1.2, -1.3]
            .iter()
            .map(|&x| BigRational::from_float(x).unwrap())
            .collect();
        let p = r.iter().fold(Polynomial::one(), |acc, root| {
            &acc * &Polynomial::new(vec![-root, BigRational::one()])
        });

        let roots = ExactRootSolver.solve(&p).unwrap();
        let values: Vec<_> = roots.iter().map(|x| x.root.clone()).collect();
        assert_eq!(
            values,
            vec![
                ExactRoot::Rational(r[2].clone()),
                ExactRoot::Rational(r[1].clone()),
                ExactRoot::Rational(r[0].clone()),
            ]
        );
    }

    #[test]
    fn test_solve_quartic_with_quadratic_factors() {
        // (z² + 1)(z² + 2) → ±i, ±√2·i
        let p = &poly(&[1, 0, 1]) * &poly(&[2, 0, 1]);
        let roots = ExactRootSolver.solve(&p).unwrap();
        let rendered: Vec<String> = roots.iter().map(|r| r.root.to_string()).collect();
        assert_eq!(rendered, vec!["-I*sqrt(2)", "-I", "I", "I*sqrt(2)"]);
        assert!(roots.iter().all(|r| matches!(r.root, ExactRoot::Quadratic { .. })));
    }

    #[test]
    fn test_solve_quartic_real_quadratic_factors() {
        // (z² − 2)(z² − 3)
        let p = &poly(&[-2, 0, 1]) * &poly(&[-3, 0, 1]);
        let roots = ExactRootSolver.solve(&p).unwrap();
        let rendered: Vec<String> = roots.iter().map(|r| r.root.to_string()).collect();
        assert_eq!(rendered, vec!["-sqrt(3)", "-sqrt(2)", "sqrt(2)", "sqrt(3)"]);
    }

    #[test]
    fn test_solve_product_of_irreducible_cubics() {
        // (z³ − 2)(z³ − 3) has no rational roots or quadratic factors
        let p = &poly(&[-2, 0, 0, 1]) * &poly(&[-3, 0, 0, 1]);
        let roots = ExactRootSolver.solve(&p).unwrap();
        assert_eq!(roots.len(), 6);
        for r in &roots {
            match &r.root {
                ExactRoot::Algebraic { factor, .. } => assert_eq!(factor, &p),
                other => panic!("expected algebraic root, got {}", other),
            }
        }
    }

    #[test]
    fn test_compare_roots() {
        let a = ExactRoot::Rational(q(-1, 1));
        let b = ExactRoot::Rational(q(1, 1));
        assert_eq!(compare_roots(&a, &b), Ordering::Less);
    }
}
