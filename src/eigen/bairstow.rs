use tracing::{debug, trace, warn};

use crate::eigen::eigen_config::EigenConfig;
use crate::error::{Error, Result};
use crate::matrix::matrix_gen::Scalar;

/// A polynomial root. Complex roots always come as a conjugate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Root<T> {
    Real(T),
    Complex { re: T, im: T },
}

impl<T: Scalar> Root<T> {
    pub fn re(&self) -> T {
        match self {
            Root::Real(x) => *x,
            Root::Complex { re, .. } => *re,
        }
    }

    pub fn im(&self) -> T {
        match self {
            Root::Real(_) => T::zero(),
            Root::Complex { im, .. } => *im,
        }
    }

    pub fn as_real(&self) -> Option<T> {
        match self {
            Root::Real(x) => Some(*x),
            Root::Complex { .. } => None,
        }
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Root::Real(_))
    }
}

// Roots of a0*x^2 + a1*x + a2
fn quadratic_roots<T: Scalar>(a0: T, a1: T, a2: T) -> Vec<Root<T>> {
    let two = T::one() + T::one();
    let discriminant = a1 * a1 - two * two * a0 * a2;

    if discriminant.is_zero() {
        vec![Root::Real(-a1 / (two * a0))]
    } else if discriminant > T::zero() {
        let s = discriminant.sqrt();
        vec![
            Root::Real((-a1 + s) / (two * a0)),
            Root::Real((-a1 - s) / (two * a0)),
        ]
    } else {
        let re = -a1 / (two * a0);
        let im = (-discriminant).sqrt() / (two * a0).abs();
        vec![Root::Complex { re, im }, Root::Complex { re, im: -im }]
    }
}

// out[i] = s[i] - p*out[i-1] - q*out[i-2], with out[-1] = out[-2] = 0
fn synthetic_division<T: Scalar>(s: &[T], p: T, q: T) -> Vec<T> {
    let mut out = Vec::with_capacity(s.len());
    let (mut prev1, mut prev2) = (T::zero(), T::zero());
    for &x in s {
        let value = x - p * prev1 - q * prev2;
        out.push(value);
        prev2 = prev1;
        prev1 = value;
    }
    out
}

// Finds x^2 + p*x + q dividing `a` (degree >= 3). Returns (p, q, quotient).
fn quadratic_factor<T: Scalar>(
    a: &[T],
    tolerance: T,
    max_iterations: Option<usize>,
) -> Result<(T, T, Vec<T>)> {
    let n = a.len() - 1;
    let nudge = T::one() / (T::one() + T::one());
    let mut p = a[1] / a[0];
    let mut q = a[2] / a[0];
    let mut iterations = 0;

    loop {
        if let Some(limit) = max_iterations {
            if iterations >= limit {
                warn!(degree = n, iterations, "bairstow iteration limit reached");
                return Err(Error::NoConvergence { iterations });
            }
        }
        iterations += 1;

        let mut b = synthetic_division(a, p, q);
        let c = synthetic_division(&b, p, q);

        let d = c[n - 2] * c[n - 2] - c[n - 3] * (c[n - 1] - b[n - 1]);
        if d.is_zero() {
            trace!(p = ?p, q = ?q, "singular correction system, nudging trial factor");
            p = p + nudge;
            q = q + nudge;
            continue;
        }

        let delta_p = (b[n - 1] * c[n - 2] - b[n] * c[n - 3]) / d;
        let delta_q = (b[n] * c[n - 2] - b[n - 1] * (c[n - 1] - b[n - 1])) / d;
        if !delta_p.is_finite() || !delta_q.is_finite() {
            warn!(degree = n, iterations, "bairstow corrections diverged");
            return Err(Error::NoConvergence { iterations });
        }

        if delta_p.abs() < tolerance && delta_q.abs() < tolerance {
            debug!(degree = n, iterations, p = ?p, q = ?q, "quadratic factor converged");
            b.truncate(n - 1);
            return Ok((p, q, b));
        }

        p = p + delta_p;
        q = q + delta_q;
    }
}

/// Roots of the polynomial `coefficients[0]*x^n + ... + coefficients[n]`
/// by Bairstow's method: quadratic factors are extracted one at a time and
/// the polynomial deflated until degree two or less remains.
pub fn bairstow<T: Scalar>(coefficients: &[T], config: &EigenConfig) -> Result<Vec<Root<T>>> {
    let mut a: Vec<T> = coefficients
        .iter()
        .copied()
        .skip_while(|c| c.is_zero())
        .collect();
    if a.is_empty() {
        return Err(Error::UndefinedOperation {
            op: "bairstow",
            reason: "polynomial is identically zero",
        });
    }

    let tolerance = num_traits::cast::<f64, T>(config.tolerance)
        .unwrap_or_else(T::epsilon)
        .max(T::epsilon());

    let mut roots = Vec::with_capacity(a.len() - 1);
    while a.len() > 3 {
        let (p, q, deflated) = quadratic_factor(&a, tolerance, config.max_iterations)?;
        roots.extend(quadratic_roots(T::one(), p, q));
        a = deflated;
    }

    match a.as_slice() {
        [a0, a1, a2] => roots.extend(quadratic_roots(*a0, *a1, *a2)),
        [a0, a1] => roots.push(Root::Real(-*a1 / *a0)),
        _ => {}
    }

    Ok(roots)
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
