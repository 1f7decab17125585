use tracing::trace;

use crate::error::{Error, Result};
use crate::matrix::matrix::MatrixOps;
use crate::matrix::matrix_gen::{Matrix, Scalar};

/// Coefficients `(1, b0, ..., b_{n-1})` of the characteristic polynomial,
/// highest degree first.
///
/// Trace recurrence (Faddeev-LeVerrier):
/// `b0 = -tr(A)`, `H_k = A*H_{k-1} + b_{k-1}*I`, `b_k = -tr(A*H_k) / (k+1)`.
pub fn characteristic_polynomial<T: Scalar>(matrix: &Matrix<T>) -> Result<Vec<T>> {
    if !matrix.is_square() {
        return Err(Error::not_square("characteristic_polynomial"));
    }

    let a = matrix.flatten();
    let n = a.rows();
    let identity = Matrix::identity(n)?;

    let mut coefficients = vec![T::one(), -a.trace()?];
    let mut h = identity.clone();
    let mut divisor = T::one();
    for k in 1..n {
        divisor = divisor + T::one();
        h = a.product(&h)?.add(&identity.scale(coefficients[k]))?;
        let b = -a.product(&h)?.trace()? / divisor;
        trace!(k, coefficient = ?b, "characteristic polynomial coefficient");
        coefficients.push(b);
    }

    Ok(coefficients)
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
