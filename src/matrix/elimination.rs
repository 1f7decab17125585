//! Gaussian elimination over dense rows, shared by inverse, determinant and rank.

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::matrix::matrix_gen::Scalar;

// Picks the pivot row for `column` among rows >= `start`. An entry of
// magnitude exactly one wins immediately; otherwise the entry closest to +-1.
fn select_pivot<T: Scalar>(rows: &[Vec<T>], column: usize, start: usize) -> Option<usize> {
    let mut best: Option<(usize, T)> = None;

    for (i, row) in rows.iter().enumerate().skip(start) {
        let value = row[column];
        if value.is_zero() {
            continue;
        }
        if value.abs() == T::one() {
            return Some(i);
        }

        let distance = (value.abs() - T::one()).abs();
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((i, distance)),
        }
    }

    best.map(|(i, _)| i)
}

/// Eliminates `column` from every row except the chosen pivot row.
///
/// Works on a copy of `rows`; returns the reduced rows together with the
/// pivot index, or `None` when the column is zero from `start` downwards.
pub(crate) fn row_reduction<T: Scalar>(
    rows: &[Vec<T>],
    column: usize,
    start: usize,
) -> Option<(Vec<Vec<T>>, usize)> {
    let pivot = select_pivot(rows, column, start)?;

    let mut reduced = rows.to_vec();
    let pivot_row = reduced[pivot].clone();
    for (i, row) in reduced.iter_mut().enumerate() {
        if i == pivot || row[column].is_zero() {
            continue;
        }
        let ratio = -row[column] / pivot_row[column];
        for (x, p) in row.iter_mut().zip(pivot_row.iter()) {
            *x = *x + *p * ratio;
        }
        row[column] = T::zero();
    }

    trace!(column, start, pivot, "row reduction");
    Some((reduced, pivot))
}

fn ensure_square<T>(rows: &[Vec<T>], op: &'static str) -> Result<usize> {
    let n = rows.len();
    if n == 0 || rows.iter().any(|row| row.len() != n) {
        return Err(Error::not_square(op));
    }
    Ok(n)
}

/// Gauss-Jordan on `[A | I]`; the right half ends up holding `A^-1`.
pub(crate) fn inverse<T: Scalar>(rows: &[Vec<T>]) -> Result<Vec<Vec<T>>> {
    let n = ensure_square(rows, "inverse")?;

    let mut augmented: Vec<Vec<T>> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .copied()
                .chain((0..n).map(|j| if i == j { T::one() } else { T::zero() }))
                .collect()
        })
        .collect();

    for k in 0..n {
        let (mut reduced, pivot) = match row_reduction(&augmented, k, k) {
            Some(result) => result,
            None => {
                debug!(column = k, "no pivot found, matrix is singular");
                return Err(Error::singular("inverse"));
            }
        };

        let scale = reduced[pivot][k];
        reduced[pivot].iter_mut().for_each(|x| *x = *x / scale);
        reduced.swap(pivot, k);
        augmented = reduced;
    }

    Ok(augmented
        .into_iter()
        .map(|row| row[n..].to_vec())
        .collect())
}

pub(crate) fn determinant<T: Scalar>(rows: &[Vec<T>]) -> Result<T> {
    let n = ensure_square(rows, "determinant")?;

    match n {
        1 => Ok(rows[0][0]),
        2 => Ok(rows[0][0] * rows[1][1] - rows[0][1] * rows[1][0]),
        _ => {
            let (reduced, pivot) = match row_reduction(rows, 0, 0) {
                Some(result) => result,
                None => return Ok(T::zero()),
            };

            // Lifting the pivot row to the top takes `pivot` adjacent swaps.
            let sign = if pivot % 2 == 0 { T::one() } else { -T::one() };
            let minor: Vec<Vec<T>> = reduced
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != pivot)
                .map(|(_, row)| row[1..].to_vec())
                .collect();

            Ok(sign * reduced[pivot][0] * determinant(&minor)?)
        }
    }
}

pub(crate) fn rank<T: Scalar>(rows: &[Vec<T>]) -> usize {
    let mut rows = rows.to_vec();

    loop {
        match rows.first() {
            None => return 0,
            Some(first) if first.is_empty() => return 0,
            Some(first) if rows.len() == 1 => {
                return usize::from(first.iter().any(|x| !x.is_zero()));
            }
            _ => {}
        }

        match row_reduction(&rows, 0, 0) {
            Some((reduced, pivot)) => {
                let rest: Vec<Vec<T>> = reduced
                    .into_iter()
                    .enumerate()
                    .filter(|(i, _)| *i != pivot)
                    .map(|(_, row)| row[1..].to_vec())
                    .collect();
                return 1 + rank(&rest);
            }
            // leading column is all zero: drop it and keep looking
            None => {
                rows = rows.into_iter().map(|row| row[1..].to_vec()).collect();
            }
        }
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::matrix::MatrixOps;
    use crate::matrix::matrix_gen::Matrix;

    fn m(lines: Vec<Vec<f64>>) -> Matrix<f64> {
        Matrix::new(lines).unwrap()
    }

    #[test]
    fn test_pivot_prefers_unit_entries() {
        let rows = vec![vec![3.0, 1.0], vec![-1.0, 2.0], vec![1.0, 0.0]];
        assert_eq!(select_pivot(&rows, 0, 0), Some(1));

        let rows = vec![vec![5.0], vec![0.5], vec![1.75]];
        assert_eq!(select_pivot(&rows, 0, 0), Some(1));

        let rows = vec![vec![2.0], vec![0.0], vec![0.0]];
        assert_eq!(select_pivot(&rows, 0, 1), None);
    }

    #[test]
    fn test_row_reduction_clears_column() {
        let rows = vec![vec![2.0, 1.0], vec![1.0, 1.0]];
        let (reduced, pivot) = row_reduction(&rows, 0, 0).unwrap();

        assert_eq!(pivot, 1);
        assert_eq!(reduced, vec![vec![0.0, -1.0], vec![1.0, 1.0]]);
        // input is left untouched
        assert_eq!(rows, vec![vec![2.0, 1.0], vec![1.0, 1.0]]);

        assert!(row_reduction(&[vec![0.0, 1.0], vec![0.0, 2.0]], 0, 0).is_none());
    }

    #[test]
    fn test_inverse() {
        let a = m(vec![
            vec![1.0, 3.0, 2.0],
            vec![2.0, 1.0, 3.0],
            vec![1.0, 4.0, 2.0],
        ]);
        let expected = m(vec![
            vec![-10.0, 2.0, 7.0],
            vec![-1.0, 0.0, 1.0],
            vec![7.0, -1.0, -5.0],
        ]);

        let inverse = a.inverse().unwrap();
        assert!(inverse.equals(&expected));
        assert!(a
            .product(&inverse)
            .unwrap()
            .equals(&Matrix::<f64>::identity(3).unwrap()));
    }

    #[test]
    fn test_inverse_needs_row_swaps() {
        let a = m(vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        assert_eq!(a.inverse().unwrap(), a);

        let b = m(vec![vec![4.0, 7.0], vec![2.0, 6.0]]);
        let product = b.product(&b.inverse().unwrap()).unwrap().to_array();
        for (i, row) in product.iter().enumerate() {
            for (j, x) in row.iter().enumerate() {
                let target = if i == j { 1.0 } else { 0.0 };
                assert!((x - target).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_inverse_failures() {
        let singular = m(vec![
            vec![1.0, 2.0, 3.0],
            vec![2.0, 3.0, 4.0],
            vec![1.0, 1.0, 1.0],
        ]);
        assert_eq!(
            singular.inverse(),
            Err(Error::UndefinedOperation {
                op: "inverse",
                reason: "matrix is singular"
            })
        );

        assert_eq!(
            m(vec![vec![1.0, 2.0]]).inverse(),
            Err(Error::UndefinedOperation {
                op: "inverse",
                reason: "matrix is not square"
            })
        );
    }

    #[test]
    fn test_determinant() {
        assert_eq!(m(vec![vec![7.0]]).determinant().unwrap(), 7.0);
        assert_eq!(
            m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).determinant().unwrap(),
            -2.0
        );
        assert_eq!(
            m(vec![
                vec![6.0, 1.0, 1.0],
                vec![4.0, -2.0, 5.0],
                vec![2.0, 8.0, 7.0]
            ])
            .determinant()
            .unwrap(),
            -306.0
        );
        // pivot found on an odd row flips the sign
        assert_eq!(
            m(vec![
                vec![0.0, 2.0, 1.0],
                vec![3.0, 0.0, 0.0],
                vec![1.0, 1.0, 0.0]
            ])
            .determinant()
            .unwrap(),
            3.0
        );
        assert_eq!(
            m(vec![
                vec![2.0, 1.0, 0.0, 0.0],
                vec![1.0, 2.0, 0.0, 0.0],
                vec![0.0, 0.0, 3.0, 1.0],
                vec![0.0, 0.0, 1.0, 3.0]
            ])
            .determinant()
            .unwrap(),
            24.0
        );
    }

    #[test]
    fn test_determinant_of_singular_is_zero() {
        let singular = m(vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ]);
        assert_eq!(singular.determinant().unwrap(), 0.0);

        let zero_column = m(vec![
            vec![0.0, 2.0, 3.0],
            vec![0.0, 5.0, 6.0],
            vec![0.0, 8.0, 9.0],
        ]);
        assert_eq!(zero_column.determinant().unwrap(), 0.0);

        assert!(matches!(
            m(vec![vec![1.0, 2.0, 3.0]]).determinant(),
            Err(Error::UndefinedOperation { op: "determinant", .. })
        ));
    }

    #[test]
    fn test_rank() {
        assert_eq!(
            m(vec![
                vec![4.0, 2.0, 1.0],
                vec![5.0, 4.0, 1.0],
                vec![1.0, 2.0, 0.0]
            ])
            .rank(),
            2
        );
        assert_eq!(
            m(vec![
                vec![1.0, 2.0, 3.0],
                vec![4.0, 5.0, 6.0],
                vec![7.0, 8.0, 10.0]
            ])
            .rank(),
            3
        );
        assert_eq!(
            m(vec![
                vec![1.0, 2.0, 3.0],
                vec![2.0, 4.0, 6.0],
                vec![1.0, 1.0, 1.0]
            ])
            .rank(),
            2
        );
        assert_eq!(m(vec![vec![0.0, 0.0], vec![0.0, 0.0]]).rank(), 0);
        assert_eq!(m(vec![vec![0.0, 3.0, 0.0]]).rank(), 1);
        assert_eq!(m(vec![vec![1.0], vec![2.0], vec![3.0]]).rank(), 1);
    }

    #[test]
    fn test_rank_skips_zero_leading_column() {
        let a = m(vec![vec![0.0, 1.0], vec![0.0, 0.0]]);
        assert_eq!(a.rank(), 1);

        let b = m(vec![
            vec![0.0, 1.0, 2.0],
            vec![0.0, 2.0, 1.0],
            vec![0.0, 0.0, 0.0],
        ]);
        assert_eq!(b.rank(), 2);
    }
}
