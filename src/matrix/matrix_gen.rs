use itertools::iproduct;
use num_traits::Float;
use std::ops;

use crate::eigen::bairstow::{bairstow, Root};
use crate::eigen::characteristic::characteristic_polynomial;
use crate::eigen::eigen_config::EigenConfig;
use crate::error::{Error, Result};
use crate::matrix::elimination;
use crate::matrix::matrix::MatrixOps;

pub trait Scalar:  // Avoid repeating all the traits
    Float
    + std::iter::Sum<Self>
    + std::fmt::Display
    + std::fmt::Debug
    + Send
    + Sync
    + 'static
{
}

impl<T> Scalar for T where
    T: Float + std::iter::Sum<T> + std::fmt::Display + std::fmt::Debug + Send + Sync + 'static
{
}

/// Remembers how a matrix was built so that zero and identity matrices can
/// answer determinant / inverse / rank / eigenvalue queries without elimination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    General,
    Zero,
    Identity,
}

/// A cell is either a number or a whole sub-matrix.
#[derive(Debug, Clone)]
pub enum Cell<T> {
    Scalar(T),
    Nested(Matrix<T>),
}

impl<T: Scalar> Cell<T> {
    /// (rows, cols) occupied by this cell once flattened
    pub fn extent(&self) -> (usize, usize) {
        match self {
            Cell::Scalar(_) => (1, 1),
            Cell::Nested(m) => (m.height, m.width),
        }
    }

    pub fn as_scalar(&self) -> Option<T> {
        match self {
            Cell::Scalar(x) => Some(*x),
            Cell::Nested(_) => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&Matrix<T>> {
        match self {
            Cell::Scalar(_) => None,
            Cell::Nested(m) => Some(m),
        }
    }

    fn add(&self, rhs: &Cell<T>) -> Result<Cell<T>> {
        match (self, rhs) {
            (Cell::Scalar(a), Cell::Scalar(b)) => Ok(Cell::Scalar(*a + *b)),
            (Cell::Nested(a), Cell::Nested(b)) => Ok(Cell::Nested(a.add(b)?)),
            _ => Err(Error::DimensionMismatch {
                op: "add",
                lhs: self.extent(),
                rhs: rhs.extent(),
            }),
        }
    }

    fn mul(&self, rhs: &Cell<T>) -> Result<Cell<T>> {
        match (self, rhs) {
            (Cell::Scalar(a), Cell::Scalar(b)) => Ok(Cell::Scalar(*a * *b)),
            (Cell::Nested(a), Cell::Nested(b)) => Ok(Cell::Nested(a.product(b)?)),
            _ => Err(Error::DimensionMismatch {
                op: "product",
                lhs: self.extent(),
                rhs: rhs.extent(),
            }),
        }
    }

    fn scale(&self, k: T) -> Cell<T> {
        match self {
            Cell::Scalar(x) => Cell::Scalar(*x * k),
            Cell::Nested(m) => Cell::Nested(m.scale(k)),
        }
    }

    fn transpose(&self) -> Cell<T> {
        match self {
            Cell::Scalar(x) => Cell::Scalar(*x),
            Cell::Nested(m) => Cell::Nested(m.transpose()),
        }
    }
}

impl<T: Scalar> From<T> for Cell<T> {
    fn from(value: T) -> Self {
        Cell::Scalar(value)
    }
}

impl<T: Scalar> From<Matrix<T>> for Cell<T> {
    fn from(value: Matrix<T>) -> Self {
        Cell::Nested(value)
    }
}

/// Row-major grid of cells. `rows`/`cols` describe the grid, `height`/`width`
/// the dense matrix obtained by flattening it.
#[derive(Debug, Clone)]
pub struct Matrix<T> {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) height: usize,
    pub(crate) width: usize,
    pub(crate) cells: Vec<Cell<T>>,
    pub(crate) kind: Kind,
}

impl<T: Scalar> Matrix<T> {
    pub fn new(lines: Vec<Vec<T>>) -> Result<Matrix<T>> {
        Matrix::from_cells(
            lines
                .into_iter()
                .map(|line| line.into_iter().map(Cell::Scalar).collect())
                .collect(),
        )
    }

    pub fn from_blocks(blocks: Vec<Vec<Matrix<T>>>) -> Result<Matrix<T>> {
        Matrix::from_cells(
            blocks
                .into_iter()
                .map(|line| line.into_iter().map(Cell::Nested).collect())
                .collect(),
        )
    }

    pub fn from_cells(lines: Vec<Vec<Cell<T>>>) -> Result<Matrix<T>> {
        let rows = lines.len();
        let cols = match lines.first() {
            None => {
                return Err(Error::InvalidMatrix {
                    reason: "matrix has no rows",
                })
            }
            Some(first) => first.len(),
        };
        if cols == 0 {
            return Err(Error::InvalidMatrix {
                reason: "matrix has an empty row",
            });
        }
        if lines.iter().any(|line| line.len() != cols) {
            return Err(Error::InvalidMatrix {
                reason: "rows have unequal length",
            });
        }

        Matrix::from_cell_vec(
            rows,
            cols,
            lines.into_iter().flatten().collect(),
            Kind::General,
        )
    }

    pub fn from_fn(
        rows: usize,
        cols: usize,
        mut f: impl FnMut(usize, usize) -> T,
    ) -> Result<Matrix<T>> {
        Matrix::new(
            (0..rows)
                .map(|i| (0..cols).map(|j| f(i, j)).collect())
                .collect(),
        )
    }

    pub fn zeros(rows: usize, cols: usize) -> Result<Matrix<T>> {
        let mut matrix = Matrix::from_fn(rows, cols, |_, _| T::zero())?;
        matrix.kind = Kind::Zero;
        Ok(matrix)
    }

    pub fn identity(n: usize) -> Result<Matrix<T>> {
        let mut matrix =
            Matrix::from_fn(n, n, |i, j| if i == j { T::one() } else { T::zero() })?;
        matrix.kind = Kind::Identity;
        Ok(matrix)
    }

    pub fn row_vector(values: Vec<T>) -> Result<Matrix<T>> {
        Matrix::new(vec![values])
    }

    pub fn column_vector(values: Vec<T>) -> Result<Matrix<T>> {
        Matrix::new(values.into_iter().map(|x| vec![x]).collect())
    }

    // Validates block conformance: every cell of a grid row has the same
    // height, every cell of a grid column the same width.
    pub(crate) fn from_cell_vec(
        rows: usize,
        cols: usize,
        cells: Vec<Cell<T>>,
        kind: Kind,
    ) -> Result<Matrix<T>> {
        if rows == 0 || cols == 0 || cells.len() != rows * cols {
            return Err(Error::InvalidMatrix {
                reason: "grid shape does not match its cells",
            });
        }

        let heights: Vec<usize> = (0..rows).map(|i| cells[i * cols].extent().0).collect();
        let widths: Vec<usize> = (0..cols).map(|j| cells[j].extent().1).collect();

        let conformant = iproduct!(0..rows, 0..cols)
            .all(|(i, j)| cells[i * cols + j].extent() == (heights[i], widths[j]));
        if !conformant {
            return Err(Error::InvalidMatrix {
                reason: "nested cells are not conformant",
            });
        }

        Ok(Matrix {
            rows,
            cols,
            height: heights.iter().sum(),
            width: widths.iter().sum(),
            cells,
            kind,
        })
    }

    // Caller guarantees a non-empty rectangular input.
    pub(crate) fn from_dense(lines: Vec<Vec<T>>, kind: Kind) -> Matrix<T> {
        let rows = lines.len();
        let cols = lines.first().map_or(0, |line| line.len());
        Matrix {
            rows,
            cols,
            height: rows,
            width: cols,
            cells: lines.into_iter().flatten().map(Cell::Scalar).collect(),
            kind,
        }
    }

    /// Grid shape (rows, cols); equals `dims()` unless some cells are nested.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Flattened shape (rows, cols).
    pub fn dims(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn cells(&self) -> &[Cell<T>] {
        &self.cells
    }

    #[inline(always)]
    pub fn at(&self, row: usize, col: usize) -> &Cell<T> {
        &self.cells[row * self.cols + col]
    }

    pub fn is_nested(&self) -> bool {
        self.cells.iter().any(|c| matches!(c, Cell::Nested(_)))
    }

    pub(crate) fn row_heights(&self) -> Vec<usize> {
        (0..self.rows).map(|i| self.at(i, 0).extent().0).collect()
    }

    pub(crate) fn col_widths(&self) -> Vec<usize> {
        (0..self.cols).map(|j| self.at(0, j).extent().1).collect()
    }

    pub fn add(&self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        if self.shape() != rhs.shape() {
            return Err(Error::DimensionMismatch {
                op: "add",
                lhs: self.shape(),
                rhs: rhs.shape(),
            });
        }

        // Cellwise sums keep every extent, so the grid stays conformant.
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            height: self.height,
            width: self.width,
            cells: self
                .cells
                .iter()
                .zip(rhs.cells.iter())
                .map(|(a, b)| a.add(b))
                .collect::<Result<Vec<_>>>()?,
            kind: Kind::General,
        })
    }

    pub fn subtract(&self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        self.add(&rhs.scale(-T::one()))
    }

    pub fn scale(&self, k: T) -> Matrix<T> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            height: self.height,
            width: self.width,
            cells: self.cells.iter().map(|c| c.scale(k)).collect(),
            kind: if self.kind == Kind::Zero {
                Kind::Zero
            } else {
                Kind::General
            },
        }
    }

    /// Matrix product. Nested cells are multiplied and summed as matrices,
    /// which gives true block multiplication.
    pub fn product(&self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        if self.cols != rhs.rows {
            return Err(Error::DimensionMismatch {
                op: "product",
                lhs: self.shape(),
                rhs: rhs.shape(),
            });
        }

        let cells = iproduct!(0..self.rows, 0..rhs.cols)
            .map(|(i, j)| {
                (1..self.cols).try_fold(self.at(i, 0).mul(rhs.at(0, j))?, |acc, k| {
                    acc.add(&self.at(i, k).mul(rhs.at(k, j))?)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Matrix::from_cell_vec(self.rows, rhs.cols, cells, Kind::General)
    }

    /// Repeated squaring. `pow(0)` is the identity of the flattened dimension.
    /// The result is always flat.
    pub fn pow(&self, n: u32) -> Result<Matrix<T>> {
        if !self.is_square() {
            return Err(Error::not_square("pow"));
        }
        if self.kind == Kind::Identity {
            return Ok(self.clone());
        }

        // A square nested grid need not be conformant with itself, so
        // nested input is squared in flattened form.
        let mut acc: Option<Matrix<T>> = None;
        let mut base = self.flatten();
        let mut n = n;
        loop {
            if n & 1 == 1 {
                acc = Some(match acc {
                    Some(a) => a.product(&base)?,
                    None => base.clone(),
                });
            }
            n >>= 1;
            if n == 0 {
                break;
            }
            base = base.product(&base)?;
        }

        match acc {
            Some(result) => Ok(result),
            None => Matrix::identity(self.height),
        }
    }

    /// Exact comparison of the flattened forms.
    pub fn equals(&self, other: &Matrix<T>) -> bool {
        self.dims() == other.dims() && self.dense_rows() == other.dense_rows()
    }
}

impl<T: Scalar> MatrixOps<T> for Matrix<T> {
    fn rows(&self) -> usize {
        self.height
    }

    fn cols(&self) -> usize {
        self.width
    }

    fn to_array(&self) -> Vec<Vec<T>> {
        self.dense_rows()
    }

    fn transpose(&self) -> Matrix<T> {
        Matrix {
            rows: self.cols,
            cols: self.rows,
            height: self.width,
            width: self.height,
            cells: (0..self.cols)
                .flat_map(|c| (0..self.rows).map(move |r| self.at(r, c).transpose()))
                .collect(),
            kind: self.kind,
        }
    }

    fn inverse(&self) -> Result<Matrix<T>> {
        if !self.is_square() {
            return Err(Error::not_square("inverse"));
        }
        match self.kind {
            Kind::Identity => Ok(self.clone()),
            Kind::Zero => Err(Error::singular("inverse")),
            Kind::General => Ok(Matrix::from_dense(
                elimination::inverse(&self.dense_rows())?,
                Kind::General,
            )),
        }
    }

    fn determinant(&self) -> Result<T> {
        if !self.is_square() {
            return Err(Error::not_square("determinant"));
        }
        match self.kind {
            Kind::Identity => Ok(T::one()),
            Kind::Zero => Ok(T::zero()),
            Kind::General => elimination::determinant(&self.dense_rows()),
        }
    }

    fn rank(&self) -> usize {
        match self.kind {
            Kind::Identity => self.height,
            Kind::Zero => 0,
            Kind::General => elimination::rank(&self.dense_rows()),
        }
    }

    fn trace(&self) -> Result<T> {
        if !self.is_square() {
            return Err(Error::not_square("trace"));
        }
        let dense = self.dense_rows();
        Ok((0..self.height).map(|i| dense[i][i]).sum())
    }

    fn eigenvalues_with(&self, config: &EigenConfig) -> Result<Vec<Root<T>>> {
        if !self.is_square() {
            return Err(Error::not_square("eigenvalues"));
        }
        match self.kind {
            Kind::Identity => Ok(vec![Root::Real(T::one()); self.height]),
            Kind::Zero => Ok(vec![Root::Real(T::zero()); self.height]),
            Kind::General => bairstow(&characteristic_polynomial(self)?, config),
        }
    }
}

impl<T: Scalar> PartialEq for Matrix<T> {
    fn eq(&self, other: &Matrix<T>) -> bool {
        self.equals(other)
    }
}

impl<T: Scalar> ops::Add<&Matrix<T>> for &Matrix<T> {
    type Output = Result<Matrix<T>>;

    fn add(self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        Matrix::add(self, rhs)
    }
}

impl<T: Scalar> ops::Sub<&Matrix<T>> for &Matrix<T> {
    type Output = Result<Matrix<T>>;

    fn sub(self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        self.subtract(rhs)
    }
}

impl<T: Scalar> ops::Mul<&Matrix<T>> for &Matrix<T> {
    type Output = Result<Matrix<T>>;

    fn mul(self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        self.product(rhs)
    }
}

impl<T: Scalar> ops::Mul<T> for &Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, k: T) -> Matrix<T> {
        self.scale(k)
    }
}

impl<T: Scalar> ops::Neg for &Matrix<T> {
    type Output = Matrix<T>;

    fn neg(self) -> Matrix<T> {
        self.scale(-T::one())
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
