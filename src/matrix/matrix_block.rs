use itertools::Itertools;
use std::ops;
use std::sync::OnceLock;
use tracing::debug;

use crate::eigen::bairstow::Root;
use crate::eigen::eigen_config::EigenConfig;
use crate::error::{Error, Result};
use crate::matrix::matrix::MatrixOps;
use crate::matrix::matrix_gen::{Cell, Kind, Matrix, Scalar};
use crate::utils::{interior_cuts, normalize_cuts};

/// A grid of sub-matrices. Blocks in one block-row share their height, blocks
/// in one block-column share their width.
///
/// `row_cuts` / `col_cuts` are the interior partition boundaries in flattened
/// coordinates. The flattened form is computed once and cached.
#[derive(Debug, Clone)]
pub struct BlockMatrix<T> {
    blocks: Matrix<T>,
    row_cuts: Vec<usize>,
    col_cuts: Vec<usize>,
    flat: OnceLock<Matrix<T>>,
}

impl<T: Scalar> BlockMatrix<T> {
    pub fn new(blocks: Vec<Vec<Matrix<T>>>) -> Result<BlockMatrix<T>> {
        BlockMatrix::from_grid(Matrix::from_blocks(blocks)?)
    }

    /// Same as `new`, additionally checking the expected cut points.
    pub fn with_cuts(
        blocks: Vec<Vec<Matrix<T>>>,
        row_cuts: &[usize],
        col_cuts: &[usize],
    ) -> Result<BlockMatrix<T>> {
        let matrix = BlockMatrix::new(blocks)?;
        if matrix.row_cuts != row_cuts || matrix.col_cuts != col_cuts {
            return Err(Error::InvalidMatrix {
                reason: "cut points do not match block extents",
            });
        }
        Ok(matrix)
    }

    fn from_grid(blocks: Matrix<T>) -> Result<BlockMatrix<T>> {
        if blocks.cells().iter().any(|c| c.as_matrix().is_none()) {
            return Err(Error::InvalidMatrix {
                reason: "every cell of a block matrix must be a matrix",
            });
        }

        Ok(BlockMatrix {
            row_cuts: interior_cuts(&blocks.row_heights()),
            col_cuts: interior_cuts(&blocks.col_widths()),
            blocks,
            flat: OnceLock::new(),
        })
    }

    // Keeps the partition of `self`; only valid when `blocks` has it.
    fn with_blocks(&self, blocks: Matrix<T>) -> BlockMatrix<T> {
        BlockMatrix {
            blocks,
            row_cuts: self.row_cuts.clone(),
            col_cuts: self.col_cuts.clone(),
            flat: OnceLock::new(),
        }
    }

    /// Number of (block-rows, block-columns).
    pub fn block_shape(&self) -> (usize, usize) {
        self.blocks.shape()
    }

    pub fn block(&self, row: usize, col: usize) -> Option<&Matrix<T>> {
        let (rows, cols) = self.block_shape();
        if row >= rows || col >= cols {
            return None;
        }
        self.blocks.at(row, col).as_matrix()
    }

    /// The underlying nested grid.
    pub fn blocks(&self) -> &Matrix<T> {
        &self.blocks
    }

    pub fn row_cuts(&self) -> &[usize] {
        &self.row_cuts
    }

    pub fn col_cuts(&self) -> &[usize] {
        &self.col_cuts
    }

    pub fn dims(&self) -> (usize, usize) {
        self.blocks.dims()
    }

    // The block grid with every block flattened. Blocks of equal extent may
    // still nest differently inside, so blockwise arithmetic runs on this.
    fn flat_blocks(&self) -> Matrix<T> {
        Matrix {
            rows: self.blocks.rows,
            cols: self.blocks.cols,
            height: self.blocks.height,
            width: self.blocks.width,
            cells: self
                .blocks
                .cells
                .iter()
                .map(|cell| match cell {
                    Cell::Nested(m) => Cell::Nested(m.flatten()),
                    Cell::Scalar(x) => Cell::Scalar(*x),
                })
                .collect(),
            kind: Kind::General,
        }
    }

    pub fn flatten(&self) -> &Matrix<T> {
        self.flat.get_or_init(|| {
            debug!(
                block_rows = self.blocks.rows,
                block_cols = self.blocks.cols,
                "caching flattened block matrix"
            );
            self.blocks.flatten()
        })
    }

    /// True when `other` is a block matrix with the same grid shape and
    /// pairwise equal block dimensions.
    pub fn has_same_block<M: MatrixOps<T>>(&self, other: &M) -> Result<bool> {
        let other = other.as_block().ok_or(Error::ExpectedBlockMatrix)?;

        Ok(self.block_shape() == other.block_shape()
            && self
                .blocks
                .cells()
                .iter()
                .zip(other.blocks.cells().iter())
                .all(|(a, b)| a.extent() == b.extent()))
    }

    pub fn add(&self, rhs: &BlockMatrix<T>) -> Result<BlockMatrix<T>> {
        if self.has_same_block(rhs)? {
            return Ok(self.with_blocks(self.flat_blocks().add(&rhs.flat_blocks())?));
        }
        if !self.is_same_size(rhs) {
            return Err(Error::DimensionMismatch {
                op: "add",
                lhs: self.dims(),
                rhs: rhs.dims(),
            });
        }

        debug!("block partitions differ, adding flattened forms");
        self.flatten()
            .add(rhs.flatten())?
            .split(&self.row_cuts, &self.col_cuts)
    }

    pub fn subtract(&self, rhs: &BlockMatrix<T>) -> Result<BlockMatrix<T>> {
        self.add(&rhs.scale(-T::one()))
    }

    pub fn scale(&self, k: T) -> BlockMatrix<T> {
        self.with_blocks(self.blocks.scale(k))
    }

    /// Block multiplication when the inner partitions agree, otherwise the
    /// flattened product partitioned by `self`'s rows and `rhs`'s columns.
    pub fn product(&self, rhs: &BlockMatrix<T>) -> Result<BlockMatrix<T>> {
        if self.cols() != rhs.rows() {
            return Err(Error::DimensionMismatch {
                op: "product",
                lhs: self.dims(),
                rhs: rhs.dims(),
            });
        }

        if self.col_cuts == rhs.row_cuts {
            return BlockMatrix::from_grid(self.flat_blocks().product(&rhs.flat_blocks())?);
        }

        debug!("inner partitions differ, multiplying flattened forms");
        self.flatten()
            .product(rhs.flatten())?
            .split(&self.row_cuts, &rhs.col_cuts)
    }

    pub fn pow(&self, n: u32) -> Result<Matrix<T>> {
        self.flatten().pow(n)
    }

    pub fn equals(&self, other: &Matrix<T>) -> bool {
        self.flatten().equals(other)
    }
}

impl<T: Scalar> Matrix<T> {
    /// Partitions the flattened matrix at the given row and column cut points.
    /// Out-of-range cuts are clamped, duplicates ignored.
    pub fn split(&self, row_cuts: &[usize], col_cuts: &[usize]) -> Result<BlockMatrix<T>> {
        let dense = self.dense_rows();
        let row_bounds = normalize_cuts(row_cuts, self.height);
        let col_bounds = normalize_cuts(col_cuts, self.width);

        let blocks = row_bounds
            .iter()
            .tuple_windows()
            .map(|(&top, &bottom)| {
                col_bounds
                    .iter()
                    .tuple_windows()
                    .map(|(&left, &right)| {
                        Matrix::new(
                            dense[top..bottom]
                                .iter()
                                .map(|row| row[left..right].to_vec())
                                .collect(),
                        )
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        BlockMatrix::new(blocks)
    }
}

impl<T: Scalar> MatrixOps<T> for BlockMatrix<T> {
    fn rows(&self) -> usize {
        self.blocks.rows()
    }

    fn cols(&self) -> usize {
        self.blocks.cols()
    }

    fn to_array(&self) -> Vec<Vec<T>> {
        self.flatten().to_array()
    }

    fn transpose(&self) -> BlockMatrix<T> {
        BlockMatrix {
            blocks: self.blocks.transpose(),
            row_cuts: self.col_cuts.clone(),
            col_cuts: self.row_cuts.clone(),
            flat: OnceLock::new(),
        }
    }

    fn inverse(&self) -> Result<Matrix<T>> {
        self.flatten().inverse()
    }

    fn determinant(&self) -> Result<T> {
        self.flatten().determinant()
    }

    fn rank(&self) -> usize {
        self.flatten().rank()
    }

    fn trace(&self) -> Result<T> {
        self.flatten().trace()
    }

    fn eigenvalues_with(&self, config: &EigenConfig) -> Result<Vec<Root<T>>> {
        self.flatten().eigenvalues_with(config)
    }

    fn as_block(&self) -> Option<&BlockMatrix<T>> {
        Some(self)
    }
}

impl<T: Scalar> PartialEq for BlockMatrix<T> {
    fn eq(&self, other: &BlockMatrix<T>) -> bool {
        self.flatten().equals(other.flatten())
    }
}

impl<T: Scalar> PartialEq<Matrix<T>> for BlockMatrix<T> {
    fn eq(&self, other: &Matrix<T>) -> bool {
        self.equals(other)
    }
}

impl<T: Scalar> PartialEq<BlockMatrix<T>> for Matrix<T> {
    fn eq(&self, other: &BlockMatrix<T>) -> bool {
        other.equals(self)
    }
}

impl<T: Scalar> ops::Add<&BlockMatrix<T>> for &BlockMatrix<T> {
    type Output = Result<BlockMatrix<T>>;

    fn add(self, rhs: &BlockMatrix<T>) -> Result<BlockMatrix<T>> {
        BlockMatrix::add(self, rhs)
    }
}

impl<T: Scalar> ops::Sub<&BlockMatrix<T>> for &BlockMatrix<T> {
    type Output = Result<BlockMatrix<T>>;

    fn sub(self, rhs: &BlockMatrix<T>) -> Result<BlockMatrix<T>> {
        self.subtract(rhs)
    }
}

impl<T: Scalar> ops::Mul<&BlockMatrix<T>> for &BlockMatrix<T> {
    type Output = Result<BlockMatrix<T>>;

    fn mul(self, rhs: &BlockMatrix<T>) -> Result<BlockMatrix<T>> {
        self.product(rhs)
    }
}

impl<T: Scalar> ops::Mul<T> for &BlockMatrix<T> {
    type Output = BlockMatrix<T>;

    fn mul(self, k: T) -> BlockMatrix<T> {
        self.scale(k)
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
