use crate::eigen::bairstow::Root;
use crate::eigen::eigen_config::EigenConfig;
use crate::error::Result;
use crate::matrix::matrix_block::BlockMatrix;
use crate::matrix::matrix_gen::{Matrix, Scalar};

/// Operations shared by plain and block matrices. Dimensions are always
/// those of the flattened form.
pub trait MatrixOps<T: Scalar>
where
    Self: Sized,
{
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;

    fn to_array(&self) -> Vec<Vec<T>>;
    fn transpose(&self) -> Self;
    fn inverse(&self) -> Result<Matrix<T>>;
    fn determinant(&self) -> Result<T>;
    fn rank(&self) -> usize;
    fn trace(&self) -> Result<T>;
    fn eigenvalues_with(&self, config: &EigenConfig) -> Result<Vec<Root<T>>>;

    fn eigenvalues(&self) -> Result<Vec<Root<T>>> {
        self.eigenvalues_with(&EigenConfig::default())
    }

    fn is_square(&self) -> bool {
        self.rows() == self.cols()
    }

    fn is_same_size<M: MatrixOps<T>>(&self, other: &M) -> bool {
        self.rows() == other.rows() && self.cols() == other.cols()
    }

    fn as_block(&self) -> Option<&BlockMatrix<T>> {
        None
    }
}
