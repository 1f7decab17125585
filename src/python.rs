use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyType;

use crate::eigen::bairstow::Root;
use crate::error::Error;
use crate::matrix::matrix::MatrixOps;
use crate::matrix::matrix_gen::Matrix;

// --------------------------------------------------
//                      PYTHON
// --------------------------------------------------

impl From<Error> for PyErr {
    fn from(error: Error) -> PyErr {
        PyValueError::new_err(error.to_string())
    }
}

#[derive(Debug, Clone)]
#[pyclass(frozen, name = "Matrix")]
pub struct PyMatrix {
    inner: Matrix<f64>,
}

impl From<Matrix<f64>> for PyMatrix {
    fn from(inner: Matrix<f64>) -> Self {
        PyMatrix { inner }
    }
}

#[pymethods]
impl PyMatrix {
    #[classmethod]
    pub fn from_list(_cls: &Bound<PyType>, lines: Vec<Vec<f64>>) -> PyResult<Self> {
        Ok(Matrix::new(lines)?.into())
    }

    #[classmethod]
    pub fn identity(_cls: &Bound<PyType>, n: usize) -> PyResult<Self> {
        Ok(Matrix::identity(n)?.into())
    }

    #[classmethod]
    pub fn zeros(_cls: &Bound<PyType>, rows: usize, cols: usize) -> PyResult<Self> {
        Ok(Matrix::zeros(rows, cols)?.into())
    }

    pub fn to_list(&self) -> Vec<Vec<f64>> {
        self.inner.to_array()
    }

    pub fn __add__(&self, rhs: &PyMatrix) -> PyResult<PyMatrix> {
        Ok(self.inner.add(&rhs.inner)?.into())
    }

    pub fn __sub__(&self, rhs: &PyMatrix) -> PyResult<PyMatrix> {
        Ok(self.inner.subtract(&rhs.inner)?.into())
    }

    pub fn __mul__(&self, rhs: &PyMatrix) -> PyResult<PyMatrix> {
        Ok(self.inner.product(&rhs.inner)?.into())
    }

    pub fn __eq__(&self, rhs: &PyMatrix) -> bool {
        self.inner.equals(&rhs.inner)
    }

    pub fn scale(&self, k: f64) -> PyMatrix {
        self.inner.scale(k).into()
    }

    pub fn pow(&self, n: u32) -> PyResult<PyMatrix> {
        Ok(self.inner.pow(n)?.into())
    }

    #[allow(non_snake_case)]
    #[getter]
    pub fn T(&self) -> PyMatrix {
        self.inner.transpose().into()
    }

    #[getter]
    pub fn rows(&self) -> usize {
        self.inner.rows()
    }

    #[getter]
    pub fn cols(&self) -> usize {
        self.inner.cols()
    }

    pub fn inverse(&self) -> PyResult<PyMatrix> {
        Ok(self.inner.inverse()?.into())
    }

    pub fn determinant(&self) -> PyResult<f64> {
        Ok(self.inner.determinant()?)
    }

    pub fn rank(&self) -> usize {
        self.inner.rank()
    }

    pub fn trace(&self) -> PyResult<f64> {
        Ok(self.inner.trace()?)
    }

    /// Eigenvalues as (real, imaginary) pairs
    pub fn eigenvalues(&self) -> PyResult<Vec<(f64, f64)>> {
        Ok(self
            .inner
            .eigenvalues()?
            .iter()
            .map(|r: &Root<f64>| (r.re(), r.im()))
            .collect())
    }

    pub fn split(
        &self,
        row_cuts: Vec<usize>,
        col_cuts: Vec<usize>,
    ) -> PyResult<Vec<Vec<PyMatrix>>> {
        let block = self.inner.split(&row_cuts, &col_cuts)?;
        let (rows, cols) = block.block_shape();
        (0..rows)
            .map(|i| {
                (0..cols)
                    .map(|j| {
                        block
                            .block(i, j)
                            .cloned()
                            .map(PyMatrix::from)
                            .ok_or_else(|| PyValueError::new_err("block index out of range"))
                    })
                    .collect::<PyResult<Vec<_>>>()
            })
            .collect()
    }
}

/// A Python module implemented in Rust.
#[pymodule]
fn block_matrix(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyMatrix>()?;
    Ok(())
}
