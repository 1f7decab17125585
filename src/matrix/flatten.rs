use crate::matrix::matrix_gen::{Cell, Kind, Matrix, Scalar};

impl<T: Scalar> Matrix<T> {
    /// Expands every nested cell, returning an equivalent all-scalar matrix.
    pub fn flatten(&self) -> Matrix<T> {
        if !self.is_nested() {
            return self.clone();
        }
        Matrix::from_dense(self.dense_rows(), Kind::General)
    }

    pub(crate) fn dense_rows(&self) -> Vec<Vec<T>> {
        let mut out = vec![vec![T::zero(); self.width]; self.height];
        self.place_into(&mut out, 0, 0);
        out
    }

    // Walks the grid with a (row, column) cursor, writing each cell's
    // flattened form at the cursor before advancing it by the cell's extent.
    fn place_into(&self, out: &mut [Vec<T>], row_offset: usize, col_offset: usize) {
        let mut row_cursor = row_offset;
        for i in 0..self.rows {
            let mut col_cursor = col_offset;
            let mut height = 0;
            for j in 0..self.cols {
                let cell = self.at(i, j);
                match cell {
                    Cell::Scalar(x) => out[row_cursor][col_cursor] = *x,
                    Cell::Nested(m) => m.place_into(out, row_cursor, col_cursor),
                }
                let (h, w) = cell.extent();
                height = h;
                col_cursor += w;
            }
            row_cursor += height;
        }
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::matrix::matrix_gen::{Cell, Matrix};
    use crate::matrix::matrix::MatrixOps;

    fn m(lines: Vec<Vec<f64>>) -> Matrix<f64> {
        Matrix::new(lines).unwrap()
    }

    fn expected() -> Matrix<f64> {
        m(vec![
            vec![1.0, 2.0, 3.0],
            vec![2.0, 3.0, 4.0],
            vec![1.0, 1.0, 1.0],
        ])
    }

    #[test]
    fn test_flatten_row_blocks() {
        let nested = Matrix::from_blocks(vec![
            vec![m(vec![vec![1.0, 2.0, 3.0]])],
            vec![m(vec![vec![2.0, 3.0, 4.0]])],
            vec![m(vec![vec![1.0, 1.0, 1.0]])],
        ])
        .unwrap();

        assert_eq!(nested.shape(), (3, 1));
        assert_eq!(nested.dims(), (3, 3));
        assert!(nested.flatten().equals(&expected()));
        assert!(!nested.flatten().is_nested());
    }

    #[test]
    fn test_flatten_uneven_blocks() {
        let nested = Matrix::from_blocks(vec![
            vec![
                m(vec![vec![1.0, 2.0], vec![2.0, 3.0]]),
                m(vec![vec![3.0], vec![4.0]]),
            ],
            vec![m(vec![vec![1.0, 1.0]]), m(vec![vec![1.0]])],
        ])
        .unwrap();

        assert_eq!(nested.flatten().to_array(), expected().to_array());
    }

    #[test]
    fn test_flatten_deeply_nested_and_mixed() {
        let inner = Matrix::from_blocks(vec![vec![
            m(vec![vec![1.0], vec![2.0]]),
            m(vec![vec![2.0, 3.0], vec![3.0, 4.0]]),
        ]])
        .unwrap();
        let outer = Matrix::from_cells(vec![
            vec![Cell::Nested(inner)],
            vec![Cell::Nested(m(vec![vec![1.0, 1.0, 1.0]]))],
        ])
        .unwrap();
        assert_eq!(outer.flatten(), expected());

        // scalars count as 1x1 cells
        let mixed = Matrix::from_cells(vec![
            vec![Cell::Scalar(1.0), Cell::Nested(m(vec![vec![2.0, 3.0]]))],
            vec![Cell::Scalar(2.0), Cell::Nested(m(vec![vec![3.0, 4.0]]))],
            vec![Cell::Scalar(1.0), Cell::Nested(m(vec![vec![1.0, 1.0]]))],
        ])
        .unwrap();
        assert_eq!(mixed.flatten(), expected());
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let nested = Matrix::from_blocks(vec![vec![
            m(vec![vec![1.0], vec![2.0]]),
            m(vec![vec![5.0, 6.0], vec![7.0, 8.0]]),
        ]])
        .unwrap();
        assert_eq!(nested.flatten().flatten(), nested.flatten());
        assert_eq!(expected().flatten(), expected());
    }
}
