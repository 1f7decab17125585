pub mod error;

pub mod matrix {
    pub mod elimination;
    pub mod flatten;
    pub mod matrix;
    pub mod matrix_block;
    pub mod matrix_gen;
}
pub mod eigen {
    pub mod bairstow;
    pub mod characteristic;
    pub mod eigen_config;
}

pub mod utils;

#[cfg(feature = "python")]
pub mod python;

pub use eigen::bairstow::{bairstow, Root};
pub use eigen::characteristic::characteristic_polynomial;
pub use eigen::eigen_config::EigenConfig;
pub use error::{Error, Result};
pub use matrix::matrix::MatrixOps;
pub use matrix::matrix_block::BlockMatrix;
pub use matrix::matrix_gen::{Cell, Kind, Matrix, Scalar};

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
