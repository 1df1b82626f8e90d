//! Conversions between ndarray and nalgebra types.
//!
//! The public API works with ndarray; linear solves go through nalgebra's
//! decompositions.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Convert an ndarray Array2 to a nalgebra DMatrix.
///
/// # Arguments
///
/// * `arr` - The ndarray Array2 to convert
///
/// # Returns
///
/// * A nalgebra DMatrix with the same shape and data
pub fn ndarray_to_nalgebra<T: nalgebra::Scalar>(arr: &Array2<T>) -> DMatrix<T> {
    DMatrix::from_fn(arr.nrows(), arr.ncols(), |i, j| arr[[i, j]].clone())
}

/// Convert an ndarray Array1 to a nalgebra DVector.
pub fn ndarray_vec_to_nalgebra<T: nalgebra::Scalar>(arr: &Array1<T>) -> DVector<T> {
    DVector::from_iterator(arr.len(), arr.iter().cloned())
}

/// Convert a nalgebra DVector to an ndarray Array1.
pub fn nalgebra_vec_to_ndarray<T: Clone>(vec: &DVector<T>) -> Array1<T> {
    vec.iter().cloned().collect()
}
