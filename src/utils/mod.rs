//! Numerical helpers shared by the cost functions and the minimizer.

pub mod finite_difference;
pub mod matrix_convert;

pub use finite_difference::{gradient, jacobian};
pub use matrix_convert::{nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra};
