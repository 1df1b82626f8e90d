//! Chebyshev function approximation.
//!
//! [`ApproximationBase`] interpolates a function on one interval;
//! [`PiecewiseApproximation`] stitches one or more such segments together and
//! chooses their orders adaptively.
//!
//! ```rust
//! use peakinit_rs::approximation::PiecewiseApproximation;
//!
//! let f = PiecewiseApproximation::adaptive(0.0, 3.0, |x: f64| x.sin(), 1e-14, 16).unwrap();
//! assert!(f.is_good());
//!
//! let df = f.derivative();
//! assert!((df.eval(1.0) - 1.0f64.cos()).abs() < 1e-10);
//! ```

pub mod base;
pub mod piecewise;
pub mod spline;

pub use base::{ApproximationBase, BestFit, DEFAULT_TOLERANCE};
pub use piecewise::{PiecewiseApproximation, Segment, MAX_SPLIT_DEPTH};
pub use spline::CubicSpline;
