//! Iterative minimizers of [`CostFunction`]s.
//!
//! A minimizer is bound to a cost function with [`Minimizer::initialize`] and
//! then driven one iteration at a time. Each call to
//! [`Minimizer::iterate`] leaves the cost function's parameters at the point
//! chosen by that iteration.

pub mod config;
pub mod local_search;

pub use config::LocalSearchConfig;
pub use local_search::LocalSearchMinimizer;

use crate::cost_function::CostFunction;
use crate::error::Result;

/// An iterative minimizer.
pub trait Minimizer<'a> {
    /// Bind the minimizer to a cost function.
    fn initialize(&mut self, cost_function: &'a mut dyn CostFunction);

    /// Perform iteration number `iteration`, counting from zero.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if another iteration should follow
    fn iterate(&mut self, iteration: usize) -> Result<bool>;

    /// The cost at the current parameters.
    fn cost_function_val(&self) -> Result<f64>;

    /// Iterate until the minimizer stops or `max_iterations` is reached.
    ///
    /// # Returns
    ///
    /// * The number of iterations performed
    fn minimize(&mut self, max_iterations: usize) -> Result<usize> {
        let mut done = 0;
        while done < max_iterations {
            let more = self.iterate(done)?;
            done += 1;
            if !more {
                break;
            }
        }
        Ok(done)
    }
}
