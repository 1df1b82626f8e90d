//! Tests of the local search minimizer on model fits and plain cost functions.

use approx::assert_abs_diff_eq;
use peakinit_rs::cost_function::{CostFunction, LeastSquaresCost};
use peakinit_rs::domain::{FunctionDomain1D, FunctionValues};
use peakinit_rs::error::Result;
use peakinit_rs::estimator::ParameterEstimator;
use peakinit_rs::minimizer::{LocalSearchConfig, LocalSearchMinimizer, Minimizer};
use peakinit_rs::model::Model;
use peakinit_rs::models::GaussianModel;

/// An elongated bowl with no derivative information.
struct Bowl {
    p: Vec<f64>,
}

impl CostFunction for Bowl {
    fn nparams(&self) -> usize {
        self.p.len()
    }

    fn parameter(&self, i: usize) -> Result<f64> {
        Ok(self.p[i])
    }

    fn set_parameter(&mut self, i: usize, value: f64) -> Result<()> {
        self.p[i] = value;
        Ok(())
    }

    fn val(&self) -> Result<f64> {
        let (x, y) = (self.p[0], self.p[1]);
        Ok((x - 3.0).powi(2) + 4.0 * (y - 0.5).powi(2) + 0.5 * (x - 3.0) * (y - 0.5) + 1.0)
    }
}

#[test]
fn test_grid_search_only() -> Result<()> {
    let mut bowl = Bowl { p: vec![1.0, 2.0] };
    let start = bowl.val()?;

    let mut costs = Vec::new();
    {
        let mut minimizer = LocalSearchMinimizer::new();
        minimizer.initialize(&mut bowl);
        let mut i = 0;
        while minimizer.iterate(i)? {
            costs.push(minimizer.cost_function_val()?);
            i += 1;
        }
        costs.push(minimizer.cost_function_val()?);
        assert_eq!(i + 1, minimizer.config().max_iterations);
    }

    assert!(costs.windows(2).all(|w| w[1] <= w[0]));
    assert!(costs[costs.len() - 1] < start);
    assert!(costs[costs.len() - 1] < 1.2);
    Ok(())
}

#[test]
fn test_refines_estimated_gaussian() -> Result<()> {
    let domain = FunctionDomain1D::linspace(-6.0, 8.0, 141)?;
    let values = FunctionValues::from_fn(&domain, |x| {
        let u = (x - 1.2) / 0.9;
        2.5 * (-0.5 * u * u).exp()
    });

    let mut model = GaussianModel::new();
    model.set_parameter_by_name("Height", 2.0, true)?;
    model.set_parameter_by_name("PeakCentre", 1.0, true)?;
    ParameterEstimator::estimate(&mut model, &domain, &values)?;

    let (start, end) = {
        let mut cost = LeastSquaresCost::new(&mut model, &domain, &values)?;
        let start = cost.val()?;

        let mut minimizer = LocalSearchMinimizer::with_config(LocalSearchConfig::default());
        minimizer.initialize(&mut cost);
        let iterations = minimizer.minimize(10)?;
        assert_eq!(iterations, 10);
        (start, minimizer.cost_function_val()?)
    };

    assert!(end < 0.1 * start, "cost {} -> {}", start, end);
    assert_abs_diff_eq!(
        model.get_parameter_by_name("PeakCentre")?,
        1.2,
        epsilon = 0.1
    );
    Ok(())
}

#[test]
fn test_fixed_parameters_do_not_move() -> Result<()> {
    let domain = FunctionDomain1D::linspace(-5.0, 5.0, 51)?;
    let values = FunctionValues::from_fn(&domain, |x| 3.0 * (-0.5 * x * x).exp());

    let mut model = GaussianModel::new();
    let height = model.parameter_index("Height")?;
    model.set_parameter(height, 2.0, true)?;
    model.fix(height)?;

    {
        let mut cost = LeastSquaresCost::new(&mut model, &domain, &values)?;
        assert_eq!(cost.nparams(), 2);

        let mut minimizer = LocalSearchMinimizer::new();
        minimizer.initialize(&mut cost);
        minimizer.minimize(3)?;
    }

    assert_eq!(model.get_parameter(height)?, 2.0);
    Ok(())
}
