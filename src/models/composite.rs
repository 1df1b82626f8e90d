//! Composite models: sums of child models.
//!
//! A composite owns no parameters of its own. Its flat parameter index runs over
//! the children in order, and the parameter names are prefixed with the child's
//! position, so the `Sigma` of the second child is `f1.Sigma`.

use crate::error::{PeakInitError, Result};
use crate::model::{Model, ModelKind};
use crate::parameters::{ParameterError, Parameters};
use ndarray::Array1;

/// A model that evaluates to the sum of its children.
pub struct CompositeModel {
    children: Vec<Box<dyn Model>>,
    // Always empty; returned by `parameters()`.
    empty: Parameters,
}

impl CompositeModel {
    /// Create an empty composite.
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            empty: Parameters::new(),
        }
    }

    /// Append a child model, returning the composite for chaining.
    pub fn with<M: Model + 'static>(mut self, model: M) -> Self {
        self.children.push(Box::new(model));
        self
    }

    /// Append a boxed child model.
    pub fn push(&mut self, model: Box<dyn Model>) {
        self.children.push(model);
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Map a flat index to (child position, index within that child).
    fn locate(&self, i: usize) -> Result<(usize, usize)> {
        let mut offset = 0;
        for (k, child) in self.children.iter().enumerate() {
            let n = child.nparams();
            if i < offset + n {
                return Ok((k, i - offset));
            }
            offset += n;
        }
        Err(ParameterError::IndexOutOfRange {
            index: i,
            len: offset,
        }
        .into())
    }

    fn offset_of(&self, child: usize) -> usize {
        self.children[..child].iter().map(|c| c.nparams()).sum()
    }
}

impl Default for CompositeModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for CompositeModel {
    fn name(&self) -> &str {
        "CompositeFunction"
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Composite
    }

    fn parameters(&self) -> &Parameters {
        &self.empty
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.empty
    }

    fn eval(&self, x: &Array1<f64>) -> Result<Array1<f64>> {
        let mut total = Array1::zeros(x.len());
        for child in &self.children {
            total += &child.eval(x)?;
        }
        Ok(total)
    }

    fn components(&self) -> &[Box<dyn Model>] {
        &self.children
    }

    fn components_mut(&mut self) -> &mut [Box<dyn Model>] {
        &mut self.children
    }

    fn nparams(&self) -> usize {
        self.children.iter().map(|c| c.nparams()).sum()
    }

    fn parameter_name(&self, i: usize) -> Result<String> {
        let (k, local) = self.locate(i)?;
        Ok(format!("f{}.{}", k, self.children[k].parameter_name(local)?))
    }

    fn get_parameter(&self, i: usize) -> Result<f64> {
        let (k, local) = self.locate(i)?;
        self.children[k].get_parameter(local)
    }

    fn set_parameter(&mut self, i: usize, value: f64, explicitly_set: bool) -> Result<()> {
        let (k, local) = self.locate(i)?;
        self.children[k].set_parameter(local, value, explicitly_set)
    }

    fn is_explicitly_set(&self, i: usize) -> Result<bool> {
        let (k, local) = self.locate(i)?;
        self.children[k].is_explicitly_set(local)
    }

    fn is_active(&self, i: usize) -> Result<bool> {
        let (k, local) = self.locate(i)?;
        self.children[k].is_active(local)
    }

    fn fix(&mut self, i: usize) -> Result<()> {
        let (k, local) = self.locate(i)?;
        self.children[k].fix(local)
    }

    fn parameter_index(&self, name: &str) -> Result<usize> {
        let not_found = || PeakInitError::ParameterNotFound(name.to_string());

        let (prefix, rest) = name.split_once('.').ok_or_else(not_found)?;
        let k: usize = prefix
            .strip_prefix('f')
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(not_found)?;
        let child = self.children.get(k).ok_or_else(not_found)?;

        Ok(self.offset_of(k) + child.parameter_index(rest)?)
    }
}
