//! Parameter definition and implementation
//!
//! This module provides the Parameter struct, the building block of a model's
//! parameter set. A parameter remembers whether its current value was set
//! explicitly by the caller or filled in by an estimator, which is what the
//! initial-value estimation uses to decide whether it may overwrite it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Parameter '{name}' cannot take the non-finite value {value}")]
    NonFiniteValue { name: String, value: f64 },

    #[error("Parameter '{name}' already exists")]
    DuplicateName { name: String },

    #[error("Parameter '{name}' not found")]
    ParameterNotFound { name: String },

    #[error("Parameter index {index} out of range for {len} parameters")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A named model parameter
///
/// Parameters can be fixed (excluded from minimization) and carry an
/// `explicitly_set` flag distinguishing user-supplied values from estimates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Name of the parameter
    pub name: String,

    /// Current value of the parameter
    value: f64,

    /// Initial value when created (for reset operations)
    init_value: f64,

    /// Whether this parameter can be varied during minimization
    pub vary: bool,

    /// Whether the current value was supplied explicitly by the caller
    explicitly_set: bool,
}

impl Parameter {
    /// Create a new parameter with the given name and default value
    ///
    /// The value is a model default: the parameter is not marked as
    /// explicitly set.
    ///
    /// # Examples
    ///
    /// ```
    /// use peakinit_rs::parameters::parameter::Parameter;
    ///
    /// let param = Parameter::new("Sigma", 1.0);
    /// assert_eq!(param.name(), "Sigma");
    /// assert_eq!(param.value(), 1.0);
    /// assert!(param.vary());
    /// assert!(!param.is_explicitly_set());
    /// ```
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            init_value: value,
            vary: true,
            explicitly_set: false,
        }
    }

    /// Create a parameter whose value counts as explicitly set.
    pub fn explicit(name: &str, value: f64) -> Self {
        let mut param = Self::new(name, value);
        param.explicitly_set = true;
        param
    }

    /// Get the current value of the parameter
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set the value of the parameter and mark it as explicitly set
    ///
    /// # Returns
    ///
    /// `Ok(())` if the value was set successfully, or an error if the value is not finite
    pub fn set_value(&mut self, value: f64) -> Result<(), ParameterError> {
        self.assign(value, true)
    }

    /// Set the value of the parameter without marking it as explicitly set
    ///
    /// Estimators use this so that a later estimate may still replace the value.
    pub fn set_estimate(&mut self, value: f64) -> Result<(), ParameterError> {
        self.assign(value, false)
    }

    /// Set the value and the explicit flag in one step.
    pub fn assign(&mut self, value: f64, explicitly_set: bool) -> Result<(), ParameterError> {
        if !value.is_finite() {
            return Err(ParameterError::NonFiniteValue {
                name: self.name.clone(),
                value,
            });
        }

        self.value = value;
        self.explicitly_set = explicitly_set;
        Ok(())
    }

    /// Whether the current value was supplied explicitly
    pub fn is_explicitly_set(&self) -> bool {
        self.explicitly_set
    }

    /// Get the initial value of the parameter
    pub fn init_value(&self) -> f64 {
        self.init_value
    }

    /// Reset the parameter to its initial value
    pub fn reset(&mut self) {
        self.value = self.init_value;
        self.explicitly_set = false;
    }

    /// Get the name of the parameter
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the parameter is varied during minimization
    pub fn vary(&self) -> bool {
        self.vary
    }

    /// Set whether the parameter is varied during minimization
    pub fn set_vary(&mut self, vary: bool) {
        self.vary = vary;
    }
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.value == other.value
            && self.vary == other.vary
            && self.explicitly_set == other.explicitly_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_creation() {
        let param = Parameter::new("Height", 10.0);
        assert_eq!(param.name(), "Height");
        assert_eq!(param.value(), 10.0);
        assert_eq!(param.init_value(), 10.0);
        assert!(param.vary());
        assert!(!param.is_explicitly_set());

        let param = Parameter::explicit("Height", 3.0);
        assert!(param.is_explicitly_set());
    }

    #[test]
    fn test_explicit_flag() {
        let mut param = Parameter::new("Sigma", 1.0);

        param.set_estimate(2.5).unwrap();
        assert_eq!(param.value(), 2.5);
        assert!(!param.is_explicitly_set());

        param.set_value(0.7).unwrap();
        assert_eq!(param.value(), 0.7);
        assert!(param.is_explicitly_set());

        param.reset();
        assert_eq!(param.value(), 1.0);
        assert!(!param.is_explicitly_set());
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let mut param = Parameter::new("Sigma", 1.0);
        assert!(param.set_value(f64::NAN).is_err());
        assert!(param.set_estimate(f64::INFINITY).is_err());
        assert_eq!(param.value(), 1.0);
    }

    #[test]
    fn test_parameter_vary() {
        let mut param = Parameter::new("A", 1.0);
        assert!(param.vary());

        param.set_vary(false);
        assert!(!param.vary());

        param.set_vary(true);
        assert!(param.vary());
    }
}
