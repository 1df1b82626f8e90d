//! Parameters collection implementation
//!
//! This module provides the Parameters struct, an insertion-ordered collection
//! of Parameter objects addressable both by name and by position. Position is
//! what minimizers and cost functions use; names are what estimators use.

use crate::parameters::parameter::{Parameter, ParameterError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An ordered collection of model parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameters {
    /// Parameters in declaration order
    params: Vec<Parameter>,

    /// Map of parameter names to their position in `params`
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Parameters {
    /// Create a new empty parameters collection
    ///
    /// # Examples
    ///
    /// ```
    /// use peakinit_rs::parameters::Parameters;
    ///
    /// let params = Parameters::new();
    /// assert_eq!(params.len(), 0);
    /// ```
    pub fn new() -> Self {
        Self {
            params: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add a parameter to the end of the collection
    ///
    /// # Returns
    ///
    /// `Ok(())` if the parameter was added, or an error if a parameter with the
    /// same name already exists
    pub fn add(&mut self, param: Parameter) -> Result<(), ParameterError> {
        if self.index.contains_key(param.name()) {
            return Err(ParameterError::DuplicateName {
                name: param.name().to_string(),
            });
        }

        self.index.insert(param.name().to_string(), self.params.len());
        self.params.push(param);
        Ok(())
    }

    /// Add a parameter with a default (not explicitly set) value
    ///
    /// # Examples
    ///
    /// ```
    /// use peakinit_rs::parameters::Parameters;
    ///
    /// let mut params = Parameters::new();
    /// params.add_param("Height", 1.0).unwrap();
    /// params.add_param("PeakCentre", 0.0).unwrap();
    /// assert_eq!(params.index_of("PeakCentre"), Some(1));
    /// ```
    pub fn add_param(&mut self, name: &str, value: f64) -> Result<(), ParameterError> {
        self.add(Parameter::new(name, value))
    }

    /// Get a parameter by name
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.index.get(name).map(|&i| &self.params[i])
    }

    /// Get a mutable reference to a parameter by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.params[i]),
            None => None,
        }
    }

    /// Get a parameter by position
    pub fn get_at(&self, index: usize) -> Result<&Parameter, ParameterError> {
        let len = self.params.len();
        self.params
            .get(index)
            .ok_or(ParameterError::IndexOutOfRange { index, len })
    }

    /// Get a mutable reference to a parameter by position
    pub fn get_at_mut(&mut self, index: usize) -> Result<&mut Parameter, ParameterError> {
        let len = self.params.len();
        self.params
            .get_mut(index)
            .ok_or(ParameterError::IndexOutOfRange { index, len })
    }

    /// Position of the named parameter
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Check if a parameter with the given name exists
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get the value of the named parameter
    pub fn value_of(&self, name: &str) -> Result<f64, ParameterError> {
        self.get(name)
            .map(|p| p.value())
            .ok_or_else(|| ParameterError::ParameterNotFound {
                name: name.to_string(),
            })
    }

    /// Get the number of parameters in the collection
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the collection is empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameter names in declaration order
    pub fn names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name().to_string()).collect()
    }

    /// Iterate over the parameters in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    /// Parameter values in declaration order
    pub fn values(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.value()).collect()
    }

    /// Parameters that are varied during minimization
    pub fn varying(&self) -> Vec<&Parameter> {
        self.params.iter().filter(|p| p.vary()).collect()
    }

    /// Parameters that are held fixed
    pub fn fixed(&self) -> Vec<&Parameter> {
        self.params.iter().filter(|p| !p.vary()).collect()
    }

    /// Reset every parameter to its initial value
    pub fn reset(&mut self) {
        for param in self.params.iter_mut() {
            param.reset();
        }
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name().to_string(), i))
            .collect();
    }
}

/// Collects parameters in order; a repeated name keeps its first occurrence.
impl FromIterator<Parameter> for Parameters {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for param in iter {
            if !params.contains(param.name()) {
                params.index.insert(param.name().to_string(), params.params.len());
                params.params.push(param);
            }
        }
        params
    }
}

impl Parameters {
    /// Save parameters to a JSON string
    ///
    /// # Examples
    ///
    /// ```
    /// use peakinit_rs::parameters::Parameters;
    ///
    /// let mut params = Parameters::new();
    /// params.add_param("Sigma", 1.5).unwrap();
    ///
    /// let json = params.to_json().unwrap();
    /// assert!(json.contains("Sigma"));
    /// ```
    pub fn to_json(&self) -> crate::error::Result<String> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(json)
    }

    /// Load parameters from a JSON string
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let mut params: Parameters = serde_json::from_str(json)?;
        params.rebuild_index();
        Ok(params)
    }
}
