//! # Parameter System
//!
//! Named, ordered model parameters. Every parameter can be addressed by name
//! (as the estimators do) or by position (as cost functions and minimizers do),
//! can be fixed so that minimizers leave it alone, and records whether its value
//! was supplied explicitly or filled in by an estimate.
//!
//! ## Example Usage
//!
//! ```rust
//! use peakinit_rs::parameters::Parameters;
//!
//! let mut params = Parameters::new();
//! params.add_param("Height", 1.0).unwrap();
//! params.add_param("Sigma", 1.0).unwrap();
//!
//! // A value supplied by the caller is explicit...
//! params.get_mut("Height").unwrap().set_value(10.0).unwrap();
//! // ...an estimate is not.
//! params.get_mut("Sigma").unwrap().set_estimate(0.4).unwrap();
//!
//! assert!(params.get("Height").unwrap().is_explicitly_set());
//! assert!(!params.get("Sigma").unwrap().is_explicitly_set());
//! ```

pub mod parameter;
pub mod parameters;


// Re-export key types
pub use parameter::{Parameter, ParameterError};
pub use parameters::Parameters;
