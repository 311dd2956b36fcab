//! Evaluation configuration.
//!
//! Settings are read once per thread when the evaluation context is first used.
//! The environment variable [`MAX_EVALUATION_DEPTH_ENV`] overrides the default,
//! and embedders holding a JSON settings blob can load it with
//! [`EvaluationConfig::from_json_str`].

use std::env;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_MAX_EVALUATION_DEPTH, MAX_EVALUATION_DEPTH_ENV};
use crate::error::ProviderError;

/// Configuration for provider evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluationConfig {
  /// Maximum number of nested evaluation scopes on a single thread.
  pub max_depth: usize,
}

impl Default for EvaluationConfig {
  fn default() -> Self {
    Self {
      max_depth: DEFAULT_MAX_EVALUATION_DEPTH,
    }
  }
}

impl EvaluationConfig {
  /// Read the configuration from the environment, falling back to defaults.
  ///
  /// # Errors
  ///
  /// Returns `Config` if the variable is set but is not a positive integer.
  pub fn from_env() -> Result<Self, ProviderError> {
    match env::var(MAX_EVALUATION_DEPTH_ENV) {
      Ok(raw) => {
        let max_depth = raw
          .trim()
          .parse::<usize>()
          .map_err(|e| ProviderError::Config(format!("{MAX_EVALUATION_DEPTH_ENV}={raw:?}: {e}")))?;
        Self { max_depth }.validated()
      }
      Err(env::VarError::NotPresent) => Ok(Self::default()),
      Err(env::VarError::NotUnicode(_)) => Err(ProviderError::Config(format!(
        "{MAX_EVALUATION_DEPTH_ENV} is not valid unicode"
      ))),
    }
  }

  /// Parse the configuration from JSON. Missing fields take their defaults.
  pub fn from_json_str(json: &str) -> Result<Self, ProviderError> {
    let config: Self = serde_json::from_str(json).map_err(|e| ProviderError::Config(e.to_string()))?;
    config.validated()
  }

  fn validated(self) -> Result<Self, ProviderError> {
    if self.max_depth == 0 {
      return Err(ProviderError::Config("max_depth must be at least 1".to_string()));
    }
    Ok(self)
  }
}
