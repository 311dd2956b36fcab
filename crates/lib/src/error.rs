//! Error types for provider evaluation.
//!
//! A missing value is not an error while it travels inside a [`Value`](crate::value::Value);
//! it only becomes [`ProviderError::MissingValue`] when a caller unpacks it.
//! Everything else here is fatal to the evaluation that raised it and is never
//! converted back into a missing value.

use thiserror::Error;

use crate::value::DisplayName;

/// Errors raised while evaluating or configuring providers.
#[derive(Debug, Error)]
pub enum ProviderError {
  /// A missing value was unpacked.
  #[error("cannot query the value of {} because it has no value available", describe_origin(.paths))]
  MissingValue { paths: Vec<DisplayName> },

  /// A user-supplied transform failed.
  #[error("transform of {provider} failed: {message}")]
  Transform { provider: String, message: String },

  /// A provider re-entered its own evaluation.
  #[error("circular evaluation detected: {}", .cycle.join(" -> "))]
  CircularEvaluation { cycle: Vec<String> },

  /// Evaluation scopes nested deeper than the configured limit.
  #[error("evaluation nested {depth} scopes deep, exceeding the limit of {limit}")]
  EvaluationTooDeep { depth: usize, limit: usize },

  /// A finalized property was modified.
  #[error("the value of {property} is final and cannot be changed")]
  PropertyFinalized { property: String },

  /// A property that disallows changes was modified.
  #[error("the value of {property} cannot be changed any further")]
  ChangesDisallowed { property: String },

  /// Invalid evaluation configuration.
  #[error("invalid evaluation config: {0}")]
  Config(String),
}

impl ProviderError {
  /// Returns true if this error reports a reentrant evaluation.
  pub fn is_circular(&self) -> bool {
    matches!(self, ProviderError::CircularEvaluation { .. })
  }
}

fn describe_origin(paths: &[DisplayName]) -> String {
  match paths {
    [] => "this provider".to_string(),
    [single] => single.to_string(),
    [first, rest @ ..] => {
      let rest: Vec<String> = rest.iter().map(ToString::to_string).collect();
      format!("{} (derived from {})", first, rest.join(", "))
    }
  }
}

/// Error returned by fallible user transforms.
///
/// Evaluation errors raised by providers queried from inside a transform
/// convert through `?` and keep their identity, so a cycle detected inside a
/// transform still surfaces as [`ProviderError::CircularEvaluation`].
#[derive(Debug, Error)]
pub enum TransformError {
  /// The transform itself rejected its input.
  #[error("{0}")]
  Failed(String),

  /// A provider evaluated by the transform failed.
  #[error(transparent)]
  Provider(Box<ProviderError>),
}

impl TransformError {
  /// Create a transform failure with the given message.
  pub fn failed(message: impl Into<String>) -> Self {
    TransformError::Failed(message.into())
  }

  /// Attribute this failure to `provider`.
  pub(crate) fn into_provider_error(self, provider: impl FnOnce() -> String) -> ProviderError {
    match self {
      TransformError::Failed(message) => ProviderError::Transform {
        provider: provider(),
        message,
      },
      TransformError::Provider(err) => *err,
    }
  }
}

impl From<ProviderError> for TransformError {
  fn from(err: ProviderError) -> Self {
    TransformError::Provider(Box::new(err))
  }
}
