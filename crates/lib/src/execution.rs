//! Execution-time classification of provider values.
//!
//! At the end of configuration a cache layer asks each provider graph root for
//! its [`ExecutionTimeValue`]. A `Fixed` payload can be stored as a constant,
//! a `Changing` provider must be evaluated again at execution time, and a
//! `Missing` value stays missing. Classification must be sound: a value that
//! could still change is never reported as fixed.

use crate::provider::{Provider, fixed::missing_with, fixed};
use crate::value::{DisplayName, SideEffect, Value, ValueType};

/// A provider's value as known ahead of execution.
#[derive(Debug)]
pub enum ExecutionTimeValue<T: ValueType> {
  /// A final value with no remaining dependency on mutable state.
  Fixed {
    value: T,
    side_effect: Option<SideEffect<T>>,
  },
  /// The value must be recomputed from this provider at execution time.
  Changing(Provider<T>),
  /// No value, with the diagnostic path explaining why.
  Missing(Vec<DisplayName>),
}

impl<T: ValueType> ExecutionTimeValue<T> {
  pub fn fixed(value: T) -> Self {
    ExecutionTimeValue::Fixed {
      value,
      side_effect: None,
    }
  }

  pub fn changing(provider: Provider<T>) -> Self {
    ExecutionTimeValue::Changing(provider)
  }

  pub fn missing() -> Self {
    ExecutionTimeValue::Missing(Vec::new())
  }

  pub fn missing_with(paths: Vec<DisplayName>) -> Self {
    ExecutionTimeValue::Missing(paths)
  }

  /// Classify an already computed value as fixed or missing.
  pub fn from_value(value: Value<T>) -> Self {
    let side_effect = value.side_effect().cloned();
    match value.get_without_side_effect() {
      Some(payload) => ExecutionTimeValue::Fixed {
        value: payload.clone(),
        side_effect,
      },
      None => ExecutionTimeValue::Missing(value.path_to_origin().to_vec()),
    }
  }

  pub fn is_missing(&self) -> bool {
    matches!(self, ExecutionTimeValue::Missing(_))
  }

  pub fn has_fixed_value(&self) -> bool {
    matches!(self, ExecutionTimeValue::Fixed { .. })
  }

  pub fn is_changing(&self) -> bool {
    matches!(self, ExecutionTimeValue::Changing(_))
  }

  pub fn fixed_value(&self) -> Option<&T> {
    match self {
      ExecutionTimeValue::Fixed { value, .. } => Some(value),
      _ => None,
    }
  }

  pub fn changing_value(&self) -> Option<&Provider<T>> {
    match self {
      ExecutionTimeValue::Changing(provider) => Some(provider),
      _ => None,
    }
  }

  /// The value this classification stands for. `None` for a changing value,
  /// which has no value until it is evaluated again.
  pub fn to_value(&self) -> Option<Value<T>> {
    match self {
      ExecutionTimeValue::Fixed { value, side_effect } => {
        Some(Value::present(value.clone()).with_side_effect(side_effect.clone()))
      }
      ExecutionTimeValue::Changing(_) => None,
      ExecutionTimeValue::Missing(paths) => Some(Value::missing_with(paths.clone())),
    }
  }

  /// A provider that reproduces this classification when evaluated.
  pub fn to_provider(&self) -> Provider<T> {
    match self {
      ExecutionTimeValue::Fixed { value, side_effect } => fixed(value.clone()).with_side_effect_opt(side_effect.clone()),
      ExecutionTimeValue::Changing(provider) => provider.clone(),
      ExecutionTimeValue::Missing(paths) => missing_with(paths.clone()),
    }
  }

  /// Attach `side_effect` after any effect already carried.
  pub fn with_side_effect(self, side_effect: SideEffect<T>) -> Self {
    match self {
      ExecutionTimeValue::Fixed {
        value,
        side_effect: existing,
      } => ExecutionTimeValue::Fixed {
        value,
        side_effect: SideEffect::composite(existing, Some(side_effect)),
      },
      ExecutionTimeValue::Changing(provider) => ExecutionTimeValue::Changing(provider.with_side_effect(side_effect)),
      missing @ ExecutionTimeValue::Missing(_) => missing,
    }
  }
}
