//! Evaluation results.
//!
//! A [`Value`] is what a provider hands back when asked for its value: either a
//! payload or a missing marker carrying the chain of [`DisplayName`]s that
//! explains where the value should have come from. Either may carry a
//! [`SideEffect`] that runs when the value is unpacked with [`Value::get`].
//!
//! Values are never cached by the engine and are not `Clone`, so the side
//! effect of one evaluation runs at most once.

mod side_effect;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use side_effect::SideEffect;

use crate::error::ProviderError;

/// Bound shared by every type a provider can compute.
pub trait ValueType: Clone + fmt::Debug + Send + Sync + 'static {}

impl<T> ValueType for T where T: Clone + fmt::Debug + Send + Sync + 'static {}

/// A human readable name used in missing-value diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DisplayName(pub String);

impl fmt::Display for DisplayName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<&str> for DisplayName {
  fn from(name: &str) -> Self {
    DisplayName(name.to_string())
  }
}

impl From<String> for DisplayName {
  fn from(name: String) -> Self {
    DisplayName(name)
  }
}

#[derive(Debug)]
enum State<T> {
  Present(T),
  Missing(Vec<DisplayName>),
}

/// The result of evaluating a provider.
#[derive(Debug)]
pub struct Value<T: ValueType> {
  state: State<T>,
  side_effect: Option<SideEffect<T>>,
}

impl<T: ValueType> Value<T> {
  /// A present value without a side effect.
  pub fn present(value: T) -> Self {
    Self {
      state: State::Present(value),
      side_effect: None,
    }
  }

  /// A missing value with an empty diagnostic path.
  pub fn missing() -> Self {
    Self::missing_with(Vec::new())
  }

  /// A missing value explained by `paths`.
  pub fn missing_with(paths: Vec<DisplayName>) -> Self {
    Self {
      state: State::Missing(paths),
      side_effect: None,
    }
  }

  /// Present for `Some`, missing for `None`.
  pub fn of_option(value: Option<T>) -> Self {
    match value {
      Some(value) => Self::present(value),
      None => Self::missing(),
    }
  }

  pub fn is_missing(&self) -> bool {
    matches!(self.state, State::Missing(_))
  }

  /// Unpack the payload, running the attached side effect.
  ///
  /// # Errors
  ///
  /// Returns `MissingValue` with the diagnostic paths if the value is missing.
  pub fn get(self) -> Result<T, ProviderError> {
    match self.state {
      State::Present(value) => {
        if let Some(side_effect) = &self.side_effect {
          side_effect.execute(&value);
        }
        Ok(value)
      }
      State::Missing(paths) => Err(ProviderError::MissingValue { paths }),
    }
  }

  /// Unpack the payload if present, running the attached side effect.
  pub fn or_none(self) -> Option<T> {
    self.get().ok()
  }

  /// Borrow the payload without running the side effect.
  pub fn get_without_side_effect(&self) -> Option<&T> {
    match &self.state {
      State::Present(value) => Some(value),
      State::Missing(_) => None,
    }
  }

  pub fn side_effect(&self) -> Option<&SideEffect<T>> {
    self.side_effect.as_ref()
  }

  /// Attach `side_effect`, running after any effect already attached.
  ///
  /// Missing values drop the effect since they can never be unpacked.
  pub fn with_side_effect(mut self, side_effect: Option<SideEffect<T>>) -> Self {
    if self.is_missing() {
      return self;
    }
    self.side_effect = SideEffect::composite(self.side_effect.take(), side_effect);
    self
  }

  /// Map the payload. The original side effect is carried over in fixed form.
  pub fn transform<S: ValueType>(self, f: impl FnOnce(T) -> S) -> Value<S> {
    let side_effect = SideEffect::fixed_from(&self);
    match self.state {
      State::Present(value) => Value::present(f(value)).with_side_effect(side_effect),
      State::Missing(paths) => Value::missing_with(paths),
    }
  }

  /// Re-type a missing value, keeping its paths. `None` if the value is present.
  pub fn as_missing<S: ValueType>(&self) -> Option<Value<S>> {
    match &self.state {
      State::Present(_) => None,
      State::Missing(paths) => Some(Value::missing_with(paths.clone())),
    }
  }

  /// Prepend `name` to the diagnostic path of a missing value.
  pub fn push_when_missing(mut self, name: Option<&DisplayName>) -> Self {
    if let (State::Missing(paths), Some(name)) = (&mut self.state, name) {
      paths.insert(0, name.clone());
    }
    self
  }

  /// Append the diagnostic paths of `other` when both values are missing.
  pub fn add_paths_from<S: ValueType>(mut self, other: &Value<S>) -> Self {
    if let (State::Missing(paths), State::Missing(other_paths)) = (&mut self.state, &other.state) {
      paths.extend(other_paths.iter().cloned());
    }
    self
  }

  /// The diagnostic path of a missing value; empty when present.
  pub fn path_to_origin(&self) -> &[DisplayName] {
    match &self.state {
      State::Present(_) => &[],
      State::Missing(paths) => paths,
    }
  }
}
