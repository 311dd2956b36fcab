//! Deferred actions attached to values.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::{Value, ValueType};

type Action<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// An action run when the value it is attached to is unpacked.
///
/// Side effects compose in sequence. When a value is transformed, its effect is
/// bound to the original payload with [`SideEffect::fixed_from`] so it can
/// travel with the transformed result.
pub struct SideEffect<T> {
  action: Action<T>,
}

impl<T> Clone for SideEffect<T> {
  fn clone(&self) -> Self {
    Self {
      action: self.action.clone(),
    }
  }
}

impl<T> fmt::Debug for SideEffect<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("SideEffect")
  }
}

impl<T: ValueType> SideEffect<T> {
  pub fn new(action: impl Fn(&T) + Send + Sync + 'static) -> Self {
    Self {
      action: Arc::new(action),
    }
  }

  pub fn execute(&self, value: &T) {
    trace!(value = ?value, "executing side effect");
    (self.action)(value)
  }

  /// Bind `effect` to `value`, producing an effect that ignores its own argument.
  pub fn fixed<S: ValueType>(value: T, effect: SideEffect<T>) -> SideEffect<S> {
    SideEffect::new(move |_: &S| effect.execute(&value))
  }

  /// The fixed form of the side effect attached to `value`, if any.
  pub fn fixed_from<S: ValueType>(value: &Value<T>) -> Option<SideEffect<S>> {
    let effect = value.side_effect()?.clone();
    let payload = value.get_without_side_effect()?.clone();
    Some(Self::fixed(payload, effect))
  }

  /// Run `first`, then `second`.
  pub fn composite(first: Option<SideEffect<T>>, second: Option<SideEffect<T>>) -> Option<SideEffect<T>> {
    match (first, second) {
      (None, second) => second,
      (first, None) => first,
      (Some(first), Some(second)) => Some(SideEffect::new(move |value: &T| {
        first.execute(value);
        second.execute(value);
      })),
    }
  }
}
