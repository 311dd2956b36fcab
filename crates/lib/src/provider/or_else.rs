//! First-present fallback.

use std::fmt;
use std::sync::{Arc, Weak};

use super::{GuardedProvider, Provider, ProviderInternal, TypeDescriptor};
use crate::consumer::ValueConsumer;
use crate::context::{EvaluationOwner, OwnerId};
use crate::error::ProviderError;
use crate::execution::ExecutionTimeValue;
use crate::producer::ValueProducer;
use crate::value::{Value, ValueType};

/// Yields `left` when it is present and `right` otherwise.
///
/// `right` is never evaluated for its value when `left` is present, and never
/// touched at all by execution-time classification when `left` is fixed.
pub struct OrElseProvider<T: ValueType> {
  left: GuardedProvider<T>,
  right: GuardedProvider<T>,
}

impl<T: ValueType> OrElseProvider<T> {
  pub(crate) fn create(left: Provider<T>, right: Provider<T>) -> Provider<T> {
    let provider: Arc<Self> = Arc::new_cyclic(|this: &Weak<Self>| {
      let owner = EvaluationOwner::new(OwnerId::of_weak(this), "or");
      Self {
        left: GuardedProvider::new(owner.clone(), left),
        right: GuardedProvider::new(owner, right),
      }
    });
    Provider::from_arc(provider)
  }
}

impl<T: ValueType> ProviderInternal<T> for OrElseProvider<T> {
  fn kind(&self) -> &'static str {
    "or"
  }

  fn value_type(&self) -> Option<TypeDescriptor> {
    self.left.value_type()
  }

  fn calculate_presence(&self, consumer: ValueConsumer) -> Result<bool, ProviderError> {
    Ok(self.left.calculate_presence(consumer)? || self.right.calculate_presence(consumer)?)
  }

  fn calculate_own_value(&self, consumer: ValueConsumer) -> Result<Value<T>, ProviderError> {
    let left = self.left.calculate_value(consumer)?;
    if !left.is_missing() {
      return Ok(left);
    }
    let right = self.right.calculate_value(consumer)?;
    if !right.is_missing() {
      return Ok(right);
    }
    Ok(left.add_paths_from(&right))
  }

  /// Both sides may contribute at execution time, so both producers count.
  fn producer(&self) -> Result<ValueProducer, ProviderError> {
    Ok(self.left.producer()?.plus(self.right.producer()?))
  }

  fn calculate_execution_time_value(&self) -> Result<ExecutionTimeValue<T>, ProviderError> {
    let left = self.left.calculate_execution_time_value()?;
    if left.has_fixed_value() {
      return Ok(left);
    }
    let right = self.right.calculate_execution_time_value()?;
    if left.is_missing() {
      return Ok(right);
    }
    if right.is_missing() {
      // the right branch can never contribute, drop it
      return Ok(left);
    }
    Ok(ExecutionTimeValue::changing(OrElseProvider::create(
      left.to_provider(),
      right.to_provider(),
    )))
  }

  fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "or({}, {})", self.left, self.right)
  }
}
