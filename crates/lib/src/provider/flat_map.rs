//! Monadic bind over providers.
//!
//! `flat_map` evaluates its upstream, hands the payload to a transform that
//! picks the next provider, and evaluates that. The downstream provider is not
//! known until the transform has run, so presence and producer queries go
//! through a "backing provider" built from a non-strict read of the upstream.
//! Execution-time classification looks at the upstream first: a changing
//! upstream keeps the whole bind changing.

use std::fmt;
use std::sync::{Arc, Weak};

use super::fixed::not_defined;
use super::{GuardedProvider, Provider, ProviderInternal, TypeDescriptor, render};
use crate::consumer::ValueConsumer;
use crate::context::{EvaluationOwner, OwnerId};
use crate::error::{ProviderError, TransformError};
use crate::execution::ExecutionTimeValue;
use crate::producer::ValueProducer;
use crate::value::{SideEffect, Value, ValueType};

pub(crate) type FlatMapTransform<T, S> = Arc<dyn Fn(T) -> Result<Option<Provider<S>>, TransformError> + Send + Sync>;

pub struct FlatMapProvider<T: ValueType, S: ValueType> {
  owner: EvaluationOwner,
  upstream: GuardedProvider<T>,
  transform: FlatMapTransform<T, S>,
}

impl<T: ValueType, S: ValueType> FlatMapProvider<T, S> {
  pub(crate) fn create(upstream: Provider<T>, transform: FlatMapTransform<T, S>) -> Provider<S> {
    let provider: Arc<Self> = Arc::new_cyclic(|this: &Weak<Self>| {
      let owner = EvaluationOwner::new(OwnerId::of_weak(this), "flatmap");
      Self {
        upstream: GuardedProvider::new(owner.clone(), upstream),
        owner,
        transform,
      }
    });
    Provider::from_arc(provider)
  }

  fn guard(&self, provider: Provider<S>) -> GuardedProvider<S> {
    GuardedProvider::new(self.owner.clone(), provider)
  }

  /// Run the transform on a present upstream value.
  fn map_value(&self, value: Value<T>) -> Result<GuardedProvider<S>, ProviderError> {
    let transformed = {
      let _scope = self.owner.begin_evaluation()?;
      match value.get_without_side_effect() {
        Some(payload) => (self.transform)(payload.clone()),
        None => Ok(None),
      }
    };
    let transformed = transformed.map_err(|err| err.into_provider_error(|| render::<S>(&self.owner, self)))?;

    let Some(transformed) = transformed else {
      return Ok(self.guard(not_defined()));
    };

    // The transformed provider's own side effect runs before this fixed one.
    // Source order cannot be kept in general: the transformed provider may hide
    // side effects under any number of wrapping providers.
    Ok(self.guard(transformed.with_side_effect_opt(SideEffect::fixed_from(&value))))
  }

  fn backing_provider(&self) -> Result<GuardedProvider<S>, ProviderError> {
    let value = self.upstream.calculate_value(ValueConsumer::IgnoreUnsafeRead)?;
    if value.is_missing() {
      return Ok(self.guard(not_defined()));
    }
    self.map_value(value)
  }
}

impl<T: ValueType, S: ValueType> ProviderInternal<S> for FlatMapProvider<T, S> {
  fn kind(&self) -> &'static str {
    "flatmap"
  }

  fn value_type(&self) -> Option<TypeDescriptor> {
    None
  }

  fn calculate_presence(&self, _consumer: ValueConsumer) -> Result<bool, ProviderError> {
    self
      .backing_provider()?
      .calculate_presence(ValueConsumer::IgnoreUnsafeRead)
  }

  fn calculate_own_value(&self, consumer: ValueConsumer) -> Result<Value<S>, ProviderError> {
    let value = self.upstream.calculate_value(consumer)?;
    if let Some(missing) = value.as_missing() {
      return Ok(missing);
    }
    self.map_value(value)?.calculate_value(consumer)
  }

  fn producer(&self) -> Result<ValueProducer, ProviderError> {
    self.backing_provider()?.producer()
  }

  fn calculate_execution_time_value(&self) -> Result<ExecutionTimeValue<S>, ProviderError> {
    match self.upstream.calculate_execution_time_value()? {
      ExecutionTimeValue::Missing(paths) => Ok(ExecutionTimeValue::Missing(paths)),
      ExecutionTimeValue::Changing(provider) => Ok(ExecutionTimeValue::changing(Self::create(
        provider,
        self.transform.clone(),
      ))),
      ExecutionTimeValue::Fixed { value, side_effect } => {
        let value = Value::present(value).with_side_effect(side_effect);
        self.map_value(value)?.calculate_execution_time_value()
      }
    }
  }

  fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "flatmap({})", self.upstream)
  }
}
