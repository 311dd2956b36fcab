//! Payload transforms.

use std::fmt;
use std::sync::{Arc, Weak};

use super::{GuardedProvider, Provider, ProviderInternal, render};
use crate::consumer::ValueConsumer;
use crate::context::{EvaluationOwner, OwnerId};
use crate::error::{ProviderError, TransformError};
use crate::execution::ExecutionTimeValue;
use crate::producer::ValueProducer;
use crate::value::{SideEffect, Value, ValueType};

pub(crate) type MapTransform<T, S> = Arc<dyn Fn(T) -> Result<Option<S>, TransformError> + Send + Sync>;

/// Applies a transform to the upstream payload.
///
/// The upstream side effect travels with the result in fixed form. A transform
/// returning `None` makes the result missing.
pub struct MapProvider<T: ValueType, S: ValueType> {
  owner: EvaluationOwner,
  upstream: GuardedProvider<T>,
  transform: MapTransform<T, S>,
}

impl<T: ValueType, S: ValueType> MapProvider<T, S> {
  pub(crate) fn create(upstream: Provider<T>, transform: MapTransform<T, S>) -> Provider<S> {
    let provider: Arc<Self> = Arc::new_cyclic(|this: &Weak<Self>| {
      let owner = EvaluationOwner::new(OwnerId::of_weak(this), "map");
      Self {
        upstream: GuardedProvider::new(owner.clone(), upstream),
        owner,
        transform,
      }
    });
    Provider::from_arc(provider)
  }

  fn apply(&self, payload: &T) -> Result<Option<S>, ProviderError> {
    let result = {
      let _scope = self.owner.begin_evaluation()?;
      (self.transform)(payload.clone())
    };
    result.map_err(|err| err.into_provider_error(|| render::<S>(&self.owner, self)))
  }
}

impl<T: ValueType, S: ValueType> ProviderInternal<S> for MapProvider<T, S> {
  fn kind(&self) -> &'static str {
    "map"
  }

  fn calculate_own_value(&self, consumer: ValueConsumer) -> Result<Value<S>, ProviderError> {
    let value = self.upstream.calculate_value(consumer)?;
    let Some(payload) = value.get_without_side_effect() else {
      return Ok(value.as_missing().unwrap_or_else(Value::missing));
    };
    let mapped = self.apply(payload)?;
    Ok(Value::of_option(mapped).with_side_effect(SideEffect::fixed_from(&value)))
  }

  fn producer(&self) -> Result<ValueProducer, ProviderError> {
    self.upstream.producer()
  }

  fn calculate_execution_time_value(&self) -> Result<ExecutionTimeValue<S>, ProviderError> {
    match self.upstream.calculate_execution_time_value()? {
      ExecutionTimeValue::Missing(paths) => Ok(ExecutionTimeValue::Missing(paths)),
      ExecutionTimeValue::Fixed { value, side_effect } => Ok(match self.apply(&value)? {
        Some(mapped) => ExecutionTimeValue::Fixed {
          value: mapped,
          side_effect: side_effect.map(|effect| SideEffect::fixed(value, effect)),
        },
        None => ExecutionTimeValue::missing(),
      }),
      ExecutionTimeValue::Changing(provider) => Ok(ExecutionTimeValue::changing(MapProvider::create(
        provider,
        self.transform.clone(),
      ))),
    }
  }

  fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "map({})", self.upstream)
  }
}
