//! Wrappers that leave the value alone.
//!
//! [`WithSideEffectProvider`] attaches a side effect to every present value and
//! [`NamedProvider`] gives a provider a name for missing-value diagnostics.
//! Both forward every other query to the wrapped provider.

use std::fmt;
use std::sync::{Arc, Weak};

use super::{GuardedProvider, Provider, ProviderInternal, TypeDescriptor};
use crate::consumer::ValueConsumer;
use crate::context::{EvaluationOwner, OwnerId};
use crate::error::ProviderError;
use crate::execution::ExecutionTimeValue;
use crate::producer::ValueProducer;
use crate::value::{DisplayName, SideEffect, Value, ValueType};

pub struct WithSideEffectProvider<T: ValueType> {
  provider: GuardedProvider<T>,
  side_effect: SideEffect<T>,
}

impl<T: ValueType> WithSideEffectProvider<T> {
  pub(crate) fn create(provider: Provider<T>, side_effect: SideEffect<T>) -> Provider<T> {
    let provider: Arc<Self> = Arc::new_cyclic(|this: &Weak<Self>| Self {
      provider: GuardedProvider::new(
        EvaluationOwner::new(OwnerId::of_weak(this), "with_side_effect"),
        provider,
      ),
      side_effect,
    });
    Provider::from_arc(provider)
  }
}

impl<T: ValueType> ProviderInternal<T> for WithSideEffectProvider<T> {
  fn kind(&self) -> &'static str {
    "with_side_effect"
  }

  fn value_type(&self) -> Option<TypeDescriptor> {
    self.provider.value_type()
  }

  fn calculate_presence(&self, consumer: ValueConsumer) -> Result<bool, ProviderError> {
    self.provider.calculate_presence(consumer)
  }

  fn calculate_own_value(&self, consumer: ValueConsumer) -> Result<Value<T>, ProviderError> {
    let value = self.provider.calculate_value(consumer)?;
    Ok(value.with_side_effect(Some(self.side_effect.clone())))
  }

  fn producer(&self) -> Result<ValueProducer, ProviderError> {
    self.provider.producer()
  }

  fn calculate_execution_time_value(&self) -> Result<ExecutionTimeValue<T>, ProviderError> {
    Ok(
      self
        .provider
        .calculate_execution_time_value()?
        .with_side_effect(self.side_effect.clone()),
    )
  }

  fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.provider, f)
  }
}

pub struct NamedProvider<T: ValueType> {
  provider: GuardedProvider<T>,
  name: DisplayName,
}

impl<T: ValueType> NamedProvider<T> {
  pub(crate) fn create(provider: Provider<T>, name: DisplayName) -> Provider<T> {
    let provider: Arc<Self> = Arc::new_cyclic(|this: &Weak<Self>| Self {
      provider: GuardedProvider::new(EvaluationOwner::new(OwnerId::of_weak(this), name.0.clone()), provider),
      name,
    });
    Provider::from_arc(provider)
  }
}

impl<T: ValueType> ProviderInternal<T> for NamedProvider<T> {
  fn kind(&self) -> &'static str {
    "named"
  }

  fn value_type(&self) -> Option<TypeDescriptor> {
    self.provider.value_type()
  }

  fn calculate_presence(&self, consumer: ValueConsumer) -> Result<bool, ProviderError> {
    self.provider.calculate_presence(consumer)
  }

  // The handle pushes `name` onto a missing path, see `declared_display_name`.
  fn calculate_own_value(&self, consumer: ValueConsumer) -> Result<Value<T>, ProviderError> {
    self.provider.calculate_value(consumer)
  }

  fn producer(&self) -> Result<ValueProducer, ProviderError> {
    self.provider.producer()
  }

  fn calculate_execution_time_value(&self) -> Result<ExecutionTimeValue<T>, ProviderError> {
    Ok(match self.provider.calculate_execution_time_value()? {
      ExecutionTimeValue::Missing(mut paths) => {
        paths.insert(0, self.name.clone());
        ExecutionTimeValue::Missing(paths)
      }
      ExecutionTimeValue::Changing(provider) => ExecutionTimeValue::Changing(provider.named(self.name.clone())),
      fixed => fixed,
    })
  }

  fn declared_display_name(&self) -> Option<&DisplayName> {
    Some(&self.name)
  }

  fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.name, f)
  }
}
