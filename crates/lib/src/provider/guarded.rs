use std::fmt;

use super::{Provider, TypeDescriptor};
use crate::consumer::ValueConsumer;
use crate::context::EvaluationOwner;
use crate::error::ProviderError;
use crate::execution::ExecutionTimeValue;
use crate::producer::ValueProducer;
use crate::value::{Value, ValueType};

/// A provider held by an owner. Every query opens an evaluation scope for the
/// owner before delegating, and the scope closes however the query returns.
pub struct GuardedProvider<T: ValueType> {
  owner: EvaluationOwner,
  provider: Provider<T>,
}

impl<T: ValueType> GuardedProvider<T> {
  pub fn new(owner: EvaluationOwner, provider: Provider<T>) -> Self {
    Self { owner, provider }
  }

  pub fn provider(&self) -> &Provider<T> {
    &self.provider
  }

  pub fn value_type(&self) -> Option<TypeDescriptor> {
    self.provider.value_type()
  }

  pub fn calculate_presence(&self, consumer: ValueConsumer) -> Result<bool, ProviderError> {
    let _scope = self.owner.begin_evaluation()?;
    self.provider.calculate_presence(consumer)
  }

  pub fn calculate_value(&self, consumer: ValueConsumer) -> Result<Value<T>, ProviderError> {
    let _scope = self.owner.begin_evaluation()?;
    self.provider.calculate_value(consumer)
  }

  pub fn producer(&self) -> Result<ValueProducer, ProviderError> {
    let _scope = self.owner.begin_evaluation()?;
    self.provider.producer()
  }

  pub fn calculate_execution_time_value(&self) -> Result<ExecutionTimeValue<T>, ProviderError> {
    let _scope = self.owner.begin_evaluation()?;
    self.provider.calculate_execution_time_value()
  }
}

impl<T: ValueType> fmt::Display for GuardedProvider<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.provider, f)
  }
}
