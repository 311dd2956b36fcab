//! Constant leaves.

use std::fmt;

use super::{Provider, ProviderInternal};
use crate::consumer::ValueConsumer;
use crate::error::ProviderError;
use crate::execution::ExecutionTimeValue;
use crate::producer::ValueProducer;
use crate::value::{DisplayName, Value, ValueType};

/// A provider of a fixed value.
pub fn fixed<T: ValueType>(value: T) -> Provider<T> {
  Provider::new(FixedProvider { value })
}

/// A provider that never has a value.
pub fn not_defined<T: ValueType>() -> Provider<T> {
  missing_with(Vec::new())
}

/// A provider that is missing for the given reasons.
pub(crate) fn missing_with<T: ValueType>(paths: Vec<DisplayName>) -> Provider<T> {
  Provider::new(NotDefinedProvider { paths })
}

pub struct FixedProvider<T: ValueType> {
  value: T,
}

impl<T: ValueType> ProviderInternal<T> for FixedProvider<T> {
  fn kind(&self) -> &'static str {
    "fixed"
  }

  fn calculate_presence(&self, _consumer: ValueConsumer) -> Result<bool, ProviderError> {
    Ok(true)
  }

  fn calculate_own_value(&self, _consumer: ValueConsumer) -> Result<Value<T>, ProviderError> {
    Ok(Value::present(self.value.clone()))
  }

  fn producer(&self) -> Result<ValueProducer, ProviderError> {
    Ok(ValueProducer::NoProducer)
  }

  fn calculate_execution_time_value(&self) -> Result<ExecutionTimeValue<T>, ProviderError> {
    Ok(ExecutionTimeValue::fixed(self.value.clone()))
  }

  fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "fixed({:?})", self.value)
  }
}

pub struct NotDefinedProvider {
  paths: Vec<DisplayName>,
}

impl<T: ValueType> ProviderInternal<T> for NotDefinedProvider {
  fn kind(&self) -> &'static str {
    "undefined"
  }

  fn calculate_presence(&self, _consumer: ValueConsumer) -> Result<bool, ProviderError> {
    Ok(false)
  }

  fn calculate_own_value(&self, _consumer: ValueConsumer) -> Result<Value<T>, ProviderError> {
    Ok(Value::missing_with(self.paths.clone()))
  }

  fn producer(&self) -> Result<ValueProducer, ProviderError> {
    Ok(ValueProducer::NoProducer)
  }

  fn calculate_execution_time_value(&self) -> Result<ExecutionTimeValue<T>, ProviderError> {
    Ok(ExecutionTimeValue::missing_with(self.paths.clone()))
  }
}
