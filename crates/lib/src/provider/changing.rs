//! Leaves whose value may differ between configuration and execution.

use std::sync::Arc;

use super::{Provider, ProviderInternal};
use crate::consumer::ValueConsumer;
use crate::error::{ProviderError, TransformError};
use crate::execution::ExecutionTimeValue;
use crate::producer::{ProducerRef, ValueProducer};
use crate::value::{Value, ValueType};

type Compute<T> = Arc<dyn Fn() -> Result<Option<T>, TransformError> + Send + Sync>;

/// A provider that calls `compute` on every evaluation.
///
/// Its execution-time value is always `Changing`: nothing guarantees the
/// callable returns the same thing later.
pub fn changing<T, F>(compute: F) -> Provider<T>
where
  T: ValueType,
  F: Fn() -> Result<Option<T>, TransformError> + Send + Sync + 'static,
{
  Provider::new(ChangingProvider {
    compute: Arc::new(compute),
    producer: None,
  })
}

/// A changing provider whose value is an output of the work node `producer`.
pub fn produced_by<T, F>(producer: impl Into<ProducerRef>, compute: F) -> Provider<T>
where
  T: ValueType,
  F: Fn() -> Result<Option<T>, TransformError> + Send + Sync + 'static,
{
  Provider::new(ChangingProvider {
    compute: Arc::new(compute),
    producer: Some(producer.into()),
  })
}

pub struct ChangingProvider<T: ValueType> {
  compute: Compute<T>,
  producer: Option<ProducerRef>,
}

impl<T: ValueType> ProviderInternal<T> for ChangingProvider<T> {
  fn kind(&self) -> &'static str {
    "changing"
  }

  /// Outputs of a work node are assumed present; anything else has to be computed.
  fn calculate_presence(&self, consumer: ValueConsumer) -> Result<bool, ProviderError> {
    if self.producer.is_some() {
      return Ok(true);
    }
    Ok(!self.calculate_own_value(consumer)?.is_missing())
  }

  fn calculate_own_value(&self, _consumer: ValueConsumer) -> Result<Value<T>, ProviderError> {
    let value = (self.compute)().map_err(|err| err.into_provider_error(|| self.label()))?;
    Ok(Value::of_option(value))
  }

  fn producer(&self) -> Result<ValueProducer, ProviderError> {
    Ok(match &self.producer {
      Some(producer) => ValueProducer::Producer(producer.clone()),
      None => ValueProducer::Unknown,
    })
  }

  fn calculate_execution_time_value(&self) -> Result<ExecutionTimeValue<T>, ProviderError> {
    Ok(ExecutionTimeValue::changing(Provider::new(ChangingProvider {
      compute: self.compute.clone(),
      producer: self.producer.clone(),
    })))
  }

  fn describe(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.label())
  }
}

impl<T: ValueType> ChangingProvider<T> {
  fn label(&self) -> String {
    match &self.producer {
      Some(producer) => format!("output of {}", producer),
      None => "changing".to_string(),
    }
  }
}
