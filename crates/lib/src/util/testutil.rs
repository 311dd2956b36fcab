//! Test helpers for lazyconf-lib.
//!
//! [`EffectLog`] records side effect executions in order, and [`SpyProvider`]
//! is a leaf provider that counts how often each query reaches it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::consumer::ValueConsumer;
use crate::error::ProviderError;
use crate::execution::ExecutionTimeValue;
use crate::producer::ValueProducer;
use crate::provider::{Provider, ProviderInternal};
use crate::value::{SideEffect, Value, ValueType};

/// Ordered record of side effect executions, shared between clones.
#[derive(Clone, Default)]
pub struct EffectLog {
  entries: Arc<Mutex<Vec<String>>>,
}

impl EffectLog {
  pub fn new() -> Self {
    Self::default()
  }

  /// A side effect that records `label:<value>`.
  pub fn effect<T: ValueType>(&self, label: &str) -> SideEffect<T> {
    let entries = self.entries.clone();
    let label = label.to_string();
    SideEffect::new(move |value: &T| entries.lock().push(format!("{}:{:?}", label, value)))
  }

  pub fn entries(&self) -> Vec<String> {
    self.entries.lock().clone()
  }
}

#[derive(Default)]
struct Calls {
  presence: AtomicUsize,
  value: AtomicUsize,
  producer: AtomicUsize,
  execution_time: AtomicUsize,
  consumers: Mutex<Vec<ValueConsumer>>,
}

enum Behavior<T> {
  Present(T),
  Missing,
  Failing(String),
}

struct SpyInternal<T: ValueType> {
  behavior: Behavior<T>,
  calls: Arc<Calls>,
}

impl<T: ValueType> SpyInternal<T> {
  fn outcome(&self) -> Result<Option<T>, ProviderError> {
    match &self.behavior {
      Behavior::Present(value) => Ok(Some(value.clone())),
      Behavior::Missing => Ok(None),
      Behavior::Failing(message) => Err(ProviderError::Transform {
        provider: "spy".to_string(),
        message: message.clone(),
      }),
    }
  }
}

impl<T: ValueType> ProviderInternal<T> for SpyInternal<T> {
  fn kind(&self) -> &'static str {
    "spy"
  }

  fn calculate_presence(&self, _consumer: ValueConsumer) -> Result<bool, ProviderError> {
    self.calls.presence.fetch_add(1, Ordering::SeqCst);
    Ok(self.outcome()?.is_some())
  }

  fn calculate_own_value(&self, consumer: ValueConsumer) -> Result<Value<T>, ProviderError> {
    self.calls.value.fetch_add(1, Ordering::SeqCst);
    self.calls.consumers.lock().push(consumer);
    Ok(Value::of_option(self.outcome()?))
  }

  fn producer(&self) -> Result<ValueProducer, ProviderError> {
    self.calls.producer.fetch_add(1, Ordering::SeqCst);
    Ok(ValueProducer::NoProducer)
  }

  fn calculate_execution_time_value(&self) -> Result<ExecutionTimeValue<T>, ProviderError> {
    self.calls.execution_time.fetch_add(1, Ordering::SeqCst);
    Ok(match self.outcome()? {
      Some(value) => ExecutionTimeValue::fixed(value),
      None => ExecutionTimeValue::missing(),
    })
  }
}

/// A leaf provider that counts the queries reaching it.
pub struct SpyProvider<T: ValueType> {
  provider: Provider<T>,
  calls: Arc<Calls>,
}

impl<T: ValueType> SpyProvider<T> {
  fn with_behavior(behavior: Behavior<T>) -> Self {
    let calls = Arc::new(Calls::default());
    let provider = Provider::new(SpyInternal {
      behavior,
      calls: calls.clone(),
    });
    Self { provider, calls }
  }

  pub fn present(value: T) -> Self {
    Self::with_behavior(Behavior::Present(value))
  }

  pub fn missing() -> Self {
    Self::with_behavior(Behavior::Missing)
  }

  /// Every query except `producer` fails with `message`.
  pub fn failing(message: &str) -> Self {
    Self::with_behavior(Behavior::Failing(message.to_string()))
  }

  pub fn provider(&self) -> Provider<T> {
    self.provider.clone()
  }

  pub fn presence_calls(&self) -> usize {
    self.calls.presence.load(Ordering::SeqCst)
  }

  pub fn value_calls(&self) -> usize {
    self.calls.value.load(Ordering::SeqCst)
  }

  pub fn producer_calls(&self) -> usize {
    self.calls.producer.load(Ordering::SeqCst)
  }

  pub fn execution_time_calls(&self) -> usize {
    self.calls.execution_time.load(Ordering::SeqCst)
  }

  /// Consumers passed to value evaluation, in call order.
  pub fn consumers(&self) -> Vec<ValueConsumer> {
    self.calls.consumers.lock().clone()
  }
}
