//! Settable, finalizable provider leaves.
//!
//! A [`Property`] holds an explicitly set provider and a convention used when
//! nothing was set. It can be frozen with [`Property::finalize_value`], after
//! which its value is computed once and kept, or locked with
//! [`Property::disallow_changes`], after which the provider it holds stays but
//! can no longer be replaced.
//!
//! The state lock is only held to read or swap the held providers. Evaluating
//! them happens outside the lock, inside an evaluation scope for the property,
//! so a property whose value depends on itself fails with a cycle rather than
//! a deadlock.

mod value;

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

pub use value::{AbsentPropertyValue, PropertyValue, absent};

use crate::consumer::ValueConsumer;
use crate::context::{EvaluationOwner, OwnerId};
use crate::error::ProviderError;
use crate::execution::ExecutionTimeValue;
use crate::producer::{ProducerRef, ValueProducer};
use crate::provider::{GuardedProvider, Provider, ProviderInternal, fixed, not_defined, render};
use crate::value::{DisplayName, Value, ValueType};

struct PropertyState<T: ValueType> {
  value: Option<Provider<T>>,
  convention: Option<Provider<T>>,
  producer: Option<ProducerRef>,
  /// What produced the value that was frozen.
  frozen_producer: Option<ValueProducer>,
  finalized: bool,
  finalize_on_read: bool,
  changes_disallowed: bool,
}

impl<T: ValueType> PropertyState<T> {
  fn effective(&self) -> Option<Provider<T>> {
    self.value.clone().or_else(|| self.convention.clone())
  }
}

struct PropertyInner<T: ValueType> {
  owner: EvaluationOwner,
  name: Option<DisplayName>,
  state: Mutex<PropertyState<T>>,
}

/// A settable provider.
///
/// Clones share state. [`Property::as_provider`] returns a provider view that
/// follows later changes.
pub struct Property<T: ValueType> {
  inner: Arc<PropertyInner<T>>,
}

impl<T: ValueType> Clone for Property<T> {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
    }
  }
}

impl<T: ValueType> Default for Property<T> {
  fn default() -> Self {
    Self::create(None)
  }
}

impl<T: ValueType> Property<T> {
  pub fn new() -> Self {
    Self::create(None)
  }

  /// A property reported as `name` in diagnostics.
  pub fn named(name: impl Into<DisplayName>) -> Self {
    Self::create(Some(name.into()))
  }

  fn create(name: Option<DisplayName>) -> Self {
    let inner = Arc::new_cyclic(|this: &Weak<PropertyInner<T>>| {
      let label = name.as_ref().map_or_else(|| "property".to_string(), |name| name.0.clone());
      PropertyInner {
        owner: EvaluationOwner::new(OwnerId::of_weak(this), label),
        name,
        state: Mutex::new(PropertyState {
          value: None,
          convention: None,
          producer: None,
          frozen_producer: None,
          finalized: false,
          finalize_on_read: false,
          changes_disallowed: false,
        }),
      }
    });
    Self { inner }
  }

  /// Set a fixed value.
  pub fn set(&self, value: T) -> Result<(), ProviderError> {
    self.set_provider(fixed(value))
  }

  /// Set the provider this property reads from.
  ///
  /// # Errors
  ///
  /// - `PropertyFinalized` after the value was finalized
  /// - `ChangesDisallowed` after [`Property::disallow_changes`]
  pub fn set_provider(&self, provider: Provider<T>) -> Result<(), ProviderError> {
    let mut state = self.inner.state.lock();
    self.inner.assert_can_change(&state)?;
    state.value = Some(provider);
    Ok(())
  }

  /// Clear the explicitly set value, falling back to the convention.
  pub fn unset(&self) -> Result<(), ProviderError> {
    let mut state = self.inner.state.lock();
    self.inner.assert_can_change(&state)?;
    state.value = None;
    Ok(())
  }

  /// Set the provider used while no value is set.
  pub fn convention(&self, provider: Provider<T>) -> Result<(), ProviderError> {
    let mut state = self.inner.state.lock();
    self.inner.assert_can_change(&state)?;
    state.convention = Some(provider);
    Ok(())
  }

  /// Compute the value now and keep it from here on.
  ///
  /// A missing value is kept as missing with its diagnostic path. Calling this
  /// again is a no-op.
  pub fn finalize_value(&self) -> Result<(), ProviderError> {
    self.inner.finalize()
  }

  /// Finalize on the first strict read instead of now.
  pub fn finalize_value_on_read(&self) {
    self.inner.state.lock().finalize_on_read = true;
  }

  /// Keep the current provider but reject any further change.
  pub fn disallow_changes(&self) {
    self.inner.state.lock().changes_disallowed = true;
  }

  /// Record `producer` as the work node that produces this property's value.
  pub fn attach_producer(&self, producer: impl Into<ProducerRef>) {
    self.inner.state.lock().producer = Some(producer.into());
  }

  pub fn is_finalized(&self) -> bool {
    self.inner.state.lock().finalized
  }

  pub fn name(&self) -> Option<&DisplayName> {
    self.inner.name.as_ref()
  }

  /// A provider view of this property.
  pub fn as_provider(&self) -> Provider<T> {
    Provider::from_arc(self.inner.clone())
  }

  pub fn get(&self) -> Result<T, ProviderError> {
    self.as_provider().get()
  }

  pub fn get_or_none(&self) -> Result<Option<T>, ProviderError> {
    self.as_provider().get_or_none()
  }

  pub fn is_present(&self) -> Result<bool, ProviderError> {
    self.as_provider().is_present()
  }
}

impl<T: ValueType> PropertyInner<T> {
  fn label(&self) -> String {
    self.owner.label().to_string()
  }

  fn assert_can_change(&self, state: &PropertyState<T>) -> Result<(), ProviderError> {
    if state.finalized {
      return Err(ProviderError::PropertyFinalized { property: self.label() });
    }
    if state.changes_disallowed {
      return Err(ProviderError::ChangesDisallowed { property: self.label() });
    }
    Ok(())
  }

  fn guard(&self, provider: Provider<T>) -> GuardedProvider<T> {
    GuardedProvider::new(self.owner.clone(), provider)
  }

  fn snapshot(&self) -> Option<GuardedProvider<T>> {
    let provider = self.state.lock().effective();
    provider.map(|provider| self.guard(provider))
  }

  fn finalize(&self) -> Result<(), ProviderError> {
    let provider = {
      let state = self.state.lock();
      if state.finalized {
        return Ok(());
      }
      state.effective()
    };

    let (frozen, producer) = match provider {
      Some(provider) => {
        let provider = self.guard(provider);
        let producer = provider.producer()?;
        let value = provider.calculate_value(ValueConsumer::StrictEvaluation)?;
        (ExecutionTimeValue::from_value(value).to_provider(), producer)
      }
      None => (not_defined(), ValueProducer::NoProducer),
    };

    let mut state = self.state.lock();
    // another thread may have won the race
    if !state.finalized {
      state.value = Some(frozen);
      state.convention = None;
      state.frozen_producer = Some(producer);
      state.finalized = true;
      debug!(property = %self.owner.label(), "finalized property value");
    }
    Ok(())
  }

  fn should_finalize_on_read(&self, consumer: ValueConsumer) -> bool {
    if !consumer.is_strict() {
      return false;
    }
    let state = self.state.lock();
    state.finalize_on_read && !state.finalized
  }
}

impl<T: ValueType> ProviderInternal<T> for PropertyInner<T> {
  fn kind(&self) -> &'static str {
    "property"
  }

  fn calculate_presence(&self, consumer: ValueConsumer) -> Result<bool, ProviderError> {
    match self.snapshot() {
      Some(provider) => provider.calculate_presence(consumer),
      None => Ok(false),
    }
  }

  fn calculate_own_value(&self, consumer: ValueConsumer) -> Result<Value<T>, ProviderError> {
    if self.should_finalize_on_read(consumer) {
      self.finalize()?;
    }
    match self.snapshot() {
      Some(provider) => provider.calculate_value(consumer),
      None => Ok(Value::missing()),
    }
  }

  fn producer(&self) -> Result<ValueProducer, ProviderError> {
    let (attached, frozen) = {
      let state = self.state.lock();
      (state.producer.clone(), state.frozen_producer.clone())
    };
    let attached = match attached {
      Some(producer) => ValueProducer::Producer(producer),
      None => ValueProducer::NoProducer,
    };
    let from_value = match (frozen, self.snapshot()) {
      (Some(frozen), _) => frozen,
      (None, Some(provider)) => provider.producer()?,
      (None, None) => ValueProducer::NoProducer,
    };
    Ok(attached.plus(from_value))
  }

  fn calculate_execution_time_value(&self) -> Result<ExecutionTimeValue<T>, ProviderError> {
    match self.snapshot() {
      Some(provider) => provider.calculate_execution_time_value(),
      None => Ok(ExecutionTimeValue::missing()),
    }
  }

  fn declared_display_name(&self) -> Option<&DisplayName> {
    self.name.as_ref()
  }

  fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(name) = &self.name {
      return fmt::Display::fmt(name, f);
    }
    match self.snapshot() {
      Some(provider) => write!(f, "property({})", provider),
      None => f.write_str("property(undefined)"),
    }
  }
}

impl<T: ValueType> fmt::Display for Property<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&render::<T>(&self.inner.owner, self.inner.as_ref()))
  }
}

impl<T: ValueType> fmt::Debug for Property<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Property({})", self)
  }
}
