//! Uniform access to whatever a work node declares as an input or output.

use std::marker::PhantomData;

use crate::error::ProviderError;
use crate::producer::ValueProducer;
use crate::property::Property;
use crate::provider::Provider;
use crate::value::ValueType;

/// A value declared on a work node, read when the node's inputs are fingerprinted.
pub trait PropertyValue<T: ValueType>: Send + Sync {
  /// The current value, if any.
  fn call(&self) -> Result<Option<T>, ProviderError>;

  /// What produces the value. `NoProducer` when not supported.
  fn producer(&self) -> Result<ValueProducer, ProviderError>;

  /// Freeze the value if the implementation supports it.
  fn maybe_finalize_value(&self) -> Result<(), ProviderError>;
}

impl<T: ValueType> PropertyValue<T> for Provider<T> {
  fn call(&self) -> Result<Option<T>, ProviderError> {
    self.get_or_none()
  }

  fn producer(&self) -> Result<ValueProducer, ProviderError> {
    Provider::producer(self)
  }

  fn maybe_finalize_value(&self) -> Result<(), ProviderError> {
    Ok(())
  }
}

impl<T: ValueType> PropertyValue<T> for Property<T> {
  fn call(&self) -> Result<Option<T>, ProviderError> {
    self.get_or_none()
  }

  fn producer(&self) -> Result<ValueProducer, ProviderError> {
    self.as_provider().producer()
  }

  fn maybe_finalize_value(&self) -> Result<(), ProviderError> {
    self.finalize_value()
  }
}

/// A value that is never there.
pub struct AbsentPropertyValue<T>(PhantomData<fn() -> T>);

impl<T> Default for AbsentPropertyValue<T> {
  fn default() -> Self {
    Self(PhantomData)
  }
}

impl<T: ValueType> PropertyValue<T> for AbsentPropertyValue<T> {
  fn call(&self) -> Result<Option<T>, ProviderError> {
    Ok(None)
  }

  fn producer(&self) -> Result<ValueProducer, ProviderError> {
    Ok(ValueProducer::NoProducer)
  }

  fn maybe_finalize_value(&self) -> Result<(), ProviderError> {
    Ok(())
  }
}

pub fn absent<T: ValueType>() -> AbsentPropertyValue<T> {
  AbsentPropertyValue::default()
}
