//! Lazy providers.
//!
//! A provider describes a value that has not been computed yet. Every provider
//! implements [`ProviderInternal`], answering four questions without caching:
//!
//! - is a value present ([`ProviderInternal::calculate_presence`])
//! - what is the value ([`ProviderInternal::calculate_own_value`])
//! - what would produce it ([`ProviderInternal::producer`])
//! - can it be frozen ahead of execution ([`ProviderInternal::calculate_execution_time_value`])
//!
//! [`Provider`] is the shared handle users compose with `map`, `flat_map`,
//! `or_else` and friends. Combinators hold their inputs as [`GuardedProvider`]s
//! so that every query they forward runs inside an evaluation scope and a
//! provider reached again from its own evaluation fails fast.
//!
//! # Submodules
//!
//! - [`fixed`] - constant and undefined leaves
//! - [`changing`] - leaves recomputed on every evaluation
//! - [`flat_map`] - monadic bind
//! - [`or_else`] - first-present fallback
//! - [`map`] - payload transforms
//! - [`decorate`] - side effect and display name wrappers

pub mod changing;
pub mod decorate;
pub mod fixed;
pub mod flat_map;
mod guarded;
pub mod map;
pub mod or_else;

use std::any::{TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

pub use changing::{changing, produced_by};
pub use fixed::{fixed, not_defined};
pub use guarded::GuardedProvider;

use crate::consumer::ValueConsumer;
use crate::context::{EvaluationContext, EvaluationOwner, OwnerId};
use crate::error::{ProviderError, TransformError};
use crate::execution::ExecutionTimeValue;
use crate::producer::ValueProducer;
use crate::value::{DisplayName, SideEffect, Value, ValueType};

/// Static type hint for a provider's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
  id: TypeId,
  name: &'static str,
}

impl TypeDescriptor {
  pub fn of<T: 'static>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: type_name::<T>(),
    }
  }

  pub fn id(&self) -> TypeId {
    self.id
  }

  pub fn name(&self) -> &'static str {
    self.name
  }
}

/// The evaluation contract every provider implements.
pub trait ProviderInternal<T: ValueType>: Send + Sync {
  /// Short name used in scope labels and as the reentrant display form.
  fn kind(&self) -> &'static str;

  /// Best-effort static type of the value.
  fn value_type(&self) -> Option<TypeDescriptor> {
    Some(TypeDescriptor::of::<T>())
  }

  /// Whether a value is present. Never runs side effects or finalizes anything,
  /// whatever `consumer` asks for.
  fn calculate_presence(&self, _consumer: ValueConsumer) -> Result<bool, ProviderError> {
    Ok(!self.calculate_own_value(ValueConsumer::IgnoreUnsafeRead)?.is_missing())
  }

  /// Compute the value.
  fn calculate_own_value(&self, consumer: ValueConsumer) -> Result<Value<T>, ProviderError>;

  /// Describe what produces the value, without computing it where avoidable.
  fn producer(&self) -> Result<ValueProducer, ProviderError>;

  /// Classify the value as fixed, changing or missing ahead of execution.
  fn calculate_execution_time_value(&self) -> Result<ExecutionTimeValue<T>, ProviderError>;

  /// Name pushed onto the diagnostic path when this provider's value is missing.
  fn declared_display_name(&self) -> Option<&DisplayName> {
    None
  }

  /// Textual form, rendered with reentrance protection by `Display`.
  fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.kind())
  }
}

/// Shared handle to a provider.
pub struct Provider<T: ValueType>(Arc<dyn ProviderInternal<T>>);

impl<T: ValueType> Clone for Provider<T> {
  fn clone(&self) -> Self {
    Self(self.0.clone())
  }
}

impl<T: ValueType> Provider<T> {
  pub fn new(provider: impl ProviderInternal<T> + 'static) -> Self {
    Self(Arc::new(provider))
  }

  pub(crate) fn from_arc(provider: Arc<dyn ProviderInternal<T>>) -> Self {
    Self(provider)
  }

  pub fn internal(&self) -> &dyn ProviderInternal<T> {
    self.0.as_ref()
  }

  /// Returns true if both handles point at the same provider.
  pub fn ptr_eq(&self, other: &Provider<T>) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }

  pub(crate) fn owner(&self) -> EvaluationOwner {
    EvaluationOwner::new(OwnerId::of(self.0.as_ref()), self.0.kind())
  }

  pub fn value_type(&self) -> Option<TypeDescriptor> {
    self.0.value_type()
  }

  pub fn calculate_presence(&self, consumer: ValueConsumer) -> Result<bool, ProviderError> {
    self.0.calculate_presence(consumer)
  }

  /// The provider's own value with its declared display name pushed onto a missing path.
  pub fn calculate_value(&self, consumer: ValueConsumer) -> Result<Value<T>, ProviderError> {
    let value = self.0.calculate_own_value(consumer)?;
    Ok(value.push_when_missing(self.0.declared_display_name()))
  }

  pub fn producer(&self) -> Result<ValueProducer, ProviderError> {
    self.0.producer()
  }

  pub fn calculate_execution_time_value(&self) -> Result<ExecutionTimeValue<T>, ProviderError> {
    let value = self.0.calculate_execution_time_value()?;
    debug!(
      provider = self.0.kind(),
      fixed = value.has_fixed_value(),
      changing = value.is_changing(),
      "classified execution-time value"
    );
    Ok(value)
  }

  /// Evaluate strictly and unpack, running side effects.
  pub fn get(&self) -> Result<T, ProviderError> {
    self.calculate_value(ValueConsumer::StrictEvaluation)?.get()
  }

  /// Evaluate strictly and unpack if present, running side effects.
  pub fn get_or_none(&self) -> Result<Option<T>, ProviderError> {
    Ok(self.calculate_value(ValueConsumer::StrictEvaluation)?.or_none())
  }

  /// Speculative presence check.
  pub fn is_present(&self) -> Result<bool, ProviderError> {
    self.calculate_presence(ValueConsumer::IgnoreUnsafeRead)
  }

  pub fn map<S, F>(&self, transform: F) -> Provider<S>
  where
    S: ValueType,
    F: Fn(T) -> S + Send + Sync + 'static,
  {
    self.try_map(move |value| Ok(Some(transform(value))))
  }

  /// Map with a transform that may fail or produce no value.
  pub fn try_map<S, F>(&self, transform: F) -> Provider<S>
  where
    S: ValueType,
    F: Fn(T) -> Result<Option<S>, TransformError> + Send + Sync + 'static,
  {
    map::MapProvider::create(self.clone(), Arc::new(transform))
  }

  pub fn flat_map<S, F>(&self, transform: F) -> Provider<S>
  where
    S: ValueType,
    F: Fn(T) -> Provider<S> + Send + Sync + 'static,
  {
    self.try_flat_map(move |value| Ok(Some(transform(value))))
  }

  /// Flat map with a transform that may fail or leave the result undefined.
  pub fn try_flat_map<S, F>(&self, transform: F) -> Provider<S>
  where
    S: ValueType,
    F: Fn(T) -> Result<Option<Provider<S>>, TransformError> + Send + Sync + 'static,
  {
    flat_map::FlatMapProvider::create(self.clone(), Arc::new(transform))
  }

  /// This provider's value if present, otherwise `fallback`'s.
  pub fn or_else(&self, fallback: Provider<T>) -> Provider<T> {
    or_else::OrElseProvider::create(self.clone(), fallback)
  }

  pub fn or_else_value(&self, fallback: T) -> Provider<T> {
    self.or_else(fixed(fallback))
  }

  /// Attach `side_effect` to every value this provider produces.
  pub fn with_side_effect(&self, side_effect: SideEffect<T>) -> Provider<T> {
    decorate::WithSideEffectProvider::create(self.clone(), side_effect)
  }

  pub(crate) fn with_side_effect_opt(&self, side_effect: Option<SideEffect<T>>) -> Provider<T> {
    match side_effect {
      Some(side_effect) => self.with_side_effect(side_effect),
      None => self.clone(),
    }
  }

  /// Name this provider in missing-value diagnostics.
  pub fn named(&self, name: impl Into<DisplayName>) -> Provider<T> {
    decorate::NamedProvider::create(self.clone(), name.into())
  }
}

/// Render `provider` as seen from `owner`, falling back to the owner's label on reentrance.
pub(crate) fn render<T: ValueType>(owner: &EvaluationOwner, provider: &dyn ProviderInternal<T>) -> String {
  struct Describe<'a, T: ValueType>(&'a dyn ProviderInternal<T>);

  impl<T: ValueType> fmt::Display for Describe<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      self.0.describe(f)
    }
  }

  EvaluationContext::try_run(owner, || owner.label().to_string(), || Describe(provider).to_string())
}

impl<T: ValueType> fmt::Display for Provider<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&render(&self.owner(), self.0.as_ref()))
  }
}

impl<T: ValueType> fmt::Debug for Provider<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Provider({})", self)
  }
}
