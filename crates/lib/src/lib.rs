//! lazyconf-lib: lazy provider evaluation
//!
//! This crate provides the engine behind deferred configuration values:
//! - `Provider`: a lazily computed value, composed with `map`, `flat_map` and `or_else`
//! - `Value`: the result of one evaluation, present or missing, with an optional side effect
//! - `ExecutionTimeValue`: whether a value can be frozen ahead of execution
//! - `ValueProducer`: which work nodes produce a value
//! - `Property`: a settable, finalizable provider
//!
//! Evaluation is synchronous and nothing is cached. A provider that is reached
//! again from its own evaluation fails with `ProviderError::CircularEvaluation`.

pub mod config;
pub mod consts;
pub mod consumer;
pub mod context;
pub mod error;
pub mod execution;
pub mod producer;
pub mod property;
pub mod provider;
pub mod util;
pub mod value;

pub use consumer::ValueConsumer;
pub use error::{ProviderError, TransformError};
pub use execution::ExecutionTimeValue;
pub use producer::{ProducerRef, ValueProducer};
pub use property::{Property, PropertyValue};
pub use provider::{Provider, ProviderInternal, changing, fixed, not_defined, produced_by};
pub use value::{DisplayName, SideEffect, Value, ValueType};
