//! Structural descriptions of what produces a provider's value.
//!
//! A build-graph inferencer asks a provider for its [`ValueProducer`] to learn
//! which work nodes must run before the value can be read, without computing
//! the value itself.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a unit of work (for example a task) that produces a value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProducerRef(pub String);

impl fmt::Display for ProducerRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<&str> for ProducerRef {
  fn from(name: &str) -> Self {
    ProducerRef(name.to_string())
  }
}

impl From<String> for ProducerRef {
  fn from(name: String) -> Self {
    ProducerRef(name)
  }
}

/// What would produce a provider's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ValueProducer {
  /// The value needs no work to be produced.
  #[default]
  NoProducer,
  /// The value may be produced by work that cannot be described.
  Unknown,
  /// The value is produced by the given work node.
  Producer(ProducerRef),
  /// The value may be produced by any of these.
  Union(Vec<ValueProducer>),
}

impl ValueProducer {
  pub fn producer(producer: impl Into<ProducerRef>) -> Self {
    ValueProducer::Producer(producer.into())
  }

  /// Combine two producers, dropping empty sides and flattening unions.
  pub fn plus(self, other: ValueProducer) -> Self {
    match (self, other) {
      (ValueProducer::NoProducer, other) => other,
      (this, ValueProducer::NoProducer) => this,
      (ValueProducer::Union(mut left), ValueProducer::Union(right)) => {
        left.extend(right);
        ValueProducer::Union(left)
      }
      (ValueProducer::Union(mut left), right) => {
        left.push(right);
        ValueProducer::Union(left)
      }
      (left, ValueProducer::Union(mut right)) => {
        right.insert(0, left);
        ValueProducer::Union(right)
      }
      (left, right) => ValueProducer::Union(vec![left, right]),
    }
  }

  /// Returns true if at least one concrete producer is known.
  pub fn is_known(&self) -> bool {
    match self {
      ValueProducer::NoProducer | ValueProducer::Unknown => false,
      ValueProducer::Producer(_) => true,
      ValueProducer::Union(parts) => parts.iter().any(ValueProducer::is_known),
    }
  }

  /// Visit every concrete producer in declaration order.
  pub fn visit_producers(&self, visitor: &mut impl FnMut(&ProducerRef)) {
    match self {
      ValueProducer::NoProducer | ValueProducer::Unknown => {}
      ValueProducer::Producer(producer) => visitor(producer),
      ValueProducer::Union(parts) => {
        for part in parts {
          part.visit_producers(visitor);
        }
      }
    }
  }

  /// The distinct concrete producers.
  pub fn producers(&self) -> BTreeSet<ProducerRef> {
    let mut producers = BTreeSet::new();
    self.visit_producers(&mut |producer| {
      producers.insert(producer.clone());
    });
    producers
  }
}
