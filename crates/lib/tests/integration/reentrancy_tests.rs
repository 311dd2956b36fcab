use std::sync::Arc;

use lazyconf_lib::context::EvaluationContext;
use lazyconf_lib::{Property, Provider, ProviderError, fixed};
use parking_lot::Mutex;

fn self_referencing() -> Provider<i32> {
  let slot: Arc<Mutex<Option<Provider<i32>>>> = Arc::new(Mutex::new(None));
  let inner = slot.clone();
  let provider = fixed(1).try_flat_map(move |x| {
    let this = inner.lock().clone();
    match this {
      Some(this) => Ok(Some(fixed(x + this.get()?))),
      None => Ok(Some(fixed(x))),
    }
  });
  *slot.lock() = Some(provider.clone());
  provider
}

#[test]
fn self_reference_through_transform_is_detected() {
  let provider = self_referencing();
  match provider.get() {
    Err(ProviderError::CircularEvaluation { cycle }) => {
      assert_eq!(cycle.first(), cycle.last());
      assert!(cycle.len() >= 2);
    }
    other => panic!("unexpected result: {:?}", other),
  }
  assert_eq!(EvaluationContext::depth(), 0);
}

#[test]
fn every_query_detects_the_cycle() {
  let provider = self_referencing();
  assert!(provider.is_present().unwrap_err().is_circular());
  assert!(provider.producer().unwrap_err().is_circular());
  assert!(provider.calculate_execution_time_value().unwrap_err().is_circular());
  assert_eq!(EvaluationContext::depth(), 0);
}

#[test]
fn display_of_cyclic_graph_terminates() {
  let provider = self_referencing();
  assert_eq!(provider.to_string(), "flatmap(fixed(1))");
}

#[test]
fn mutually_dependent_properties_are_detected() {
  let a = Property::<i32>::named("a");
  let b = Property::<i32>::named("b");
  a.set_provider(b.as_provider().map(|x| x + 1)).unwrap();
  b.set_provider(a.as_provider().map(|x| x * 2)).unwrap();

  match a.get() {
    Err(ProviderError::CircularEvaluation { cycle }) => {
      assert_eq!(cycle.first().map(String::as_str), Some("a"));
      assert_eq!(cycle.last().map(String::as_str), Some("a"));
      assert!(cycle.iter().any(|label| label == "b"));
    }
    other => panic!("unexpected result: {:?}", other),
  }
}

#[test]
fn shared_provider_is_not_a_cycle() {
  let shared = fixed(2).map(|x| x * 10);
  let provider = shared.flat_map({
    let shared = shared.clone();
    move |x| shared.map(move |y| x + y)
  });
  assert_eq!(provider.get().unwrap(), 40);
}
