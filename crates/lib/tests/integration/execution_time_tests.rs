use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use lazyconf_lib::{ExecutionTimeValue, Provider, ValueConsumer, changing, fixed, not_defined};
use proptest::prelude::*;

use super::common::Recorder;

#[derive(Debug, Clone)]
enum Step {
  Add(i64),
  Scale(i64),
  Bind(i64),
  Fallback(i64),
  FallbackFromMissing,
  Named(String),
}

fn step() -> impl Strategy<Value = Step> {
  prop_oneof![
    (-100i64..100).prop_map(Step::Add),
    (-5i64..5).prop_map(Step::Scale),
    (-100i64..100).prop_map(Step::Bind),
    (-100i64..100).prop_map(Step::Fallback),
    Just(Step::FallbackFromMissing),
    "[a-z]{1,6}".prop_map(Step::Named),
  ]
}

fn apply(provider: Provider<i64>, step: Step) -> Provider<i64> {
  match step {
    Step::Add(n) => provider.map(move |x| x.wrapping_add(n)),
    Step::Scale(n) => provider.map(move |x| x.wrapping_mul(n)),
    Step::Bind(n) => provider.flat_map(move |x| fixed(x.wrapping_sub(n))),
    Step::Fallback(n) => provider.or_else(fixed(n)),
    Step::FallbackFromMissing => not_defined().or_else(provider),
    Step::Named(name) => provider.named(name),
  }
}

proptest! {
  #[test]
  fn literal_chains_classify_as_fixed(seed in -1000i64..1000, steps in prop::collection::vec(step(), 0..12)) {
    let provider = steps.into_iter().fold(fixed(seed), apply);

    let classified = provider.calculate_execution_time_value().unwrap();
    let evaluated = provider.calculate_value(ValueConsumer::StrictEvaluation).unwrap().get().unwrap();
    prop_assert_eq!(classified.fixed_value(), Some(&evaluated));

    let again = provider.calculate_execution_time_value().unwrap();
    prop_assert_eq!(again.fixed_value(), Some(&evaluated));
  }
}

#[test]
fn anything_changing_stays_changing() {
  let base = changing(|| Ok(Some(1i64)));
  let chains = vec![
    base.map(|x| x + 1),
    base.named("version"),
    fixed(2).flat_map({
      let base = base.clone();
      move |_| base.clone()
    }),
    base.flat_map(fixed),
    base.flat_map(|x| fixed(x * 2)).map(|x| x + 1),
    not_defined().or_else(base.clone()),
  ];
  for chain in chains {
    assert!(chain.calculate_execution_time_value().unwrap().is_changing(), "{}", chain);
  }
}

#[test]
fn changing_upstream_is_recomputed_through_flat_map() {
  let counter = Arc::new(AtomicI64::new(0));
  let source = counter.clone();
  let provider = changing(move || Ok(Some(source.fetch_add(1, Ordering::SeqCst)))).flat_map(|x| fixed(x * 10));

  let classified = provider.calculate_execution_time_value().unwrap();
  assert!(classified.fixed_value().is_none());

  let late = classified.to_provider();
  assert_eq!(late.get().unwrap(), 0);
  assert_eq!(late.get().unwrap(), 10);
}

#[test]
fn fixed_classification_carries_side_effects_without_running_them() {
  let recorder = Recorder::new();
  let provider = fixed(3)
    .with_side_effect(recorder.effect("source"))
    .map(|x| x * 2)
    .named("doubled");

  let classified = provider.calculate_execution_time_value().unwrap();
  assert!(recorder.events().is_empty());

  match classified {
    ExecutionTimeValue::Fixed { value, side_effect } => {
      assert_eq!(value, 6);
      side_effect.expect("side effect kept").execute(&value);
    }
    other => panic!("unexpected classification: {:?}", other),
  }
  assert_eq!(recorder.events(), vec!["source(3)"]);
}

#[test]
fn changing_branch_becomes_provider_for_execution() {
  let provider = changing(|| Ok(Some("late".to_string()))).map(|s| s.len());
  let classified = provider.calculate_execution_time_value().unwrap();
  assert_eq!(classified.to_provider().get().unwrap(), 4);
  assert!(classified.to_value().is_none());
}
