use lazyconf_lib::{DisplayName, ExecutionTimeValue, ProviderError, ValueConsumer, changing, fixed, not_defined};
use proptest::prelude::*;

use super::common::{Recorder, counting, failing};

#[test]
fn present_left_never_evaluates_right() {
  let right = failing::<String>();
  let provider = fixed("a".to_string()).or_else(right.provider.clone());

  assert_eq!(provider.get().unwrap(), "a");
  assert!(provider.is_present().unwrap());
  assert_eq!(right.evaluations(), 0);
}

#[test]
fn right_side_effect_fires_only_on_fallback() {
  let recorder = Recorder::new();
  let provider = not_defined().or_else(fixed(2).with_side_effect(recorder.effect("right")));
  assert_eq!(provider.get().unwrap(), 2);
  assert_eq!(recorder.events(), vec!["right(2)"]);
}

#[test]
fn missing_both_sides_explains_both() {
  let provider = not_defined::<i32>()
    .named("sourceDir")
    .or_else(not_defined::<i32>().named("conventionDir"));

  match provider.get() {
    Err(ProviderError::MissingValue { paths }) => {
      assert_eq!(paths, vec![DisplayName::from("sourceDir"), DisplayName::from("conventionDir")]);
    }
    other => panic!("unexpected result: {:?}", other),
  }
}

#[test]
fn fixed_left_never_touches_right() {
  let right = counting(Some(2));
  let provider = fixed(1).or_else(right.provider.clone());

  match provider.calculate_execution_time_value().unwrap() {
    ExecutionTimeValue::Fixed { value, .. } => assert_eq!(value, 1),
    other => panic!("unexpected classification: {:?}", other),
  }
  assert_eq!(right.evaluations(), 0);
}

#[test]
fn changing_left_keeps_fallback_for_execution() {
  let provider = changing(|| Ok(None::<i32>)).or_else(fixed(7));
  let value = provider.calculate_execution_time_value().unwrap();
  let rebuilt = value.changing_value().expect("changing classification");
  assert_eq!(rebuilt.calculate_value(ValueConsumer::StrictEvaluation).unwrap().get().unwrap(), 7);
}

#[test]
fn missing_left_collapses_to_right() {
  let provider = not_defined().or_else(fixed(7)).or_else(fixed(8));
  assert_eq!(provider.calculate_execution_time_value().unwrap().fixed_value(), Some(&7));
}

proptest! {
  #[test]
  fn missing_paths_are_unioned(left in "[a-z]{1,8}", right in "[a-z]{1,8}") {
    let provider = not_defined::<u8>()
      .named(left.clone())
      .or_else(not_defined::<u8>().named(right.clone()));
    let value = provider.calculate_value(ValueConsumer::IgnoreUnsafeRead).unwrap();
    prop_assert!(value.is_missing());
    prop_assert_eq!(value.path_to_origin(), &[DisplayName(left), DisplayName(right)][..]);
  }
}
