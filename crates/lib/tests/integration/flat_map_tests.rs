use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lazyconf_lib::{Provider, ProviderError, TransformError, fixed, not_defined, produced_by};

use super::common::Recorder;

#[test]
fn missing_upstream_never_invokes_transform() {
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = calls.clone();
  let provider = not_defined::<i32>().flat_map(move |x| {
    counter.fetch_add(1, Ordering::SeqCst);
    fixed(x)
  });

  assert!(provider.get_or_none().unwrap().is_none());
  assert!(!provider.is_present().unwrap());
  assert!(provider.calculate_execution_time_value().unwrap().is_missing());
  assert!(provider.producer().is_ok());
  assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn doubles_and_runs_upstream_effect_last() {
  let recorder = Recorder::new();
  let inner = recorder.clone();
  let provider = fixed(5)
    .with_side_effect(recorder.effect("upstream"))
    .flat_map(move |x| fixed(x * 2).with_side_effect(inner.effect("inner")));

  assert_eq!(provider.get().unwrap(), 10);
  assert_eq!(recorder.events(), vec!["inner(10)", "upstream(5)"]);
}

#[test]
fn each_read_runs_effects_again() {
  let recorder = Recorder::new();
  let provider = fixed(5).with_side_effect(recorder.effect("upstream")).flat_map(|x| fixed(x * 2));
  provider.get().unwrap();
  provider.get().unwrap();
  assert_eq!(recorder.events(), vec!["upstream(5)", "upstream(5)"]);
}

#[test]
fn transform_errors_are_not_missing_values() {
  let provider: Provider<i32> =
    fixed("x").try_flat_map(|s| Err(TransformError::failed(format!("cannot parse {s}"))));
  match provider.get_or_none() {
    Err(ProviderError::Transform { message, .. }) => assert_eq!(message, "cannot parse x"),
    other => panic!("unexpected result: {:?}", other),
  }
}

#[test]
fn producer_follows_selected_branch() {
  let provider = fixed(true).flat_map(|release| {
    if release {
      produced_by("releaseJar", || Ok(Some("release.jar".to_string())))
    } else {
      produced_by("debugJar", || Ok(Some("debug.jar".to_string())))
    }
  });
  let producers: Vec<String> = provider.producer().unwrap().producers().into_iter().map(|p| p.0).collect();
  assert_eq!(producers, vec!["releaseJar"]);
  assert!(provider.value_type().is_none());
}
