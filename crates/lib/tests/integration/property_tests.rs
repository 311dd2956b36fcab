use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lazyconf_lib::property::absent;
use lazyconf_lib::{Property, PropertyValue, ProviderError, ValueProducer, changing, fixed, produced_by};

#[test]
fn convention_then_value_then_finalize() {
  let output_dir = Property::named("outputDir");
  let build_dir = Property::named("buildDir");
  build_dir.set("build".to_string()).unwrap();
  output_dir
    .convention(build_dir.as_provider().map(|dir| format!("{dir}/out")))
    .unwrap();

  assert_eq!(output_dir.get().unwrap(), "build/out");
  build_dir.set("target".to_string()).unwrap();
  assert_eq!(output_dir.get().unwrap(), "target/out");

  output_dir.finalize_value().unwrap();
  build_dir.set("elsewhere".to_string()).unwrap();
  assert_eq!(output_dir.get().unwrap(), "target/out");
  assert!(matches!(
    output_dir.set("x".to_string()),
    Err(ProviderError::PropertyFinalized { .. })
  ));
}

#[test]
fn missing_property_explains_its_chain() {
  let output_dir = Property::<String>::named("outputDir");
  let build_dir = Property::<String>::named("buildDir");
  output_dir.set_provider(build_dir.as_provider().map(|dir| dir + "/out")).unwrap();

  let err = output_dir.get().unwrap_err();
  assert_eq!(
    err.to_string(),
    "cannot query the value of outputDir (derived from buildDir) because it has no value available"
  );
}

#[test]
fn finalize_on_read_freezes_first_strict_read() {
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = calls.clone();
  let property = Property::new();
  property
    .set_provider(changing(move || Ok(Some(counter.fetch_add(1, Ordering::SeqCst)))))
    .unwrap();
  property.finalize_value_on_read();

  let first = property.get().unwrap();
  assert_eq!(property.get().unwrap(), first);
  assert!(property.is_finalized());
  assert!(property.as_provider().calculate_execution_time_value().unwrap().has_fixed_value());
}

#[test]
fn property_values_expose_dependencies() {
  let archive = Property::named("archive");
  archive.set_provider(produced_by("zip", || Ok(Some("out.zip".to_string())))).unwrap();

  let values: Vec<Box<dyn PropertyValue<String>>> = vec![
    Box::new(archive.clone()) as Box<dyn PropertyValue<String>>,
    Box::new(fixed("release".to_string())),
    Box::new(absent::<String>()),
  ];

  let before: Vec<ValueProducer> = values.iter().map(|value| value.producer().unwrap()).collect();
  for value in &values {
    value.maybe_finalize_value().unwrap();
  }
  assert!(archive.is_finalized());
  let after: Vec<ValueProducer> = values.iter().map(|value| value.producer().unwrap()).collect();

  let expected = vec![ValueProducer::producer("zip"), ValueProducer::NoProducer, ValueProducer::NoProducer];
  assert_eq!(before, expected);
  assert_eq!(after, expected);
  assert_eq!(values[0].call().unwrap(), Some("out.zip".to_string()));
  assert_eq!(values[2].call().unwrap(), None);
}

#[test]
fn attached_producer_survives_finalization() {
  let archive = Property::<String>::named("archive");
  archive.attach_producer("zip");
  archive.set("out.zip".to_string()).unwrap();
  archive.finalize_value().unwrap();
  assert_eq!(archive.as_provider().producer().unwrap(), ValueProducer::producer("zip"));
}
