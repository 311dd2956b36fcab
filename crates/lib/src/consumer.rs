/// The capability a caller grants when asking a provider for its value.
///
/// Producer discovery and execution-time classification always evaluate with
/// [`ValueConsumer::IgnoreUnsafeRead`], whatever the original caller asked for,
/// so they never finalize anything on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueConsumer {
  /// Final consumption. Providers may finalize or validate their state.
  StrictEvaluation,
  /// Speculative read that must leave provider state untouched.
  IgnoreUnsafeRead,
}

impl ValueConsumer {
  pub fn is_strict(self) -> bool {
    self == ValueConsumer::StrictEvaluation
  }
}
