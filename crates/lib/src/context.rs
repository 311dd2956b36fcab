//! Reentrancy detection for provider evaluation.
//!
//! Every thread keeps a stack of the owners currently evaluating. Opening a
//! scope pushes a frame and returns a [`ScopeContext`] guard that removes it when
//! dropped, so the frame is released on every exit path including `?` returns
//! and unwinding. Opening a scope for an owner that is already on the stack is
//! a [`ProviderError::CircularEvaluation`].
//!
//! The stack is thread-local: concurrent evaluations on different threads never
//! see each other's frames.

use std::borrow::Cow;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Weak;

use tracing::{trace, warn};

use crate::config::EvaluationConfig;
use crate::error::ProviderError;

thread_local! {
  static STACK: RefCell<EvaluationStack> = RefCell::new(EvaluationStack::from_env());
}

struct Frame {
  owner: OwnerId,
  label: Cow<'static, str>,
}

struct EvaluationStack {
  frames: Vec<Frame>,
  config: EvaluationConfig,
}

impl EvaluationStack {
  fn from_env() -> Self {
    let config = EvaluationConfig::from_env().unwrap_or_else(|err| {
      warn!(error = %err, "ignoring invalid evaluation config");
      EvaluationConfig::default()
    });
    Self {
      frames: Vec::new(),
      config,
    }
  }
}

/// Identity of an evaluation owner: the address of the owning provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(usize);

impl OwnerId {
  pub fn of<T: ?Sized>(owner: &T) -> Self {
    OwnerId(owner as *const T as *const () as usize)
  }

  /// Identity of a value still under construction in `Arc::new_cyclic`.
  ///
  /// Matches [`OwnerId::of`] for the finished value.
  pub fn of_weak<T>(owner: &Weak<T>) -> Self {
    OwnerId(owner.as_ptr() as *const () as usize)
  }
}

/// A provider as seen by the scope stack.
#[derive(Debug, Clone)]
pub struct EvaluationOwner {
  id: OwnerId,
  label: Cow<'static, str>,
}

impl EvaluationOwner {
  pub fn new(id: OwnerId, label: impl Into<Cow<'static, str>>) -> Self {
    Self {
      id,
      label: label.into(),
    }
  }

  pub fn id(&self) -> OwnerId {
    self.id
  }

  pub fn label(&self) -> &str {
    &self.label
  }

  /// Open an evaluation scope for this owner.
  pub fn begin_evaluation(&self) -> Result<ScopeContext, ProviderError> {
    EvaluationContext::open(self)
  }
}

/// Guard for an open evaluation scope. Dropping it closes the scope.
#[must_use = "the scope closes as soon as the guard is dropped"]
pub struct ScopeContext {
  owner: OwnerId,
  _not_send: PhantomData<*const ()>,
}

impl Drop for ScopeContext {
  fn drop(&mut self) {
    let _ = STACK.try_with(|stack| {
      let mut stack = stack.borrow_mut();
      // guards dropped out of order still release their own frame
      if let Some(position) = stack.frames.iter().rposition(|frame| frame.owner == self.owner) {
        stack.frames.remove(position);
      }
      trace!(depth = stack.frames.len(), "closed evaluation scope");
    });
  }
}

/// Entry points to the current thread's scope stack.
pub struct EvaluationContext;

impl EvaluationContext {
  /// Open a scope for `owner`.
  ///
  /// # Errors
  ///
  /// - `CircularEvaluation` if `owner` is already evaluating on this thread
  /// - `EvaluationTooDeep` if the stack is at its configured limit
  pub fn open(owner: &EvaluationOwner) -> Result<ScopeContext, ProviderError> {
    Self::push(owner).inspect_err(|err| {
      if let ProviderError::CircularEvaluation { cycle } = err {
        warn!(cycle = %cycle.join(" -> "), "circular provider evaluation");
      }
    })
  }

  /// Run `f` inside a scope for `owner`, or `fallback` if the scope cannot be opened.
  ///
  /// Used where reentrance is expected and harmless, such as rendering a
  /// provider that appears inside its own description.
  pub fn try_run<R>(owner: &EvaluationOwner, fallback: impl FnOnce() -> R, f: impl FnOnce() -> R) -> R {
    match Self::push(owner) {
      Ok(_scope) => f(),
      Err(_) => fallback(),
    }
  }

  /// Returns true if `owner` has an open scope on this thread.
  pub fn is_evaluating(owner: OwnerId) -> bool {
    STACK.with(|stack| stack.borrow().frames.iter().any(|frame| frame.owner == owner))
  }

  /// Number of open scopes on this thread.
  pub fn depth() -> usize {
    STACK.with(|stack| stack.borrow().frames.len())
  }

  /// The configuration in effect on this thread.
  pub fn config() -> EvaluationConfig {
    STACK.with(|stack| stack.borrow().config.clone())
  }

  /// Replace the configuration for this thread.
  pub fn configure(config: EvaluationConfig) {
    STACK.with(|stack| stack.borrow_mut().config = config);
  }

  fn push(owner: &EvaluationOwner) -> Result<ScopeContext, ProviderError> {
    STACK.with(|stack| {
      let mut stack = stack.borrow_mut();

      if let Some(start) = stack.frames.iter().position(|frame| frame.owner == owner.id) {
        let mut cycle: Vec<String> = stack.frames[start..].iter().map(|f| f.label.to_string()).collect();
        cycle.push(owner.label.to_string());
        return Err(ProviderError::CircularEvaluation { cycle });
      }

      let limit = stack.config.max_depth;
      if stack.frames.len() >= limit {
        return Err(ProviderError::EvaluationTooDeep {
          depth: stack.frames.len() + 1,
          limit,
        });
      }

      stack.frames.push(Frame {
        owner: owner.id,
        label: owner.label.clone(),
      });
      trace!(owner = %owner.label, depth = stack.frames.len(), "opened evaluation scope");

      Ok(ScopeContext {
        owner: owner.id,
        _not_send: PhantomData,
      })
    })
  }
}
