//! The invocation engine.
//!
//! Walks the root factories in declaration order. Each factory's inputs are
//! resolved left to right; an input bound to a factory that has not run yet is
//! produced first, recursively. Every factory runs at most once and its outputs
//! replace its pending bindings in the value map.

use crate::error::{Error, Result};
use crate::factory::Argument;
use crate::provider::Slot;
use crate::registry::{Binding, FactoryId, Registry};
use crate::resolver::Provided;
use crate::shape::{Repr, Requirement, Upcast};
use std::collections::HashMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
  /// On the current call stack.
  Invoking,
  /// Outputs recorded.
  Done,
}

/// Drives one run over a built and validated registry.
pub(crate) struct Invoker<'r> {
  registry: &'r mut Registry,
  ledger: HashMap<FactoryId, CallState>,
}

impl<'r> Invoker<'r> {
  pub(crate) fn new(registry: &'r mut Registry) -> Self {
    Self {
      registry,
      ledger: HashMap::new(),
    }
  }

  /// Invokes every root factory not already invoked as a dependency.
  pub(crate) fn invoke(&mut self) -> Result<()> {
    for id in 0..self.registry.factories.len() {
      if self.ledger.contains_key(&id) {
        continue;
      }
      self.call_factory(id)?;
    }
    Ok(())
  }

  fn call_factory(&mut self, id: FactoryId) -> Result<()> {
    self.ledger.insert(id, CallState::Invoking);

    let inputs = self.registry.factories[id].signature().inputs().to_vec();
    let mut arguments = Vec::with_capacity(inputs.len());
    for requirement in &inputs {
      arguments.push(self.resolve_argument(requirement)?);
    }

    let factory = &mut self.registry.factories[id];
    debug!(factory = factory.describe(), "invoking factory");
    let call = factory
      .take_call()
      .ok_or_else(|| Error::CycleDetected(factory.describe().to_owned()))?;
    let slots = call(arguments)?;

    for slot in slots {
      self.record(slot);
    }
    self.ledger.insert(id, CallState::Done);
    Ok(())
  }

  /// Resolves one input, invoking the factory bound to it first if needed.
  fn resolve_argument(&mut self, requirement: &Requirement) -> Result<Argument> {
    loop {
      let (dependency, shape) = match self.registry.provide(requirement)? {
        Provided::Value { slot, upcast } => return normalize(requirement, slot, upcast.as_ref()),
        Provided::Pending { factory, shape } => (factory, shape),
        Provided::Unbound(shape) => return Err(Error::MissingProvider(shape.name().to_owned())),
      };

      match self.ledger.get(&dependency) {
        None => {
          trace!(
            requirement = %requirement,
            factory = self.registry.factories[dependency].describe(),
            "producing dependency"
          );
          self.call_factory(dependency)?;
        }
        Some(CallState::Invoking) => {
          return Err(Error::CycleDetected(
            self.registry.factories[dependency].describe().to_owned(),
          ))
        }
        // Ran already but left the binding pending: nothing else can produce it.
        Some(CallState::Done) => return Err(Error::MissingProvider(shape.name().to_owned())),
      }
    }
  }

  /// Stores a produced value, replacing whatever was bound to its type.
  fn record(&mut self, slot: Slot) {
    let Some(key) = self.registry.output_key(&slot.shape()) else {
      return;
    };
    debug!(shape = key.name(), repr = ?slot.repr(), "output recorded");
    self.registry.values.insert(key.id(), Binding::Value(slot));
  }
}

/// Bridges the form a value is held in and the form a parameter asks for, then
/// upcasts to the contract if the parameter names one.
///
/// A shared parameter fed from an owned value gets a fresh `Arc` around a copy.
/// An owned parameter fed from a shared value gets the shared handle, and the
/// parameter clones out of it.
fn normalize(requirement: &Requirement, slot: &Slot, upcast: Option<&Upcast>) -> Result<Argument> {
  let value = match (requirement.repr(), slot.repr()) {
    (Repr::Shared, Repr::Owned) => slot.copy().unwrap_or_else(|| slot.share()),
    _ => slot.share(),
  };

  match upcast {
    None => Ok(Argument::Value(value)),
    Some(upcast) => upcast(value)
      .map(Argument::Capability)
      .ok_or_else(|| Error::ArgumentMismatch {
        expected: requirement.to_string(),
      }),
  }
}
