//! Capability resolution: from a requested shape to the concrete shape that
//! provides it, and from there to its current binding.

use crate::error::{Error, Result};
use crate::registry::{Binding, FactoryId, Registry};
use crate::provider::Slot;
use crate::shape::{Requirement, Shape, ShapeKind, Upcast};
use tracing::trace;

/// The concrete shape chosen for a request. `upcast` is set when the request
/// was a contract.
pub(crate) struct Match {
  pub(crate) shape: Shape,
  pub(crate) upcast: Option<Upcast>,
}

/// The outcome of [`Registry::provide`].
pub(crate) enum Provided<'r> {
  Value { slot: &'r Slot, upcast: Option<Upcast> },
  Pending { factory: FactoryId, shape: Shape },
  /// Known to the catalog but bound to nothing.
  Unbound(Shape),
}

impl Registry {
  /// Finds the shape that satisfies a request. Concrete shapes resolve to
  /// themselves, contracts to their first implementer in the catalog.
  pub(crate) fn concrete_of(&self, shape: &Shape) -> Option<Match> {
    match shape.kind() {
      ShapeKind::Concrete { .. } => Some(Match {
        shape: *shape,
        upcast: None,
      }),
      ShapeKind::Contract { .. } => {
        // Ambiguity has been rejected already unless the policy allows it, in
        // which case the first registered implementer is the intended choice.
        let implementer = self.catalog.implementers(shape.id()).first()?;
        trace!(
          contract = shape.name(),
          concrete = implementer.shape.name(),
          "contract resolved"
        );
        Some(Match {
          shape: implementer.shape,
          upcast: Some(implementer.upcast.clone()),
        })
      }
      ShapeKind::Opaque | ShapeKind::Fault => None,
    }
  }

  /// The shape a factory output is stored under, or `None` if it cannot be
  /// tracked.
  ///
  /// Concrete outputs are their own key. An `Arc<dyn Contract>` output is kept
  /// under the contract: the type behind it is unknown, and the catalog lists
  /// the producing factory as an implementer of that contract.
  pub(crate) fn output_key(&self, shape: &Shape) -> Option<Shape> {
    match shape.kind() {
      ShapeKind::Concrete { .. } | ShapeKind::Contract { .. } => Some(*shape),
      ShapeKind::Opaque | ShapeKind::Fault => None,
    }
  }

  /// Looks up the current provider for a factory input.
  pub(crate) fn provide(&self, requirement: &Requirement) -> Result<Provided<'_>> {
    let matched = self
      .concrete_of(&requirement.base_shape())
      .ok_or_else(|| Error::NoInjectableValue(requirement.to_string()))?;

    Ok(match self.values.get(&matched.shape.id()) {
      Some(Binding::Value(slot)) => Provided::Value {
        slot,
        upcast: matched.upcast,
      },
      Some(Binding::Pending(id)) => Provided::Pending {
        factory: *id,
        shape: matched.shape,
      },
      None => Provided::Unbound(matched.shape),
    })
  }
}
