//! The per-run type catalog and its capability table.

use crate::shape::{Capabilities, Shape, ShapeKind, Upcast};
use indexmap::IndexMap;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use tracing::trace;

/// A catalog entry that satisfies a contract, with the conversion to it.
#[derive(Clone)]
pub(crate) struct Implementer {
  pub(crate) shape: Shape,
  pub(crate) upcast: Upcast,
}

/// Every concrete shape seen in factory signatures and supplied values, in
/// first-registration order.
#[derive(Default)]
pub(crate) struct TypeCatalog {
  shapes: IndexMap<TypeId, Shape>,
  implementers: HashMap<TypeId, Vec<Implementer>>,
}

impl TypeCatalog {
  /// Records a concrete shape and the contracts it declares. Contracts, opaque
  /// shapes and already-known shapes are ignored. Returns true if the shape is new.
  pub(crate) fn add(&mut self, shape: Shape) -> bool {
    let ShapeKind::Concrete { declare } = shape.kind() else {
      return false;
    };
    if self.shapes.contains_key(&shape.id()) {
      return false;
    }

    let mut capabilities = Capabilities::new(shape);
    declare(&mut capabilities);
    for capability in capabilities.into_entries() {
      trace!(
        concrete = shape.name(),
        contract = capability.contract_name,
        "catalog capability"
      );
      self
        .implementers
        .entry(capability.contract)
        .or_default()
        .push(Implementer {
          shape,
          upcast: capability.upcast,
        });
    }

    trace!(shape = shape.name(), "catalog entry");
    self.shapes.insert(shape.id(), shape);
    true
  }

  /// Records a factory that returns `Arc<dyn Contract>` as an implementer of
  /// that contract. The value it produces is served to contract consumers as
  /// is. Returns true if the contract had no such entry yet.
  pub(crate) fn add_produced_contract(&mut self, shape: Shape) -> bool {
    let ShapeKind::Contract { reshare } = shape.kind() else {
      return false;
    };
    let implementers = self.implementers.entry(shape.id()).or_default();
    if implementers.iter().any(|implementer| implementer.shape == shape) {
      return false;
    }

    trace!(contract = shape.name(), "catalog produced contract");
    implementers.push(Implementer {
      shape,
      upcast: Rc::new(move |stored: Arc<dyn Any + Send + Sync>| reshare(&*stored)),
    });
    true
  }

  /// The implementers of a contract, in catalog order.
  pub(crate) fn implementers(&self, contract: TypeId) -> &[Implementer] {
    self
      .implementers
      .get(&contract)
      .map(Vec::as_slice)
      .unwrap_or_default()
  }

  #[cfg(test)]
  pub(crate) fn shapes(&self) -> impl Iterator<Item = &Shape> {
    self.shapes.values()
  }

  pub(crate) fn len(&self) -> usize {
    self.shapes.len()
  }
}
