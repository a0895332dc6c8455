//! The per-run provider registry: root factories, the type catalog and the value map.

use crate::catalog::TypeCatalog;
use crate::config::{Ambiguity, Config};
use crate::error::{Error, Result};
use crate::factory::Factory;
use crate::provider::{Provider, ProviderKind, Slot};
use crate::shape::Repr;
use indexmap::IndexMap;
use std::any::TypeId;
use tracing::{debug, trace, warn};

/// Index of a factory in the root provider list.
pub(crate) type FactoryId = usize;

/// What currently provides a type.
pub(crate) enum Binding {
  /// An available value.
  Value(Slot),
  /// Not produced yet; running this factory will produce it.
  Pending(FactoryId),
}

/// Context object for one resolution run. Built fresh by every run and dropped
/// afterwards.
pub(crate) struct Registry {
  pub(crate) config: Config,
  /// Root factories in declaration order.
  pub(crate) factories: Vec<Factory>,
  pub(crate) values: IndexMap<TypeId, Binding>,
  pub(crate) catalog: TypeCatalog,
}

impl Registry {
  pub(crate) fn new(config: Config) -> Self {
    Self {
      config,
      factories: Vec::new(),
      values: IndexMap::new(),
      catalog: TypeCatalog::default(),
    }
  }

  /// Runs every registry phase: partition, catalog, ambiguity check and value map fill.
  pub(crate) fn build(config: Config, providers: Vec<Provider>) -> Result<Self> {
    let mut registry = Self::new(config);
    registry.partition(providers)?;
    registry.build_catalog();
    registry.check_ambiguity()?;
    registry.fill_value_map();
    debug!(
      factories = registry.factories.len(),
      values = registry.values.len(),
      catalog = registry.catalog.len(),
      "registry built"
    );
    Ok(registry)
  }

  /// Splits the root list into factories and values. Values are recorded into
  /// the value map straight away.
  pub(crate) fn partition(&mut self, providers: Vec<Provider>) -> Result<()> {
    for provider in providers {
      match provider.into_kind() {
        ProviderKind::Factory(factory) => self.factories.push(factory),
        ProviderKind::Value { slot, description } => self.record_value(slot, description)?,
        ProviderKind::Nil => return Err(Error::UnsupportedProvider("None".to_owned())),
      }
    }
    Ok(())
  }

  fn record_value(&mut self, slot: Slot, description: String) -> Result<()> {
    let shape = slot.shape();
    if shape.qualified_name().is_none() {
      // A plain primitive cannot be a provider; an `Arc` of one is simply untrackable.
      return match slot.repr() {
        Repr::Owned => Err(Error::UnsupportedProvider(description)),
        Repr::Shared => {
          trace!(shape = shape.name(), "ignoring untrackable shared value");
          Ok(())
        }
      };
    }
    if self.values.contains_key(&shape.id()) {
      warn!(shape = shape.name(), "supplied value replaces an earlier value of the same type");
    }
    trace!(shape = shape.name(), repr = ?slot.repr(), "value bound");
    self.values.insert(shape.id(), Binding::Value(slot));
    Ok(())
  }

  /// Collects every concrete shape reachable from factory signatures and
  /// supplied values.
  pub(crate) fn build_catalog(&mut self) {
    for factory in &self.factories {
      let signature = factory.signature();
      for input in signature.inputs() {
        self.catalog.add(input.base_shape());
      }
      for output in signature.outputs() {
        if output.is_contract() {
          self.catalog.add_produced_contract(*output);
        } else {
          self.catalog.add(*output);
        }
      }
    }
    for binding in self.values.values() {
      if let Binding::Value(slot) = binding {
        self.catalog.add(slot.shape());
      }
    }
  }

  /// Looks for contracts required by some factory that more than one catalog
  /// type implements.
  pub(crate) fn check_ambiguity(&self) -> Result<()> {
    let mut seen = Vec::new();
    for factory in &self.factories {
      for input in factory.signature().inputs() {
        let shape = input.base_shape();
        if !shape.is_contract() || seen.contains(&shape.id()) {
          continue;
        }
        seen.push(shape.id());

        let implementers = self.catalog.implementers(shape.id());
        if implementers.len() < 2 {
          continue;
        }
        let candidates: Vec<String> = implementers
          .iter()
          .map(|implementer| implementer.shape.name().to_owned())
          .collect();
        match self.config.ambiguity {
          Ambiguity::Reject => {
            return Err(Error::AmbiguousCapability {
              contract: shape.name().to_owned(),
              candidates,
            })
          }
          Ambiguity::FirstRegistered => warn!(
            contract = shape.name(),
            chosen = %candidates[0],
            candidates = candidates.len(),
            "contract has several implementers; using the first registered"
          ),
        }
      }
    }
    Ok(())
  }

  /// Binds every factory output that has no provider yet to that factory. The
  /// first factory producing a type wins, and supplied values always win.
  pub(crate) fn fill_value_map(&mut self) {
    for (id, factory) in self.factories.iter().enumerate() {
      for output in factory.signature().outputs() {
        let Some(key) = self.output_key(output) else {
          continue;
        };
        if self.values.contains_key(&key.id()) {
          continue;
        }
        trace!(shape = key.name(), factory = factory.describe(), "factory bound");
        self.values.insert(key.id(), Binding::Pending(id));
      }
    }
  }
}
