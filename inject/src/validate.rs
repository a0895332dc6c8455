//! Cycle validation. Runs over the whole graph before any factory is invoked,
//! so a rejected run has no side effects.

use crate::error::{Error, Result};
use crate::registry::{FactoryId, Registry};
use crate::resolver::Provided;
use std::cell::RefCell;
use std::collections::HashMap;

/// An RAII guard that counts how many times a factory sits on the current
/// validation path.
///
/// Entering increments the factory's counter and dropping the guard decrements
/// it, so a factory reached twice through independent branches is not mistaken
/// for a cycle.
struct DepthGuard<'a> {
  depths: &'a RefCell<HashMap<FactoryId, usize>>,
  id: FactoryId,
  depth: usize,
}

impl<'a> DepthGuard<'a> {
  fn enter(depths: &'a RefCell<HashMap<FactoryId, usize>>, id: FactoryId) -> Self {
    let depth = {
      let mut depths = depths.borrow_mut();
      let depth = depths.entry(id).or_insert(0);
      *depth += 1;
      *depth
    };
    Self { depths, id, depth }
  }
}

impl Drop for DepthGuard<'_> {
  fn drop(&mut self) {
    if let Some(depth) = self.depths.borrow_mut().get_mut(&self.id) {
      *depth -= 1;
    }
  }
}

impl Registry {
  /// Walks the dependencies of every root factory and fails on the first cycle.
  /// Inputs with no injectable value are reported here too.
  pub(crate) fn validate(&self) -> Result<()> {
    for id in 0..self.factories.len() {
      let depths = RefCell::new(HashMap::new());
      self.validate_factory(id, &depths)?;
    }
    Ok(())
  }

  fn validate_factory(&self, id: FactoryId, depths: &RefCell<HashMap<FactoryId, usize>>) -> Result<()> {
    let guard = DepthGuard::enter(depths, id);
    if guard.depth >= 2 {
      return Err(Error::CycleDetected(self.factories[id].describe().to_owned()));
    }

    for requirement in self.factories[id].signature().inputs() {
      if let Provided::Pending { factory, .. } = self.provide(requirement)? {
        self.validate_factory(factory, depths)?;
      }
    }
    Ok(())
  }
}
