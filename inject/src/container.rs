//! The `Container` builder and its run phases.

use crate::config::Config;
use crate::error::Result;
use crate::invoke::Invoker;
use crate::provider::{IntoProvider, Provider};
use crate::registry::Registry;
use std::fmt;

/// Collects the root provider list and runs a single resolution over it.
///
/// The container holds no state beyond the providers it was given. Every run
/// builds its own type catalog and value map and drops them when done, and
/// running consumes the container because factories are `FnOnce`.
#[derive(Default)]
pub struct Container {
  providers: Vec<Provider>,
  config: Config,
}

impl Container {
  /// Creates a new, empty `Container` with the default configuration.
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a new, empty `Container` with the given configuration.
  pub fn with_config(config: Config) -> Self {
    Self {
      providers: Vec::new(),
      config,
    }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  // --- Registration ---

  /// Appends a provider to the root list. Declaration order decides the
  /// invocation order of factories that do not depend on each other.
  pub fn add<M>(&mut self, provider: impl IntoProvider<M>) -> &mut Self {
    self.providers.push(provider.into_provider());
    self
  }

  pub fn len(&self) -> usize {
    self.providers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.providers.is_empty()
  }

  // --- Running ---

  /// Builds the registry and checks it for ambiguity and cycles without
  /// invoking any factory.
  pub fn validate(self) -> Result<()> {
    let registry = Registry::build(self.config, self.providers)?;
    registry.validate()
  }

  /// Resolves and invokes every root factory, each at most once.
  ///
  /// Returns the first error encountered. Factories that ran before the error
  /// are not rolled back.
  pub fn run(self) -> Result<()> {
    let mut registry = Registry::build(self.config, self.providers)?;
    registry.validate()?;
    Invoker::new(&mut registry).invoke()
  }
}

impl Extend<Provider> for Container {
  fn extend<I: IntoIterator<Item = Provider>>(&mut self, iter: I) {
    self.providers.extend(iter);
  }
}

impl FromIterator<Provider> for Container {
  fn from_iter<I: IntoIterator<Item = Provider>>(iter: I) -> Self {
    let mut container = Container::new();
    container.extend(iter);
    container
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("providers", &self.providers.len())
      .field("config", &self.config)
      .finish()
  }
}
