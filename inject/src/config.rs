//! Run configuration.

/// What to do when a required contract has more than one implementer in the
/// type catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
  feature = "serde",
  derive(serde::Serialize, serde::Deserialize),
  serde(rename_all = "snake_case")
)]
pub enum Ambiguity {
  /// Fail the run with `Error::AmbiguousCapability` before any factory runs.
  #[default]
  Reject,
  /// Use the implementer that entered the catalog first. Catalog order follows
  /// factory declaration order (inputs, then outputs), then supplied values.
  FirstRegistered,
}

/// Configuration for a single resolution run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
  feature = "serde",
  derive(serde::Serialize, serde::Deserialize),
  serde(default)
)]
pub struct Config {
  pub ambiguity: Ambiguity,
}

impl Config {
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets the ambiguity policy.
  pub fn ambiguity(mut self, ambiguity: Ambiguity) -> Self {
    self.ambiguity = ambiguity;
    self
  }
}
