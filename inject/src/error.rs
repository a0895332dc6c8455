use thiserror::Error;

/// The error type returned by a resolution run.
///
/// Every variant is terminal: the first error aborts the run, and side effects
/// of factories that already ran are not undone.
#[derive(Debug, Error)]
pub enum Error {
  /// A root provider was neither a factory nor a trackable value.
  #[error("unsupported provider type: {0}")]
  UnsupportedProvider(String),

  /// A required type has no catalog entry or no implementer.
  #[error("no injectable value for type {0}")]
  NoInjectableValue(String),

  /// A required type is known but nothing is bound to produce it.
  #[error("missing provider object for {0}")]
  MissingProvider(String),

  /// A factory transitively requires its own output.
  #[error("cycle detected in {0}")]
  CycleDetected(String),

  /// More than one catalog type implements a required contract.
  #[error("ambiguous capability {contract}: implemented by {}", .candidates.join(", "))]
  AmbiguousCapability {
    contract: String,
    candidates: Vec<String>,
  },

  /// A resolved argument did not match the declared parameter type.
  #[error("resolved argument does not match parameter type {expected}")]
  ArgumentMismatch { expected: String },

  /// The error returned by a factory, passed through unchanged.
  #[error(transparent)]
  Factory(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// True if this error came from a factory rather than from the engine.
  pub fn is_factory_error(&self) -> bool {
    matches!(self, Error::Factory(_))
  }

  /// Returns the original factory error, for downcasting.
  pub fn into_factory_error(self) -> Option<Box<dyn std::error::Error + Send + Sync>> {
    match self {
      Error::Factory(error) => Some(error),
      _ => None,
    }
  }
}

/// A specialized `Result` type for `fibre_inject` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
