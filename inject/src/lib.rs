//! # Fibre Inject
//!
//! A dependency resolution and invocation engine. Hand it a list of ready-made
//! values and constructor functions; it works out, purely from the types of
//! their parameters and return values, which constructors must run and in what
//! order, runs each of them at most once, and threads every output into the
//! inputs of its dependents.
//!
//! ## Core Concepts
//!
//! - **Provider**: a value, or a factory (any fn or closure whose parameters and
//!   return type the engine understands).
//! - **Component**: a concrete type described with `component!`.
//! - **Contract**: a `dyn Trait` described with `contract!`. A factory asking for
//!   `Arc<dyn Trait>` receives the one catalog type that declares it, or the
//!   value of a factory that returns `Arc<dyn Trait>`.
//! - **Representation**: a factory can take `T` or `Arc<T>`; the engine copies or
//!   shares as needed, whichever form the value was produced in.
//! - **Fail fast**: a factory returning `Err` ends the run with that error.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_inject::{component, contract, init, providers};
//! use std::sync::Arc;
//!
//! trait Lister: Send + Sync {
//!   fn list(&self) -> Vec<String>;
//! }
//!
//! #[derive(Clone)]
//! struct Service;
//!
//! impl Lister for Service {
//!   fn list(&self) -> Vec<String> {
//!     vec!["Sarah".to_string(), "Bob".to_string()]
//!   }
//! }
//!
//! struct Client {
//!   lister: Arc<dyn Lister>,
//! }
//!
//! contract!(dyn Lister);
//! component!(Service: dyn Lister);
//! component!(Client);
//!
//! let new_client = |lister: Arc<dyn Lister>| Arc::new(Client { lister });
//! let new_service = || Arc::new(Service);
//! let use_client = |client: Arc<Client>| {
//!   assert_eq!(client.lister.list().join(", "), "Sarah, Bob");
//! };
//!
//! // Declaration order does not matter: the service is built first, then the
//! // client, then `use_client` runs.
//! init(providers![new_client, use_client, new_service]).unwrap();
//! ```

mod catalog;
mod config;
mod container;
mod error;
mod factory;
mod invoke;
mod macros;
mod provider;
mod registry;
mod resolver;
mod shape;
mod validate;

pub use config::{Ambiguity, Config};
pub use container::Container;
pub use error::{Error, Result};
pub use factory::{Argument, Factory, FactoryFn, Output, Outputs, Param, Signature};
pub use provider::{IntoProvider, Provider, Slot};
pub use shape::{Capabilities, Injectable, Repr, Requirement, Shape, ShapeKind};

/// Runs a single resolution over `providers` with the default configuration.
///
/// Shorthand for collecting the providers into a [`Container`] and calling
/// [`Container::run`].
pub fn init(providers: impl IntoIterator<Item = Provider>) -> Result<()> {
  providers.into_iter().collect::<Container>().run()
}
