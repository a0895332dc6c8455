//! Public macros for describing types and building provider lists.

/// Implements `Injectable` for a concrete component type, optionally declaring
/// the contracts it implements.
///
/// The type must be `Send + Sync + 'static`. It must also be `Clone` to be
/// injected or produced by value; `Arc<T>` works either way.
///
/// # Examples
///
/// ```
/// use fibre_inject::{component, contract};
///
/// trait Greeter: Send + Sync {
///   fn greet(&self) -> String;
/// }
///
/// #[derive(Clone)]
/// struct English;
///
/// impl Greeter for English {
///   fn greet(&self) -> String {
///     "Hello!".to_string()
///   }
/// }
///
/// #[derive(Clone)]
/// struct Settings {
///   verbose: bool,
/// }
///
/// contract!(dyn Greeter);
/// component!(English: dyn Greeter);
/// component!(Settings);
/// ```
#[macro_export]
macro_rules! component {
  ($type:ty $(: $($contract:ty),+ $(,)?)?) => {
    impl $crate::Injectable for $type {
      fn shape() -> $crate::Shape {
        $crate::Shape::concrete::<Self>()
      }

      fn share(argument: $crate::Argument) -> ::core::option::Option<::std::sync::Arc<Self>> {
        argument.into_shared()
      }

      fn store_shared(shared: ::std::sync::Arc<Self>) -> $crate::Slot {
        $crate::Slot::shared(shared)
      }

      fn capabilities(_capabilities: &mut $crate::Capabilities) {
        $($(
          _capabilities.implements::<$contract, Self>(|it| it);
        )+)?
      }
    }
  };
}

/// Implements `Injectable` for one or more `dyn Trait` contracts.
///
/// The trait must have `Send + Sync` as supertraits. A factory asks for a
/// contract with an `Arc<dyn Trait>` parameter and receives whichever catalog
/// type declared it with `component!`, or the output of a factory returning
/// `Arc<dyn Trait>`.
#[macro_export]
macro_rules! contract {
  ($($contract:ty),+ $(,)?) => {
    $(
      impl $crate::Injectable for $contract {
        fn shape() -> $crate::Shape {
          $crate::Shape::contract::<Self>()
        }

        fn share(argument: $crate::Argument) -> ::core::option::Option<::std::sync::Arc<Self>> {
          argument.into_capability()
        }

        fn store_shared(shared: ::std::sync::Arc<Self>) -> $crate::Slot {
          $crate::Slot::contract(shared)
        }
      }
    )+
  };
}

/// Builds a root provider list from factories and values.
///
/// # Examples
///
/// ```
/// use fibre_inject::{component, init, providers};
/// use std::sync::Arc;
///
/// #[derive(Clone)]
/// struct Port(u16);
/// struct Server {
///   port: u16,
/// }
///
/// component!(Port);
/// component!(Server);
///
/// let new_server = |port: Port| Arc::new(Server { port: port.0 });
/// let check = |server: Arc<Server>| assert_eq!(server.port, 8080);
///
/// init(providers![check, new_server, Port(8080)]).unwrap();
/// ```
#[macro_export]
macro_rules! providers {
  ($($provider:expr),* $(,)?) => {
    ::std::vec![$($crate::Provider::new($provider)),*]
  };
}
