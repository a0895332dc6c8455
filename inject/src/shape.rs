//! Type identity and self-description for everything that flows through the engine.
//!
//! Rust has no runtime reflection, so every type that takes part in resolution
//! describes itself through [`Injectable`]. The `component!` and `contract!`
//! macros write those implementations for you.

use crate::factory::Argument;
use crate::provider::Slot;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// How a value is held, or how a factory asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repr {
  /// A plain value, `T`.
  Owned,
  /// A shared reference, `Arc<T>`.
  Shared,
}

/// The broad category of a [`Shape`].
#[derive(Clone, Copy)]
pub enum ShapeKind {
  /// A nominal type that can be produced and stored. Carries the function that
  /// declares which contracts the type implements.
  Concrete { declare: fn(&mut Capabilities) },
  /// A behavioral contract (a `dyn Trait`). Resolved to an implementing
  /// concrete shape, or stored as is when a factory returns `Arc<dyn Trait>`.
  /// Carries the function that clones such a stored handle.
  Contract {
    reshare: fn(&(dyn Any + Send + Sync)) -> Option<Box<dyn Any + Send + Sync>>,
  },
  /// A type that cannot be tracked by the engine (primitives, strings).
  Opaque,
  /// The error slot of a fallible factory.
  Fault,
}

impl fmt::Debug for ShapeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShapeKind::Concrete { .. } => write!(f, "Concrete"),
      ShapeKind::Contract { .. } => write!(f, "Contract"),
      ShapeKind::Opaque => write!(f, "Opaque"),
      ShapeKind::Fault => write!(f, "Fault"),
    }
  }
}

/// The runtime descriptor of a type: its identity, its full name and its kind.
#[derive(Clone, Copy)]
pub struct Shape {
  id: TypeId,
  name: &'static str,
  kind: ShapeKind,
}

impl Shape {
  /// Describes a concrete component type.
  pub fn concrete<T: Injectable>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: type_name::<T>(),
      kind: ShapeKind::Concrete {
        declare: T::capabilities,
      },
    }
  }

  /// Describes a contract, usually a `dyn Trait`.
  pub fn contract<I: ?Sized + Any + Send + Sync>() -> Self {
    Self {
      id: TypeId::of::<I>(),
      name: type_name::<I>(),
      kind: ShapeKind::Contract {
        reshare: reshare_of::<I>,
      },
    }
  }

  /// Describes a type the engine can carry but never track.
  pub fn opaque<T: ?Sized + Any>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: type_name::<T>(),
      kind: ShapeKind::Opaque,
    }
  }

  /// The shape of the `Err` side of a fallible factory.
  pub(crate) fn fault() -> Self {
    Self {
      id: TypeId::of::<Box<dyn std::error::Error + Send + Sync>>(),
      name: "error",
      kind: ShapeKind::Fault,
    }
  }

  pub fn id(&self) -> TypeId {
    self.id
  }

  /// The full path of the type as reported by `std::any::type_name`.
  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn kind(&self) -> ShapeKind {
    self.kind
  }

  pub fn is_contract(&self) -> bool {
    matches!(self.kind, ShapeKind::Contract { .. })
  }

  /// The name under which this shape can be tracked, or `None` when the engine
  /// cannot inject it (opaque types and error slots).
  pub fn qualified_name(&self) -> Option<&'static str> {
    match self.kind {
      ShapeKind::Concrete { .. } | ShapeKind::Contract { .. } => Some(self.name),
      ShapeKind::Opaque | ShapeKind::Fault => None,
    }
  }
}

impl PartialEq for Shape {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for Shape {}

impl fmt::Debug for Shape {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Shape")
      .field("name", &self.name)
      .field("kind", &self.kind)
      .finish()
  }
}

impl fmt::Display for Shape {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name)
  }
}

/// One declared factory input: the shape it needs and the form it wants it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
  shape: Shape,
  repr: Repr,
}

impl Requirement {
  pub fn new(shape: Shape, repr: Repr) -> Self {
    Self { shape, repr }
  }

  /// The underlying shape with the `Arc` indirection stripped.
  pub fn base_shape(&self) -> Shape {
    self.shape
  }

  pub fn repr(&self) -> Repr {
    self.repr
  }
}

impl fmt::Display for Requirement {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.repr {
      Repr::Owned => write!(f, "{}", self.shape),
      Repr::Shared => write!(f, "Arc<{}>", self.shape),
    }
  }
}

/// Clones a stored `Arc<dyn Contract>` out of its type-erased holder.
fn reshare_of<I: ?Sized + Any + Send + Sync>(
  stored: &(dyn Any + Send + Sync),
) -> Option<Box<dyn Any + Send + Sync>> {
  stored
    .downcast_ref::<Arc<I>>()
    .map(|shared| Box::new(Arc::clone(shared)) as Box<dyn Any + Send + Sync>)
}

/// Type-erased conversion from a stored concrete value to a boxed `Arc<dyn Contract>`.
pub(crate) type Upcast = Rc<dyn Fn(Arc<dyn Any + Send + Sync>) -> Option<Box<dyn Any + Send + Sync>>>;

pub(crate) struct Capability {
  pub(crate) contract: TypeId,
  pub(crate) contract_name: &'static str,
  pub(crate) upcast: Upcast,
}

/// The list of contracts a concrete type declares it implements.
///
/// Filled by [`Injectable::capabilities`] once, when the type first enters the
/// type catalog of a run.
pub struct Capabilities {
  owner: Shape,
  entries: Vec<Capability>,
}

impl Capabilities {
  pub(crate) fn new(owner: Shape) -> Self {
    Self {
      owner,
      entries: Vec::new(),
    }
  }

  /// Declares that `T` can be used wherever an `Arc<I>` is required.
  ///
  /// `cast` is normally the identity closure `|it| it`, which lets the compiler
  /// perform the unsizing coercion from `Arc<T>` to `Arc<dyn Trait>`.
  pub fn implements<I, T>(&mut self, cast: fn(Arc<T>) -> Arc<I>) -> &mut Self
  where
    I: ?Sized + Any + Send + Sync,
    T: Any + Send + Sync,
  {
    if TypeId::of::<T>() != self.owner.id() {
      tracing::warn!(
        owner = self.owner.name(),
        declared = type_name::<T>(),
        contract = type_name::<I>(),
        "ignoring capability declared for a different type"
      );
      return self;
    }
    let upcast: Upcast = Rc::new(move |value: Arc<dyn Any + Send + Sync>| {
      value
        .downcast::<T>()
        .ok()
        .map(|concrete| Box::new(cast(concrete)) as Box<dyn Any + Send + Sync>)
    });
    self.entries.push(Capability {
      contract: TypeId::of::<I>(),
      contract_name: type_name::<I>(),
      upcast,
    });
    self
  }

  pub(crate) fn into_entries(self) -> Vec<Capability> {
    self.entries
  }
}

/// A type that can take part in resolution, either as a concrete component or
/// as a contract.
///
/// Implement it with `component!` for concrete types and with `contract!` for
/// `dyn Trait` contracts:
///
/// ```
/// use fibre_inject::{component, contract};
///
/// trait Lister: Send + Sync {
///   fn list(&self) -> Vec<String>;
/// }
///
/// #[derive(Clone)]
/// struct Service;
///
/// impl Lister for Service {
///   fn list(&self) -> Vec<String> {
///     vec!["Sarah".into()]
///   }
/// }
///
/// contract!(dyn Lister);
/// component!(Service: dyn Lister);
/// ```
pub trait Injectable: Any + Send + Sync {
  /// Describes this type.
  fn shape() -> Shape;

  /// Recovers an `Arc<Self>` from a resolved argument.
  #[doc(hidden)]
  fn share(argument: Argument) -> Option<Arc<Self>>;

  /// Stores a shared handle produced by a factory.
  #[doc(hidden)]
  fn store_shared(shared: Arc<Self>) -> Slot;

  /// Declares the contracts this type implements.
  fn capabilities(_capabilities: &mut Capabilities)
  where
    Self: Sized,
  {
  }

  /// Renders a value for error messages.
  fn describe(&self) -> String {
    type_name::<Self>().to_owned()
  }
}

macro_rules! opaque_injectable {
  ($($ty:ty),* $(,)?) => {
    $(
      impl Injectable for $ty {
        fn shape() -> Shape {
          Shape::opaque::<Self>()
        }

        fn share(argument: Argument) -> Option<Arc<Self>> {
          argument.into_shared()
        }

        fn store_shared(shared: Arc<Self>) -> Slot {
          Slot::shared(shared)
        }

        fn describe(&self) -> String {
          format!("{:?}", self)
        }
      }
    )*
  };
}

opaque_injectable!(
  bool,
  char,
  i8,
  i16,
  i32,
  i64,
  i128,
  isize,
  u8,
  u16,
  u32,
  u64,
  u128,
  usize,
  f32,
  f64,
  String,
  &'static str,
);
