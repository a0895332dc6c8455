//! Providers: the values and factories handed to the engine.

use crate::factory::{Factory, FactoryFn};
use crate::shape::{Injectable, Repr, Shape};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

type CopyFn = fn(&(dyn Any + Send + Sync)) -> Option<Arc<dyn Any + Send + Sync>>;

fn copy_of<T: Any + Send + Sync + Clone>(
  value: &(dyn Any + Send + Sync),
) -> Option<Arc<dyn Any + Send + Sync>> {
  value
    .downcast_ref::<T>()
    .map(|concrete| Arc::new(concrete.clone()) as Arc<dyn Any + Send + Sync>)
}

enum Holding {
  // Owned values are always `Clone`, so a fresh copy can be made on demand.
  Owned { copy: CopyFn },
  Shared,
}

/// A type-erased concrete value, either supplied by the caller or produced by a
/// factory.
#[doc(hidden)]
pub struct Slot {
  shape: Shape,
  holding: Holding,
  value: Arc<dyn Any + Send + Sync>,
}

impl Slot {
  pub(crate) fn owned<T: Injectable + Clone>(value: T) -> Self {
    Self {
      shape: <T as Injectable>::shape(),
      holding: Holding::Owned { copy: copy_of::<T> },
      value: Arc::new(value),
    }
  }

  #[doc(hidden)]
  pub fn shared<T: Injectable>(value: Arc<T>) -> Self {
    Self {
      shape: <T as Injectable>::shape(),
      holding: Holding::Shared,
      value,
    }
  }

  /// Holds an `Arc<dyn Contract>` as produced. The concrete type behind it is
  /// not known, so the slot is keyed by the contract itself.
  #[doc(hidden)]
  pub fn contract<I: ?Sized + Injectable>(value: Arc<I>) -> Self {
    Self {
      shape: <I as Injectable>::shape(),
      holding: Holding::Shared,
      value: Arc::new(value),
    }
  }

  pub(crate) fn shape(&self) -> Shape {
    self.shape
  }

  pub(crate) fn repr(&self) -> Repr {
    match self.holding {
      Holding::Owned { .. } => Repr::Owned,
      Holding::Shared => Repr::Shared,
    }
  }

  /// Another handle to the stored value.
  pub(crate) fn share(&self) -> Arc<dyn Any + Send + Sync> {
    Arc::clone(&self.value)
  }

  /// A fresh allocation holding a copy of an owned value. `None` for shared slots.
  pub(crate) fn copy(&self) -> Option<Arc<dyn Any + Send + Sync>> {
    match self.holding {
      Holding::Owned { copy } => copy(&*self.value),
      Holding::Shared => None,
    }
  }
}

impl fmt::Debug for Slot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Slot")
      .field("shape", &self.shape.name())
      .field("repr", &self.repr())
      .finish()
  }
}

pub(crate) enum ProviderKind {
  Value { slot: Slot, description: String },
  Factory(Factory),
  Nil,
}

/// A single entry of the root provider list: a ready-made value or a factory.
pub struct Provider {
  kind: ProviderKind,
}

impl Provider {
  /// Converts anything usable as a provider: a factory fn or closure, an
  /// injectable value, an `Arc` of one, or an `Option` of any of these.
  pub fn new<M>(provider: impl IntoProvider<M>) -> Self {
    provider.into_provider()
  }

  /// A value injected by copy.
  pub fn value<T: Injectable + Clone>(value: T) -> Self {
    let description = value.describe();
    Self {
      kind: ProviderKind::Value {
        slot: Slot::owned(value),
        description,
      },
    }
  }

  /// A value injected by reference.
  pub fn shared<T: Injectable>(value: Arc<T>) -> Self {
    let description = value.describe();
    Self {
      kind: ProviderKind::Value {
        slot: Slot::shared(value),
        description,
      },
    }
  }

  pub fn factory<M, F: FactoryFn<M>>(factory: F) -> Self {
    Self {
      kind: ProviderKind::Factory(factory.into_factory()),
    }
  }

  /// An absent provider. Always rejected by the registry.
  pub fn nil() -> Self {
    Self {
      kind: ProviderKind::Nil,
    }
  }

  pub fn is_factory(&self) -> bool {
    matches!(self.kind, ProviderKind::Factory(_))
  }

  pub(crate) fn into_kind(self) -> ProviderKind {
    self.kind
  }
}

impl fmt::Debug for Provider {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.kind {
      ProviderKind::Value { slot, .. } => f.debug_tuple("Value").field(slot).finish(),
      ProviderKind::Factory(factory) => f.debug_tuple("Factory").field(factory).finish(),
      ProviderKind::Nil => f.write_str("Nil"),
    }
  }
}

/// Conversion into a [`Provider`].
///
/// `Marker` keeps the blanket implementations apart: factories, owned values,
/// shared values and optional providers each use their own marker.
pub trait IntoProvider<Marker> {
  fn into_provider(self) -> Provider;
}

#[doc(hidden)]
pub struct FactoryMarker<M>(PhantomData<M>);

#[doc(hidden)]
pub struct ValueMarker;

#[doc(hidden)]
pub struct SharedMarker;

#[doc(hidden)]
pub struct OptionMarker<M>(PhantomData<M>);

impl IntoProvider<()> for Provider {
  fn into_provider(self) -> Provider {
    self
  }
}

impl<M, F: FactoryFn<M>> IntoProvider<FactoryMarker<M>> for F {
  fn into_provider(self) -> Provider {
    Provider::factory(self)
  }
}

impl<T: Injectable + Clone> IntoProvider<ValueMarker> for T {
  fn into_provider(self) -> Provider {
    Provider::value(self)
  }
}

impl<T: Injectable> IntoProvider<SharedMarker> for Arc<T> {
  fn into_provider(self) -> Provider {
    Provider::shared(self)
  }
}

impl<M, P: IntoProvider<M>> IntoProvider<OptionMarker<M>> for Option<P> {
  fn into_provider(self) -> Provider {
    match self {
      Some(provider) => provider.into_provider(),
      None => Provider::nil(),
    }
  }
}
