//! Factory signatures.
//!
//! Any `FnOnce` whose parameters implement [`Param`] and whose return type
//! implements [`Outputs`] is a factory. The traits here let such a function
//! describe its ordered inputs and outputs, which is all the engine needs to
//! place it in the construction order.

use crate::error::{Error, Result};
use crate::provider::Slot;
use crate::shape::{Injectable, Repr, Requirement, Shape};
use once_cell::unsync::OnceCell;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A resolved, normalized value handed to a factory parameter.
#[doc(hidden)]
pub enum Argument {
  /// A concrete value; the `Arc` holds the concrete type itself.
  Value(Arc<dyn Any + Send + Sync>),
  /// A concrete value already upcast to a contract; the box holds an `Arc<dyn Contract>`.
  Capability(Box<dyn Any + Send + Sync>),
}

impl Argument {
  pub fn into_shared<T: Any + Send + Sync>(self) -> Option<Arc<T>> {
    match self {
      Argument::Value(value) => value.downcast::<T>().ok(),
      Argument::Capability(_) => None,
    }
  }

  pub fn into_capability<I: ?Sized + Any + Send + Sync>(self) -> Option<Arc<I>> {
    match self {
      Argument::Capability(boxed) => boxed.downcast::<Arc<I>>().ok().map(|shared| *shared),
      Argument::Value(_) => None,
    }
  }

  fn value_ref<T: Any>(&self) -> Option<&T> {
    match self {
      Argument::Value(value) => value.downcast_ref::<T>(),
      Argument::Capability(_) => None,
    }
  }
}

/// A factory parameter type.
///
/// `T` asks for a copy of the value, `Arc<T>` asks for a shared reference.
/// `Arc<dyn Contract>` asks for whichever catalog type implements the contract.
pub trait Param: Sized + 'static {
  fn requirement() -> Requirement;

  #[doc(hidden)]
  fn extract(argument: Argument) -> Option<Self>;
}

impl<T: Injectable + Clone> Param for T {
  fn requirement() -> Requirement {
    Requirement::new(<T as Injectable>::shape(), Repr::Owned)
  }

  fn extract(argument: Argument) -> Option<Self> {
    argument.value_ref::<T>().cloned()
  }
}

impl<T: ?Sized + Injectable> Param for Arc<T> {
  fn requirement() -> Requirement {
    Requirement::new(<T as Injectable>::shape(), Repr::Shared)
  }

  fn extract(argument: Argument) -> Option<Self> {
    <T as Injectable>::share(argument)
  }
}

/// A single factory output.
pub trait Output: 'static {
  fn shape() -> Shape;

  #[doc(hidden)]
  fn into_slot(self) -> Slot;
}

impl<T: Injectable + Clone> Output for T {
  fn shape() -> Shape {
    <T as Injectable>::shape()
  }

  fn into_slot(self) -> Slot {
    Slot::owned(self)
  }
}

impl<T: ?Sized + Injectable> Output for Arc<T> {
  fn shape() -> Shape {
    <T as Injectable>::shape()
  }

  fn into_slot(self) -> Slot {
    <T as Injectable>::store_shared(self)
  }
}

/// The full return type of a factory: nothing, one output, a tuple of outputs,
/// or any of those wrapped in a `Result`.
pub trait Outputs: 'static {
  /// The declared output shapes, with a trailing error slot for `Result`.
  fn shapes() -> Vec<Shape>;

  #[doc(hidden)]
  fn into_slots(self) -> Result<Vec<Slot>>;
}

impl Outputs for () {
  fn shapes() -> Vec<Shape> {
    Vec::new()
  }

  fn into_slots(self) -> Result<Vec<Slot>> {
    Ok(Vec::new())
  }
}

impl<O: Output> Outputs for O {
  fn shapes() -> Vec<Shape> {
    vec![<O as Output>::shape()]
  }

  fn into_slots(self) -> Result<Vec<Slot>> {
    Ok(vec![self.into_slot()])
  }
}

impl<R, E> Outputs for std::result::Result<R, E>
where
  R: Outputs,
  E: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
  fn shapes() -> Vec<Shape> {
    let mut shapes = R::shapes();
    shapes.push(Shape::fault());
    shapes
  }

  fn into_slots(self) -> Result<Vec<Slot>> {
    match self {
      Ok(outputs) => outputs.into_slots(),
      Err(error) => Err(Error::Factory(error.into())),
    }
  }
}

macro_rules! impl_tuple_outputs {
  ($($output:ident),+) => {
    impl<$($output: Output),+> Outputs for ($($output,)+) {
      fn shapes() -> Vec<Shape> {
        vec![$(<$output as Output>::shape()),+]
      }

      #[allow(non_snake_case)]
      fn into_slots(self) -> Result<Vec<Slot>> {
        let ($($output,)+) = self;
        Ok(vec![$($output.into_slot()),+])
      }
    }
  };
}

impl_tuple_outputs!(O1, O2);
impl_tuple_outputs!(O1, O2, O3);
impl_tuple_outputs!(O1, O2, O3, O4);

/// The ordered inputs and outputs of a factory.
#[derive(Debug, Clone)]
pub struct Signature {
  inputs: Vec<Requirement>,
  outputs: Vec<Shape>,
}

impl Signature {
  pub fn new(inputs: Vec<Requirement>, outputs: Vec<Shape>) -> Self {
    Self { inputs, outputs }
  }

  pub fn inputs(&self) -> &[Requirement] {
    &self.inputs
  }

  pub fn outputs(&self) -> &[Shape] {
    &self.outputs
  }
}

impl fmt::Display for Signature {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("fn(")?;
    for (i, input) in self.inputs.iter().enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }
      write!(f, "{}", input)?;
    }
    f.write_str(")")?;
    match self.outputs.as_slice() {
      [] => Ok(()),
      [single] => write!(f, " -> {}", single),
      many => {
        f.write_str(" -> (")?;
        for (i, output) in many.iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{}", output)?;
        }
        f.write_str(")")
      }
    }
  }
}

type BoxedCall = Box<dyn FnOnce(Vec<Argument>) -> Result<Vec<Slot>>>;

/// A type-erased factory: its signature plus the call itself, which can run once.
pub struct Factory {
  signature: Signature,
  call: Option<BoxedCall>,
  rendered: OnceCell<String>,
}

impl Factory {
  fn new(signature: Signature, call: BoxedCall) -> Self {
    Self {
      signature,
      call: Some(call),
      rendered: OnceCell::new(),
    }
  }

  pub fn signature(&self) -> &Signature {
    &self.signature
  }

  /// The rendered signature, used in logs and cycle errors.
  pub fn describe(&self) -> &str {
    self.rendered.get_or_init(|| self.signature.to_string())
  }

  pub(crate) fn take_call(&mut self) -> Option<BoxedCall> {
    self.call.take()
  }
}

impl fmt::Debug for Factory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Factory")
      .field("signature", &self.describe())
      .field("spent", &self.call.is_none())
      .finish()
  }
}

/// Functions and closures usable as factories.
///
/// `Marker` is the function pointer type matching the signature; it only exists
/// so one closure type can be told apart from another during inference.
pub trait FactoryFn<Marker>: 'static {
  fn into_factory(self) -> Factory;
}

fn next_argument<P: Param>(arguments: &mut impl Iterator<Item = Argument>) -> Result<P> {
  arguments
    .next()
    .and_then(P::extract)
    .ok_or_else(|| Error::ArgumentMismatch {
      expected: P::requirement().to_string(),
    })
}

macro_rules! impl_factory_fn {
  ($($param:ident),*) => {
    impl<Func, Out, $($param,)*> FactoryFn<fn($($param,)*) -> Out> for Func
    where
      Func: FnOnce($($param),*) -> Out + 'static,
      Out: Outputs,
      $($param: Param,)*
    {
      #[allow(non_snake_case, unused_mut, unused_variables)]
      fn into_factory(self) -> Factory {
        let signature = Signature::new(
          vec![$(<$param as Param>::requirement()),*],
          Out::shapes(),
        );
        Factory::new(
          signature,
          Box::new(move |arguments: Vec<Argument>| {
            let mut arguments = arguments.into_iter();
            $(let $param = next_argument::<$param>(&mut arguments)?;)*
            (self)($($param),*).into_slots()
          }),
        )
      }
    }
  };
}

impl_factory_fn!();
impl_factory_fn!(P1);
impl_factory_fn!(P1, P2);
impl_factory_fn!(P1, P2, P3);
impl_factory_fn!(P1, P2, P3, P4);
impl_factory_fn!(P1, P2, P3, P4, P5);
impl_factory_fn!(P1, P2, P3, P4, P5, P6);
impl_factory_fn!(P1, P2, P3, P4, P5, P6, P7);
impl_factory_fn!(P1, P2, P3, P4, P5, P6, P7, P8);
