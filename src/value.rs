//! Type-erased values and the reference-depth adapter
//!
//! A resolved [Value] remembers its concrete type and how many `Arc` layers separate it from its
//! canonical type. Before a value is written into a destination, the adapter adds or removes
//! layers until the value has the depth of the destination type, then downcasts it:
//!
//! * a `Config` written into an `Arc<Arc<Config>>` slot is wrapped twice,
//! * an `Arc<Config>` written into a `Config` slot is stripped once (cloning the pointee),
//! * anything else fails with [WiringError::TypeMismatch].

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::{TypeKey, WiringError};

/// A type which can be bound, resolved and injected.
///
/// Plain types implement it through the [injectable!](crate::injectable) macro, `Arc<T>` implements
/// it for every [Pointee] `T`.
pub trait Injectable: Clone + Send + Sync + 'static {
    /// Number of `Arc` layers between this type and its canonical type
    const DEPTH: usize;

    /// Canonical binding key
    fn type_key() -> TypeKey;

    /// Interfaces satisfied by the canonical type
    fn capabilities() -> Vec<Capability> {
        Vec::new()
    }

    /// Remove one layer of indirection, or return `None` for a canonical value.
    fn strip(self) -> Option<Value> {
        None
    }

    /// Adapt a resolved value to this type.
    fn from_value(value: Value) -> Result<Self, WiringError> {
        value.settle()
    }
}

/// A type which can sit behind an `Arc` layer.
///
/// Sized value types get one extra level of depth when wrapped, while interfaces (`dyn Trait`)
/// use `Arc<dyn Trait>` as their canonical handle.
pub trait Pointee: Send + Sync + 'static {
    /// Depth of `Arc<Self>`
    const ARC_DEPTH: usize;

    /// Canonical key of `Arc<Self>`
    fn arc_key() -> TypeKey;

    fn arc_capabilities() -> Vec<Capability> {
        Vec::new()
    }

    fn strip_arc(arc: Arc<Self>) -> Option<Value>;

    fn arc_from_value(value: Value) -> Result<Arc<Self>, WiringError>;
}

impl<T: ?Sized + Pointee> Injectable for Arc<T> {
    const DEPTH: usize = T::ARC_DEPTH;

    fn type_key() -> TypeKey {
        T::arc_key()
    }

    fn capabilities() -> Vec<Capability> {
        T::arc_capabilities()
    }

    fn strip(self) -> Option<Value> {
        T::strip_arc(self)
    }

    fn from_value(value: Value) -> Result<Self, WiringError> {
        T::arc_from_value(value)
    }
}

impl<T: ?Sized + Pointee> Pointee for Arc<T> {
    const ARC_DEPTH: usize = T::ARC_DEPTH + 1;

    fn arc_key() -> TypeKey {
        T::arc_key()
    }

    fn arc_capabilities() -> Vec<Capability> {
        T::arc_capabilities()
    }

    fn strip_arc(arc: Arc<Self>) -> Option<Value> {
        Some(Value::new(Arc::clone(&*arc)))
    }

    fn arc_from_value(value: Value) -> Result<Arc<Self>, WiringError> {
        arc_from_value(value)
    }
}

/// Adapt a value to `Arc<T>` for a sized `T`, wrapping it if it is not deep enough.
pub fn arc_from_value<T: Injectable + Pointee>(value: Value) -> Result<Arc<T>, WiringError> {
    if value.depth() < <Arc<T> as Injectable>::DEPTH {
        tracing::trace!(from = value.type_name(), to = type_name::<Arc<T>>(), "wrap");
        Ok(Arc::new(T::from_value(value)?))
    } else {
        value.settle()
    }
}

/// Conversion of a concrete value into an interface handle
pub type Cast = fn(Value) -> Result<Value, WiringError>;

/// Declare that a bound type can be used as an interface.
#[derive(Clone, Copy, Debug)]
pub struct Capability {
    interface: TypeKey,
    cast: Cast,
}

impl Capability {
    pub fn new(interface: TypeKey, cast: Cast) -> Self {
        Self { interface, cast }
    }

    pub fn interface(&self) -> &TypeKey {
        &self.interface
    }

    pub fn cast(&self) -> Cast {
        self.cast
    }
}

trait Layer: Send + Sync {
    fn depth(&self) -> usize;
    fn type_name(&self) -> &'static str;
    fn strip(self: Box<Self>) -> Option<Value>;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

struct Held<T>(T);

impl<T: Injectable> Layer for Held<T> {
    fn depth(&self) -> usize {
        T::DEPTH
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn strip(self: Box<Self>) -> Option<Value> {
        self.0.strip()
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        Box::new(self.0)
    }
}

/// Type-erased value produced by a provider
pub struct Value(Box<dyn Layer>);

impl Value {
    pub fn new<T: Injectable>(value: T) -> Self {
        Self(Box::new(Held(value)))
    }

    /// Reference depth of the concrete value
    pub fn depth(&self) -> usize {
        self.0.depth()
    }

    /// Name of the concrete type
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    /// Remove one `Arc` layer
    pub fn strip(self) -> Option<Value> {
        self.0.strip()
    }

    /// Adapt this value to the target type, adding or removing `Arc` layers as needed.
    pub fn adapt<T: Injectable>(self) -> Result<T, WiringError> {
        T::from_value(self)
    }

    /// Strip layers down to the depth of the target type, then downcast.
    ///
    /// This is the last step of [Value::adapt], it never adds layers.
    pub fn settle<T: Injectable>(self) -> Result<T, WiringError> {
        let mut value = self;
        while value.depth() > T::DEPTH {
            let from = value.type_name();
            tracing::trace!(from, to = type_name::<T>(), "strip");
            value = value.strip().ok_or(WiringError::TypeMismatch {
                from,
                to: type_name::<T>(),
            })?;
        }
        value.downcast()
    }

    fn downcast<T: Injectable>(self) -> Result<T, WiringError> {
        let from = self.type_name();
        self.0
            .into_any()
            .downcast::<T>()
            .map(|b| *b)
            .map_err(|_| WiringError::TypeMismatch {
                from,
                to: type_name::<T>(),
            })
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type", &self.type_name())
            .field("depth", &self.depth())
            .finish()
    }
}

/// Destination of an injected value
///
/// Implemented for all [Injectable] types, so that `&mut T` can be used where a `&mut dyn Slot`
/// is expected.
pub trait Slot {
    /// Canonical key of the destination type
    fn key(&self) -> TypeKey;

    /// Adapt the value to the destination type and overwrite the destination.
    fn assign(&mut self, value: Value) -> Result<(), WiringError>;
}

impl<T: Injectable> Slot for T {
    fn key(&self) -> TypeKey {
        T::type_key()
    }

    fn assign(&mut self, value: Value) -> Result<(), WiringError> {
        *self = T::from_value(value)?;
        Ok(())
    }
}
