//! Canonical type identities used as binding keys

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::Injectable;

/// What a [TypeKey] names
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// A plain value type
    Value,
    /// A trait object, resolved through `Arc<dyn Trait>`
    Interface,
}

/// Canonical runtime identity of a type, with all `Arc` layers removed.
///
/// Equality and hashing only look at the [TypeId], the name is kept for error messages.
#[derive(Clone, Copy, Debug)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    kind: Kind,
}

impl TypeKey {
    /// Key of a plain value type
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            kind: Kind::Value,
        }
    }

    /// Key of an interface, given as the trait object type (`dyn Trait`)
    pub fn interface<T: ?Sized + 'static>() -> Self {
        Self {
            kind: Kind::Interface,
            ..Self::of::<T>()
        }
    }

    /// Canonical key of an injectable type: `Config`, `Arc<Config>` and
    /// `Arc<Arc<Config>>` all map to the key of `Config`.
    pub fn canonical<T: Injectable>() -> Self {
        T::type_key()
    }

    /// Number of `Arc` layers between `T` and its canonical type
    pub fn depth<T: Injectable>() -> usize {
        T::DEPTH
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == Kind::Interface
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
