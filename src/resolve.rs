//! Providers and the errors raised while wiring values
//!
//! * The [Provide] trait indicates that a struct can produce a [Value] for a requested key.
//!   The provider can either hold a singleton of the target type or act as a factory for
//!   on-demand instances.
//! * A [Resolver] is the result of a lookup in a [Container]: the provider found for a key and,
//!   if the key was matched through an interface, the cast from the bound type to the
//!   interface handle.

use std::marker::PhantomData;
use std::sync::Arc;

use thiserror::Error;

use crate::{Cast, Container, Injectable, TypeKey, Value};

/// Error produced by a wrapped function
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Provide a value for a canonical type
///
/// The container performing the resolution is passed along, it may differ from the container
/// where the provider was bound when the provider is reached through a parent.
pub trait Provide: Send + Sync {
    fn provide(&self, scope: &Container, key: &TypeKey) -> Result<Value, WiringError>;
}

/// Shared trait object implementing [Provide]
pub type Provider = Arc<dyn Provide>;

impl<F> Provide for F
where
    F: Fn(&Container, &TypeKey) -> Result<Value, WiringError> + Send + Sync,
{
    fn provide(&self, scope: &Container, key: &TypeKey) -> Result<Value, WiringError> {
        self(scope, key)
    }
}

/// Generic clone-based provider
pub struct SingletonProvider<T>(T);

impl<T> SingletonProvider<T> {
    pub fn build(data: T) -> Arc<Self> {
        Arc::new(SingletonProvider(data))
    }
}

impl<T: Injectable> Provide for SingletonProvider<T> {
    fn provide(&self, _scope: &Container, _key: &TypeKey) -> Result<Value, WiringError> {
        Ok(Value::new(self.0.clone()))
    }
}

/// Build a fresh default instance on every call
pub struct ZeroProvider<T>(PhantomData<fn() -> T>);

impl<T> ZeroProvider<T> {
    pub fn build() -> Arc<Self> {
        Arc::new(ZeroProvider(PhantomData))
    }
}

impl<T: Injectable + Default> Provide for ZeroProvider<T> {
    fn provide(&self, _scope: &Container, _key: &TypeKey) -> Result<Value, WiringError> {
        Ok(Value::new(T::default()))
    }
}

/// Generic provider for single-use instances based on a constructor closure
pub struct FactoryProvider<F, T> {
    factory: F,
    _target: PhantomData<fn() -> T>,
}

impl<F, T> FactoryProvider<F, T> {
    pub fn build(factory: F) -> Arc<Self> {
        Arc::new(Self {
            factory,
            _target: PhantomData,
        })
    }
}

impl<F, T> Provide for FactoryProvider<F, T>
where
    F: Fn(&Container) -> Result<T, WiringError> + Send + Sync,
    T: Injectable,
{
    fn provide(&self, scope: &Container, _key: &TypeKey) -> Result<Value, WiringError> {
        (self.factory)(scope).map(Value::new)
    }
}

/// Provide the resolving container itself
pub(crate) struct SelfProvider;

impl Provide for SelfProvider {
    fn provide(&self, scope: &Container, _key: &TypeKey) -> Result<Value, WiringError> {
        Ok(Value::new(scope.clone()))
    }
}

/// Provider found for a requested key
#[derive(Clone)]
pub struct Resolver {
    key: TypeKey,
    provider: Provider,
    cast: Option<Cast>,
}

impl Resolver {
    pub(crate) fn new(key: TypeKey, provider: Provider, cast: Option<Cast>) -> Self {
        Self {
            key,
            provider,
            cast,
        }
    }

    /// The requested key
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    /// Whether the provider was matched through an interface
    pub fn is_cast(&self) -> bool {
        self.cast.is_some()
    }

    /// Produce a value using the provider
    pub fn provide(&self, scope: &Container) -> Result<Value, WiringError> {
        let value = self.provider.provide(scope, &self.key)?;
        match self.cast {
            Some(cast) => cast(value),
            None => Ok(value),
        }
    }
}

/// Errors triggered during the wiring process
#[derive(Error, Debug)]
pub enum WiringError {
    #[error("Consistency error: type {type_name} is already bound in this container")]
    DuplicateBinding { type_name: &'static str },
    #[error("No provider bound for type {type_name}")]
    Unresolved { type_name: &'static str },
    #[error("Cannot assign from {from} to {to}")]
    TypeMismatch {
        from: &'static str,
        to: &'static str,
    },
    #[error("Expected {expected} destinations for the function outputs, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("Wrapped function failed: {0}")]
    Failure(#[source] BoxError),
}
