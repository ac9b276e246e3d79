//! Runtime dependency injection with a type-keyed provider registry.
//!
//! A [Container] maps canonical types to providers. It can produce a value of a requested type,
//! fill the settable fields of a record and call arbitrary functions with injected arguments.
//!
//! # Simple use case
//!
//! ```
//! # use std::sync::Arc;
//! # use rt_inject::*;
//! // Define traits and implementors
//! trait Logger: Send + Sync {
//!     fn prefix(&self) -> String;
//! }
//! interface!(dyn Logger);
//!
//! #[derive(Clone, Default)]
//! struct StdoutLogger;
//!
//! impl Logger for StdoutLogger {
//!     fn prefix(&self) -> String {
//!         "[stdout]".into()
//!     }
//! }
//! injectable!(StdoutLogger: dyn Logger);
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Settings {
//!     verbose: bool,
//! }
//! injectable!(Settings);
//!
//! // A record with injectable fields
//! struct Service {
//!     logger: Option<Arc<dyn Logger>>,
//!     settings: Arc<Settings>,
//! }
//! record!(Service { settings });
//!
//! # fn main() -> Result<(), WiringError> {
//! let mut container = Container::new();
//! container.bind_singleton(Settings { verbose: true })?;
//! container.bind_zero_value::<StdoutLogger>()?;
//!
//! // Values are adapted to the requested number of Arc layers
//! let settings: Arc<Arc<Settings>> = container.resolve()?;
//! assert!(settings.verbose);
//!
//! // Interfaces are matched by the bound implementors
//! let logger: Arc<dyn Logger> = container.resolve()?;
//! assert_eq!(logger.prefix(), "[stdout]");
//!
//! let mut service = Service {
//!     logger: None,
//!     settings: Arc::new(Settings { verbose: false }),
//! };
//! container.inject(&mut service)?;
//! assert!(service.settings.verbose);
//! # Ok(())
//! # }
//! ```
//!
//! # Mechanism
//!
//! Rust has no runtime reflection, so types opt into resolution through explicit tags:
//!
//! * The [Injectable] trait gives the canonical [TypeKey] of a type and its reference depth.
//!   It is implemented for plain types with the [injectable!] macro and for `Arc<T>`,
//!   each `Arc` layer adding one level of depth.
//! * The [interface!] macro declares a trait object as an interface, resolved as `Arc<dyn Trait>`.
//! * The [record!] macro lists the fields of a struct which can be injected.
//! * The [Callable] trait is implemented for all functions with up to 10 injectable arguments.
//!
//! Bindings are keyed on the canonical type: binding `Arc<Settings>` and then `Settings` in the
//! same container fails with [WiringError::DuplicateBinding]. When a value is written into a
//! destination, `Arc` layers are added or removed until it matches the destination type.
//!
//! Child containers are derived from a snapshot of their parent: they see the bindings of the
//! parent at the time of their creation and can shadow them with their own.

mod function;
mod helpers;
mod inject;
mod key;
mod resolve;
mod value;

pub use function::{
    Actualized, ActualizedNoError, Callable, InjectedFunction, Outcome, Returns, Setter,
    SetterNoError, Values,
};
pub use inject::{Container, Field, Options, Record};
pub use key::{Kind, TypeKey};
pub use resolve::{
    BoxError, FactoryProvider, Provide, Provider, Resolver, SingletonProvider, WiringError,
    ZeroProvider,
};
pub use value::{arc_from_value, Capability, Cast, Injectable, Pointee, Slot, Value};

#[cfg(test)]
mod tests;
