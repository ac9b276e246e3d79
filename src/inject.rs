use std::collections::HashMap;
use std::sync::Arc;

use crate::resolve::SelfProvider;
use crate::*;

/// Container settings
#[derive(Clone, Copy, Debug)]
pub struct Options {
    /// Resolve an interface through any bound type implementing it when the interface itself is
    /// not bound.
    pub interface_fallback: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interface_fallback: true,
        }
    }
}

#[derive(Clone)]
struct Binding {
    provider: Provider,
    capabilities: Vec<Capability>,
}

/// Dependency injection registry.
///
/// Bindings are keyed on the canonical type of the bound value. A child container keeps a
/// snapshot of its parent taken when the child was derived: bindings added to the parent
/// later are not visible from the child.
#[derive(Clone)]
pub struct Container {
    bindings: HashMap<TypeKey, Binding>,
    parent: Option<Arc<Container>>,
    options: Options,
}

impl Container {
    /// Create a root container, bound to itself.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        let mut container = Self {
            bindings: HashMap::new(),
            parent: None,
            options,
        };
        container.bindings.insert(
            Container::type_key(),
            Binding {
                provider: Arc::new(SelfProvider),
                capabilities: Vec::new(),
            },
        );
        container
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Derive a child container.
    ///
    /// The child starts empty and falls back to a copy of the current bindings of this container.
    pub fn child(&self) -> Container {
        tracing::debug!(bindings = self.bindings.len(), "derive child container");
        Container {
            bindings: HashMap::new(),
            parent: Some(Arc::new(self.clone())),
            options: self.options,
        }
    }

    /// Bind a provider to the canonical type of `S`.
    ///
    /// Return an error if this type is already bound in this container
    pub fn bind_provider<S, F>(&mut self, provider: F) -> Result<(), WiringError>
    where
        S: Injectable,
        F: Fn(&Container, &TypeKey) -> Result<Value, WiringError> + Send + Sync + 'static,
    {
        self.bind_with::<S>(Arc::new(provider))
    }

    /// Bind a value returned on every resolution of its canonical type
    pub fn bind_singleton<T: Injectable>(&mut self, value: T) -> Result<(), WiringError> {
        self.bind_with::<T>(SingletonProvider::build(value))
    }

    /// Bind the canonical type of `T` to fresh default instances
    pub fn bind_zero_value<T: Injectable + Default>(&mut self) -> Result<(), WiringError> {
        self.bind_with::<T>(ZeroProvider::<T>::build())
    }

    /// Bind a constructor called on every resolution.
    ///
    /// The constructor receives the resolving container and may resolve its own dependencies.
    pub fn bind_factory<T, F>(&mut self, factory: F) -> Result<(), WiringError>
    where
        T: Injectable,
        F: Fn(&Container) -> Result<T, WiringError> + Send + Sync + 'static,
    {
        self.bind_with::<T>(FactoryProvider::<F, T>::build(factory))
    }

    fn bind_with<S: Injectable>(&mut self, provider: Provider) -> Result<(), WiringError> {
        let key = S::type_key();
        if self.bindings.contains_key(&key) {
            return Err(WiringError::DuplicateBinding {
                type_name: key.name(),
            });
        }
        tracing::debug!(type_name = key.name(), depth = S::DEPTH, "bind");
        self.bindings.insert(
            key,
            Binding {
                provider,
                capabilities: S::capabilities(),
            },
        );
        Ok(())
    }

    /// Find the provider for a canonical key.
    ///
    /// Local bindings come first, then the parent chain. Interfaces which are not bound
    /// explicitly can be matched by a local binding implementing them.
    pub fn provider_for(&self, key: &TypeKey) -> Option<Resolver> {
        if let Some(binding) = self.bindings.get(key) {
            return Some(Resolver::new(*key, binding.provider.clone(), None));
        }
        if let Some(resolver) = self.parent.as_ref().and_then(|p| p.provider_for(key)) {
            tracing::trace!(type_name = key.name(), "found in parent");
            return Some(resolver);
        }
        if key.is_interface() && self.options.interface_fallback {
            // first match wins, the iteration order is unspecified
            for (bound, binding) in &self.bindings {
                if let Some(cap) = binding.capabilities.iter().find(|c| c.interface() == key) {
                    tracing::trace!(
                        type_name = key.name(),
                        implementor = bound.name(),
                        "interface fallback"
                    );
                    let provider = binding.provider.clone();
                    return Some(Resolver::new(*key, provider, Some(cap.cast())));
                }
            }
        }
        None
    }

    /// Whether a provider can be found for the canonical type of `T`
    pub fn is_bound<T: Injectable>(&self) -> bool {
        self.provider_for(&T::type_key()).is_some()
    }

    /// Obtain an instance of the target type.
    pub fn resolve<T: Injectable>(&self) -> Result<T, WiringError> {
        let key = T::type_key();
        let resolver = self.provider_for(&key).ok_or(WiringError::Unresolved {
            type_name: key.name(),
        })?;
        resolver.provide(self)?.adapt()
    }

    /// Resolve the type of the destination and write the value into it.
    ///
    /// Return `false` if no provider was found, the destination is then left untouched.
    pub fn provide_into(&self, to: &mut dyn Slot) -> Result<bool, WiringError> {
        let Some(resolver) = self.provider_for(&to.key()) else {
            return Ok(false);
        };
        to.assign(resolver.provide(self)?)?;
        Ok(true)
    }

    /// Inject all resolvable fields of a record.
    ///
    /// Fields without a provider are skipped and keep their current value.
    pub fn inject<R: Record + ?Sized>(&self, target: &mut R) -> Result<(), WiringError> {
        for mut field in target.fields() {
            let name = field.name();
            if self.provide_into(field.slot())? {
                tracing::trace!(field = name, "injected");
            } else {
                let type_name = field.key().name();
                tracing::trace!(field = name, type_name, "no provider, skipped");
            }
        }
        Ok(())
    }

    /// Prepare a function for repeated calls with injected arguments.
    ///
    /// Providers are looked up once for every parameter, missing providers are reported when
    /// the function is invoked.
    pub fn pre_inject_all<Args, Ret, F>(&self, function: F) -> InjectedFunction
    where
        F: Callable<Args, Ret>,
    {
        function.pre_inject(self)
    }

    /// Call a function after injecting its parameter(s).
    pub fn call<Args, Ret, F>(&self, function: &F) -> Result<Ret, WiringError>
    where
        F: Callable<Args, Ret>,
    {
        function.inject_and_call(self)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

crate::injectable!(Container);

/// A structured record with injectable fields
///
/// Use the [record!](crate::record) macro to list the externally settable fields.
pub trait Record {
    fn fields(&mut self) -> Vec<Field<'_>>;
}

/// Mutable access to a settable field of a [Record]
pub struct Field<'a> {
    name: &'static str,
    slot: &'a mut dyn Slot,
}

impl<'a> Field<'a> {
    pub fn new<T: Injectable>(name: &'static str, slot: &'a mut T) -> Self {
        Self { name, slot }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn key(&self) -> TypeKey {
        self.slot.key()
    }

    pub fn slot(&mut self) -> &mut dyn Slot {
        &mut *self.slot
    }
}
