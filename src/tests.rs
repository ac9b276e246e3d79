use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use crate::{injectable, interface, record};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Config {
    name: String,
}
injectable!(Config);

#[derive(Clone, Debug, Default, PartialEq)]
struct Alpha;
injectable!(Alpha);

#[derive(Clone, Debug, Default, PartialEq)]
struct Beta {
    x: i32,
}
injectable!(Beta);

#[derive(Clone, Debug, PartialEq)]
struct Ticket(usize);
injectable!(Ticket);

#[derive(Debug, PartialEq)]
struct Boom;

impl fmt::Display for Boom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("boom")
    }
}

impl std::error::Error for Boom {}

trait Animal: Send + Sync {
    fn name(&self) -> String;
}
interface!(dyn Animal);

#[derive(Clone)]
struct Dog {
    name: &'static str,
}

impl Animal for Dog {
    fn name(&self) -> String {
        self.name.to_string()
    }
}
injectable!(Dog: dyn Animal);

fn config(name: &str) -> Config {
    Config { name: name.into() }
}

fn is_duplicate<T>(result: &Result<T, WiringError>) -> bool {
    matches!(result, Err(WiringError::DuplicateBinding { .. }))
}

#[test]
fn canonical_keys_strip_arc_layers() {
    let key = TypeKey::canonical::<Arc<Arc<Config>>>();
    assert_eq!(key, TypeKey::of::<Config>());
    assert_eq!(key, TypeKey::canonical::<Config>());
    assert_eq!(TypeKey::depth::<Config>(), 0);
    assert_eq!(TypeKey::depth::<Arc<Arc<Config>>>(), 2);

    assert_eq!(key.kind(), Kind::Value);
    let animal = TypeKey::canonical::<Arc<dyn Animal>>();
    assert!(animal.is_interface());
    assert_eq!(animal.kind(), Kind::Interface);
    assert_eq!(animal, TypeKey::canonical::<Arc<Arc<dyn Animal>>>());
    assert_eq!(TypeKey::depth::<Arc<dyn Animal>>(), 0);
    assert_eq!(TypeKey::depth::<Arc<Arc<dyn Animal>>>(), 1);
}

#[test]
fn singleton_is_identity_preserving() -> Result<(), WiringError> {
    init_tracing();
    let shared = Arc::new(config("shared"));
    let mut container = Container::new();
    container.bind_singleton(shared.clone())?;

    for _ in 0..3 {
        let resolved: Arc<Config> = container.resolve()?;
        assert!(Arc::ptr_eq(&shared, &resolved));
    }
    let copy: Config = container.resolve()?;
    assert_eq!(copy, config("shared"));
    Ok(())
}

#[test]
fn zero_value_builds_fresh_instances() -> Result<(), WiringError> {
    let mut container = Container::new();
    container.bind_zero_value::<Arc<Config>>()?;

    let first: Arc<Config> = container.resolve()?;
    let second: Arc<Config> = container.resolve()?;
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(*first, Config::default());
    Ok(())
}

#[test]
fn duplicate_bindings_are_rejected() -> Result<(), WiringError> {
    let mut container = Container::new();
    container.bind_singleton(config("first"))?;

    let again = container.bind_singleton(config("second"));
    assert!(is_duplicate(&again));
    let zero = container.bind_zero_value::<Config>();
    assert!(is_duplicate(&zero));
    let provider = container
        .bind_provider::<Config, _>(|_, _| Ok(Value::new(config("p"))));
    assert!(is_duplicate(&provider));

    // the canonical type is the same at any depth
    let deeper = container.bind_singleton(Arc::new(Arc::new(config("deep"))));
    assert!(is_duplicate(&deeper));

    container.bind_zero_value::<Beta>()?;
    let factory = container.bind_factory(|_| Ok(Beta { x: 1 }));
    assert!(is_duplicate(&factory));

    // the first binding is kept
    assert_eq!(container.resolve::<Config>()?, config("first"));
    Ok(())
}

#[test]
fn children_see_a_snapshot_of_their_parent() -> Result<(), WiringError> {
    init_tracing();
    let mut parent = Container::new();
    parent.bind_singleton(config("parent"))?;

    let mut child = parent.child();
    let sibling = parent.child();
    parent.bind_singleton(Beta { x: 3 })?;

    assert_eq!(child.resolve::<Config>()?, config("parent"));
    assert!(!child.is_bound::<Beta>());
    assert!(parent.is_bound::<Beta>());

    child.bind_singleton(Alpha)?;
    assert!(child.is_bound::<Alpha>());
    assert!(!parent.is_bound::<Alpha>());
    assert!(!sibling.is_bound::<Alpha>());

    // a child can shadow a parent binding
    child.bind_singleton(config("child"))?;
    assert_eq!(child.resolve::<Config>()?, config("child"));
    assert_eq!(parent.resolve::<Config>()?, config("parent"));
    assert_eq!(sibling.resolve::<Config>()?, config("parent"));
    Ok(())
}

struct Holder {
    config: Arc<Config>,
    beta: Beta,
    alpha: Option<Alpha>,
    scope: Option<Container>,
}
record!(Holder { config, beta });

struct Scoped {
    container: Container,
    ticket: Ticket,
}
record!(Scoped { container, ticket });

#[test]
fn inject_sets_resolvable_fields() -> Result<(), WiringError> {
    let mut container = Container::new();
    container.bind_singleton(config("injected"))?;

    let mut holder = Holder {
        config: Arc::new(config("initial")),
        beta: Beta { x: -1 },
        alpha: None,
        scope: None,
    };
    container.inject(&mut holder)?;
    assert_eq!(*holder.config, config("injected"));
    assert_eq!(holder.beta, Beta { x: -1 });
    assert!(holder.alpha.is_none());
    assert!(holder.scope.is_none());

    // injecting again writes the same values
    container.inject(&mut holder)?;
    assert_eq!(*holder.config, config("injected"));
    Ok(())
}

#[test]
fn container_injects_itself() -> Result<(), WiringError> {
    let mut container = Container::new();
    container.bind_singleton(Ticket(9))?;

    let mut scoped = Scoped {
        container: Container::with_options(Options::default()),
        ticket: Ticket(0),
    };
    container.inject(&mut scoped)?;
    assert_eq!(scoped.ticket, Ticket(9));
    assert!(scoped.container.is_bound::<Ticket>());

    let resolved: Arc<Container> = container.resolve()?;
    assert_eq!(resolved.resolve::<Ticket>()?, Ticket(9));

    // a child resolves itself, not the root
    let mut child = container.child();
    child.bind_singleton(Alpha)?;
    let resolved: Container = child.resolve()?;
    assert!(resolved.is_bound::<Alpha>());
    assert!(resolved.is_bound::<Ticket>());
    assert!(!container.is_bound::<Alpha>());
    Ok(())
}

#[test]
fn values_are_wrapped_to_the_requested_depth() -> Result<(), WiringError> {
    let mut container = Container::new();
    container.bind_singleton(config("plain"))?;

    let wrapped: Arc<Arc<Config>> = container.resolve()?;
    assert_eq!(**wrapped, config("plain"));

    let mut slot: Arc<Arc<Config>> = Arc::default();
    assert!(container.provide_into(&mut slot)?);
    assert_eq!(**slot, config("plain"));
    Ok(())
}

#[test]
fn values_are_stripped_to_the_requested_depth() -> Result<(), WiringError> {
    let inner = Arc::new(config("inner"));
    let mut container = Container::new();
    container.bind_singleton(Arc::new(inner.clone()))?;

    let stripped: Arc<Config> = container.resolve()?;
    assert!(Arc::ptr_eq(&inner, &stripped));
    let plain: Config = container.resolve()?;
    assert_eq!(plain, config("inner"));
    Ok(())
}

#[test]
fn provider_returning_another_type_is_a_mismatch() -> Result<(), WiringError> {
    let mut container = Container::new();
    container.bind_provider::<Config, _>(|_, _| Ok(Value::new(Arc::new(Beta { x: 1 }))))?;

    match container.resolve::<Config>() {
        Err(WiringError::TypeMismatch { from, to }) => {
            assert!(from.ends_with("Beta"));
            assert!(to.ends_with("Config"));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let mut slot = Config::default();
    assert!(container.provide_into(&mut slot).is_err());
    assert_eq!(slot, Config::default());
    Ok(())
}

#[test]
fn unbound_types_are_unresolved() {
    let container = Container::new();
    assert!(matches!(
        container.resolve::<Beta>(),
        Err(WiringError::Unresolved { .. })
    ));

    let mut slot = Beta { x: 4 };
    assert!(!container.provide_into(&mut slot).unwrap());
    assert_eq!(slot, Beta { x: 4 });
}

#[test]
fn interfaces_fall_back_to_implementors() -> Result<(), WiringError> {
    init_tracing();
    let mut container = Container::new();
    container.bind_singleton(Dog { name: "rex" })?;

    let animal: Arc<dyn Animal> = container.resolve()?;
    assert_eq!(animal.name(), "rex");
    let wrapped: Arc<Arc<dyn Animal>> = container.resolve()?;
    assert_eq!(wrapped.name(), "rex");

    // the fallback also goes through the parent chain
    let child = container.child();
    let animal: Arc<dyn Animal> = child.resolve()?;
    assert_eq!(animal.name(), "rex");
    Ok(())
}

#[test]
fn interface_fallback_keeps_shared_instances() -> Result<(), WiringError> {
    let dog = Arc::new(Dog { name: "fido" });
    let mut container = Container::new();
    container.bind_singleton(dog.clone())?;

    let animal: Arc<dyn Animal> = container.resolve()?;
    assert_eq!(Arc::as_ptr(&dog) as *const (), Arc::as_ptr(&animal) as *const ());
    Ok(())
}

#[test]
fn explicit_interface_bindings_win() -> Result<(), WiringError> {
    let mut container = Container::new();
    container.bind_singleton(Dog { name: "implementor" })?;
    let explicit: Arc<dyn Animal> = Arc::new(Dog { name: "explicit" });
    container.bind_singleton(explicit)?;

    let animal: Arc<dyn Animal> = container.resolve()?;
    assert_eq!(animal.name(), "explicit");
    Ok(())
}

#[derive(Clone)]
struct Cat;

impl Animal for Cat {
    fn name(&self) -> String {
        "cat".into()
    }
}
injectable!(Cat: dyn Animal);

#[test]
fn parent_implementor_wins_over_child_fallback() -> Result<(), WiringError> {
    init_tracing();
    let mut parent = Container::new();
    parent.bind_singleton(Dog { name: "parent-dog" })?;

    let mut child = parent.child();
    child.bind_singleton(Cat)?;

    let animal: Arc<dyn Animal> = child.resolve()?;
    assert_eq!(animal.name(), "parent-dog");

    let resolver = child
        .provider_for(&TypeKey::canonical::<Arc<dyn Animal>>())
        .ok_or(WiringError::Unresolved { type_name: "Animal" })?;
    assert!(resolver.is_cast());
    assert!(resolver.key().is_interface());
    Ok(())
}

#[test]
fn parent_interface_binding_wins_over_child_fallback() -> Result<(), WiringError> {
    let mut parent = Container::new();
    let explicit: Arc<dyn Animal> = Arc::new(Dog { name: "explicit" });
    parent.bind_singleton(explicit)?;

    let mut child = parent.child();
    child.bind_singleton(Cat)?;

    let animal: Arc<dyn Animal> = child.resolve()?;
    assert_eq!(animal.name(), "explicit");

    let resolver = child
        .provider_for(&TypeKey::canonical::<Arc<dyn Animal>>())
        .ok_or(WiringError::Unresolved { type_name: "Animal" })?;
    assert!(!resolver.is_cast());

    // without any binding in the chain, the child falls back to its own implementor
    let mut lonely = Container::new().child();
    lonely.bind_singleton(Cat)?;
    let animal: Arc<dyn Animal> = lonely.resolve()?;
    assert_eq!(animal.name(), "cat");
    Ok(())
}

#[test]
fn interface_fallback_can_be_disabled() -> Result<(), WiringError> {
    let mut container = Container::with_options(Options {
        interface_fallback: false,
    });
    assert!(!container.options().interface_fallback);
    assert!(!container.child().options().interface_fallback);
    assert!(Container::new().options().interface_fallback);
    container.bind_singleton(Dog { name: "rex" })?;

    assert!(!container.is_bound::<Arc<dyn Animal>>());
    assert!(!container.child().is_bound::<Arc<dyn Animal>>());
    assert!(container.is_bound::<Dog>());
    Ok(())
}

fn make_beta(_alpha: Alpha) -> Result<Beta, Boom> {
    Ok(Beta { x: 5 })
}

fn fail_beta(_alpha: Alpha) -> Result<Beta, Boom> {
    Err(Boom)
}

#[test]
fn actualized_function_writes_outputs() -> Result<(), WiringError> {
    init_tracing();
    let mut container = Container::new();
    container.bind_zero_value::<Alpha>()?;
    container.bind_zero_value::<Beta>()?;

    let injected = container.pre_inject_all(make_beta);
    assert_eq!(injected.outputs(), 1);
    assert_eq!(injected.failure_slot(), Some(1));

    let mut beta = Beta::default();
    injected.actualize().invoke()?.set(&mut [&mut beta])?;
    assert_eq!(beta, Beta { x: 5 });

    // outputs are adapted like any other value
    let mut shared: Arc<Beta> = Arc::default();
    injected.actualize().invoke()?.set(&mut [&mut shared])?;
    assert_eq!(*shared, Beta { x: 5 });
    Ok(())
}

#[test]
fn actualized_function_returns_failures() -> Result<(), WiringError> {
    let mut container = Container::new();
    container.bind_zero_value::<Alpha>()?;
    container.bind_zero_value::<Beta>()?;

    let injected = container.pre_inject_all(fail_beta);
    let mut beta = Beta { x: -1 };
    let err = injected.actualize().invoke()?.set(&mut [&mut beta]).unwrap_err();
    match err {
        WiringError::Failure(source) => assert_eq!(source.downcast_ref::<Boom>(), Some(&Boom)),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(beta, Beta { x: -1 });
    Ok(())
}

#[test]
fn setter_checks_the_number_of_destinations() -> Result<(), WiringError> {
    let mut container = Container::new();
    container.bind_zero_value::<Alpha>()?;
    let injected = container.pre_inject_all(make_beta);
    let actualized = injected.actualize();

    let none = actualized.invoke()?.set(&mut []);
    assert!(matches!(
        none,
        Err(WiringError::ArityMismatch {
            expected: 1,
            actual: 0
        })
    ));

    let (mut first, mut second) = (Beta::default(), Beta::default());
    let two = actualized.invoke()?.set(&mut [&mut first, &mut second]);
    assert!(matches!(
        two,
        Err(WiringError::ArityMismatch {
            expected: 1,
            actual: 2
        })
    ));
    assert_eq!(first, Beta::default());
    Ok(())
}

#[test]
fn missing_arguments_fail_at_call_time() -> Result<(), WiringError> {
    let mut container = Container::new();
    let injected = container.pre_inject_all(make_beta);
    assert!(matches!(
        injected.actualize().invoke(),
        Err(WiringError::Unresolved { .. })
    ));

    // providers are looked up when the function is prepared
    container.bind_zero_value::<Alpha>()?;
    assert!(injected.actualize().invoke().is_err());
    let mut beta = Beta::default();
    container
        .pre_inject_all(make_beta)
        .actualize()
        .invoke()?
        .set(&mut [&mut beta])?;
    assert_eq!(beta.x, 5);
    Ok(())
}

#[test]
fn arguments_are_resolved_on_every_invocation() -> Result<(), WiringError> {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut container = Container::new();
    let source = counter.clone();
    container.bind_factory(move |_| Ok(Ticket(source.fetch_add(1, Ordering::SeqCst))))?;

    let injected = container.pre_inject_all(|ticket: Ticket| ticket);
    assert_eq!(injected.failure_slot(), None);
    let actualized = injected.actualize();

    let mut ticket = Ticket(usize::MAX);
    actualized.invoke()?.set(&mut [&mut ticket])?;
    assert_eq!(ticket, Ticket(0));
    actualized.invoke()?.set(&mut [&mut ticket])?;
    assert_eq!(ticket, Ticket(1));
    injected.actualize().invoke()?.set(&mut [&mut ticket])?;
    assert_eq!(ticket, Ticket(2));
    assert_eq!(counter.load(Ordering::SeqCst), 3);
    Ok(())
}

fn split(beta: Beta, count: u32) -> (Beta, u32, String) {
    (Beta { x: beta.x * 2 }, count + 1, format!("{count}"))
}

#[test]
fn multiple_outputs_are_written_in_order() -> Result<(), WiringError> {
    let mut container = Container::new();
    container.bind_singleton(Beta { x: 21 })?;
    container.bind_singleton(41u32)?;

    let injected = container.pre_inject_all(split);
    assert_eq!(injected.outputs(), 3);

    let (mut beta, mut count, mut text) = (Beta::default(), 0u32, String::new());
    injected
        .actualize_no_error()
        .invoke()
        .set(&mut [&mut beta, &mut count, &mut text]);
    assert_eq!(beta, Beta { x: 42 });
    assert_eq!(count, 42);
    assert_eq!(text, "41");
    Ok(())
}

#[derive(Clone, Default)]
struct Calls(Arc<AtomicUsize>);
injectable!(Calls);

#[test]
fn functions_without_outputs() -> Result<(), WiringError> {
    let calls = Calls::default();
    let mut container = Container::new();
    container.bind_singleton(calls.clone())?;

    let injected = container.pre_inject_all(|calls: Calls| {
        calls.0.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(injected.outputs(), 0);
    injected.actualize().invoke()?.set(&mut [])?;
    injected.actualize_no_error().invoke().set(&mut []);
    assert_eq!(calls.0.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
#[should_panic(expected = "Wrapped function failed: boom")]
fn no_error_variant_panics_on_failure() {
    let mut container = Container::new();
    container.bind_zero_value::<Alpha>().unwrap();
    let mut beta = Beta::default();
    container
        .pre_inject_all(fail_beta)
        .actualize_no_error()
        .invoke()
        .set(&mut [&mut beta]);
}

#[test]
#[should_panic(expected = "No provider bound")]
fn no_error_variant_panics_on_missing_arguments() {
    let container = Container::new();
    container.pre_inject_all(make_beta).actualize_no_error().invoke();
}

#[test]
fn call_injects_arguments_once() -> Result<(), WiringError> {
    let mut container = Container::new();
    container.bind_zero_value::<Alpha>()?;
    container.bind_singleton(config("called"))?;

    let beta = container.call(&make_beta)?;
    assert_eq!(beta, Ok(Beta { x: 5 }));

    let name = container.call(&|config: Arc<Config>, _alpha: Alpha| config.name.clone())?;
    assert_eq!(name, "called");
    Ok(())
}

#[test]
fn factories_resolve_their_dependencies() -> Result<(), WiringError> {
    let mut parent = Container::new();
    parent.bind_factory(|scope| Ok(Beta { x: scope.resolve::<i32>()? }))?;

    // the factory resolves through the container performing the resolution
    let mut child = parent.child();
    child.bind_singleton(7i32)?;
    assert_eq!(child.resolve::<Beta>()?, Beta { x: 7 });
    assert!(matches!(
        parent.resolve::<Beta>(),
        Err(WiringError::Unresolved { .. })
    ));
    Ok(())
}
