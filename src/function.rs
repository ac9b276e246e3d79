//! Call arbitrary functions with arguments resolved from a [Container]
//!
//! [Container::pre_inject_all] wraps a function into an [InjectedFunction]. Actualizing it
//! gives a factory which resolves fresh arguments, calls the function and hands back a
//! [Setter] writing the return values into caller-provided destinations:
//!
//! ```
//! # use rt_inject::*;
//! #[derive(Clone, Default)]
//! struct Port(u16);
//! injectable!(Port);
//!
//! fn describe(port: Port) -> Result<String, std::fmt::Error> {
//!     Ok(format!("listening on {}", port.0))
//! }
//!
//! # fn main() -> Result<(), WiringError> {
//! let mut container = Container::new();
//! container.bind_singleton(Port(8080))?;
//!
//! let injected = container.pre_inject_all(describe);
//! let mut text = String::new();
//! injected.actualize().invoke()?.set(&mut [&mut text])?;
//! assert_eq!(text, "listening on 8080");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::*;

/// Ordinary outputs of a call, or the error it returned
pub type Outcome = Result<Vec<Value>, BoxError>;

type Caller = dyn Fn() -> Result<Outcome, WiringError> + Send + Sync;

/// Infallible return values of a function
pub trait Values: Sized + 'static {
    const COUNT: usize;
    fn into_values(self) -> Vec<Value>;
}

impl Values for () {
    const COUNT: usize = 0;
    fn into_values(self) -> Vec<Value> {
        Vec::new()
    }
}

impl<T: Injectable> Values for T {
    const COUNT: usize = 1;
    fn into_values(self) -> Vec<Value> {
        vec![Value::new(self)]
    }
}

/// Return type of an injectable function
///
/// The `Err` side of a `Result` is the failure slot: it consumes no destination and is
/// reported instead of the ordinary outputs.
pub trait Returns: Sized + 'static {
    /// Number of ordinary outputs
    const OUTPUTS: usize;
    /// Position of the failure output, after the ordinary ones
    const FAILURE_SLOT: Option<usize> = None;
    fn into_outcome(self) -> Outcome;
}

impl<V: Values> Returns for V {
    const OUTPUTS: usize = V::COUNT;
    fn into_outcome(self) -> Outcome {
        Ok(self.into_values())
    }
}

impl<V: Values, E: Into<BoxError> + 'static> Returns for Result<V, E> {
    const OUTPUTS: usize = V::COUNT;
    const FAILURE_SLOT: Option<usize> = Some(V::COUNT);
    fn into_outcome(self) -> Outcome {
        self.map(Values::into_values).map_err(Into::into)
    }
}

macro_rules! values_tuple ({ $count:literal: $($param:ident)+ } => {
    impl<$($param: Injectable,)+> Values for ($($param,)+) {
        const COUNT: usize = $count;

        #[allow(non_snake_case)]
        fn into_values(self) -> Vec<Value> {
            let ($($param,)+) = self;
            vec![$(Value::new($param),)+]
        }
    }
});

values_tuple! { 2: A B }
values_tuple! { 3: A B C }
values_tuple! { 4: A B C D }
values_tuple! { 5: A B C D E }
values_tuple! { 6: A B C D E F }

/// A function whose parameters can all be injected
///
/// This trait is implemented for all functions with up to 10 arguments, using a tuple to
/// wrap the parameter types in a single type.
pub trait Callable<Args, Ret> {
    /// Resolve all parameters and call the function once.
    fn inject_and_call(&self, container: &Container) -> Result<Ret, WiringError>;

    /// Look up a provider for every parameter and wrap the function for later calls.
    fn pre_inject(self, container: &Container) -> InjectedFunction;
}

fn argument<T: Injectable>(
    scope: &Container,
    resolver: Option<&Resolver>,
) -> Result<T, WiringError> {
    let resolver = resolver.ok_or(WiringError::Unresolved {
        type_name: T::type_key().name(),
    })?;
    resolver.provide(scope)?.adapt()
}

macro_rules! callable_tuple ({ $($param:ident)* } => {
    impl<Func, Ret, $($param,)*> Callable<($($param,)*), Ret> for Func
    where
        Func: Fn($($param),*) -> Ret + Send + Sync + 'static,
        Ret: Returns,
        $($param: Injectable,)*
    {
        #[inline]
        #[allow(unused_variables)]
        fn inject_and_call(&self, container: &Container) -> Result<Ret, WiringError> {
            Ok((self)($(container.resolve::<$param>()?,)*))
        }

        #[allow(non_snake_case, unused_variables)]
        fn pre_inject(self, container: &Container) -> InjectedFunction {
            $(let $param = container.provider_for(&<$param as Injectable>::type_key());)*
            let scope = container.clone();
            let caller = move || -> Result<Outcome, WiringError> {
                Ok((self)($(argument::<$param>(&scope, $param.as_ref())?,)*).into_outcome())
            };
            InjectedFunction::new::<Ret>(Arc::new(caller))
        }
    }
});

callable_tuple! {}
callable_tuple! { A }
callable_tuple! { A B }
callable_tuple! { A B C }
callable_tuple! { A B C D }
callable_tuple! { A B C D E }
callable_tuple! { A B C D E F }
callable_tuple! { A B C D E F G }
callable_tuple! { A B C D E F G H }
callable_tuple! { A B C D E F G H I }
callable_tuple! { A B C D E F G H I J }

/// A function wrapped with pre-resolved argument providers
#[derive(Clone)]
pub struct InjectedFunction {
    caller: Arc<Caller>,
    outputs: usize,
    failure_slot: Option<usize>,
}

impl InjectedFunction {
    fn new<R: Returns>(caller: Arc<Caller>) -> Self {
        Self {
            caller,
            outputs: R::OUTPUTS,
            failure_slot: R::FAILURE_SLOT,
        }
    }

    /// Number of destinations expected by the setters
    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn failure_slot(&self) -> Option<usize> {
        self.failure_slot
    }

    /// Deferred invocation returning errors to the caller
    pub fn actualize(&self) -> Actualized {
        Actualized(self.clone())
    }

    /// Deferred invocation panicking on any error
    pub fn actualize_no_error(&self) -> ActualizedNoError {
        ActualizedNoError(self.actualize())
    }
}

/// Setter factory returned by [InjectedFunction::actualize]
#[derive(Clone)]
pub struct Actualized(InjectedFunction);

impl Actualized {
    /// Resolve fresh arguments and call the function.
    pub fn invoke(&self) -> Result<Setter, WiringError> {
        let outcome = (self.0.caller)()?;
        Ok(Setter {
            outcome,
            outputs: self.0.outputs,
        })
    }
}

/// Setter factory returned by [InjectedFunction::actualize_no_error]
#[derive(Clone)]
pub struct ActualizedNoError(Actualized);

impl ActualizedNoError {
    /// Resolve fresh arguments and call the function.
    ///
    /// Panics if an argument can not be resolved.
    #[track_caller]
    pub fn invoke(&self) -> SetterNoError {
        match self.0.invoke() {
            Ok(setter) => SetterNoError(setter),
            Err(err) => panic!("{err}"),
        }
    }
}

/// Results of a call, waiting to be written into destinations
pub struct Setter {
    outcome: Outcome,
    outputs: usize,
}

impl Setter {
    /// Write the ordinary outputs into the destinations, in order.
    ///
    /// If the function failed, nothing is written and its error is returned as
    /// [WiringError::Failure].
    pub fn set(self, to: &mut [&mut dyn Slot]) -> Result<(), WiringError> {
        if to.len() != self.outputs {
            return Err(WiringError::ArityMismatch {
                expected: self.outputs,
                actual: to.len(),
            });
        }
        let values = self.outcome.map_err(WiringError::Failure)?;
        for (value, dest) in values.into_iter().zip(to.iter_mut()) {
            Slot::assign(&mut **dest, value)?;
        }
        Ok(())
    }
}

/// Panicking variant of [Setter]
pub struct SetterNoError(Setter);

impl SetterNoError {
    #[track_caller]
    pub fn set(self, to: &mut [&mut dyn Slot]) {
        if let Err(err) = self.0.set(to) {
            panic!("{err}");
        }
    }
}
