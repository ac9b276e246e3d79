/// Declare that a value type can be bound and injected.
///
/// The type must be `Clone + Send + Sync + 'static`. Interfaces implemented by the type can be
/// listed after a colon, they must have been declared with [interface!](crate::interface).
/// A bound value can then be resolved as any of these interfaces when the interface itself is
/// not bound.
///
/// ```
/// # use std::sync::Arc;
/// # use rt_inject::*;
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
/// interface!(dyn Greeter);
///
/// #[derive(Clone)]
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".into()
///     }
/// }
/// injectable!(English: dyn Greeter);
///
/// # fn main() -> Result<(), WiringError> {
/// let mut container = Container::new();
/// container.bind_singleton(English)?;
/// let greeter: Arc<dyn Greeter> = container.resolve()?;
/// assert_eq!(greeter.greet(), "hello");
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! injectable {
    ($ty:ty) => {
        $crate::injectable!($ty :);
    };
    ($ty:ty : $($iface:ty),* $(,)?) => {
        impl $crate::Injectable for $ty {
            const DEPTH: usize = 0;

            fn type_key() -> $crate::TypeKey {
                $crate::TypeKey::of::<$ty>()
            }

            fn capabilities() -> ::std::vec::Vec<$crate::Capability> {
                ::std::vec![$(
                    $crate::Capability::new(
                        <::std::sync::Arc<$iface> as $crate::Injectable>::type_key(),
                        |value: $crate::Value| -> ::std::result::Result<$crate::Value, $crate::WiringError> {
                            let concrete: ::std::sync::Arc<$ty> = value.adapt()?;
                            let handle: ::std::sync::Arc<$iface> = concrete;
                            ::std::result::Result::Ok($crate::Value::new(handle))
                        },
                    ),
                )*]
            }
        }

        impl $crate::Pointee for $ty {
            const ARC_DEPTH: usize = 1;

            fn arc_key() -> $crate::TypeKey {
                $crate::TypeKey::of::<$ty>()
            }

            fn arc_capabilities() -> ::std::vec::Vec<$crate::Capability> {
                <$ty as $crate::Injectable>::capabilities()
            }

            fn strip_arc(arc: ::std::sync::Arc<Self>) -> ::std::option::Option<$crate::Value> {
                ::std::option::Option::Some($crate::Value::new(::std::clone::Clone::clone(&*arc)))
            }

            fn arc_from_value(
                value: $crate::Value,
            ) -> ::std::result::Result<::std::sync::Arc<Self>, $crate::WiringError> {
                $crate::arc_from_value(value)
            }
        }
    };
}

/// Declare a trait object as an interface.
///
/// The trait must be `Send + Sync`, its values are resolved as `Arc<dyn Trait>`.
#[macro_export]
macro_rules! interface {
    ($iface:ty) => {
        impl $crate::Pointee for $iface {
            const ARC_DEPTH: usize = 0;

            fn arc_key() -> $crate::TypeKey {
                $crate::TypeKey::interface::<$iface>()
            }

            fn strip_arc(_arc: ::std::sync::Arc<Self>) -> ::std::option::Option<$crate::Value> {
                ::std::option::Option::None
            }

            fn arc_from_value(
                value: $crate::Value,
            ) -> ::std::result::Result<::std::sync::Arc<Self>, $crate::WiringError> {
                value.settle()
            }
        }
    };
}

/// Declare the settable fields of a record.
///
/// Only the listed fields are injected, their types must be [Injectable](crate::Injectable).
///
/// ```
/// # use rt_inject::*;
/// #[derive(Clone)]
/// struct Name(&'static str);
/// injectable!(Name);
///
/// struct Greeting {
///     name: Name,
///     count: u32,
/// }
/// record!(Greeting { name });
///
/// # fn main() -> Result<(), WiringError> {
/// let mut container = Container::new();
/// container.bind_singleton(Name("world"))?;
/// container.bind_singleton(7u32)?;
///
/// let mut greeting = Greeting { name: Name("nobody"), count: 0 };
/// container.inject(&mut greeting)?;
/// assert_eq!(greeting.name.0, "world");
/// assert_eq!(greeting.count, 0);
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn fields(&mut self) -> ::std::vec::Vec<$crate::Field<'_>> {
                ::std::vec![$($crate::Field::new(::std::stringify!($field), &mut self.$field),)*]
            }
        }
    };
}

injectable!(bool);
injectable!(char);
injectable!(i8);
injectable!(i16);
injectable!(i32);
injectable!(i64);
injectable!(i128);
injectable!(isize);
injectable!(u8);
injectable!(u16);
injectable!(u32);
injectable!(u64);
injectable!(u128);
injectable!(usize);
injectable!(f32);
injectable!(f64);
injectable!(String);
injectable!(&'static str);
