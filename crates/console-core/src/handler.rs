//! Typed handler adapters
//!
//! Turns ordinary Rust functions and closures into [`Invocable`]s. The
//! declared parameter list is derived from the argument types, so a handler
//! can only take primitive kinds:
//!
//! ```rust,ignore
//! registry.register_fn("spawn", |count: u32, name: String| {
//!     format!("spawned {count} {name}")
//! })?;
//!
//! registry.register_method("open", door.clone(), |door: &Door| door.open())?;
//! ```
//!
//! Handlers take up to four arguments. Return values go through
//! [`CommandOutput`]; an `Err` becomes an invocation failure.

use std::any::{type_name, Any};
use std::fmt;

use crate::errors::BoxError;
use crate::invocable::{Invocable, InvokeResult, OperationId, Receiver, Signature};
use crate::kind::{ArgValue, ParamKind};

/// A Rust type that can receive a coerced argument
pub trait FromArg: Sized + 'static {
    /// Kind declared for this type
    const KIND: ParamKind;

    /// Extract from a value of the matching kind
    fn from_arg(value: &ArgValue) -> Option<Self>;
}

macro_rules! impl_from_arg {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromArg for $ty {
                const KIND: ParamKind = ParamKind::$variant;

                fn from_arg(value: &ArgValue) -> Option<Self> {
                    match value {
                        ArgValue::$variant(v) => Some(*v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_arg! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    char => Char,
}

impl FromArg for String {
    const KIND: ParamKind = ParamKind::String;

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Str(v) => Some(v.clone()),
            _ => None,
        }
    }
}

/// Conversion of a handler's return value into console output
pub trait CommandOutput {
    /// `Ok(None)` for no output
    fn into_output(self) -> InvokeResult;
}

impl CommandOutput for () {
    fn into_output(self) -> InvokeResult {
        Ok(None)
    }
}

macro_rules! impl_display_output {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CommandOutput for $ty {
                fn into_output(self) -> InvokeResult {
                    Ok(Some(self.to_string()))
                }
            }
        )*
    };
}

impl_display_output!(
    String, &'static str, bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32,
    f64,
);

impl<T: CommandOutput> CommandOutput for Option<T> {
    fn into_output(self) -> InvokeResult {
        match self {
            Some(value) => value.into_output(),
            None => Ok(None),
        }
    }
}

impl<T, E> CommandOutput for Result<T, E>
where
    T: CommandOutput,
    E: Into<BoxError>,
{
    fn into_output(self) -> InvokeResult {
        match self {
            Ok(value) => value.into_output(),
            Err(e) => Err(e.into()),
        }
    }
}

/// A static handler taking primitive arguments
pub trait Handler<Args>: Send + Sync + 'static {
    /// Declared parameter kinds
    fn params() -> Vec<ParamKind>;

    /// Call with coerced arguments
    fn call(&self, args: &[ArgValue]) -> InvokeResult;
}

/// A handler bound to a receiver of type `T`
pub trait Method<T, Args>: Send + Sync + 'static {
    /// Declared parameter kinds, receiver excluded
    fn params() -> Vec<ParamKind>;

    /// Call on `receiver` with coerced arguments
    fn call(&self, receiver: &T, args: &[ArgValue]) -> InvokeResult;
}

fn next_arg<'a, T: FromArg>(
    args: &mut impl Iterator<Item = (usize, &'a ArgValue)>,
) -> Result<T, BoxError> {
    let (idx, value) = args.next().ok_or("missing argument")?;
    T::from_arg(value).ok_or_else(|| {
        format!(
            "argument {idx} is {} but {} was expected",
            value.kind(),
            T::KIND
        )
        .into()
    })
}

macro_rules! impl_handlers {
    ($($arg:ident),*) => {
        impl<F, R, $($arg,)*> Handler<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: CommandOutput,
            $($arg: FromArg,)*
        {
            fn params() -> Vec<ParamKind> {
                vec![$($arg::KIND),*]
            }

            #[allow(non_snake_case, unused_variables, unused_mut)]
            fn call(&self, args: &[ArgValue]) -> InvokeResult {
                let mut iter = args.iter().enumerate();
                $(let $arg = next_arg::<$arg>(&mut iter)?;)*
                (self)($($arg),*).into_output()
            }
        }

        impl<F, T, R, $($arg,)*> Method<T, ($($arg,)*)> for F
        where
            F: Fn(&T, $($arg),*) -> R + Send + Sync + 'static,
            T: 'static,
            R: CommandOutput,
            $($arg: FromArg,)*
        {
            fn params() -> Vec<ParamKind> {
                vec![$($arg::KIND),*]
            }

            #[allow(non_snake_case, unused_variables, unused_mut)]
            fn call(&self, receiver: &T, args: &[ArgValue]) -> InvokeResult {
                let mut iter = args.iter().enumerate();
                $(let $arg = next_arg::<$arg>(&mut iter)?;)*
                (self)(receiver, $($arg),*).into_output()
            }
        }
    };
}

impl_handlers!();
impl_handlers!(A1);
impl_handlers!(A1, A2);
impl_handlers!(A1, A2, A3);
impl_handlers!(A1, A2, A3, A4);

type CallFn = dyn Fn(Option<&Receiver>, &[ArgValue]) -> InvokeResult + Send + Sync;

/// An [`Invocable`] backed by a Rust closure
pub struct FnInvocable {
    id: OperationId,
    signature: Signature,
    call: Box<CallFn>,
}

impl FnInvocable {
    /// Build from an explicit signature.
    ///
    /// The signature's type names are validated when a command is built from
    /// this invocable, not here.
    pub fn new<C>(id: OperationId, signature: Signature, call: C) -> Self
    where
        C: Fn(Option<&Receiver>, &[ArgValue]) -> InvokeResult + Send + Sync + 'static,
    {
        Self {
            id,
            signature,
            call: Box::new(call),
        }
    }

    /// Wrap a static handler
    pub fn function<H, Args>(name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<Args>,
        Args: 'static,
    {
        let path = type_name::<H>();
        let mut signature = declare(Signature::new(name), &<H as Handler<Args>>::params());
        signature.owner = owner_of_path(path);
        signature.synthetic = path.contains("{{closure}}");

        Self::new(OperationId::for_handler(&handler), signature, move |_, args| {
            <H as Handler<Args>>::call(&handler, args)
        })
    }

    /// Wrap a handler bound to a receiver of type `T`
    pub fn method<T, H, Args>(name: impl Into<String>, handler: H) -> Self
    where
        T: Any + Send + Sync,
        H: Method<T, Args>,
        Args: 'static,
    {
        let mut signature =
            declare(Signature::new(name), &<H as Method<T, Args>>::params()).bound();
        signature.owner = Some(short_type_name::<T>().to_string());
        signature.synthetic = type_name::<H>().contains("{{closure}}");

        Self::new(OperationId::for_handler(&handler), signature, move |receiver, args| {
            let receiver = receiver.ok_or("operation requires a bound instance")?;
            let target = receiver.downcast_ref::<T>().ok_or_else(|| {
                format!("bound instance is not a {}", short_type_name::<T>())
            })?;
            <H as Method<T, Args>>::call(&handler, target, args)
        })
    }

    /// Replace the owner name shown in the full name
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.signature.owner = Some(owner.into());
        self
    }
}

impl Invocable for FnInvocable {
    fn id(&self) -> OperationId {
        self.id.clone()
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn invoke(&self, receiver: Option<&Receiver>, args: &[ArgValue]) -> InvokeResult {
        (self.call)(receiver, args)
    }
}

impl fmt::Debug for FnInvocable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInvocable")
            .field("id", &self.id)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

fn declare(signature: Signature, kinds: &[ParamKind]) -> Signature {
    kinds
        .iter()
        .enumerate()
        .fold(signature, |sig, (idx, kind)| {
            sig.with_param(format!("arg{idx}"), kind.type_name())
        })
}

/// Last path segment of `T`'s type name, generics stripped
fn short_type_name<T>() -> &'static str {
    let path = type_name::<T>();
    let base = path.split('<').next().unwrap_or(path);
    base.rsplit("::").next().unwrap_or(base)
}

/// Enclosing module or function of a handler path
fn owner_of_path(path: &str) -> Option<String> {
    path.split("::")
        .filter(|segment| !segment.starts_with("{{"))
        .collect::<Vec<_>>()
        .iter()
        .rev()
        .nth(1)
        .map(|segment| segment.to_string())
}
