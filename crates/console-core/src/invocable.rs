//! Invocable operations and the references they are bound to
//!
//! An [`Invocable`] is the opaque "call this with these typed arguments"
//! capability supplied by the host. The console never looks behind it: it
//! reads the declared [`Signature`], and calls [`Invocable::invoke`] with
//! coerced arguments and the bound [`Receiver`], if any.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::errors::BoxError;
use crate::kind::ArgValue;

/// Result of a single invocation: optional display output, or a failure.
pub type InvokeResult = std::result::Result<Option<String>, BoxError>;

/// Stable reference to an operation
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OperationId {
    /// Operation identified by a host-chosen path
    Named(Arc<str>),
    /// Operation identified by the Rust type of its handler
    Handler(TypeId),
    /// Operation identified by the handler value it was built from
    Instance(u64),
}

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(0);

impl OperationId {
    /// Identify an operation by name
    pub fn named(path: impl Into<Arc<str>>) -> Self {
        Self::Named(path.into())
    }

    /// Identify an operation by its handler type.
    ///
    /// Only meaningful for zero-sized handlers (function items and closures
    /// that capture nothing), where the type fixes the behaviour.
    pub fn of<H: 'static>() -> Self {
        Self::Handler(TypeId::of::<H>())
    }

    /// Fresh identity, distinct from every other
    pub fn unique() -> Self {
        Self::Instance(NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed))
    }

    /// Identity for a handler value.
    ///
    /// Zero-sized handlers are identified by type, so registering the same
    /// function twice yields the same operation. Capturing closures and
    /// function pointers carry state the type does not describe and get a
    /// fresh identity per value.
    pub fn for_handler<H: 'static>(_handler: &H) -> Self {
        if std::mem::size_of::<H>() == 0 {
            Self::of::<H>()
        } else {
            Self::unique()
        }
    }
}

/// Identity of a bound receiver
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReceiverId(usize);

/// A shared instance an operation is bound to.
///
/// Two receivers are the same instance iff they point at the same allocation.
#[derive(Clone)]
pub struct Receiver {
    id: ReceiverId,
    value: Arc<dyn Any + Send + Sync>,
}

impl Receiver {
    /// Bind to a shared instance
    pub fn new<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        let id = ReceiverId(Arc::as_ptr(&value) as *const () as usize);
        Self { id, value }
    }

    /// Identity of the bound instance
    pub fn id(&self) -> ReceiverId {
        self.id
    }

    /// Borrow the instance as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Whether the instance is a `T`
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }
}

impl PartialEq for Receiver {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Receiver {}

impl fmt::Debug for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver").field("id", &self.id).finish()
    }
}

/// A declared parameter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDecl {
    /// Parameter name
    pub name: String,
    /// Declared type name, validated when a command is built
    pub type_name: String,
}

impl ParamDecl {
    /// Declare a parameter
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// What an operation declares about itself
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// Operation name
    pub name: String,
    /// Short name of the owning type or module
    pub owner: Option<String>,
    /// Ordered parameters
    pub params: Vec<ParamDecl>,
    /// Requires no bound instance
    pub is_static: bool,
    /// Compiler-generated or anonymous operation
    pub synthetic: bool,
}

impl Signature {
    /// Signature of a static operation with no parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: None,
            params: Vec::new(),
            is_static: true,
            synthetic: false,
        }
    }

    /// Set the owner name
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Append a parameter
    pub fn with_param(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.params.push(ParamDecl::new(name, type_name));
        self
    }

    /// Mark as requiring a bound instance
    pub fn bound(mut self) -> Self {
        self.is_static = false;
        self
    }

    /// Mark as anonymous
    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }
}

/// An operation the console can call
pub trait Invocable: Send + Sync {
    /// Stable reference used for command identity
    fn id(&self) -> OperationId;

    /// Declared name, owner and parameters
    fn signature(&self) -> &Signature;

    /// Call the operation.
    ///
    /// `args` match the declared parameters in count and kind. `receiver` is
    /// `None` for static operations.
    fn invoke(&self, receiver: Option<&Receiver>, args: &[ArgValue]) -> InvokeResult;
}

/// Resolves a display label for a bound receiver
pub trait TargetLabelResolver: Send + Sync {
    /// Label for `receiver`, or `None` when it is not a world object
    fn resolve(&self, receiver: &Receiver) -> Option<String>;
}

/// Resolver that labels nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTargetLabels;

impl TargetLabelResolver for NoTargetLabels {
    fn resolve(&self, _receiver: &Receiver) -> Option<String> {
        None
    }
}

impl<F> TargetLabelResolver for F
where
    F: Fn(&Receiver) -> Option<String> + Send + Sync,
{
    fn resolve(&self, receiver: &Receiver) -> Option<String> {
        self(receiver)
    }
}
