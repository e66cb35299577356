//! # Command
//!
//! A [`Command`] wraps an [`Invocable`] with what the console needs to list,
//! search and run it: a display name, a qualified full name, a group, the
//! validated parameter kinds and the bound receiver.
//!
//! Commands compare equal iff their [`CommandId`]s do. A static operation is
//! identified by the operation alone; a bound operation by the operation and
//! the receiver instance.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::coerce::coerce_all;
use crate::errors::{ConsoleError, Result};
use crate::invocable::{Invocable, OperationId, Receiver, ReceiverId, TargetLabelResolver};
use crate::kind::ParamKind;

/// Group assigned when none is declared
pub const DEFAULT_GROUP: &str = "all";

/// Full name shown for anonymous operations
pub const ANONYMOUS_FULL_NAME: &str = "Lambda Expression";

/// Identity of a command
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CommandId {
    operation: OperationId,
    receiver: Option<ReceiverId>,
}

impl CommandId {
    /// Operation part of the identity
    pub fn operation(&self) -> &OperationId {
        &self.operation
    }

    /// Receiver part, `None` for static operations
    pub fn receiver(&self) -> Option<ReceiverId> {
        self.receiver
    }
}

/// A registered, executable operation
#[derive(Clone)]
pub struct Command {
    id: CommandId,
    invocable: Arc<dyn Invocable>,
    receiver: Option<Receiver>,
    name: String,
    full_name: String,
    group: String,
    params: Vec<ParamKind>,
    target_label: String,
    is_static: bool,
}

impl Command {
    /// Build a command, validating every declared parameter.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::UnsupportedParameterType`] naming the first parameter
    /// whose type is not a primitive kind.
    pub fn new(invocable: Arc<dyn Invocable>, receiver: Option<Receiver>) -> Result<Self> {
        let signature = invocable.signature();
        let qualified = match &signature.owner {
            Some(owner) => format!("{owner}.{}", signature.name),
            None => signature.name.clone(),
        };

        let mut params = Vec::with_capacity(signature.params.len());
        for decl in &signature.params {
            let kind = ParamKind::from_type_name(&decl.type_name).ok_or_else(|| {
                ConsoleError::unsupported_parameter(&qualified, &decl.name, &decl.type_name)
            })?;
            params.push(kind);
        }

        let is_static = signature.is_static;
        let id = CommandId {
            operation: invocable.id(),
            receiver: if is_static {
                None
            } else {
                receiver.as_ref().map(Receiver::id)
            },
        };
        let full_name = if signature.synthetic {
            ANONYMOUS_FULL_NAME.to_string()
        } else {
            qualified
        };

        Ok(Self {
            id,
            name: signature.name.clone(),
            full_name,
            group: DEFAULT_GROUP.to_string(),
            params,
            target_label: String::new(),
            is_static,
            receiver,
            invocable,
        })
    }

    /// Override the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    /// Override the full name
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }

    /// Set the group
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Label the receiver through `resolver`
    pub fn with_target_label(mut self, resolver: &dyn TargetLabelResolver) -> Self {
        self.target_label = self
            .receiver
            .as_ref()
            .and_then(|receiver| resolver.resolve(receiver))
            .unwrap_or_default();
        self
    }

    /// Rename the command
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Identity
    pub fn id(&self) -> &CommandId {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualified name, or the anonymous sentinel
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Group tag
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Declared parameter kinds
    pub fn params(&self) -> &[ParamKind] {
        &self.params
    }

    /// Number of declared parameters
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Label of the bound world object, empty when there is none
    pub fn target_label(&self) -> &str {
        &self.target_label
    }

    /// Whether the operation needs no receiver
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Bound receiver
    pub fn receiver(&self) -> Option<&Receiver> {
        self.receiver.as_ref()
    }

    /// Text the fuzzy matcher searches
    pub fn search_text(&self) -> String {
        format!("{}{}{}", self.name, self.full_name, self.target_label)
    }

    /// Space-separated short type names, e.g. `int float`
    pub fn parameter_hint(&self) -> String {
        self.params
            .iter()
            .map(ParamKind::short_name)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Multi-line description for detail popups
    pub fn detail(&self) -> String {
        let params = self
            .params
            .iter()
            .map(ParamKind::type_name)
            .collect::<Vec<_>>()
            .join(", ");
        let world_object = !self.target_label.is_empty();

        let mut detail = format!(
            "Parameters: {params}\nGroup: {}\nWorld object: {world_object}\n",
            self.group
        );
        if world_object {
            detail.push_str(&format!("Target: {}", self.target_label));
        }
        detail
    }

    /// Coerce `args` and invoke the operation.
    ///
    /// Nothing is invoked unless every argument coerces. Returns the
    /// operation's output, which is also logged at `info`.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::ParamCountMismatch`], [`ConsoleError::ArgumentParseFailure`]
    /// or [`ConsoleError::InvocationFailure`]. Each is logged at `warn`.
    pub fn execute<S: AsRef<str>>(&self, args: &[S]) -> Result<Option<String>> {
        if args.len() != self.params.len() {
            tracing::warn!(
                command = %self.name,
                expected = self.params.len(),
                actual = args.len(),
                "Parameter count mismatch"
            );
            return Err(ConsoleError::param_count(
                &self.name,
                self.params.len(),
                args.len(),
            ));
        }

        let values = coerce_all(args, &self.params).map_err(|e| {
            tracing::warn!(command = %self.name, error = %e, "Argument parse failure");
            e
        })?;

        let receiver = if self.is_static {
            None
        } else {
            self.receiver.as_ref()
        };

        match self.invocable.invoke(receiver, &values) {
            Ok(output) => {
                if let Some(output) = &output {
                    tracing::info!(command = %self.name, "{output}");
                }
                Ok(output)
            }
            Err(e) => {
                tracing::warn!(command = %self.name, error = %e, "Command invocation failed");
                Err(ConsoleError::invocation(&self.name, e.to_string()))
            }
        }
    }
}

impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Command {}

impl Hash for Command {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("full_name", &self.full_name)
            .field("group", &self.group)
            .field("params", &self.params)
            .field("target_label", &self.target_label)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocable::{InvokeResult, Signature};
    use crate::kind::ArgValue;
    use assert_matches::assert_matches;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Invocable that records every call
    struct Spy {
        signature: Signature,
        calls: AtomicUsize,
        last_args: Mutex<Vec<ArgValue>>,
        fail_with: Option<&'static str>,
    }

    impl Spy {
        fn new(signature: Signature) -> Arc<Self> {
            Arc::new(Self {
                signature,
                calls: AtomicUsize::new(0),
                last_args: Mutex::new(Vec::new()),
                fail_with: None,
            })
        }

        fn failing(signature: Signature, message: &'static str) -> Arc<Self> {
            Arc::new(Self {
                signature,
                calls: AtomicUsize::new(0),
                last_args: Mutex::new(Vec::new()),
                fail_with: Some(message),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Invocable for Spy {
        fn id(&self) -> OperationId {
            OperationId::named(format!("spy::{}", self.signature.name))
        }

        fn signature(&self) -> &Signature {
            &self.signature
        }

        fn invoke(&self, _receiver: Option<&Receiver>, args: &[ArgValue]) -> InvokeResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_args.lock().unwrap() = args.to_vec();
            match self.fail_with {
                Some(message) => Err(message.into()),
                None => Ok(Some(format!("{} args", args.len()))),
            }
        }
    }

    fn set_health() -> Signature {
        Signature::new("set_health")
            .with_owner("Player")
            .with_param("amount", "i32")
    }

    #[test]
    fn test_primitive_signature_constructs() {
        let sig = Signature::new("everything")
            .with_param("a", "bool")
            .with_param("b", "u8")
            .with_param("c", "f64")
            .with_param("d", "char")
            .with_param("e", "String");
        let cmd = Command::new(Spy::new(sig), None).unwrap();

        assert_eq!(cmd.param_count(), 5);
        assert_eq!(cmd.name(), "everything");
        assert_eq!(cmd.group(), DEFAULT_GROUP);
        assert_eq!(cmd.parameter_hint(), "bool byte double char string");
    }

    #[test]
    fn test_non_primitive_parameter_rejected() {
        let sig = Signature::new("teleport")
            .with_owner("Player")
            .with_param("x", "f32")
            .with_param("target", "Transform");
        let err = Command::new(Spy::new(sig), None).unwrap_err();

        assert_matches!(
            err,
            ConsoleError::UnsupportedParameterType { ref parameter, ref type_name, .. }
                if parameter == "target" && type_name == "Transform"
        );
    }

    #[test]
    fn test_full_name() {
        let cmd = Command::new(Spy::new(set_health()), None).unwrap();
        assert_eq!(cmd.full_name(), "Player.set_health");

        let cmd = Command::new(Spy::new(Signature::new("x").synthetic()), None).unwrap();
        assert_eq!(cmd.full_name(), ANONYMOUS_FULL_NAME);
    }

    #[test]
    fn test_execute_coerces_and_invokes() {
        let spy = Spy::new(set_health());
        let cmd = Command::new(spy.clone(), None).unwrap();

        let output = cmd.execute(&["42"]).unwrap();
        assert_eq!(output, Some("1 args".to_string()));
        assert_eq!(spy.calls(), 1);
        assert_eq!(*spy.last_args.lock().unwrap(), vec![ArgValue::I32(42)]);
    }

    #[test]
    fn test_execute_count_mismatch_never_invokes() {
        let spy = Spy::new(set_health());
        let cmd = Command::new(spy.clone(), None).unwrap();

        assert_matches!(
            cmd.execute::<&str>(&[]),
            Err(ConsoleError::ParamCountMismatch { expected: 1, actual: 0, .. })
        );
        assert_matches!(
            cmd.execute(&["1", "2"]),
            Err(ConsoleError::ParamCountMismatch { expected: 1, actual: 2, .. })
        );
        assert_eq!(spy.calls(), 0);
    }

    #[test]
    fn test_execute_parse_failure_never_invokes() {
        let sig = set_health().with_param("label", "String");
        let spy = Spy::new(sig);
        let cmd = Command::new(spy.clone(), None).unwrap();

        assert_matches!(
            cmd.execute(&["not_a_number", "hero"]),
            Err(ConsoleError::ArgumentParseFailure { kind: ParamKind::I32, .. })
        );
        assert_eq!(spy.calls(), 0);
    }

    #[test]
    fn test_invocation_failure_is_reported() {
        let spy = Spy::failing(set_health(), "player is dead");
        let cmd = Command::new(spy.clone(), None).unwrap();

        let err = cmd.execute(&["10"]).unwrap_err();
        assert_matches!(
            err,
            ConsoleError::InvocationFailure { ref command, ref message }
                if command == "set_health" && message == "player is dead"
        );
        assert_eq!(spy.calls(), 1);
    }

    #[test]
    fn test_identity_static_ignores_receiver() {
        let spy = Spy::new(set_health());
        let a = Command::new(spy.clone(), Some(Receiver::new(Arc::new(1u8)))).unwrap();
        let b = Command::new(spy, None).unwrap().with_name("heal");

        assert_eq!(a, b);
    }

    #[test]
    fn test_identity_bound_includes_receiver() {
        let spy = Spy::new(set_health().bound());
        let first = Arc::new(1u8);
        let a = Command::new(spy.clone(), Some(Receiver::new(first.clone()))).unwrap();
        let b = Command::new(spy.clone(), Some(Receiver::new(first))).unwrap();
        let c = Command::new(spy, Some(Receiver::new(Arc::new(1u8)))).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_target_label_and_detail() {
        let spy = Spy::new(set_health().bound());
        let resolver = |receiver: &Receiver| receiver.downcast_ref::<String>().cloned();
        let cmd = Command::new(spy, Some(Receiver::new(Arc::new("Knight".to_string()))))
            .unwrap()
            .with_target_label(&resolver);

        assert_eq!(cmd.target_label(), "Knight");
        assert_eq!(cmd.search_text(), "set_healthPlayer.set_healthKnight");
        assert_eq!(
            cmd.detail(),
            "Parameters: i32\nGroup: all\nWorld object: true\nTarget: Knight"
        );
    }
}
