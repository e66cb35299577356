//! Console error types
//!
//! Every failure in the console is local: it ends one command construction
//! or one `execute` call and leaves the registry and session untouched.

use crate::kind::ParamKind;

/// Boxed error returned by [`Invocable`](crate::Invocable) implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building or executing commands
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// A declared parameter is not one of the primitive kinds.
    ///
    /// Raised at construction; the command is not registered.
    #[error("Unsupported parameter type `{type_name}` for parameter `{parameter}` of `{operation}`")]
    UnsupportedParameterType {
        /// Operation declaring the parameter
        operation: String,
        /// Offending parameter name
        parameter: String,
        /// Declared type name
        type_name: String,
    },

    /// Argument count does not match the declared parameter count
    #[error("Command '{command}' expects {expected} parameters, but got {actual}")]
    ParamCountMismatch {
        /// Command display name
        command: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// A token could not be coerced to its parameter kind
    #[error("Failed to parse parameter '{token}' to type {kind}: {reason}")]
    ArgumentParseFailure {
        /// Raw token
        token: String,
        /// Target kind
        kind: ParamKind,
        /// Parser message
        reason: String,
    },

    /// The invocable itself reported a failure
    #[error("Error executing command '{command}': {message}")]
    InvocationFailure {
        /// Command display name
        command: String,
        /// Underlying failure message
        message: String,
    },

    /// Session configuration is out of range
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message describing the issue
        message: String,
    },
}

impl ConsoleError {
    /// Create an unsupported parameter type error
    pub fn unsupported_parameter(
        operation: impl Into<String>,
        parameter: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self::UnsupportedParameterType {
            operation: operation.into(),
            parameter: parameter.into(),
            type_name: type_name.into(),
        }
    }

    /// Create a parameter count mismatch error
    pub fn param_count(command: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::ParamCountMismatch {
            command: command.into(),
            expected,
            actual,
        }
    }

    /// Create an argument parse failure
    pub fn parse_failure(token: impl Into<String>, kind: ParamKind, reason: impl ToString) -> Self {
        Self::ArgumentParseFailure {
            token: token.into(),
            kind,
            reason: reason.to_string(),
        }
    }

    /// Create an invocation failure
    pub fn invocation(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvocationFailure {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Console result type
pub type Result<T> = std::result::Result<T, ConsoleError>;
