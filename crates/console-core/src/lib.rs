#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
//! # Console Core
//!
//! Engine for an in-app command console: the host registers operations, the
//! user types a fuzzy query, and the console ranks, selects, coerces
//! arguments and executes.
//!
//! ## Purpose
//!
//! - Command model wrapping opaque host operations with typed parameters
//! - Registry of live commands, unique by identity
//! - Fuzzy scorer tuned for short command queries
//! - Text-to-value coercion for primitive parameter kinds
//! - Session state machine driving search, selection and execution
//!
//! ## What Does NOT Belong Here
//!
//! - Rendering, key handling and any other presentation (belongs to hosts)
//! - Discovery of operations (hosts supply [`Registration`]s)
//! - Logging subscribers; this crate only emits `tracing` events
//!
//! ## Key Components
//!
//! ```text
//! Registration ──> CommandRegistry ──> ConsoleSession
//!                     │   Command          │ fuzzy::score
//!                     │   Invocable        │ coerce
//!                     └─ SharedRegistry    └ ConfirmOutcome
//! ```

// ============================================================================
// Submodules
// ============================================================================

pub mod coerce;
pub mod command;
pub mod config;
pub mod errors;
pub mod fuzzy;
pub mod handler;
pub mod invocable;
pub mod kind;
pub mod registry;
pub mod session;
pub mod shared;

// ============================================================================
// Re-exports
// ============================================================================

pub use coerce::{coerce, coerce_all};
pub use command::{Command, CommandId, ANONYMOUS_FULL_NAME, DEFAULT_GROUP};
pub use config::SessionConfig;
pub use errors::{BoxError, ConsoleError, Result};
pub use handler::{CommandOutput, FnInvocable, FromArg, Handler, Method};
pub use invocable::{
    Invocable, InvokeResult, NoTargetLabels, OperationId, ParamDecl, Receiver, ReceiverId,
    Signature, TargetLabelResolver,
};
pub use kind::{ArgValue, ParamKind};
pub use registry::{CommandRegistry, RegisterOutcome, Registration};
pub use session::{ConfirmOutcome, ConsoleSession, ScoredCandidate, SessionState};
pub use shared::{SharedRegistry, StagedReload};
