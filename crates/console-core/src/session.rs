//! # Console Session
//!
//! The stateful controller behind a command line: it keeps the query, the
//! ranked candidates, the selection cursor and the armed command, and
//! decides on confirm whether to autocomplete, wait for arguments or
//! execute.
//!
//! The armed command is always the selected candidate, so it can never
//! drift out of step with the list.
//!
//! ## State machine
//!
//! ```text
//! Closed --open--> OpenEmpty --input--> OpenSearching --input names candidate--> Armed
//!   ^                  |                      |                                  |
//!   +------close-------+----------------------+----------------------------------+
//! ```
//!
//! Input received while closed is ignored.

use std::cmp::Ordering;

use crate::command::Command;
use crate::config::SessionConfig;
use crate::errors::ConsoleError;
use crate::fuzzy;
use crate::registry::CommandRegistry;

/// Observable state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Console hidden
    Closed,
    /// Open with no candidates
    OpenEmpty,
    /// Open with candidates, the query does not name one exactly
    OpenSearching,
    /// The query names the selected candidate
    Armed,
}

/// What a confirm did
#[derive(Debug)]
pub enum ConfirmOutcome {
    /// Closed, or nothing to confirm
    Ignored,
    /// Input was replaced with the selected candidate's name
    Autocompleted {
        /// The new input
        input: String,
    },
    /// The command is armed but the argument count does not match
    AwaitingArguments {
        /// Declared parameter count
        expected: usize,
        /// Arguments typed so far
        provided: usize,
    },
    /// The command ran
    Executed {
        /// Informational output, if any
        output: Option<String>,
    },
    /// The command was invoked and failed
    Failed(ConsoleError),
}

/// A command ranked against the current query
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    /// The command
    pub command: Command,
    /// Fuzzy score against the command's search text
    pub score: f32,
}

/// Interactive command-line session
#[derive(Debug, Clone)]
pub struct ConsoleSession {
    config: SessionConfig,
    open: bool,
    input: String,
    query: String,
    args: Vec<String>,
    candidates: Vec<ScoredCandidate>,
    selected: usize,
}

impl Default for ConsoleSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl ConsoleSession {
    /// Closed session using `config`
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            open: false,
            input: String::new(),
            query: String::new(),
            args: Vec::new(),
            candidates: Vec::new(),
            selected: 0,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        if !self.open {
            return SessionState::Closed;
        }
        match self.armed() {
            None => SessionState::OpenEmpty,
            Some(command) if self.names(command) => SessionState::Armed,
            Some(_) => SessionState::OpenSearching,
        }
    }

    /// Whether the console is shown
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Show the console with an empty input
    pub fn open(&mut self) {
        if !self.open {
            self.reset();
            self.open = true;
            tracing::debug!("Console opened");
        }
    }

    /// Hide the console and forget the query, candidates and armed command
    pub fn close(&mut self) {
        self.reset();
        self.open = false;
        tracing::debug!("Console closed");
    }

    /// Raw input text
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Lower-cased command token
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Argument tokens
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Ranked candidates, best first
    pub fn candidates(&self) -> &[ScoredCandidate] {
        &self.candidates
    }

    /// Candidates to display.
    ///
    /// A lone candidate whose name is exactly the query is hidden; it stays
    /// armed.
    pub fn visible_candidates(&self) -> &[ScoredCandidate] {
        match self.candidates.as_slice() {
            [only] if self.names(&only.command) => &[],
            all => all,
        }
    }

    /// Cursor into [`candidates`](Self::candidates)
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Command that confirm would act on
    pub fn armed(&self) -> Option<&Command> {
        self.candidates.get(self.selected).map(|c| &c.command)
    }

    /// Short type names of the armed command's parameters, `None` when it
    /// takes none
    pub fn parameter_hint(&self) -> Option<String> {
        self.armed()
            .filter(|command| command.param_count() > 0)
            .map(Command::parameter_hint)
    }

    /// Whether the query is exactly the name of some candidate
    pub fn input_matches_command(&self) -> bool {
        self.candidates.iter().any(|c| self.names(&c.command))
    }

    /// Replace the input and re-rank against `registry`
    pub fn set_input(&mut self, raw: &str, registry: &CommandRegistry) {
        if !self.open {
            return;
        }
        self.input = raw.to_string();

        let mut tokens = raw.split_whitespace();
        self.query = fuzzy::fold_str(tokens.next().unwrap_or_default());
        self.args = tokens.map(str::to_string).collect();

        self.search(registry);
    }

    /// Move the cursor down, wrapping
    pub fn cursor_down(&mut self) {
        if self.open && !self.candidates.is_empty() {
            self.selected = (self.selected + 1) % self.candidates.len();
        }
    }

    /// Move the cursor up, wrapping
    pub fn cursor_up(&mut self) {
        if self.open && !self.candidates.is_empty() {
            let len = self.candidates.len();
            self.selected = (self.selected + len - 1) % len;
        }
    }

    /// Enter: autocomplete, wait for arguments or execute.
    ///
    /// Execution happens only when the query already names the armed command
    /// and the argument count matches. The session is left as it was whether
    /// execution succeeds or fails.
    pub fn confirm(&mut self, registry: &CommandRegistry) -> ConfirmOutcome {
        if !self.open {
            return ConfirmOutcome::Ignored;
        }
        let Some(command) = self.armed().cloned() else {
            return ConfirmOutcome::Ignored;
        };

        if !self.names(&command) {
            let input = command.name().to_string();
            self.set_input(&input, registry);
            if let Some(index) = self.candidates.iter().position(|c| c.command == command) {
                self.selected = index;
            }
            return ConfirmOutcome::Autocompleted { input };
        }

        if self.args.len() != command.param_count() {
            return ConfirmOutcome::AwaitingArguments {
                expected: command.param_count(),
                provided: self.args.len(),
            };
        }

        match command.execute(&self.args) {
            Ok(output) => ConfirmOutcome::Executed { output },
            Err(e) => ConfirmOutcome::Failed(e),
        }
    }

    fn search(&mut self, registry: &CommandRegistry) {
        let threshold = self.config.acceptance_threshold;
        let query = self.query.as_str();

        let mut ranked: Vec<ScoredCandidate> = registry
            .iter()
            .map(|command| ScoredCandidate {
                score: fuzzy::score(&command.search_text(), query),
                command: command.clone(),
            })
            .filter(|candidate| candidate.score > threshold)
            .collect();

        // Stable, so ties keep registry order
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked.truncate(self.config.candidate_limit);

        tracing::trace!(query, candidates = ranked.len(), "Ranked commands");
        self.candidates = ranked;
        self.selected = 0;
    }

    fn names(&self, command: &Command) -> bool {
        !self.query.is_empty() && fuzzy::eq_fold(command.name(), &self.query)
    }

    fn reset(&mut self) {
        self.input.clear();
        self.query.clear();
        self.args.clear();
        self.candidates.clear();
        self.selected = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Arc;

    fn jump() {}
    fn jump_high() {}
    fn crouch() {}

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry.register_fn("Jump", jump).unwrap();
        registry.register_fn("JumpHigh", jump_high).unwrap();
        registry.register_fn("Crouch", crouch).unwrap();
        registry
    }

    fn open_session() -> ConsoleSession {
        let mut session = ConsoleSession::default();
        session.open();
        session
    }

    #[test]
    fn test_starts_closed_and_ignores_input() {
        let registry = registry();
        let mut session = ConsoleSession::default();

        session.set_input("jump", &registry);
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.candidates().is_empty());
        assert!(matches!(session.confirm(&registry), ConfirmOutcome::Ignored));
    }

    #[test]
    fn test_open_is_empty() {
        let session = open_session();
        assert_eq!(session.state(), SessionState::OpenEmpty);
        assert!(session.armed().is_none());
    }

    #[test]
    fn test_input_is_split_and_lowercased() {
        let registry = registry();
        let mut session = open_session();

        session.set_input("  JUMP   1  two ", &registry);
        assert_eq!(session.query(), "jump");
        assert_eq!(session.args(), ["1", "two"]);
    }

    #[test]
    fn test_ranking() {
        let registry = registry();
        let mut session = open_session();

        session.set_input("jum", &registry);
        let names: Vec<_> = session
            .candidates()
            .iter()
            .map(|c| c.command.name())
            .collect();
        assert_eq!(names, vec!["Jump", "JumpHigh"]);
        assert_eq!(session.selected_index(), 0);
        assert_eq!(session.armed().map(Command::name), Some("Jump"));
        assert_eq!(session.state(), SessionState::OpenSearching);
    }

    #[test]
    fn test_no_candidates() {
        let registry = registry();
        let mut session = open_session();

        session.set_input("xyz", &registry);
        assert_eq!(session.state(), SessionState::OpenEmpty);
        assert!(matches!(session.confirm(&registry), ConfirmOutcome::Ignored));
    }

    #[test]
    fn test_cursor_wraps_both_ways() {
        let registry = registry();
        let mut session = open_session();
        session.set_input("jum", &registry);

        session.cursor_up();
        assert_eq!(session.selected_index(), 1);
        assert_eq!(session.armed().map(Command::name), Some("JumpHigh"));

        session.cursor_down();
        assert_eq!(session.selected_index(), 0);
    }

    #[test]
    fn test_cursor_noop_without_candidates() {
        let mut session = open_session();
        session.cursor_down();
        session.cursor_up();
        assert_eq!(session.selected_index(), 0);
    }

    #[test]
    fn test_new_input_resets_cursor() {
        let registry = registry();
        let mut session = open_session();
        session.set_input("jum", &registry);
        session.cursor_down();

        session.set_input("jump", &registry);
        assert_eq!(session.selected_index(), 0);
    }

    #[test]
    fn test_autocomplete_keeps_selection() {
        let registry = registry();
        let mut session = open_session();
        session.set_input("jum", &registry);
        session.cursor_down();

        let outcome = session.confirm(&registry);
        assert!(matches!(
            outcome,
            ConfirmOutcome::Autocompleted { ref input } if input == "JumpHigh"
        ));
        assert_eq!(session.input(), "JumpHigh");
        assert_eq!(session.armed().map(Command::name), Some("JumpHigh"));
        assert_eq!(session.state(), SessionState::Armed);
    }

    #[test]
    fn test_lone_exact_candidate_is_hidden() {
        let registry = registry();
        let mut session = open_session();

        session.set_input("crouch", &registry);
        assert_eq!(session.candidates().len(), 1);
        assert!(session.visible_candidates().is_empty());
        assert!(session.input_matches_command());
        assert_eq!(session.armed().map(Command::name), Some("Crouch"));
    }

    #[test]
    fn test_exact_name_with_other_candidates_is_visible() {
        let registry = registry();
        let mut session = open_session();

        session.set_input("jump", &registry);
        assert_eq!(session.visible_candidates().len(), 2);
        assert!(session.input_matches_command());
        assert_eq!(session.state(), SessionState::Armed);
    }

    #[test]
    fn test_non_ascii_name_arms_and_resolves() {
        fn open() {}

        let mut registry = CommandRegistry::new();
        registry.register_fn("Öffnen", open).unwrap();
        let mut session = open_session();

        session.set_input("öffnen", &registry);
        assert_eq!(session.state(), SessionState::Armed);
        let armed = session.armed().map(Command::name);
        assert_eq!(armed, registry.find_by_name(session.query()).map(Command::name));
    }

    #[test]
    fn test_execute_requires_matching_arity() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut registry = CommandRegistry::new();
        registry
            .register_fn("Heal", move |amount: i32| {
                counter.fetch_add(1, AtomicOrdering::SeqCst);
                amount
            })
            .unwrap();

        let mut session = open_session();
        session.set_input("heal", &registry);
        assert_eq!(session.parameter_hint().as_deref(), Some("int"));
        assert!(matches!(
            session.confirm(&registry),
            ConfirmOutcome::AwaitingArguments { expected: 1, provided: 0 }
        ));

        session.set_input("heal 5 6", &registry);
        assert!(matches!(
            session.confirm(&registry),
            ConfirmOutcome::AwaitingArguments { expected: 1, provided: 2 }
        ));
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 0);

        session.set_input("heal 5", &registry);
        assert!(matches!(
            session.confirm(&registry),
            ConfirmOutcome::Executed { output: Some(ref out) } if out == "5"
        ));
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_failed_execution_keeps_state() {
        let mut registry = CommandRegistry::new();
        registry.register_fn("Heal", |amount: i32| amount).unwrap();

        let mut session = open_session();
        session.set_input("heal lots", &registry);
        let outcome = session.confirm(&registry);

        assert!(matches!(
            outcome,
            ConfirmOutcome::Failed(ConsoleError::ArgumentParseFailure { .. })
        ));
        assert_eq!(session.input(), "heal lots");
        assert_eq!(session.state(), SessionState::Armed);
    }

    #[test]
    fn test_close_resets() {
        let registry = registry();
        let mut session = open_session();
        session.set_input("jum", &registry);
        session.cursor_down();

        session.close();
        session.open();

        assert!(session.armed().is_none());
        assert!(session.candidates().is_empty());
        assert_eq!(session.input(), "");
        assert_eq!(session.selected_index(), 0);
        assert_eq!(session.state(), SessionState::OpenEmpty);
    }

    #[test]
    fn test_candidate_limit() {
        fn a() {}
        fn b() {}
        fn c() {}

        let mut registry = CommandRegistry::new();
        registry.register_fn("spawn_a", a).unwrap();
        registry.register_fn("spawn_b", b).unwrap();
        registry.register_fn("spawn_c", c).unwrap();

        let mut session = ConsoleSession::new(SessionConfig::default().with_candidate_limit(2));
        session.open();
        session.set_input("spawn", &registry);
        assert_eq!(session.candidates().len(), 2);
    }
}
