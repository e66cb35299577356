//! Line-oriented console front end
//!
//! Reads one event per line and prints the console after each:
//!
//! - text: type it and press enter
//! - empty line: press enter on the current input
//! - `:type <text>`: type without pressing enter
//! - `:up`, `:down`: move the selection
//! - `:detail`: describe the selected command
//! - `:open`, `:close`: show or hide the console
//! - `:list`: print every registered command
//! - `:reload`: rebuild the registry from the world
//! - `:quit`: exit

use std::io::{BufRead, Write};

use console_core::{fuzzy, ConfirmOutcome, ConsoleSession, SharedRegistry};

use crate::config::{ReplConfig, ReplError};
use crate::demo::DemoWorld;

/// One input line, parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Type `text` and press enter
    Submit(String),
    /// Press enter on the current input
    Confirm,
    /// Type `text` without pressing enter
    Type(String),
    /// Selection up
    Up,
    /// Selection down
    Down,
    /// Describe the selection
    Detail,
    /// Show the console
    Open,
    /// Hide the console
    Close,
    /// Print the registry
    List,
    /// Rebuild the registry
    Reload,
    /// Exit
    Quit,
    /// Unrecognised `:` command
    Unknown(String),
}

impl Event {
    /// Parse one line, trailing newline already stripped
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(control) = trimmed.strip_prefix(':') else {
            return if trimmed.is_empty() {
                Self::Confirm
            } else {
                Self::Submit(line.to_string())
            };
        };

        let (name, rest) = control.split_once(' ').unwrap_or((control, ""));
        match name {
            "type" => Self::Type(rest.to_string()),
            "up" => Self::Up,
            "down" => Self::Down,
            "detail" => Self::Detail,
            "open" => Self::Open,
            "close" => Self::Close,
            "list" => Self::List,
            "reload" => Self::Reload,
            "quit" | "q" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Whether to keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line
    Continue,
    /// Stop
    Quit,
}

/// Terminal host driving one session over the demo world
#[derive(Debug)]
pub struct Driver {
    world: DemoWorld,
    registry: SharedRegistry,
    session: ConsoleSession,
    prompt: String,
}

impl Driver {
    /// Build the registry from `world` and open a session
    pub fn new(config: &ReplConfig, world: DemoWorld) -> Result<Self, ReplError> {
        let registry = SharedRegistry::new(world.registry()?);
        let mut session = ConsoleSession::new(config.session);
        session.open();

        tracing::info!(
            commands = registry.snapshot().len(),
            limit = config.session.candidate_limit,
            "Console ready"
        );

        Ok(Self {
            world,
            registry,
            session,
            prompt: config.prompt.clone(),
        })
    }

    /// The world commands act on
    pub fn world(&self) -> &DemoWorld {
        &self.world
    }

    /// The session
    pub fn session(&self) -> &ConsoleSession {
        &self.session
    }

    /// The shared registry
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Read events from `input` until `:quit` or end of input
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        mut output: W,
    ) -> Result<(), ReplError> {
        write!(output, "{}", self.prompt)?;
        output.flush()?;

        for line in input.lines() {
            let event = Event::parse(&line?);
            if self.handle(event, &mut output)? == Flow::Quit {
                break;
            }
            write!(output, "{}", self.prompt)?;
            output.flush()?;
        }
        writeln!(output)?;
        Ok(())
    }

    /// Apply one event and print the result
    pub fn handle<W: Write>(&mut self, event: Event, out: &mut W) -> Result<Flow, ReplError> {
        tracing::debug!(?event, "Console event");
        let registry = self.registry.snapshot();

        match event {
            Event::Submit(text) => {
                self.session.set_input(&text, &registry);
                let outcome = self.session.confirm(&registry);
                self.print_outcome(&outcome, out)?;
            }
            Event::Confirm => {
                let outcome = self.session.confirm(&registry);
                self.print_outcome(&outcome, out)?;
            }
            Event::Type(text) => self.session.set_input(&text, &registry),
            Event::Up => self.session.cursor_up(),
            Event::Down => self.session.cursor_down(),
            Event::Open => self.session.open(),
            Event::Close => self.session.close(),
            Event::Detail => {
                match self.session.armed() {
                    Some(command) => writeln!(out, "{}", command.detail().trim_end())?,
                    None => writeln!(out, "nothing selected")?,
                }
                return Ok(Flow::Continue);
            }
            Event::List => {
                for command in registry.iter() {
                    writeln!(
                        out,
                        "  {:<12} {:<8} {}{}",
                        command.name(),
                        command.group(),
                        command.full_name(),
                        label(command.target_label())
                    )?;
                }
                return Ok(Flow::Continue);
            }
            Event::Reload => {
                let count = self.world.reload(&self.registry)?;
                let input = self.session.input().to_string();
                self.session.set_input(&input, &self.registry.snapshot());
                writeln!(out, "reloaded {count} commands")?;
            }
            Event::Quit => return Ok(Flow::Quit),
            Event::Unknown(name) => {
                writeln!(out, "unknown control :{name}")?;
                return Ok(Flow::Continue);
            }
        }

        self.print_console(out)?;
        Ok(Flow::Continue)
    }

    fn print_outcome<W: Write>(
        &self,
        outcome: &ConfirmOutcome,
        out: &mut W,
    ) -> Result<(), ReplError> {
        match outcome {
            ConfirmOutcome::Ignored if self.session.is_open() => {
                if !self.session.query().is_empty() {
                    writeln!(out, "no matching command")?;
                }
            }
            ConfirmOutcome::Ignored => {}
            ConfirmOutcome::Autocompleted { input } => writeln!(out, "-> {input}")?,
            ConfirmOutcome::AwaitingArguments { expected, provided } => {
                writeln!(out, "expects {expected} argument(s), got {provided}")?;
            }
            ConfirmOutcome::Executed { output: Some(text) } => writeln!(out, "{text}")?,
            ConfirmOutcome::Executed { output: None } => writeln!(out, "ok")?,
            ConfirmOutcome::Failed(e) => writeln!(out, "error: {e}")?,
        }
        Ok(())
    }

    fn print_console<W: Write>(&self, out: &mut W) -> Result<(), ReplError> {
        if !self.session.is_open() {
            writeln!(out, "(console closed, :open to show)")?;
            return Ok(());
        }

        let selected = self.session.selected_index();
        for (index, candidate) in self.session.visible_candidates().iter().enumerate() {
            let command = &candidate.command;
            let marker = if index == selected { '>' } else { ' ' };
            writeln!(
                out,
                "{marker} {:<12} {}{}",
                command.name(),
                command.full_name(),
                label(command.target_label())
            )?;
            if index == selected {
                if let Some(carets) = highlight(command.name(), self.session.query()) {
                    writeln!(out, "  {carets}")?;
                }
            }
        }

        if self.session.input_matches_command() {
            writeln!(out, "  = {}", self.session.query())?;
        }
        if let Some(hint) = self.session.parameter_hint() {
            let name = self.session.armed().map(|c| c.name()).unwrap_or_default();
            writeln!(out, "  {name} {hint}")?;
        }
        Ok(())
    }
}

/// Caret line marking the characters of `name` that `query` matched
fn highlight(name: &str, query: &str) -> Option<String> {
    let indices = fuzzy::match_indices(name, query)?;
    let carets: String = (0..name.chars().count())
        .map(|idx| if indices.contains(&idx) { '^' } else { ' ' })
        .collect();
    Some(carets.trim_end().to_string())
}

fn label(target: &str) -> String {
    if target.is_empty() {
        String::new()
    } else {
        format!(" [{target}]")
    }
}
