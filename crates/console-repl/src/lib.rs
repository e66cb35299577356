//! Console REPL
//!
//! Line-oriented terminal host for `console-core`. Plays the host roles the
//! engine leaves open:
//! - discovery, by registering a small demo world's commands
//! - target labels, by naming world objects
//! - presentation, by printing candidates, hints and outcomes after each line
//!
//! Configuration comes from a TOML file; logging goes to stderr through
//! `tracing-subscriber` so stdout carries only the console.

#![allow(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod demo;
pub mod driver;

pub use config::{LoggingConfig, ReplConfig, ReplError};
pub use demo::DemoWorld;
pub use driver::{Driver, Event, Flow};
