//! Showreel CLI Library
//!
//! Command-line front end for the Showreel demo sequencer: plays the demo
//! in a terminal and inspects scripts, calendars and configuration.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;
pub mod terminal;

pub use commands::{
    CalendarArgs, Cli, ColorArg, Commands, ConfigArgs, PlayArgs, ProfileArg, ScriptArgs,
    ScriptFormat,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{summary_line, ProgressReporter};
pub use terminal::TerminalPort;
