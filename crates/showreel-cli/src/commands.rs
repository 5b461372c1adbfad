//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use showreel::ProfileName;
use std::path::PathBuf;

/// Showreel: a self-playing chat and booking demo for the terminal
#[derive(Parser, Debug)]
#[command(name = "showreel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play the demo loop in the terminal
    Play(PlayArgs),

    /// Validate and print a demo script
    Script(ScriptArgs),

    /// Print the booking calendar for a reference date
    Calendar(CalendarArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Arguments for the play command
#[derive(Parser, Debug, Default)]
pub struct PlayArgs {
    /// Stop after this many cycles (runs forever when omitted)
    #[arg(short = 'n', long)]
    pub cycles: Option<u64>,

    /// Pacing preset
    #[arg(short, long)]
    pub profile: Option<ProfileArg>,

    /// Playback speed multiplier (2.0 = twice as fast)
    #[arg(short, long)]
    pub speed: Option<f64>,

    /// Script file (YAML)
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the recorded signal log as JSON
    #[arg(short, long)]
    pub transcript: Option<PathBuf>,

    /// Reference date for the booking calendar (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<String>,

    /// Run on a virtual clock: no real waiting
    #[arg(long)]
    pub instant: bool,

    /// Do not render the chat, show cycle progress only
    #[arg(long)]
    pub headless: bool,
}

/// Arguments for the script command
#[derive(Parser, Debug)]
pub struct ScriptArgs {
    /// Script file (YAML); the built-in script when omitted
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Built-in script to show when no file is given
    #[arg(short, long, default_value = "controller")]
    pub profile: ProfileArg,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: ScriptFormat,
}

/// Script output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScriptFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// JSON
    Json,
    /// YAML
    Yaml,
}

/// Arguments for the calendar command
#[derive(Parser, Debug)]
pub struct CalendarArgs {
    /// Reference date (YYYY-MM-DD); today when omitted
    #[arg(short, long)]
    pub date: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Configuration file to merge over the defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Pacing preset argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProfileArg {
    /// Full-page chat controller pacing
    #[default]
    Controller,
    /// Floating widget pacing
    Widget,
}

impl From<ProfileArg> for ProfileName {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Controller => Self::Controller,
            ProfileArg::Widget => Self::Widget,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
