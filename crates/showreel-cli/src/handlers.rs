//! Subcommand implementations

use crate::commands::{CalendarArgs, ConfigArgs, PlayArgs, ScriptArgs, ScriptFormat};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use crate::terminal::TerminalPort;
use chrono::{Local, NaiveDate};
use showreel::calendar::{format_long_sv, DEFAULT_SLOT_INDEX};
use showreel::{
    next_tuesday, CalendarMonth, CycleScheduler, DemoConfig, DemoScript, DemoSequencer,
    FakeClock, ProfileName, RunSummary, SharedClock, TokioClock, TIME_SLOTS,
};
use std::fmt::Write as _;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Parse a `YYYY-MM-DD` date argument
pub fn parse_date(value: &str) -> CliResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        CliError::invalid_argument(format!("'{value}' is not a YYYY-MM-DD date: {e}"))
    })
}

/// The configuration file, or the defaults
pub fn load_config(path: Option<&Path>) -> CliResult<DemoConfig> {
    match path {
        Some(path) => Ok(DemoConfig::load(path)?),
        None => Ok(DemoConfig::default()),
    }
}

/// Configuration for `play`: file values overridden by flags
pub fn play_config(args: &PlayArgs) -> CliResult<DemoConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(profile) = args.profile {
        config = config.with_profile(profile.into());
    }
    if let Some(speed) = args.speed {
        config = config.with_speed(speed);
    }
    if let Some(script) = &args.script {
        config = config.with_script_path(script);
    }
    if let Some(cycles) = args.cycles {
        config = config.with_max_cycles(cycles);
    }
    config.validate()?;
    Ok(config)
}

/// Play the demo loop
pub async fn run_play(cli: &CliConfig, args: &PlayArgs) -> CliResult<RunSummary> {
    let demo = play_config(args)?;
    let policy = demo.scheduler_policy();
    let clock: SharedClock = if args.instant {
        FakeClock::shared()
    } else {
        TokioClock::shared()
    };

    let quiet = cli.verbosity.is_quiet();
    let port = TerminalPort::stdout(cli.use_color(), quiet || args.headless)
        .with_signal_recording(args.transcript.is_some());
    let mut sequencer = DemoSequencer::from_config(&demo, port, clock.clone())?;
    if let Some(today) = &args.today {
        sequencer = sequencer.with_today(parse_date(today)?);
    }

    info!(
        script = %sequencer.script().name,
        profile = %demo.profile,
        speed = demo.speed,
        "starting playback"
    );

    let mut reporter = ProgressReporter::new(cli.use_color(), quiet);
    if args.headless {
        reporter.start_progress(policy.max_cycles, &sequencer.script().name);
    }

    let scheduler = CycleScheduler::new(sequencer, clock, policy);
    let started = Instant::now();
    let summary = scheduler
        .run_with(|result| {
            reporter.increment(1);
            match result {
                Ok(report) if cli.verbosity.is_verbose() => reporter.success(&format!(
                    "cycle {} finished in {:.1}s",
                    report.cycle,
                    report.elapsed.as_secs_f64()
                )),
                Ok(_) => {}
                Err(e) => reporter.failure(&format!("cycle faulted: {e}")),
            }
        })
        .await;
    reporter.finish();
    reporter.summary(&summary, started.elapsed());

    if let Some(path) = &args.transcript {
        let json = scheduler.into_sequencer().port().transcript_json()?;
        tokio::fs::write(path, json).await?;
        reporter.info(&format!("transcript written to {}", path.display()));
    }

    if summary.cycles_completed == 0 && summary.faults > 0 {
        return Err(CliError::playback(format!(
            "all {} cycles faulted",
            summary.faults
        )));
    }
    Ok(summary)
}

/// Validate a script and render it
pub fn run_script(args: &ScriptArgs) -> CliResult<String> {
    let script = match &args.script {
        Some(path) => DemoScript::load(path)?,
        None => match ProfileName::from(args.profile) {
            ProfileName::Controller => DemoScript::axie_studio(),
            ProfileName::Widget => DemoScript::widget(),
        },
    };
    render_script(&script, args.format)
}

/// Render a script in the requested format
pub fn render_script(script: &DemoScript, format: ScriptFormat) -> CliResult<String> {
    match format {
        ScriptFormat::Json => Ok(serde_json::to_string_pretty(script)?),
        ScriptFormat::Yaml => Ok(script.to_yaml()?),
        ScriptFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(
                out,
                "{}: {} steps, {} messages, {:.1}s of pauses{}",
                script.name,
                script.steps.len(),
                script.message_count(),
                script.total_pause_ms() as f64 / 1000.0,
                if script.opens_booking() {
                    ", opens booking"
                } else {
                    ""
                }
            );
            for step in &script.steps {
                let who = if step.is_control() {
                    "control".to_string()
                } else {
                    step.speaker.to_string()
                };
                let _ = writeln!(
                    out,
                    "  {:<6} {:<8} {:>5}ms  {}",
                    step.id, who, step.pause_ms, step.text
                );
            }
            Ok(out)
        }
    }
}

/// Render the booking calendar seen from `date` (today when omitted)
pub fn run_calendar(args: &CalendarArgs) -> CliResult<String> {
    let today = match &args.date {
        Some(date) => parse_date(date)?,
        None => Local::now().date_naive(),
    };
    Ok(render_calendar(today))
}

/// Calendar grid, the pre-selected Tuesday and the time slots
#[must_use]
pub fn render_calendar(today: NaiveDate) -> String {
    let month = CalendarMonth::for_booking(today);
    let mut out = month.render_text();
    let _ = writeln!(out);
    let _ = writeln!(out, "Nästa tisdag: {}", format_long_sv(next_tuesday(today)));
    let slots: Vec<String> = TIME_SLOTS
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            if i == DEFAULT_SLOT_INDEX {
                format!("[{slot}]")
            } else {
                (*slot).to_string()
            }
        })
        .collect();
    let _ = writeln!(out, "Tider: {}", slots.join(" "));
    out
}

/// Effective configuration as YAML
pub fn run_config(args: &ConfigArgs) -> CliResult<String> {
    let config = load_config(args.config.as_deref())?;
    Ok(config.to_yaml()?)
}
