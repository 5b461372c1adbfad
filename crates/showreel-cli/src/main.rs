//! Showreel CLI: play the chat and booking demo in a terminal
//!
//! ## Usage
//!
//! ```bash
//! showreel play                          # Loop the demo forever
//! showreel play --cycles 3 --speed 2     # Three cycles at double speed
//! showreel play --instant --headless -n 10 --transcript signals.json
//! showreel script --format yaml          # Dump the built-in script
//! showreel calendar --date 2024-05-13    # Booking calendar for a date
//! ```

use clap::Parser;
use showreel_cli::{
    handlers, logging, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init(config.verbosity, cli.log_json)?;

    match cli.command {
        Commands::Play(args) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(handlers::run_play(&config, &args))?;
            Ok(())
        }
        Commands::Script(args) => {
            print!("{}", handlers::run_script(&args)?);
            Ok(())
        }
        Commands::Calendar(args) => {
            print!("{}", handlers::run_calendar(&args)?);
            Ok(())
        }
        Commands::Config(args) => {
            print!("{}", handlers::run_config(&args)?);
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}
