//! Showreel: a self-playing chat and booking demo sequencer
//!
//! Showreel replays a scripted conversation between a chatbot and a
//! simulated visitor, then walks through a booking modal (date, time,
//! contact form, confirmation) and starts over. It never touches a screen
//! directly: every visible effect goes through a [`PresentationPort`], and
//! every delay goes through a [`Clock`], so a cycle can run in real time in
//! a terminal or in virtual time inside a test.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                    SHOWREEL Architecture                       │
//! ├───────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌──────────────────┐    │
//! │   │ Cycle      │    │ Demo       │    │ Presentation     │    │
//! │   │ Scheduler  │───►│ Sequencer  │───►│ Port             │    │
//! │   │ (gate)     │    │ + Booking  │    │ (terminal, mock) │    │
//! │   └────────────┘    └────────────┘    └──────────────────┘    │
//! │          │                 │                                  │
//! │          └──────► Clock ◄──┘  (tokio or fake)                 │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use showreel::{CycleScheduler, DemoSequencer, RecordingPort, SchedulerPolicy, TokioClock};
//!
//! # async fn demo() {
//! let clock = TokioClock::shared();
//! let sequencer = DemoSequencer::new(RecordingPort::new(), clock.clone());
//! let scheduler = CycleScheduler::new(
//!     sequencer,
//!     clock,
//!     SchedulerPolicy::default().with_max_cycles(1),
//! );
//! let summary = scheduler.run().await;
//! assert_eq!(summary.cycles_completed, 1);
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Booking modal sub-flow
///
/// Date, time and confirm steps with an auto-filled contact form.
pub mod booking;

/// Swedish booking calendar and "next Tuesday"
pub mod calendar;

/// Real and virtual clocks
pub mod clock;

/// Demo configuration
pub mod config;

/// Contact form details and validation
pub mod contact;

/// Presentation port and the in-memory recording port
pub mod port;

mod result;

/// Endless non-overlapping cycle loop
pub mod scheduler;

/// Demo scripts
pub mod script;

/// One-cycle sequencer
pub mod sequencer;

/// Per-cycle state
pub mod state;

/// Timing profiles
pub mod timing;

pub use booking::{BookingFlow, BookingOutcome, BookingStep, BookingView, SummaryField};
pub use calendar::{next_tuesday, CalendarDay, CalendarMonth, TIME_SLOTS};
pub use clock::{Clock, ClockKind, FakeClock, SharedClock, TokioClock};
pub use config::DemoConfig;
pub use contact::{is_valid_email, ContactDetails, ContactField};
pub use port::{
    Item, PostedMessage, PresentationPort, PresentationState, RecordingPort, Region, Signal,
};
pub use result::{ShowreelError, ShowreelResult};
pub use scheduler::{CycleGate, CycleScheduler, GateGuard, RunSummary, SchedulerPolicy};
pub use script::{ControlAction, DemoScript, ScriptStep, Speaker};
pub use sequencer::{CycleReport, DemoSequencer};
pub use state::CycleState;
pub use timing::{ProfileName, TimingProfile};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    mod end_to_end_tests {
        use super::*;

        #[tokio::test]
        async fn test_config_driven_cycle() {
            let config = DemoConfig::new()
                .with_profile(ProfileName::Widget)
                .with_speed(10.0);
            let clock = FakeClock::shared();
            let port = RecordingPort::new();
            let mut sequencer = DemoSequencer::from_config(&config, port.clone(), clock.clone())
                .unwrap()
                .with_today(NaiveDate::from_ymd_opt(2024, 5, 13).unwrap());

            let report = sequencer.play_cycle().await.unwrap();
            assert_eq!(report.messages_revealed, DemoScript::widget().message_count());
            assert!(port.signals().contains(&Signal::BookingConfirmed {
                date: NaiveDate::from_ymd_opt(2024, 5, 14).unwrap(),
                time: "10:00".to_string(),
                name: "Erik Andersson".to_string(),
            }));
        }

        #[test]
        fn test_from_config_rejects_bad_speed() {
            let config = DemoConfig::new().with_speed(-1.0);
            let result = DemoSequencer::from_config(
                &config,
                RecordingPort::new(),
                FakeClock::shared(),
            );
            assert!(matches!(result, Err(ShowreelError::Config { .. })));
        }
    }
}
