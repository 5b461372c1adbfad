//! Cycle scheduler: plays cycles back to back, one at a time, forever.
//!
//! A single-slot [`CycleGate`] guarantees that at most one cycle is active.
//! A trigger that finds the gate taken waits and rechecks instead of
//! starting a second, overlapping cycle. Faults are logged, backed off and
//! followed by a fresh cycle; they never end the loop.

use crate::clock::SharedClock;
use crate::port::PresentationPort;
use crate::result::ShowreelResult;
use crate::sequencer::{CycleReport, DemoSequencer};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Pacing between cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerPolicy {
    /// Pause after every cycle
    pub cooldown_ms: u64,
    /// Extra pause after a faulted cycle
    pub fault_backoff_ms: u64,
    /// Recheck interval while another cycle is active
    pub busy_recheck_ms: u64,
    /// Stop after this many cycles (None = forever)
    pub max_cycles: Option<u64>,
}

impl Default for SchedulerPolicy {
    fn default() -> Self {
        Self {
            cooldown_ms: 3000,
            fault_backoff_ms: 2000,
            busy_recheck_ms: 1000,
            max_cycles: None,
        }
    }
}

impl SchedulerPolicy {
    /// Stop after `cycles`
    #[must_use]
    pub const fn with_max_cycles(mut self, cycles: u64) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    /// Set the pause after every cycle
    #[must_use]
    pub const fn with_cooldown_ms(mut self, ms: u64) -> Self {
        self.cooldown_ms = ms;
        self
    }

    /// Set the extra pause after a fault
    #[must_use]
    pub const fn with_fault_backoff_ms(mut self, ms: u64) -> Self {
        self.fault_backoff_ms = ms;
        self
    }

    /// Scale every delay by `1 / speed`
    #[must_use]
    pub fn scaled(mut self, speed: f64) -> Self {
        let scale = |ms: u64| (ms as f64 / speed).round() as u64;
        self.cooldown_ms = scale(self.cooldown_ms);
        self.fault_backoff_ms = scale(self.fault_backoff_ms);
        self.busy_recheck_ms = scale(self.busy_recheck_ms).max(1);
        self
    }
}

/// Single-slot "a cycle is active" flag
#[derive(Debug, Clone, Default)]
pub struct CycleGate {
    busy: Arc<AtomicBool>,
}

impl CycleGate {
    /// Create an open gate
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a cycle currently holds the gate
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Take the gate if it is free
    #[must_use]
    pub fn try_enter(&self) -> Option<GateGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GateGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    /// Wait until the gate is free and take it. Returns the guard and the
    /// number of times the caller was deferred.
    pub async fn enter(&self, clock: &SharedClock, recheck_ms: u64) -> (GateGuard, u64) {
        let mut deferrals = 0;
        loop {
            if let Some(guard) = self.try_enter() {
                return (guard, deferrals);
            }
            deferrals += 1;
            debug!(deferrals, "cycle already running, deferring");
            clock.sleep_ms(recheck_ms.max(1)).await;
        }
    }
}

/// Releases the gate on drop
#[derive(Debug)]
pub struct GateGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Totals for a scheduler run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Cycles that ran to completion
    pub cycles_completed: u64,
    /// Cycles that ended in a fault
    pub faults: u64,
    /// Times a trigger found another cycle active and waited
    pub deferrals: u64,
}

impl RunSummary {
    /// Cycles attempted
    #[must_use]
    pub const fn cycles_attempted(&self) -> u64 {
        self.cycles_completed + self.faults
    }
}

/// Runs a [`DemoSequencer`] in an endless, non-overlapping loop
#[derive(Debug)]
pub struct CycleScheduler<P: PresentationPort> {
    sequencer: Mutex<DemoSequencer<P>>,
    gate: CycleGate,
    clock: SharedClock,
    policy: SchedulerPolicy,
    completed: AtomicU64,
    faults: AtomicU64,
    deferrals: AtomicU64,
}

impl<P: PresentationPort> CycleScheduler<P> {
    /// Wrap a sequencer
    pub fn new(sequencer: DemoSequencer<P>, clock: SharedClock, policy: SchedulerPolicy) -> Self {
        Self {
            sequencer: Mutex::new(sequencer),
            gate: CycleGate::new(),
            clock,
            policy,
            completed: AtomicU64::new(0),
            faults: AtomicU64::new(0),
            deferrals: AtomicU64::new(0),
        }
    }

    /// The pacing policy
    pub fn policy(&self) -> &SchedulerPolicy {
        &self.policy
    }

    /// Whether a cycle is active right now
    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Totals so far
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            cycles_completed: self.completed.load(Ordering::Relaxed),
            faults: self.faults.load(Ordering::Relaxed),
            deferrals: self.deferrals.load(Ordering::Relaxed),
        }
    }

    /// Run exactly one cycle, waiting for any active cycle to finish first
    ///
    /// A fault is counted and returned; the next trigger starts from a
    /// clean reset.
    pub async fn trigger(&self) -> ShowreelResult<CycleReport> {
        let (guard, deferred) = self.gate.enter(&self.clock, self.policy.busy_recheck_ms).await;
        self.deferrals.fetch_add(deferred, Ordering::Relaxed);

        let result = self.sequencer.lock().await.play_cycle().await;
        drop(guard);

        match &result {
            Ok(report) => {
                self.completed.fetch_add(1, Ordering::Relaxed);
                debug!(cycle = report.cycle, "cycle completed");
            }
            Err(e) => {
                self.faults.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, "cycle fault");
            }
        }
        result
    }

    /// Loop cycles until `max_cycles` is reached (forever when unset)
    pub async fn run(&self) -> RunSummary {
        self.run_with(|_| {}).await
    }

    /// Like [`run`](Self::run), calling `on_cycle` after every attempt
    pub async fn run_with<F>(&self, mut on_cycle: F) -> RunSummary
    where
        F: FnMut(&ShowreelResult<CycleReport>),
    {
        info!(
            cooldown_ms = self.policy.cooldown_ms,
            max_cycles = ?self.policy.max_cycles,
            "scheduler started"
        );
        let mut attempted = 0u64;
        loop {
            let result = self.trigger().await;
            attempted += 1;
            on_cycle(&result);

            if result.is_err() {
                self.clock.sleep_ms(self.policy.fault_backoff_ms).await;
            }
            if self.policy.max_cycles.is_some_and(|max| attempted >= max) {
                break;
            }
            self.clock.sleep_ms(self.policy.cooldown_ms).await;
        }

        let summary = self.summary();
        info!(
            completed = summary.cycles_completed,
            faults = summary.faults,
            "scheduler stopped"
        );
        summary
    }

    /// Consume the scheduler and return the sequencer
    pub fn into_sequencer(self) -> DemoSequencer<P> {
        self.sequencer.into_inner()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::contact::{ContactDetails, ContactField};
    use crate::port::{RecordingPort, Region, Signal};
    use crate::result::ShowreelError;
    use chrono::NaiveDate;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 13).unwrap()
    }

    fn scheduler(
        port: RecordingPort,
        policy: SchedulerPolicy,
    ) -> (CycleScheduler<RecordingPort>, Arc<FakeClock>) {
        let clock = FakeClock::shared();
        let seq = DemoSequencer::new(port, clock.clone()).with_today(monday());
        (CycleScheduler::new(seq, clock.clone(), policy), clock)
    }

    mod gate_tests {
        use super::*;

        #[test]
        fn test_gate_is_single_slot() {
            let gate = CycleGate::new();
            let guard = gate.try_enter().unwrap();
            assert!(gate.is_busy());
            assert!(gate.try_enter().is_none());
            drop(guard);
            assert!(!gate.is_busy());
            assert!(gate.try_enter().is_some());
        }

        #[tokio::test]
        async fn test_enter_waits_for_release() {
            let gate = CycleGate::new();
            let clock: SharedClock = FakeClock::shared();
            let held = gate.try_enter().unwrap();

            let waiter = gate.enter(&clock, 100);
            let release = async {
                tokio::task::yield_now().await;
                drop(held);
            };
            let ((_guard, deferrals), ()) = tokio::join!(waiter, release);
            assert!(deferrals >= 1);
        }
    }

    mod policy_tests {
        use super::*;

        #[test]
        fn test_default_policy() {
            let policy = SchedulerPolicy::default();
            assert_eq!(policy.cooldown_ms, 3000);
            assert_eq!(policy.fault_backoff_ms, 2000);
            assert!(policy.max_cycles.is_none());
        }

        #[test]
        fn test_scaled_policy() {
            let policy = SchedulerPolicy::default().scaled(2.0);
            assert_eq!(policy.cooldown_ms, 1500);
            assert_eq!(policy.busy_recheck_ms, 500);
        }

        #[test]
        fn test_policy_yaml_defaults() {
            let policy: SchedulerPolicy = serde_yaml_ng::from_str("cooldown_ms: 10").unwrap();
            assert_eq!(policy.cooldown_ms, 10);
            assert_eq!(policy.busy_recheck_ms, 1000);
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_run_stops_at_max_cycles() {
            let port = RecordingPort::new();
            let (scheduler, _) =
                scheduler(port.clone(), SchedulerPolicy::default().with_max_cycles(3));
            let summary = scheduler.run().await;

            assert_eq!(summary.cycles_completed, 3);
            assert_eq!(summary.faults, 0);
            let finished = port
                .signals()
                .iter()
                .filter(|s| matches!(s, Signal::CycleFinished { .. }))
                .count();
            assert_eq!(finished, 3);
        }

        #[tokio::test]
        async fn test_cooldown_between_cycles() {
            let port = RecordingPort::new();
            let (scheduler, clock) = scheduler(
                port,
                SchedulerPolicy::default().with_max_cycles(2).with_cooldown_ms(3000),
            );
            let mut elapsed = Vec::new();
            scheduler
                .run_with(|r| elapsed.push(r.as_ref().unwrap().elapsed))
                .await;

            let cycles: u64 = elapsed.iter().map(|d| d.as_millis() as u64).sum();
            assert_eq!(clock.now_ms(), cycles + 3000);
        }

        #[tokio::test]
        async fn test_concurrent_triggers_never_overlap() {
            let port = RecordingPort::new();
            let (scheduler, _) = scheduler(port.clone(), SchedulerPolicy::default());

            let (a, b) = tokio::join!(scheduler.trigger(), scheduler.trigger());
            a.unwrap();
            b.unwrap();

            let boundaries: Vec<Signal> = port
                .signals()
                .into_iter()
                .filter(|s| {
                    matches!(s, Signal::CycleStarted { .. } | Signal::CycleFinished { .. })
                })
                .collect();
            assert_eq!(
                boundaries,
                vec![
                    Signal::CycleStarted { cycle: 1 },
                    Signal::CycleFinished { cycle: 1 },
                    Signal::CycleStarted { cycle: 2 },
                    Signal::CycleFinished { cycle: 2 },
                ]
            );
            assert!(scheduler.summary().deferrals > 0);
            assert!(!scheduler.is_busy());
        }

        #[tokio::test]
        async fn test_fault_then_clean_cycle() {
            let port = RecordingPort::new();
            let clock = FakeClock::shared();
            let mut contact = ContactDetails::default();
            contact.set(ContactField::Email, "not-an-email");
            let seq = DemoSequencer::new(port.clone(), clock.clone())
                .with_today(monday())
                .with_contact(contact);
            let scheduler = CycleScheduler::new(seq, clock.clone(), SchedulerPolicy::default());

            let err = scheduler.trigger().await.unwrap_err();
            assert!(matches!(err, ShowreelError::InvalidContact { .. }));
            assert_eq!(scheduler.summary().faults, 1);
            assert!(!scheduler.is_busy());

            port.clear_history();
            let mut seq = scheduler.into_sequencer().with_contact(ContactDetails::default());
            let report = seq.play_cycle().await.unwrap();
            assert!(report.booking.is_some());
            // the follow-up cycle starts from a reset surface
            assert_eq!(port.signals()[0], Signal::CycleStarted { cycle: 2 });
            assert!(port.history()[0].starts_with("set_visible:typing-indicator:false"));
        }

        #[tokio::test]
        async fn test_run_survives_port_faults() {
            let port = RecordingPort::failing_on(Region::ConfirmationBanner);
            let (scheduler, _) =
                scheduler(port.clone(), SchedulerPolicy::default().with_max_cycles(3));

            let healer = port.clone();
            let summary = scheduler
                .run_with(|result| {
                    if result.is_err() {
                        healer.heal();
                    }
                })
                .await;

            assert_eq!(summary.faults, 1);
            assert_eq!(summary.cycles_completed, 2);
            assert_eq!(summary.cycles_attempted(), 3);
        }

        #[tokio::test]
        async fn test_fault_backoff_is_applied() {
            let port = RecordingPort::failing_on(Region::ChatPanel);
            let (scheduler, clock) = scheduler(
                port,
                SchedulerPolicy::default()
                    .with_max_cycles(1)
                    .with_fault_backoff_ms(2000),
            );
            let summary = scheduler.run().await;
            assert_eq!(summary.faults, 1);
            // reset fails before any sleep, leaving only the backoff
            assert_eq!(clock.now_ms(), 2000);
        }
    }
}
