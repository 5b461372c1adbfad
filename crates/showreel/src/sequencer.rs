//! Demo-cycle sequencer: replays the script against a presentation port.
//!
//! A cycle is strictly linear. It resets the surface, reveals the chat panel
//! and plays every step in order. Bot steps show the typing indicator and
//! reveal their text char by char. User steps type into the input and send.
//! The control step hands over to the [`BookingFlow`]. The only suspension
//! points are clock sleeps.

use crate::booking::{BookingFlow, BookingOutcome};
use crate::clock::SharedClock;
use crate::config::DemoConfig;
use crate::contact::ContactDetails;
use crate::port::{Item, PostedMessage, PresentationPort, Region, Signal};
use crate::result::ShowreelResult;
use crate::script::{ControlAction, DemoScript, ScriptStep, Speaker};
use crate::state::CycleState;
use crate::timing::TimingProfile;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

/// Bubbles shown at full weight before older ones are dimmed
pub const DEFAULT_MAX_VISIBLE_MESSAGES: usize = 4;

/// Opacity of bubbles beyond the visible window
pub const DIMMED_OPACITY: f32 = 0.2;

/// Opacity lost per position in the visible window
pub const OPACITY_STEP: f32 = 0.15;

/// Opacity of the bubble at `index` (0 = newest)
#[must_use]
pub fn message_opacity(index: usize, max_visible: usize) -> f32 {
    if index >= max_visible {
        DIMMED_OPACITY
    } else {
        (OPACITY_STEP.mul_add(-(index as f32), 1.0)).max(DIMMED_OPACITY)
    }
}

/// Summary of one completed cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Cycle number
    pub cycle: u64,
    /// Cycle id used in logs
    pub cycle_id: Uuid,
    /// Step ids in processing order
    pub visited: Vec<String>,
    /// Chat messages revealed
    pub messages_revealed: usize,
    /// Booking result, if the script opened the booking modal
    pub booking: Option<BookingOutcome>,
    /// Time spent according to the clock
    pub elapsed: Duration,
}

/// Replays a [`DemoScript`] against a [`PresentationPort`]
#[derive(Debug)]
pub struct DemoSequencer<P: PresentationPort> {
    script: DemoScript,
    timing: TimingProfile,
    contact: ContactDetails,
    max_visible_messages: usize,
    today: Option<NaiveDate>,
    port: P,
    clock: SharedClock,
    cycles_started: u64,
}

impl<P: PresentationPort> DemoSequencer<P> {
    /// Create a sequencer with the default script, timing and contact
    pub fn new(port: P, clock: SharedClock) -> Self {
        Self {
            script: DemoScript::default(),
            timing: TimingProfile::default(),
            contact: ContactDetails::default(),
            max_visible_messages: DEFAULT_MAX_VISIBLE_MESSAGES,
            today: None,
            port,
            clock,
            cycles_started: 0,
        }
    }

    /// Create a sequencer from a configuration
    pub fn from_config(config: &DemoConfig, port: P, clock: SharedClock) -> ShowreelResult<Self> {
        config.validate()?;
        Ok(Self::new(port, clock)
            .with_script(config.script()?)
            .with_timing(config.timing()?)
            .with_contact(config.contact.clone())
            .with_max_visible_messages(config.max_visible_messages))
    }

    /// Replace the script
    #[must_use]
    pub fn with_script(mut self, script: DemoScript) -> Self {
        self.script = script;
        self
    }

    /// Replace the timing profile
    #[must_use]
    pub fn with_timing(mut self, timing: TimingProfile) -> Self {
        self.timing = timing;
        self
    }

    /// Replace the contact details typed into the form
    #[must_use]
    pub fn with_contact(mut self, contact: ContactDetails) -> Self {
        self.contact = contact;
        self
    }

    /// Set the size of the full-weight message window
    #[must_use]
    pub fn with_max_visible_messages(mut self, max: usize) -> Self {
        self.max_visible_messages = max.max(1);
        self
    }

    /// Pin the calendar reference date instead of using today
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// The script being played
    pub fn script(&self) -> &DemoScript {
        &self.script
    }

    /// The timing profile in use
    pub fn timing(&self) -> &TimingProfile {
        &self.timing
    }

    /// The presentation port
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Cycles started so far
    pub fn cycles_started(&self) -> u64 {
        self.cycles_started
    }

    /// Fresh state for the next cycle
    pub fn next_cycle_state(&mut self) -> CycleState {
        self.cycles_started += 1;
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        CycleState::new(self.cycles_started, today)
    }

    /// Start a fresh cycle and play it to the end
    pub async fn play_cycle(&mut self) -> ShowreelResult<CycleReport> {
        let mut state = self.next_cycle_state();
        self.run_cycle(&mut state).await
    }

    /// Play one cycle with the given state
    pub async fn run_cycle(&mut self, state: &mut CycleState) -> ShowreelResult<CycleReport> {
        let span = tracing::info_span!("cycle", cycle = state.cycle, id = %state.cycle_id);
        self.play(state).instrument(span).await
    }

    async fn play(&mut self, state: &mut CycleState) -> ShowreelResult<CycleReport> {
        let started = self.clock.elapsed();
        info!(script = %self.script.name, steps = self.script.steps.len(), "cycle started");

        self.reset()?;
        self.port.emit(Signal::CycleStarted { cycle: state.cycle })?;
        self.port.set_visible(&Region::ChatPanel, true)?;
        self.clock.sleep_ms(self.timing.initial_load_ms).await;

        let steps = self.script.steps.clone();
        let mut messages_revealed = 0;
        let mut booking = None;

        for (index, step) in steps.iter().enumerate() {
            state.current_step_index = index;
            if state.has_visited(&step.id) {
                warn!(step = %step.id, "step already processed this cycle, skipping");
                continue;
            }

            if let Some(action) = step.control {
                self.clock.sleep_ms(step.pause_ms).await;
                state.mark_visited(&step.id);
                booking = Some(self.run_control(action, state).await?);
                break;
            }

            debug!(step = %step.id, speaker = %step.speaker, "playing step");
            match step.speaker {
                Speaker::Bot => self.play_bot(step, state).await?,
                Speaker::User => self.play_user(step, state).await?,
            }
            state.mark_visited(&step.id);
            messages_revealed += 1;
            self.clock.sleep_ms(step.pause_ms).await;
        }

        self.port.emit(Signal::CycleFinished { cycle: state.cycle })?;
        let elapsed = self.clock.elapsed().saturating_sub(started);
        info!(
            messages = messages_revealed,
            elapsed_ms = elapsed.as_millis() as u64,
            "cycle finished"
        );

        Ok(CycleReport {
            cycle: state.cycle,
            cycle_id: state.cycle_id,
            visited: state.visited().to_vec(),
            messages_revealed,
            booking,
            elapsed,
        })
    }

    /// Return the surface to its pre-cycle state: empty chat, empty input,
    /// no typing indicator, no modal, no animation, no banner, no highlights.
    /// Calling it twice is the same as calling it once.
    pub fn reset(&mut self) -> ShowreelResult<()> {
        let port = &mut self.port;
        port.set_visible(&Region::TypingIndicator, false)?;
        port.clear(&Region::ChatPanel)?;
        port.reveal(&Region::Input, "")?;
        port.highlight(Item::SendButton, false)?;
        port.set_opacity(&Region::ChatPanel, 1.0)?;
        port.set_visible(&Region::BookingModal, false)?;
        port.clear(&Region::BookingModal)?;
        port.set_visible(&Region::PaperPlane, false)?;
        port.set_visible(&Region::ConfirmationBanner, false)?;
        port.clear(&Region::ConfirmationBanner)?;
        Ok(())
    }

    async fn play_bot(&mut self, step: &ScriptStep, state: &mut CycleState) -> ShowreelResult<()> {
        self.port.set_visible(&Region::TypingIndicator, true)?;
        self.clock.sleep_ms(self.timing.typing_indicator_ms).await;
        self.port.set_visible(&Region::TypingIndicator, false)?;

        self.post(step, String::new(), state)?;
        self.type_bubble(step).await?;
        self.revealed(step, state)
    }

    async fn play_user(&mut self, step: &ScriptStep, state: &mut CycleState) -> ShowreelResult<()> {
        let mut typed = String::new();
        self.port.reveal(&Region::Input, &typed)?;
        if self.timing.user_types_spaces {
            for ch in step.text.chars() {
                typed.push(ch);
                self.port.reveal(&Region::Input, &typed)?;
                self.clock.sleep_ms(self.timing.user_char_ms).await;
            }
        } else {
            for word in step.text.split(' ') {
                for ch in word.chars() {
                    typed.push(ch);
                    self.port.reveal(&Region::Input, &typed)?;
                    self.clock.sleep_ms(self.timing.user_char_ms).await;
                }
                typed.push(' ');
                self.port.reveal(&Region::Input, &typed)?;
                self.clock.sleep_ms(self.timing.user_word_ms).await;
            }
        }

        self.port.highlight(Item::SendButton, true)?;
        self.clock.sleep_ms(self.timing.send_flash_ms).await;
        self.port.highlight(Item::SendButton, false)?;
        self.port.reveal(&Region::Input, "")?;

        if self.timing.user_bubble_typed {
            self.post(step, String::new(), state)?;
            self.type_bubble(step).await?;
        } else {
            self.post(step, step.text.clone(), state)?;
        }
        self.revealed(step, state)
    }

    /// Reveal a posted bubble char by char at bot pace
    async fn type_bubble(&mut self, step: &ScriptStep) -> ShowreelResult<()> {
        let region = Region::Message(step.id.clone());
        let mut shown = String::new();
        for (i, word) in step.text.split(' ').enumerate() {
            if i > 0 {
                shown.push(' ');
            }
            for ch in word.chars() {
                shown.push(ch);
                self.port.reveal(&region, &shown)?;
                self.clock.sleep_ms(self.timing.bot_char_ms).await;
            }
            self.clock.sleep_ms(self.timing.bot_word_ms).await;
        }
        Ok(())
    }

    async fn run_control(
        &mut self,
        action: ControlAction,
        state: &mut CycleState,
    ) -> ShowreelResult<BookingOutcome> {
        match action {
            ControlAction::OpenBooking => {
                info!("opening booking modal");
                self.port.emit(Signal::BookingModalOpened)?;
                BookingFlow::new(
                    &mut self.port,
                    self.clock.as_ref(),
                    &self.timing,
                    &self.contact,
                )
                .run(state)
                .await
            }
        }
    }

    fn post(&mut self, step: &ScriptStep, text: String, state: &mut CycleState) -> ShowreelResult<()> {
        self.port.post_message(&PostedMessage {
            id: step.id.clone(),
            speaker: step.speaker,
            text,
            timestamp: Local::now().format("%H:%M").to_string(),
        })?;
        state.posted.push(step.id.clone());
        Ok(())
    }

    fn revealed(&mut self, step: &ScriptStep, state: &CycleState) -> ShowreelResult<()> {
        self.port.emit(Signal::MessageRevealed {
            id: step.id.clone(),
            speaker: step.speaker,
        })?;
        self.reweight_messages(state)
    }

    fn reweight_messages(&mut self, state: &CycleState) -> ShowreelResult<()> {
        for (index, id) in state.posted_newest_first().enumerate() {
            let opacity = message_opacity(index, self.max_visible_messages);
            self.port.set_opacity(&Region::Message(id.clone()), opacity)?;
        }
        Ok(())
    }
}
