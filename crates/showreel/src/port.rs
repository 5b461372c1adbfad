//! Presentation port: the only way the sequencer touches the visible surface.
//!
//! The sequencer never looks elements up itself. It names a [`Region`] or an
//! [`Item`] and the port decides how that maps to pixels, DOM nodes or
//! terminal lines.
//!
//! # Implementations
//!
//! - [`RecordingPort`] - in-memory presentation model with a call history,
//!   used by tests and for JSON transcripts
//! - `TerminalPort` (in `showreel-cli`) - renders to the console

use crate::booking::{BookingStep, BookingView, SummaryField};
use crate::contact::ContactField;
use crate::result::{ShowreelError, ShowreelResult};
use crate::script::Speaker;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// A named visual region
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "region", content = "key")]
pub enum Region {
    /// Chat container
    ChatPanel,
    /// Message input field
    Input,
    /// Send affordance
    SendButton,
    /// Animated "bot is typing" dots
    TypingIndicator,
    /// A posted chat bubble
    Message(String),
    /// Booking modal container
    BookingModal,
    /// One of the modal's step panels
    StepPanel(BookingStep),
    /// Calendar grid
    Calendar,
    /// Time slot list
    TimeSlots,
    /// Contact form field
    ContactField(ContactField),
    /// Confirm-step summary value
    Summary(SummaryField),
    /// Paper plane animation
    PaperPlane,
    /// Final confirmation banner
    ConfirmationBanner,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChatPanel => write!(f, "chat-panel"),
            Self::Input => write!(f, "input"),
            Self::SendButton => write!(f, "send-button"),
            Self::TypingIndicator => write!(f, "typing-indicator"),
            Self::Message(id) => write!(f, "message:{id}"),
            Self::BookingModal => write!(f, "booking-modal"),
            Self::StepPanel(step) => write!(f, "step-panel:{step}"),
            Self::Calendar => write!(f, "calendar"),
            Self::TimeSlots => write!(f, "time-slots"),
            Self::ContactField(field) => write!(f, "contact:{field}"),
            Self::Summary(field) => write!(f, "summary:{field}"),
            Self::PaperPlane => write!(f, "paper-plane"),
            Self::ConfirmationBanner => write!(f, "confirmation-banner"),
        }
    }
}

/// A selectable item that can carry a highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "item", content = "key")]
pub enum Item {
    /// Send affordance (flashes on send)
    SendButton,
    /// Calendar day cell
    CalendarDay(u32),
    /// Time slot by index
    TimeSlot(usize),
    /// Step indicator tab
    StepIndicator(BookingStep),
    /// "Nästa" button of a step
    NextButton(BookingStep),
    /// "Bekräfta Bokning" button
    ConfirmButton,
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SendButton => write!(f, "send-button"),
            Self::CalendarDay(day) => write!(f, "calendar-day:{day}"),
            Self::TimeSlot(index) => write!(f, "time-slot:{index}"),
            Self::StepIndicator(step) => write!(f, "step-indicator:{step}"),
            Self::NextButton(step) => write!(f, "next-button:{step}"),
            Self::ConfirmButton => write!(f, "confirm-button"),
        }
    }
}

/// A new chat bubble
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedMessage {
    /// Script step id
    pub id: String,
    /// Author
    pub speaker: Speaker,
    /// Initial text (empty when revealed char by char)
    pub text: String,
    /// "HH:MM" stamp shown under the bubble
    pub timestamp: String,
}

/// Observable milestones of a cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "signal")]
pub enum Signal {
    /// A cycle started from a clean reset
    CycleStarted {
        /// Cycle number, starting at 1
        cycle: u64,
    },
    /// A chat message finished revealing
    MessageRevealed {
        /// Step id
        id: String,
        /// Author
        speaker: Speaker,
    },
    /// The control step opened the booking modal
    BookingModalOpened,
    /// The modal moved to a step
    BookingStepEntered {
        /// Step entered
        step: BookingStep,
    },
    /// The booking was confirmed
    BookingConfirmed {
        /// Booked date
        date: NaiveDate,
        /// Booked time slot
        time: String,
        /// Booked by
        name: String,
    },
    /// All transient UI was torn down
    CycleFinished {
        /// Cycle number
        cycle: u64,
    },
}

/// Sink for presentation mutations
pub trait PresentationPort: Send {
    /// Replace the text shown in a region
    fn reveal(&mut self, region: &Region, text: &str) -> ShowreelResult<()>;

    /// Show or hide a region
    fn set_visible(&mut self, region: &Region, visible: bool) -> ShowreelResult<()>;

    /// Set or clear the highlight on an item
    fn highlight(&mut self, item: Item, on: bool) -> ShowreelResult<()>;

    /// Add a bubble at the top of the chat panel
    fn post_message(&mut self, message: &PostedMessage) -> ShowreelResult<()>;

    /// Set region opacity (0.0 - 1.0)
    fn set_opacity(&mut self, region: &Region, opacity: f32) -> ShowreelResult<()>;

    /// Remove all content from a region
    fn clear(&mut self, region: &Region) -> ShowreelResult<()>;

    /// Mount the booking modal content
    fn render_booking(&mut self, view: &BookingView) -> ShowreelResult<()>;

    /// Publish a milestone
    fn emit(&mut self, signal: Signal) -> ShowreelResult<()>;
}

/// A chat bubble in the presentation model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bubble {
    /// Step id
    pub id: String,
    /// Author
    pub speaker: Speaker,
    /// Text revealed so far
    pub text: String,
    /// Time stamp
    pub timestamp: String,
}

/// In-memory model of everything visible
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresentationState {
    /// Visible regions
    pub visible: BTreeSet<Region>,
    /// Text per region
    pub texts: BTreeMap<Region, String>,
    /// Highlighted items
    pub highlighted: BTreeSet<Item>,
    /// Opacity overrides per region
    pub opacity: BTreeMap<Region, f32>,
    /// Chat bubbles, newest first
    pub messages: Vec<Bubble>,
    /// Mounted booking modal content
    pub booking: Option<BookingView>,
}

impl PresentationState {
    /// Whether a region is visible
    #[must_use]
    pub fn is_visible(&self, region: &Region) -> bool {
        self.visible.contains(region)
    }

    /// Text shown in a region
    #[must_use]
    pub fn text(&self, region: &Region) -> Option<&str> {
        self.texts.get(region).map(String::as_str)
    }

    /// Whether nothing transient is on screen: no bubbles, no modal, no
    /// banner, no animation, no highlights and an empty input
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.messages.is_empty()
            && self.booking.is_none()
            && self.highlighted.is_empty()
            && !self.is_visible(&Region::BookingModal)
            && !self.is_visible(&Region::ConfirmationBanner)
            && !self.is_visible(&Region::PaperPlane)
            && !self.is_visible(&Region::TypingIndicator)
            && self.text(&Region::Input).map_or(true, str::is_empty)
    }

    fn apply_clear(&mut self, region: &Region) {
        match region {
            Region::ChatPanel => {
                self.messages.clear();
                self.texts.retain(|r, _| !matches!(r, Region::Message(_)));
                self.opacity.retain(|r, _| !matches!(r, Region::Message(_)));
                self.visible.retain(|r| !matches!(r, Region::Message(_)));
            }
            Region::BookingModal => {
                self.booking = None;
                self.texts.retain(|r, _| {
                    !matches!(
                        r,
                        Region::ContactField(_) | Region::Summary(_) | Region::StepPanel(_)
                    )
                });
                self.visible.retain(|r| !matches!(r, Region::StepPanel(_)));
                self.highlighted.retain(|i| {
                    !matches!(
                        i,
                        Item::CalendarDay(_)
                            | Item::TimeSlot(_)
                            | Item::StepIndicator(_)
                            | Item::NextButton(_)
                            | Item::ConfirmButton
                    )
                });
            }
            Region::Message(id) => {
                self.messages.retain(|m| &m.id != id);
                self.texts.remove(region);
            }
            other => {
                self.texts.remove(other);
            }
        }
    }
}

#[derive(Debug, Default)]
struct Recording {
    state: PresentationState,
    calls: Vec<String>,
    signals: Vec<Signal>,
    fail_on: Option<Region>,
}

/// Port that applies every call to a [`PresentationState`] and records it
///
/// Clones share the same recording, so a test can hand one clone to the
/// sequencer and inspect another.
#[derive(Debug, Clone, Default)]
pub struct RecordingPort {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingPort {
    /// Create an empty recording port
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation touching `region` fail
    #[must_use]
    pub fn failing_on(region: Region) -> Self {
        let port = Self::new();
        port.lock().fail_on = Some(region);
        port
    }

    /// Stop injecting failures
    pub fn heal(&self) {
        self.lock().fail_on = None;
    }

    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.inner.lock().expect("recording port mutex poisoned")
    }

    /// Snapshot of the presentation model
    #[must_use]
    pub fn state(&self) -> PresentationState {
        self.lock().state.clone()
    }

    /// Call history, one entry per port call
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Check if a call with this prefix was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock().calls.iter().any(|c| c.starts_with(prefix))
    }

    /// Signals emitted so far
    #[must_use]
    pub fn signals(&self) -> Vec<Signal> {
        self.lock().signals.clone()
    }

    /// Forget calls and signals, keep the presentation model
    pub fn clear_history(&self) {
        let mut rec = self.lock();
        rec.calls.clear();
        rec.signals.clear();
    }

    /// Signals serialized as a JSON array
    pub fn transcript_json(&self) -> ShowreelResult<String> {
        Ok(serde_json::to_string_pretty(&self.lock().signals)?)
    }

    fn guard(rec: &Recording, region: &Region) -> ShowreelResult<()> {
        if rec.fail_on.as_ref() == Some(region) {
            return Err(ShowreelError::port(
                region.to_string(),
                "injected failure",
            ));
        }
        Ok(())
    }
}

impl PresentationPort for RecordingPort {
    fn reveal(&mut self, region: &Region, text: &str) -> ShowreelResult<()> {
        let mut rec = self.lock();
        Self::guard(&rec, region)?;
        rec.calls.push(format!("reveal:{region}:{text}"));
        if let Region::Message(id) = region {
            if let Some(bubble) = rec.state.messages.iter_mut().find(|m| &m.id == id) {
                bubble.text = text.to_string();
            }
        }
        rec.state.texts.insert(region.clone(), text.to_string());
        Ok(())
    }

    fn set_visible(&mut self, region: &Region, visible: bool) -> ShowreelResult<()> {
        let mut rec = self.lock();
        Self::guard(&rec, region)?;
        rec.calls.push(format!("set_visible:{region}:{visible}"));
        if visible {
            rec.state.visible.insert(region.clone());
        } else {
            rec.state.visible.remove(region);
        }
        Ok(())
    }

    fn highlight(&mut self, item: Item, on: bool) -> ShowreelResult<()> {
        let mut rec = self.lock();
        rec.calls.push(format!("highlight:{item}:{on}"));
        if on {
            rec.state.highlighted.insert(item);
        } else {
            rec.state.highlighted.remove(&item);
        }
        Ok(())
    }

    fn post_message(&mut self, message: &PostedMessage) -> ShowreelResult<()> {
        let mut rec = self.lock();
        Self::guard(&rec, &Region::ChatPanel)?;
        rec.calls.push(format!("post_message:{}:{}", message.id, message.speaker));
        rec.state.messages.insert(
            0,
            Bubble {
                id: message.id.clone(),
                speaker: message.speaker,
                text: message.text.clone(),
                timestamp: message.timestamp.clone(),
            },
        );
        rec.state
            .texts
            .insert(Region::Message(message.id.clone()), message.text.clone());
        Ok(())
    }

    fn set_opacity(&mut self, region: &Region, opacity: f32) -> ShowreelResult<()> {
        let mut rec = self.lock();
        Self::guard(&rec, region)?;
        rec.calls.push(format!("set_opacity:{region}:{opacity:.2}"));
        if (opacity - 1.0).abs() < f32::EPSILON {
            rec.state.opacity.remove(region);
        } else {
            rec.state.opacity.insert(region.clone(), opacity.clamp(0.0, 1.0));
        }
        Ok(())
    }

    fn clear(&mut self, region: &Region) -> ShowreelResult<()> {
        let mut rec = self.lock();
        Self::guard(&rec, region)?;
        rec.calls.push(format!("clear:{region}"));
        rec.state.apply_clear(region);
        Ok(())
    }

    fn render_booking(&mut self, view: &BookingView) -> ShowreelResult<()> {
        let mut rec = self.lock();
        Self::guard(&rec, &Region::BookingModal)?;
        rec.calls
            .push(format!("render_booking:{}", view.calendar.title()));
        rec.state.booking = Some(view.clone());
        Ok(())
    }

    fn emit(&mut self, signal: Signal) -> ShowreelResult<()> {
        let mut rec = self.lock();
        rec.calls.push(format!("emit:{}", signal_name(&signal)));
        rec.signals.push(signal);
        Ok(())
    }
}

/// Short name of a signal, for logs and call history
#[must_use]
pub const fn signal_name(signal: &Signal) -> &'static str {
    match signal {
        Signal::CycleStarted { .. } => "cycle_started",
        Signal::MessageRevealed { .. } => "message_revealed",
        Signal::BookingModalOpened => "booking_modal_opened",
        Signal::BookingStepEntered { .. } => "booking_step_entered",
        Signal::BookingConfirmed { .. } => "booking_confirmed",
        Signal::CycleFinished { .. } => "cycle_finished",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn bubble(id: &str) -> PostedMessage {
        PostedMessage {
            id: id.to_string(),
            speaker: Speaker::Bot,
            text: String::new(),
            timestamp: "10:00".to_string(),
        }
    }

    mod region_tests {
        use super::*;

        #[test]
        fn test_region_display() {
            assert_eq!(Region::ChatPanel.to_string(), "chat-panel");
            assert_eq!(Region::Message("msg1".into()).to_string(), "message:msg1");
            assert_eq!(
                Region::ContactField(ContactField::Email).to_string(),
                "contact:email"
            );
            assert_eq!(
                Region::StepPanel(BookingStep::Time).to_string(),
                "step-panel:time"
            );
        }

        #[test]
        fn test_item_display() {
            assert_eq!(Item::CalendarDay(14).to_string(), "calendar-day:14");
            assert_eq!(Item::ConfirmButton.to_string(), "confirm-button");
        }
    }

    mod recording_port_tests {
        use super::*;

        #[test]
        fn test_clones_share_recording() {
            let port = RecordingPort::new();
            let mut handle = port.clone();
            handle.set_visible(&Region::ChatPanel, true).unwrap();
            assert!(port.state().is_visible(&Region::ChatPanel));
            assert!(port.was_called("set_visible:chat-panel:true"));
        }

        #[test]
        fn test_post_then_reveal_updates_bubble() {
            let mut port = RecordingPort::new();
            port.post_message(&bubble("a")).unwrap();
            port.post_message(&bubble("b")).unwrap();
            port.reveal(&Region::Message("a".into()), "Hej").unwrap();

            let state = port.state();
            assert_eq!(state.messages[0].id, "b");
            assert_eq!(state.messages[1].text, "Hej");
        }

        #[test]
        fn test_clear_chat_panel_removes_bubbles() {
            let mut port = RecordingPort::new();
            port.post_message(&bubble("a")).unwrap();
            port.set_opacity(&Region::Message("a".into()), 0.5).unwrap();
            port.clear(&Region::ChatPanel).unwrap();

            let state = port.state();
            assert!(state.messages.is_empty());
            assert!(state.opacity.is_empty());
            assert!(state.text(&Region::Message("a".into())).is_none());
        }

        #[test]
        fn test_full_opacity_removes_override() {
            let mut port = RecordingPort::new();
            port.set_opacity(&Region::ChatPanel, 0.0).unwrap();
            assert_eq!(port.state().opacity.get(&Region::ChatPanel), Some(&0.0));
            port.set_opacity(&Region::ChatPanel, 1.0).unwrap();
            assert!(port.state().opacity.is_empty());
        }

        #[test]
        fn test_highlight_toggles() {
            let mut port = RecordingPort::new();
            port.highlight(Item::CalendarDay(14), true).unwrap();
            assert!(port.state().highlighted.contains(&Item::CalendarDay(14)));
            port.highlight(Item::CalendarDay(14), false).unwrap();
            assert!(port.state().highlighted.is_empty());
        }

        #[test]
        fn test_injected_failure() {
            let mut port = RecordingPort::failing_on(Region::BookingModal);
            let err = port.set_visible(&Region::BookingModal, true).unwrap_err();
            assert!(err.to_string().contains("booking-modal"));
            port.heal();
            port.set_visible(&Region::BookingModal, true).unwrap();
        }

        #[test]
        fn test_signals_and_transcript() {
            let mut port = RecordingPort::new();
            port.emit(Signal::CycleStarted { cycle: 1 }).unwrap();
            port.emit(Signal::BookingModalOpened).unwrap();
            assert_eq!(port.signals().len(), 2);
            assert!(port.was_called("emit:booking_modal_opened"));

            let json = port.transcript_json().unwrap();
            assert!(json.contains("\"signal\": \"cycle_started\""));

            port.clear_history();
            assert!(port.signals().is_empty());
            assert!(port.history().is_empty());
        }

        #[test]
        fn test_default_state_is_clean() {
            assert!(PresentationState::default().is_clean());
        }
    }
}
