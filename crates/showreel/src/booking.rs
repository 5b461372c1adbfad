//! Booking sub-flow: the three-step modal the control step opens.
//!
//! ```text
//! render ─► Date ─► Time ─► Confirm ─► paper plane ─► banner ─► teardown
//!            │        │        │
//!         highlight highlight fill form, validate, press confirm
//! ```

use crate::calendar::{
    format_long_sv, next_tuesday, weekday_name_sv, CalendarMonth, DEFAULT_SLOT_INDEX, TIME_SLOTS,
};
use crate::clock::Clock;
use crate::contact::{ContactDetails, ContactField};
use crate::port::{Item, PresentationPort, Region, Signal};
use crate::result::{ShowreelError, ShowreelResult};
use crate::state::CycleState;
use crate::timing::TimingProfile;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Banner headline shown after confirmation
pub const CONFIRMATION_TITLE: &str = "Bokning Bekräftad!";

/// Lead-in to the list of what the confirmation email carries
pub const CONFIRMATION_DETAILS_INTRO: &str = "En bekräftelse har skickats till din e-post med:";

/// What the confirmation email carries
pub const CONFIRMATION_DETAILS: [&str; 4] = [
    "Möteslänk för videosamtal",
    "Agenda för demon",
    "Förberedelsematerial",
    "Kontaktinformation",
];

/// Modal heading
pub const MODAL_TITLE: &str = "Boka Din Demo";

/// Steps of the booking modal, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    /// Pick a date
    Date,
    /// Pick a time slot
    Time,
    /// Fill contact details and confirm
    Confirm,
}

impl BookingStep {
    /// All steps in order
    pub const ALL: [Self; 3] = [Self::Date, Self::Time, Self::Confirm];

    /// Following step, `None` at the last one
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Date => Some(Self::Time),
            Self::Time => Some(Self::Confirm),
            Self::Confirm => None,
        }
    }

    /// Preceding step, `None` at the first one
    #[must_use]
    pub const fn prev(self) -> Option<Self> {
        match self {
            Self::Date => None,
            Self::Time => Some(Self::Date),
            Self::Confirm => Some(Self::Time),
        }
    }

    /// Step-indicator label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Date => "1. Välj Datum",
            Self::Time => "2. Välj Tid",
            Self::Confirm => "3. Bekräfta",
        }
    }
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::Confirm => write!(f, "confirm"),
        }
    }
}

/// Values on the confirm step summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryField {
    /// "Datum:"
    Date,
    /// "Tid:"
    Time,
    /// "Namn:"
    Name,
    /// "E-post:"
    Email,
}

impl fmt::Display for SummaryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::Name => write!(f, "name"),
            Self::Email => write!(f, "email"),
        }
    }
}

/// Content mounted into the booking modal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingView {
    /// Modal heading
    pub title: String,
    /// Month grid with the booking day selected
    pub calendar: CalendarMonth,
    /// Bookable slots
    pub time_slots: Vec<String>,
    /// Index of the pre-selected slot
    pub selected_slot: usize,
    /// Date the demo books
    pub date: NaiveDate,
}

impl BookingView {
    /// Modal content for a booking seen from `today`
    #[must_use]
    pub fn for_today(today: NaiveDate) -> Self {
        Self {
            title: MODAL_TITLE.to_string(),
            calendar: CalendarMonth::for_booking(today),
            time_slots: TIME_SLOTS.iter().map(ToString::to_string).collect(),
            selected_slot: DEFAULT_SLOT_INDEX,
            date: next_tuesday(today),
        }
    }

    /// The pre-selected slot
    #[must_use]
    pub fn selected_time(&self) -> Option<&str> {
        self.time_slots.get(self.selected_slot).map(String::as_str)
    }
}

/// What a completed booking flow produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingOutcome {
    /// Booked date
    pub date: NaiveDate,
    /// Booked slot
    pub time: String,
    /// Submitted contact details
    pub contact: ContactDetails,
}

impl BookingOutcome {
    /// Banner line, e.g. "Vi ser fram emot att träffa er på tisdag kl 10:00"
    #[must_use]
    pub fn confirmation_line(&self) -> String {
        format!(
            "Vi ser fram emot att träffa er på {} kl {}",
            weekday_name_sv(self.date.weekday()),
            self.time
        )
    }

    /// Full banner text: title, confirmation line, then the email details
    /// as `•` bullets, one per line
    #[must_use]
    pub fn banner_text(&self) -> String {
        let mut text = format!(
            "{CONFIRMATION_TITLE}\n{}\n{CONFIRMATION_DETAILS_INTRO}",
            self.confirmation_line()
        );
        for detail in CONFIRMATION_DETAILS {
            text.push_str("\n  • ");
            text.push_str(detail);
        }
        text
    }
}

/// Drives the booking modal through its steps
pub struct BookingFlow<'a, P: PresentationPort> {
    port: &'a mut P,
    clock: &'a dyn Clock,
    timing: &'a TimingProfile,
    contact: &'a ContactDetails,
}

impl<'a, P: PresentationPort> BookingFlow<'a, P> {
    /// Create a flow over a port
    pub fn new(
        port: &'a mut P,
        clock: &'a dyn Clock,
        timing: &'a TimingProfile,
        contact: &'a ContactDetails,
    ) -> Self {
        Self {
            port,
            clock,
            timing,
            contact,
        }
    }

    /// Run the whole sub-flow: open, auto-advance through all steps,
    /// confirm, play the confirmation and tear the modal down
    pub async fn run(&mut self, state: &mut CycleState) -> ShowreelResult<BookingOutcome> {
        let view = self.open(state).await?;
        self.select_date(state, &view).await?;
        self.select_time(state, &view).await?;
        let outcome = self.fill_and_confirm(state).await?;
        self.play_confirmation(&outcome).await?;
        self.teardown().await?;
        Ok(outcome)
    }

    async fn open(&mut self, state: &mut CycleState) -> ShowreelResult<BookingView> {
        let view = BookingView::for_today(state.today);
        debug!(month = %view.calendar.title(), "rendering booking modal");
        self.port.render_booking(&view)?;
        self.port.set_opacity(&Region::ChatPanel, 0.0)?;

        self.enter_step(state, BookingStep::Date)?;
        self.clock.sleep_ms(self.timing.modal_show_ms).await;
        self.port.set_visible(&Region::BookingModal, true)?;
        self.clock.sleep_ms(self.timing.auto_select_ms).await;
        Ok(view)
    }

    async fn select_date(
        &mut self,
        state: &mut CycleState,
        view: &BookingView,
    ) -> ShowreelResult<()> {
        let day = view
            .calendar
            .selected_day()
            .ok_or_else(|| ShowreelError::booking("calendar has no selected day"))?;

        self.pulse(Item::CalendarDay(day), self.timing.highlight_ms)
            .await?;
        self.clock.sleep_ms(self.timing.advance_ms).await;

        state.selected_date = Some(view.date);
        self.port
            .reveal(&Region::Summary(SummaryField::Date), &format_long_sv(view.date))?;
        self.next_step(state)?;
        Ok(())
    }

    async fn select_time(
        &mut self,
        state: &mut CycleState,
        view: &BookingView,
    ) -> ShowreelResult<()> {
        self.clock.sleep_ms(self.timing.time_settle_ms).await;
        let time = view
            .selected_time()
            .ok_or_else(|| ShowreelError::booking("no time slot is selected"))?
            .to_string();

        self.pulse(Item::TimeSlot(view.selected_slot), self.timing.highlight_ms)
            .await?;
        self.clock.sleep_ms(self.timing.advance_ms).await;

        self.port.reveal(&Region::Summary(SummaryField::Time), &time)?;
        state.selected_time = Some(time);
        self.next_step(state)?;
        Ok(())
    }

    async fn fill_and_confirm(&mut self, state: &mut CycleState) -> ShowreelResult<BookingOutcome> {
        self.clock.sleep_ms(self.timing.confirm_settle_ms).await;

        for (index, field) in ContactField::ALL.into_iter().enumerate() {
            if index > 0 {
                self.clock.sleep_ms(self.timing.field_gap_ms).await;
            }
            self.type_into_field(state, field).await?;
        }
        state.form.validate()?;

        self.port
            .reveal(&Region::Summary(SummaryField::Name), &state.form.name)?;
        self.port
            .reveal(&Region::Summary(SummaryField::Email), &state.form.email)?;

        self.pulse(Item::ConfirmButton, self.timing.confirm_highlight_ms)
            .await?;
        self.clock.sleep_ms(self.timing.confirm_press_ms).await;

        let (date, time) = match (state.selected_date, state.selected_time.clone()) {
            (Some(date), Some(time)) => (date, time),
            _ => {
                return Err(ShowreelError::booking(
                    "confirm pressed before date and time were selected",
                ))
            }
        };
        Ok(BookingOutcome {
            date,
            time,
            contact: state.form.clone(),
        })
    }

    async fn type_into_field(
        &mut self,
        state: &mut CycleState,
        field: ContactField,
    ) -> ShowreelResult<()> {
        let region = Region::ContactField(field);
        let mut typed = String::new();
        self.port.reveal(&region, &typed)?;
        for ch in self.contact.value(field).chars() {
            typed.push(ch);
            self.port.reveal(&region, &typed)?;
            self.clock.sleep_ms(self.timing.field_char_ms).await;
        }
        state.form.set(field, typed);
        Ok(())
    }

    async fn play_confirmation(&mut self, outcome: &BookingOutcome) -> ShowreelResult<()> {
        self.port.set_visible(&Region::BookingModal, false)?;
        self.clock.sleep_ms(self.timing.modal_hide_ms).await;

        self.port.set_visible(&Region::PaperPlane, true)?;
        self.clock.sleep_ms(self.timing.plane_launch_ms).await;
        self.clock.sleep_ms(self.timing.plane_flight_ms).await;
        self.port.set_visible(&Region::PaperPlane, false)?;

        self.port.reveal(&Region::ConfirmationBanner, &outcome.banner_text())?;
        self.clock.sleep_ms(self.timing.banner_show_ms).await;
        self.port.set_visible(&Region::ConfirmationBanner, true)?;

        info!(date = %outcome.date, time = %outcome.time, "booking confirmed");
        self.port.emit(Signal::BookingConfirmed {
            date: outcome.date,
            time: outcome.time.clone(),
            name: outcome.contact.name.clone(),
        })?;

        self.clock
            .sleep_ms(self.timing.confirmation_display_ms)
            .await;
        self.port.set_visible(&Region::ConfirmationBanner, false)?;
        Ok(())
    }

    async fn teardown(&mut self) -> ShowreelResult<()> {
        self.clock.sleep_ms(self.timing.teardown_ms).await;
        self.port.clear(&Region::ConfirmationBanner)?;
        self.port.clear(&Region::BookingModal)?;
        self.port.set_opacity(&Region::ChatPanel, 1.0)?;
        Ok(())
    }

    async fn pulse(&mut self, item: Item, hold_ms: u64) -> ShowreelResult<()> {
        self.port.highlight(item, true)?;
        self.clock.sleep_ms(hold_ms).await;
        self.port.highlight(item, false)
    }

    fn enter_step(&mut self, state: &mut CycleState, step: BookingStep) -> ShowreelResult<()> {
        self.port.set_visible(&Region::StepPanel(step), true)?;
        self.port.highlight(Item::StepIndicator(step), true)?;
        state.booking_step = Some(step);
        state.booking_steps_entered.push(step);
        debug!(%step, "booking step entered");
        self.port.emit(Signal::BookingStepEntered { step })
    }

    /// Advance the modal one step; no-op at the confirm step
    pub fn next_step(&mut self, state: &mut CycleState) -> ShowreelResult<bool> {
        let Some(current) = state.booking_step else {
            return Err(ShowreelError::booking("booking modal is not open"));
        };
        let Some(next) = current.next() else {
            return Ok(false);
        };
        self.port.set_visible(&Region::StepPanel(current), false)?;
        self.enter_step(state, next)?;
        Ok(true)
    }

    /// Go back one step; no-op at the date step
    pub fn prev_step(&mut self, state: &mut CycleState) -> ShowreelResult<bool> {
        let Some(current) = state.booking_step else {
            return Err(ShowreelError::booking("booking modal is not open"));
        };
        let Some(prev) = current.prev() else {
            return Ok(false);
        };
        self.port.set_visible(&Region::StepPanel(current), false)?;
        self.port.highlight(Item::StepIndicator(current), false)?;
        self.port.set_visible(&Region::StepPanel(prev), true)?;
        state.booking_step = Some(prev);
        Ok(true)
    }
}

impl<P: PresentationPort> fmt::Debug for BookingFlow<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookingFlow")
            .field("timing", self.timing)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::port::RecordingPort;

    fn today() -> NaiveDate {
        // Monday
        NaiveDate::from_ymd_opt(2024, 5, 13).unwrap()
    }

    mod step_tests {
        use super::*;

        #[test]
        fn test_step_order() {
            assert_eq!(BookingStep::Date.next(), Some(BookingStep::Time));
            assert_eq!(BookingStep::Confirm.next(), None);
            assert_eq!(BookingStep::Date.prev(), None);
            assert_eq!(BookingStep::Confirm.prev(), Some(BookingStep::Time));
            assert_eq!(BookingStep::Time.label(), "2. Välj Tid");
        }

        #[test]
        fn test_view_for_today() {
            let view = BookingView::for_today(today());
            assert_eq!(view.date, NaiveDate::from_ymd_opt(2024, 5, 14).unwrap());
            assert_eq!(view.selected_time(), Some("10:00"));
            assert_eq!(view.calendar.selected_day(), Some(14));
            assert_eq!(view.title, "Boka Din Demo");
        }

        #[test]
        fn test_confirmation_line() {
            let outcome = BookingOutcome {
                date: NaiveDate::from_ymd_opt(2024, 5, 14).unwrap(),
                time: "10:00".into(),
                contact: ContactDetails::default(),
            };
            assert_eq!(
                outcome.confirmation_line(),
                "Vi ser fram emot att träffa er på tisdag kl 10:00"
            );
        }

        #[test]
        fn test_banner_lists_email_details() {
            let outcome = BookingOutcome {
                date: NaiveDate::from_ymd_opt(2024, 5, 14).unwrap(),
                time: "10:00".into(),
                contact: ContactDetails::default(),
            };
            let banner = outcome.banner_text();
            let lines: Vec<&str> = banner.lines().collect();
            assert_eq!(lines.len(), 7);
            assert_eq!(lines[0], "Bokning Bekräftad!");
            assert_eq!(lines[2], "En bekräftelse har skickats till din e-post med:");
            assert_eq!(lines[3], "  • Möteslänk för videosamtal");
            assert_eq!(lines[6], "  • Kontaktinformation");
        }
    }

    mod navigation_tests {
        use super::*;

        #[test]
        fn test_next_and_prev_are_bounded() {
            let mut port = RecordingPort::new();
            let clock = FakeClock::new();
            let timing = TimingProfile::instant();
            let contact = ContactDetails::default();
            let mut flow = BookingFlow::new(&mut port, &clock, &timing, &contact);
            let mut state = CycleState::new(1, today());

            assert!(flow.next_step(&mut state).is_err());

            state.booking_step = Some(BookingStep::Date);
            assert!(!flow.prev_step(&mut state).unwrap());
            assert!(flow.next_step(&mut state).unwrap());
            assert!(flow.next_step(&mut state).unwrap());
            assert_eq!(state.booking_step, Some(BookingStep::Confirm));
            assert!(!flow.next_step(&mut state).unwrap());

            assert!(flow.prev_step(&mut state).unwrap());
            assert_eq!(state.booking_step, Some(BookingStep::Time));
            let shown = port.state();
            assert!(shown.is_visible(&Region::StepPanel(BookingStep::Time)));
            assert!(!shown.is_visible(&Region::StepPanel(BookingStep::Confirm)));
            assert!(!shown
                .highlighted
                .contains(&Item::StepIndicator(BookingStep::Confirm)));
        }
    }

    mod flow_tests {
        use super::*;

        #[tokio::test]
        async fn test_flow_enters_exactly_three_steps_and_confirms() {
            let mut port = RecordingPort::new();
            let observer = port.clone();
            let clock = FakeClock::new();
            let timing = TimingProfile::controller();
            let contact = ContactDetails::default();
            let mut state = CycleState::new(1, today());

            let outcome = BookingFlow::new(&mut port, &clock, &timing, &contact)
                .run(&mut state)
                .await
                .unwrap();

            assert_eq!(
                state.booking_steps_entered,
                vec![BookingStep::Date, BookingStep::Time, BookingStep::Confirm]
            );
            assert_eq!(outcome.time, "10:00");
            assert_eq!(outcome.date, NaiveDate::from_ymd_opt(2024, 5, 14).unwrap());
            assert_eq!(outcome.contact, ContactDetails::default());

            let signals = observer.signals();
            let last = signals.last().unwrap();
            assert_eq!(
                last,
                &Signal::BookingConfirmed {
                    date: NaiveDate::from_ymd_opt(2024, 5, 14).unwrap(),
                    time: "10:00".into(),
                    name: "Erik Andersson".into(),
                }
            );
            let steps: Vec<&Signal> = signals
                .iter()
                .filter(|s| matches!(s, Signal::BookingStepEntered { .. }))
                .collect();
            assert_eq!(steps.len(), 3);
        }

        #[tokio::test]
        async fn test_flow_tears_down_modal() {
            let mut port = RecordingPort::new();
            let observer = port.clone();
            let clock = FakeClock::new();
            let timing = TimingProfile::instant();
            let contact = ContactDetails::default();
            let mut state = CycleState::new(1, today());

            BookingFlow::new(&mut port, &clock, &timing, &contact)
                .run(&mut state)
                .await
                .unwrap();

            let shown = observer.state();
            assert!(shown.booking.is_none());
            assert!(!shown.is_visible(&Region::BookingModal));
            assert!(!shown.is_visible(&Region::ConfirmationBanner));
            assert!(!shown.is_visible(&Region::PaperPlane));
            assert!(shown.opacity.get(&Region::ChatPanel).is_none());
            assert!(observer.was_called("set_visible:paper-plane:true"));
            assert!(observer.was_called("highlight:calendar-day:14:true"));
            assert!(observer.was_called("highlight:time-slot:1:true"));
            assert!(observer.was_called("highlight:confirm-button:true"));
            let banner = observer
                .history()
                .into_iter()
                .find(|c| c.contains("Vi ser fram emot"))
                .unwrap();
            assert!(banner.ends_with("  • Kontaktinformation"));
        }

        #[tokio::test]
        async fn test_flow_types_contact_fields_char_by_char() {
            let mut port = RecordingPort::new();
            let observer = port.clone();
            let clock = FakeClock::new();
            let timing = TimingProfile::instant();
            let contact = ContactDetails::default();
            let mut state = CycleState::new(1, today());

            BookingFlow::new(&mut port, &clock, &timing, &contact)
                .run(&mut state)
                .await
                .unwrap();

            let history = observer.history();
            assert!(history.contains(&"reveal:contact:name:E".to_string()));
            assert!(history.contains(&"reveal:contact:name:Er".to_string()));
            assert!(history.contains(&"reveal:contact:email:erik@techsoft.se".to_string()));
            assert_eq!(state.form, contact);
        }

        #[tokio::test]
        async fn test_invalid_email_faults_before_confirming() {
            let mut port = RecordingPort::new();
            let observer = port.clone();
            let clock = FakeClock::new();
            let timing = TimingProfile::instant();
            let mut contact = ContactDetails::default();
            contact.set(ContactField::Email, "not-an-email");
            let mut state = CycleState::new(1, today());

            let err = BookingFlow::new(&mut port, &clock, &timing, &contact)
                .run(&mut state)
                .await
                .unwrap_err();

            assert!(matches!(err, ShowreelError::InvalidContact { .. }));
            assert!(!observer.was_called("emit:booking_confirmed"));
            assert!(!observer.was_called("highlight:confirm-button"));
        }

        #[tokio::test]
        async fn test_flow_duration_matches_timing() {
            let mut port = RecordingPort::new();
            let clock = FakeClock::new();
            let timing = TimingProfile::controller();
            let contact = ContactDetails::default();
            let mut state = CycleState::new(1, today());

            BookingFlow::new(&mut port, &clock, &timing, &contact)
                .run(&mut state)
                .await
                .unwrap();

            let typed: u64 = ContactField::ALL
                .iter()
                .map(|f| contact.value(*f).chars().count() as u64)
                .sum();
            let expected = timing.modal_show_ms
                + timing.auto_select_ms
                + timing.highlight_ms
                + timing.advance_ms
                + timing.time_settle_ms
                + timing.highlight_ms
                + timing.advance_ms
                + timing.confirm_settle_ms
                + typed * timing.field_char_ms
                + 4 * timing.field_gap_ms
                + timing.confirm_highlight_ms
                + timing.confirm_press_ms
                + timing.modal_hide_ms
                + timing.plane_launch_ms
                + timing.plane_flight_ms
                + timing.banner_show_ms
                + timing.confirmation_display_ms
                + timing.teardown_ms;
            assert_eq!(clock.now_ms(), expected);
        }
    }
}
