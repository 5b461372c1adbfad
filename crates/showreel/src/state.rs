//! Per-cycle transient state.

use crate::booking::BookingStep;
use crate::contact::ContactDetails;
use chrono::NaiveDate;
use std::collections::HashSet;
use uuid::Uuid;

/// Mutable state of one playthrough
///
/// Created at cycle start, handed to every step handler, dropped when the
/// cycle ends. Never shared between cycles.
#[derive(Debug, Clone)]
pub struct CycleState {
    /// Cycle number, starting at 1
    pub cycle: u64,
    /// Unique id for log correlation
    pub cycle_id: Uuid,
    /// Reference date for the booking calendar
    pub today: NaiveDate,
    /// Index of the step being played
    pub current_step_index: usize,
    /// Modal step currently shown, if the modal is open
    pub booking_step: Option<BookingStep>,
    /// Modal steps entered, in order
    pub booking_steps_entered: Vec<BookingStep>,
    /// Date picked on the date step
    pub selected_date: Option<NaiveDate>,
    /// Slot picked on the time step
    pub selected_time: Option<String>,
    /// Values typed into the contact form so far
    pub form: ContactDetails,
    /// Ids of chat bubbles posted, oldest first
    pub posted: Vec<String>,
    visited_order: Vec<String>,
    visited_set: HashSet<String>,
}

impl CycleState {
    /// Fresh state for cycle number `cycle`
    #[must_use]
    pub fn new(cycle: u64, today: NaiveDate) -> Self {
        Self {
            cycle,
            cycle_id: Uuid::new_v4(),
            today,
            current_step_index: 0,
            booking_step: None,
            booking_steps_entered: Vec::new(),
            selected_date: None,
            selected_time: None,
            form: ContactDetails::blank(),
            posted: Vec::new(),
            visited_order: Vec::new(),
            visited_set: HashSet::new(),
        }
    }

    /// Mark a step processed; false if it already was
    pub fn mark_visited(&mut self, id: &str) -> bool {
        if self.visited_set.insert(id.to_string()) {
            self.visited_order.push(id.to_string());
            true
        } else {
            false
        }
    }

    /// Whether a step was processed
    #[must_use]
    pub fn has_visited(&self, id: &str) -> bool {
        self.visited_set.contains(id)
    }

    /// Processed step ids, in processing order
    #[must_use]
    pub fn visited(&self) -> &[String] {
        &self.visited_order
    }

    /// Bubble ids, newest first
    pub fn posted_newest_first(&self) -> impl Iterator<Item = &String> {
        self.posted.iter().rev()
    }
}
