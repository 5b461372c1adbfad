//! Timing profiles: every delay a cycle waits on, in milliseconds.

use crate::result::{ShowreelError, ShowreelResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named timing preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileName {
    /// Full-page chat controller pacing
    #[default]
    Controller,
    /// Floating chat widget pacing
    Widget,
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Controller => write!(f, "controller"),
            Self::Widget => write!(f, "widget"),
        }
    }
}

impl FromStr for ProfileName {
    type Err = ShowreelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "controller" => Ok(Self::Controller),
            "widget" => Ok(Self::Widget),
            other => Err(ShowreelError::config(format!(
                "unknown timing profile '{other}' (expected controller or widget)"
            ))),
        }
    }
}

/// Delays used by the sequencer and the booking flow, plus how user text is typed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingProfile {
    /// Chat panel entrance before the first step
    pub initial_load_ms: u64,
    /// Typing indicator shown before each bot message
    pub typing_indicator_ms: u64,
    /// Per character while a bot message is revealed
    pub bot_char_ms: u64,
    /// After each word of a bot message
    pub bot_word_ms: u64,
    /// Per keystroke into the input field
    pub user_char_ms: u64,
    /// After each typed word in the input field
    pub user_word_ms: u64,
    /// Spaces are keystrokes too: no word pause and no trailing space
    pub user_types_spaces: bool,
    /// The posted user bubble is typed out at bot pace instead of shown whole
    pub user_bubble_typed: bool,
    /// Send affordance flash
    pub send_flash_ms: u64,
    /// Between rendering the modal and showing it
    pub modal_show_ms: u64,
    /// Modal visible before auto-selection starts
    pub auto_select_ms: u64,
    /// Selection highlight duration
    pub highlight_ms: u64,
    /// After a highlight, before advancing
    pub advance_ms: u64,
    /// Time step settles before the slot is highlighted
    pub time_settle_ms: u64,
    /// Confirm step settles before the form is filled
    pub confirm_settle_ms: u64,
    /// Per character typed into a contact field
    pub field_char_ms: u64,
    /// Between contact fields
    pub field_gap_ms: u64,
    /// Confirm button highlight
    pub confirm_highlight_ms: u64,
    /// After the confirm highlight, before pressing
    pub confirm_press_ms: u64,
    /// Modal fade-out before the animation
    pub modal_hide_ms: u64,
    /// Paper plane mounted before it launches
    pub plane_launch_ms: u64,
    /// Paper plane flight
    pub plane_flight_ms: u64,
    /// Confirmation banner mounted before it shows
    pub banner_show_ms: u64,
    /// Confirmation banner display window
    pub confirmation_display_ms: u64,
    /// Banner fade-out before teardown
    pub teardown_ms: u64,
}

impl TimingProfile {
    /// Pacing of the full-page chat controller
    #[must_use]
    pub const fn controller() -> Self {
        Self {
            initial_load_ms: 800,
            typing_indicator_ms: 1500,
            bot_char_ms: 40,
            bot_word_ms: 80,
            user_char_ms: 60,
            user_word_ms: 120,
            user_types_spaces: false,
            user_bubble_typed: true,
            send_flash_ms: 300,
            modal_show_ms: 10,
            auto_select_ms: 1500,
            highlight_ms: 800,
            advance_ms: 500,
            time_settle_ms: 1200,
            confirm_settle_ms: 1500,
            field_char_ms: 50,
            field_gap_ms: 300,
            confirm_highlight_ms: 1000,
            confirm_press_ms: 300,
            modal_hide_ms: 500,
            plane_launch_ms: 100,
            plane_flight_ms: 4000,
            banner_show_ms: 100,
            confirmation_display_ms: 6000,
            teardown_ms: 800,
        }
    }

    /// Pacing of the floating chat widget
    #[must_use]
    pub const fn widget() -> Self {
        Self {
            initial_load_ms: 2000,
            typing_indicator_ms: 1500,
            bot_char_ms: 30,
            bot_word_ms: 100,
            user_char_ms: 80,
            user_word_ms: 0,
            user_types_spaces: true,
            user_bubble_typed: false,
            send_flash_ms: 300,
            modal_show_ms: 10,
            auto_select_ms: 1000,
            highlight_ms: 800,
            advance_ms: 500,
            time_settle_ms: 1000,
            confirm_settle_ms: 1000,
            field_char_ms: 50,
            field_gap_ms: 300,
            confirm_highlight_ms: 1000,
            confirm_press_ms: 300,
            modal_hide_ms: 300,
            plane_launch_ms: 100,
            plane_flight_ms: 3500,
            banner_show_ms: 100,
            confirmation_display_ms: 5000,
            teardown_ms: 800,
        }
    }

    /// Preset by name
    #[must_use]
    pub const fn named(name: ProfileName) -> Self {
        match name {
            ProfileName::Controller => Self::controller(),
            ProfileName::Widget => Self::widget(),
        }
    }

    /// All delays zeroed, for tests that only care about ordering
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            initial_load_ms: 0,
            typing_indicator_ms: 0,
            bot_char_ms: 0,
            bot_word_ms: 0,
            user_char_ms: 0,
            user_word_ms: 0,
            user_types_spaces: false,
            user_bubble_typed: true,
            send_flash_ms: 0,
            modal_show_ms: 0,
            auto_select_ms: 0,
            highlight_ms: 0,
            advance_ms: 0,
            time_settle_ms: 0,
            confirm_settle_ms: 0,
            field_char_ms: 0,
            field_gap_ms: 0,
            confirm_highlight_ms: 0,
            confirm_press_ms: 0,
            modal_hide_ms: 0,
            plane_launch_ms: 0,
            plane_flight_ms: 0,
            banner_show_ms: 0,
            confirmation_display_ms: 0,
            teardown_ms: 0,
        }
    }

    /// Divide every delay by `speed` (2.0 plays twice as fast)
    ///
    /// # Errors
    ///
    /// Returns error if `speed` is not a positive finite number
    pub fn scaled(&self, speed: f64) -> ShowreelResult<Self> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ShowreelError::config(format!(
                "speed must be a positive number, got {speed}"
            )));
        }
        let s = |ms: u64| (ms as f64 / speed).round() as u64;
        Ok(Self {
            initial_load_ms: s(self.initial_load_ms),
            typing_indicator_ms: s(self.typing_indicator_ms),
            bot_char_ms: s(self.bot_char_ms),
            bot_word_ms: s(self.bot_word_ms),
            user_char_ms: s(self.user_char_ms),
            user_word_ms: s(self.user_word_ms),
            user_types_spaces: self.user_types_spaces,
            user_bubble_typed: self.user_bubble_typed,
            send_flash_ms: s(self.send_flash_ms),
            modal_show_ms: s(self.modal_show_ms),
            auto_select_ms: s(self.auto_select_ms),
            highlight_ms: s(self.highlight_ms),
            advance_ms: s(self.advance_ms),
            time_settle_ms: s(self.time_settle_ms),
            confirm_settle_ms: s(self.confirm_settle_ms),
            field_char_ms: s(self.field_char_ms),
            field_gap_ms: s(self.field_gap_ms),
            confirm_highlight_ms: s(self.confirm_highlight_ms),
            confirm_press_ms: s(self.confirm_press_ms),
            modal_hide_ms: s(self.modal_hide_ms),
            plane_launch_ms: s(self.plane_launch_ms),
            plane_flight_ms: s(self.plane_flight_ms),
            banner_show_ms: s(self.banner_show_ms),
            confirmation_display_ms: s(self.confirmation_display_ms),
            teardown_ms: s(self.teardown_ms),
        })
    }

    /// Time spent revealing a bot message char by char
    #[must_use]
    pub fn bot_reveal_ms(&self, text: &str) -> u64 {
        let chars = text.split(' ').map(|w| w.chars().count() as u64).sum::<u64>();
        let words = text.split(' ').count() as u64;
        chars * self.bot_char_ms + words * self.bot_word_ms
    }

    /// Time spent typing a user message into the input field
    #[must_use]
    pub fn user_typing_ms(&self, text: &str) -> u64 {
        if self.user_types_spaces {
            return text.chars().count() as u64 * self.user_char_ms + self.send_flash_ms;
        }
        let chars = text.split(' ').map(|w| w.chars().count() as u64).sum::<u64>();
        let words = text.split(' ').count() as u64;
        chars * self.user_char_ms + words * self.user_word_ms + self.send_flash_ms
    }

    /// Time spent on the posted user bubble; zero when it is shown whole
    #[must_use]
    pub fn user_bubble_ms(&self, text: &str) -> u64 {
        if self.user_bubble_typed {
            self.bot_reveal_ms(text)
        } else {
            0
        }
    }
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::controller()
    }
}
