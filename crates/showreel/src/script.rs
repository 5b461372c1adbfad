//! Demo scripts: the ordered, immutable list of timed steps a cycle replays.
//!
//! Scripts can be written in YAML:
//!
//! ```yaml
//! name: "axie-studio"
//! steps:
//!   - id: "msg1"
//!     text: "Hej! Välkommen till Axie Studio! 👋"
//!     speaker: bot
//!     pause_ms: 1000
//!   - id: "msg9"
//!     text: "OPEN_BOOKING_MODAL"
//!     speaker: bot
//!     control: open_booking
//!     pause_ms: 500
//! ```

use crate::result::{ShowreelError, ShowreelResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Who a message step is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The chatbot
    Bot,
    /// The simulated visitor
    User,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bot => write!(f, "bot"),
            Self::User => write!(f, "user"),
        }
    }
}

/// Side-flow triggered by a control step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    /// Open the booking modal and run the booking sub-flow
    OpenBooking,
}

/// One scripted unit: a chat message or a control action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Unique identifier within the script
    pub id: String,
    /// Message text (ignored for control steps)
    pub text: String,
    /// Message author
    pub speaker: Speaker,
    /// Control action, if this is a control step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<ControlAction>,
    /// Pause after the step, in milliseconds
    pub pause_ms: u64,
}

impl ScriptStep {
    /// Create a bot message step
    #[must_use]
    pub fn bot(id: impl Into<String>, text: impl Into<String>, pause_ms: u64) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            speaker: Speaker::Bot,
            control: None,
            pause_ms,
        }
    }

    /// Create a user message step
    #[must_use]
    pub fn user(id: impl Into<String>, text: impl Into<String>, pause_ms: u64) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            speaker: Speaker::User,
            control: None,
            pause_ms,
        }
    }

    /// Create a control step
    #[must_use]
    pub fn control(id: impl Into<String>, action: ControlAction, pause_ms: u64) -> Self {
        Self {
            id: id.into(),
            text: "OPEN_BOOKING_MODAL".to_string(),
            speaker: Speaker::Bot,
            control: Some(action),
            pause_ms,
        }
    }

    /// Whether this step triggers a side-flow instead of showing a message
    #[must_use]
    pub const fn is_control(&self) -> bool {
        self.control.is_some()
    }
}

/// An ordered, validated list of steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoScript {
    /// Script name
    pub name: String,
    /// Steps in playback order
    pub steps: Vec<ScriptStep>,
}

impl DemoScript {
    /// Create and validate a script
    pub fn new(name: impl Into<String>, steps: Vec<ScriptStep>) -> ShowreelResult<Self> {
        let script = Self {
            name: name.into(),
            steps,
        };
        script.validate()?;
        Ok(script)
    }

    /// The nine-step Axie Studio conversation
    #[must_use]
    pub fn axie_studio() -> Self {
        Self {
            name: "axie-studio".to_string(),
            steps: vec![
                ScriptStep::bot("msg1", "Hej! Välkommen till Axie Studio! 👋", 1000),
                ScriptStep::bot("msg2", "Vi hjälper företag med AI och chatbot-lösningar.", 1500),
                ScriptStep::user("msg3", "Hej! Jag är intresserad av era tjänster.", 1200),
                ScriptStep::bot("msg4", "Vad bra! Jag kan hjälpa dig att boka en demo.", 1500),
                ScriptStep::user("msg5", "Det låter perfekt! När kan vi ses?", 1000),
                ScriptStep::bot(
                    "msg6",
                    "Vi har lediga tider nästa vecka. Passar tisdag eller onsdag?",
                    1500,
                ),
                ScriptStep::user("msg7", "Tisdag skulle fungera bra!", 800),
                ScriptStep::bot("msg8", "Utmärkt! Jag öppnar bokningssystemet nu...", 1200),
                ScriptStep::control("msg9", ControlAction::OpenBooking, 500),
            ],
        }
    }

    /// The shorter floating-widget conversation
    #[must_use]
    pub fn widget() -> Self {
        Self {
            name: "widget".to_string(),
            steps: vec![
                ScriptStep::bot("w1", "Hej! Välkommen till Axie Studio! 👋", 1000),
                ScriptStep::bot(
                    "w2",
                    "Vi hjälper företag att implementera AI-lösningar för bättre kundservice.",
                    2000,
                ),
                ScriptStep::user("w3", "Hej! Det låter intressant. Kan ni hjälpa oss?", 1500),
                ScriptStep::bot("w4", "Absolut! Vi skulle gärna visa er vad vi kan göra.", 1800),
                ScriptStep::bot("w5", "Har ni tid för en kort demo någon gång?", 1200),
                ScriptStep::user("w6", "Ja, det skulle vara perfekt!", 1000),
                ScriptStep::bot("w7", "Fantastiskt! Låt mig hjälpa er att boka en tid. 📅", 1500),
                ScriptStep::control("w8", ControlAction::OpenBooking, 1000),
            ],
        }
    }

    /// Parse and validate a script from YAML
    pub fn from_yaml_str(yaml: &str) -> ShowreelResult<Self> {
        let script: Self = serde_yaml_ng::from_str(yaml)?;
        script.validate()?;
        Ok(script)
    }

    /// Load and validate a script file
    pub fn load(path: impl AsRef<Path>) -> ShowreelResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> ShowreelResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check structural rules: non-empty, unique ids, text on message
    /// steps, and at most one control step which must come last.
    pub fn validate(&self) -> ShowreelResult<()> {
        if self.steps.is_empty() {
            return Err(ShowreelError::invalid_script(format!(
                "script '{}' has no steps",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for (index, step) in self.steps.iter().enumerate() {
            if step.id.trim().is_empty() {
                return Err(ShowreelError::invalid_script(format!(
                    "step {index} has an empty id"
                )));
            }
            if !seen.insert(step.id.as_str()) {
                return Err(ShowreelError::invalid_script(format!(
                    "duplicate step id '{}'",
                    step.id
                )));
            }
            if step.is_control() {
                if index + 1 != self.steps.len() {
                    return Err(ShowreelError::invalid_script(format!(
                        "control step '{}' must be the last step",
                        step.id
                    )));
                }
            } else if step.text.trim().is_empty() {
                return Err(ShowreelError::invalid_script(format!(
                    "message step '{}' has no text",
                    step.id
                )));
            }
        }
        Ok(())
    }

    /// Message steps, in order
    pub fn messages(&self) -> impl Iterator<Item = &ScriptStep> {
        self.steps.iter().filter(|s| !s.is_control())
    }

    /// Number of message steps
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages().count()
    }

    /// Whether the script ends by opening the booking modal
    #[must_use]
    pub fn opens_booking(&self) -> bool {
        self.steps
            .last()
            .is_some_and(|s| s.control == Some(ControlAction::OpenBooking))
    }

    /// Sum of all step pauses
    #[must_use]
    pub fn total_pause_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.pause_ms).sum()
    }
}

impl Default for DemoScript {
    fn default() -> Self {
        Self::axie_studio()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod builtin_script_tests {
        use super::*;

        #[test]
        fn test_axie_studio_has_nine_steps() {
            let script = DemoScript::axie_studio();
            assert_eq!(script.steps.len(), 9);
            assert_eq!(script.message_count(), 8);
            assert!(script.opens_booking());
            script.validate().unwrap();
        }

        #[test]
        fn test_widget_script_is_valid() {
            let script = DemoScript::widget();
            script.validate().unwrap();
            assert!(script.opens_booking());
            assert_eq!(script.message_count(), 7);
        }

        #[test]
        fn test_speakers_follow_conversation() {
            let script = DemoScript::axie_studio();
            let speakers: Vec<Speaker> = script.messages().map(|s| s.speaker).collect();
            assert_eq!(
                speakers,
                vec![
                    Speaker::Bot,
                    Speaker::Bot,
                    Speaker::User,
                    Speaker::Bot,
                    Speaker::User,
                    Speaker::Bot,
                    Speaker::User,
                    Speaker::Bot,
                ]
            );
        }

        #[test]
        fn test_total_pause() {
            assert_eq!(DemoScript::axie_studio().total_pause_ms(), 10_200);
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn test_empty_script_rejected() {
            let err = DemoScript::new("empty", vec![]).unwrap_err();
            assert!(err.to_string().contains("no steps"));
        }

        #[test]
        fn test_duplicate_id_rejected() {
            let err = DemoScript::new(
                "dup",
                vec![ScriptStep::bot("a", "one", 10), ScriptStep::user("a", "two", 10)],
            )
            .unwrap_err();
            assert!(err.to_string().contains("duplicate step id 'a'"));
        }

        #[test]
        fn test_control_must_be_last() {
            let err = DemoScript::new(
                "early",
                vec![
                    ScriptStep::control("open", ControlAction::OpenBooking, 10),
                    ScriptStep::bot("after", "too late", 10),
                ],
            )
            .unwrap_err();
            assert!(err.to_string().contains("must be the last step"));
        }

        #[test]
        fn test_blank_message_rejected() {
            let err = DemoScript::new("blank", vec![ScriptStep::user("u", "   ", 10)]).unwrap_err();
            assert!(err.to_string().contains("has no text"));
        }

        #[test]
        fn test_script_without_control_is_valid() {
            let script =
                DemoScript::new("chat-only", vec![ScriptStep::bot("b", "hej", 100)]).unwrap();
            assert!(!script.opens_booking());
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_from_yaml() {
            let yaml = r#"
name: "mini"
steps:
  - id: "hello"
    text: "Hej!"
    speaker: bot
    pause_ms: 100
  - id: "reply"
    text: "Hej hej"
    speaker: user
    pause_ms: 50
  - id: "open"
    text: "OPEN_BOOKING_MODAL"
    speaker: bot
    control: open_booking
    pause_ms: 10
"#;
            let script = DemoScript::from_yaml_str(yaml).unwrap();
            assert_eq!(script.name, "mini");
            assert_eq!(script.steps[1].speaker, Speaker::User);
            assert!(script.opens_booking());
        }

        #[test]
        fn test_from_yaml_validates() {
            let yaml = r#"
name: "bad"
steps: []
"#;
            assert!(DemoScript::from_yaml_str(yaml).is_err());
        }

        #[test]
        fn test_load_from_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("script.yaml");
            std::fs::write(&path, DemoScript::widget().to_yaml().unwrap()).unwrap();
            let loaded = DemoScript::load(&path).unwrap();
            assert_eq!(loaded, DemoScript::widget());
        }

        #[test]
        fn test_load_missing_file() {
            let err = DemoScript::load("/definitely/not/here.yaml").unwrap_err();
            assert!(matches!(err, ShowreelError::Io(_)));
        }
    }
}
