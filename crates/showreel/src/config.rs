//! Demo configuration loaded from YAML.
//!
//! ```yaml
//! profile: controller
//! speed: 1.0
//! max_visible_messages: 4
//! contact:
//!   name: "Erik Andersson"
//!   company: "TechSoft AB"
//!   email: "erik@techsoft.se"
//!   phone: "+46 70 123 45 67"
//!   message: "Vi är intresserade av att implementera AI-chatbots."
//! scheduler:
//!   cooldown_ms: 3000
//!   max_cycles: 5
//! script_path: "scripts/custom.yaml"
//! ```
//!
//! Every key is optional.

use crate::contact::ContactDetails;
use crate::result::{ShowreelError, ShowreelResult};
use crate::scheduler::SchedulerPolicy;
use crate::script::DemoScript;
use crate::sequencer::DEFAULT_MAX_VISIBLE_MESSAGES;
use crate::timing::{ProfileName, TimingProfile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything that shapes a demo run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Pacing preset
    pub profile: ProfileName,
    /// Playback speed multiplier (2.0 = twice as fast)
    pub speed: f64,
    /// Bubbles kept at full weight
    pub max_visible_messages: usize,
    /// Details typed into the booking form
    pub contact: ContactDetails,
    /// Loop pacing
    pub scheduler: SchedulerPolicy,
    /// Custom script; the profile's built-in script when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_path: Option<PathBuf>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            profile: ProfileName::default(),
            speed: 1.0,
            max_visible_messages: DEFAULT_MAX_VISIBLE_MESSAGES,
            contact: ContactDetails::default(),
            scheduler: SchedulerPolicy::default(),
            script_path: None,
        }
    }
}

impl DemoConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from YAML and validate
    pub fn from_yaml_str(yaml: &str) -> ShowreelResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ShowreelResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&yaml)?;
        // relative script paths are resolved against the config file
        if let (Some(script), Some(dir)) = (&config.script_path, path.parent()) {
            if script.is_relative() {
                config.script_path = Some(dir.join(script));
            }
        }
        Ok(config)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> ShowreelResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Set the pacing preset
    #[must_use]
    pub fn with_profile(mut self, profile: ProfileName) -> Self {
        self.profile = profile;
        self
    }

    /// Set the speed multiplier
    #[must_use]
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Set the full-weight message window
    #[must_use]
    pub fn with_max_visible_messages(mut self, max: usize) -> Self {
        self.max_visible_messages = max;
        self
    }

    /// Set the form details
    #[must_use]
    pub fn with_contact(mut self, contact: ContactDetails) -> Self {
        self.contact = contact;
        self
    }

    /// Set the loop pacing
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: SchedulerPolicy) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Stop after `cycles`
    #[must_use]
    pub fn with_max_cycles(mut self, cycles: u64) -> Self {
        self.scheduler.max_cycles = Some(cycles);
        self
    }

    /// Use a script file
    #[must_use]
    pub fn with_script_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.script_path = Some(path.into());
        self
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> ShowreelResult<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(ShowreelError::config(format!(
                "speed must be a positive number, got {}",
                self.speed
            )));
        }
        if self.max_visible_messages == 0 {
            return Err(ShowreelError::config(
                "max_visible_messages must be at least 1",
            ));
        }
        if self.scheduler.max_cycles == Some(0) {
            return Err(ShowreelError::config("max_cycles must be at least 1"));
        }
        Ok(())
    }

    /// Timing profile with the speed multiplier applied
    pub fn timing(&self) -> ShowreelResult<TimingProfile> {
        TimingProfile::named(self.profile).scaled(self.speed)
    }

    /// Scheduler pacing with the speed multiplier applied
    #[must_use]
    pub fn scheduler_policy(&self) -> SchedulerPolicy {
        self.scheduler.scaled(self.speed)
    }

    /// The script to play: the configured file, or the profile's built-in
    pub fn script(&self) -> ShowreelResult<DemoScript> {
        match &self.script_path {
            Some(path) => DemoScript::load(path),
            None => Ok(match self.profile {
                ProfileName::Controller => DemoScript::axie_studio(),
                ProfileName::Widget => DemoScript::widget(),
            }),
        }
    }
}
