use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three interval kinds the timer can count down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [TimerMode::Focus, TimerMode::ShortBreak, TimerMode::LongBreak];

    /// Stable token used in checkpoints and on the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "short_break",
            TimerMode::LongBreak => "long_break",
        }
    }

    pub fn is_focus(&self) -> bool {
        matches!(self, TimerMode::Focus)
    }

    /// The mode `skip` lands on after the switch delay. Long Break is
    /// only entered by explicit selection, so skipping it returns to
    /// Focus like a short break does.
    pub fn skip_target(&self) -> TimerMode {
        match self {
            TimerMode::Focus => TimerMode::ShortBreak,
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Focus,
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerMode::Focus => write!(f, "Focus"),
            TimerMode::ShortBreak => write!(f, "Short Break"),
            TimerMode::LongBreak => write!(f, "Long Break"),
        }
    }
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(TimerMode::Focus),
            "short_break" => Ok(TimerMode::ShortBreak),
            "long_break" => Ok(TimerMode::LongBreak),
            other => Err(format!("unknown timer mode '{other}'")),
        }
    }
}

/// Lifecycle phase of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
}

/// Configured interval lengths, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDurations {
    pub focus_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
}

impl Default for ModeDurations {
    fn default() -> Self {
        ModeDurations {
            focus_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
        }
    }
}

impl ModeDurations {
    pub fn minutes(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus_minutes,
            TimerMode::ShortBreak => self.short_break_minutes,
            TimerMode::LongBreak => self.long_break_minutes,
        }
    }

    pub fn secs(&self, mode: TimerMode) -> u32 {
        self.minutes(mode).saturating_mul(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip() {
        for mode in TimerMode::ALL {
            assert_eq!(mode.as_str().parse::<TimerMode>().unwrap(), mode);
        }
        assert!("Focus".parse::<TimerMode>().is_err());
    }

    #[test]
    fn serde_matches_token_form() {
        assert_eq!(
            serde_json::to_value(TimerMode::ShortBreak).unwrap(),
            serde_json::json!("short_break")
        );
    }

    #[test]
    fn default_durations_are_25_5_15() {
        let d = ModeDurations::default();
        assert_eq!(d.secs(TimerMode::Focus), 1500);
        assert_eq!(d.secs(TimerMode::ShortBreak), 300);
        assert_eq!(d.secs(TimerMode::LongBreak), 900);
    }

    #[test]
    fn skip_toggles_focus_and_short_break() {
        assert_eq!(TimerMode::Focus.skip_target(), TimerMode::ShortBreak);
        assert_eq!(TimerMode::ShortBreak.skip_target(), TimerMode::Focus);
        assert_eq!(TimerMode::LongBreak.skip_target(), TimerMode::Focus);
    }
}
