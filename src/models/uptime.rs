// Uptime decomposed into days/hours/minutes/seconds

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeStats {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl UptimeStats {
    /// Split raw seconds (as found in /proc/uptime) using integer arithmetic.
    pub fn from_seconds(raw: f64) -> Self {
        let secs = if raw.is_finite() && raw > 0.0 {
            raw.floor() as u64
        } else {
            0
        };
        Self {
            days: secs / 86_400,
            hours: (secs / 3_600) % 24,
            minutes: (secs / 60) % 60,
            seconds: secs % 60,
        }
    }
}

fn unit(value: u64, singular: &str, plural: &str) -> String {
    format!("{} {}", value, if value == 1 { singular } else { plural })
}

/// "1 day 2 hours 1 minute 5 seconds"
impl fmt::Display for UptimeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            unit(self.days, "day", "days"),
            unit(self.hours, "hour", "hours"),
            unit(self.minutes, "minute", "minutes"),
            unit(self.seconds, "second", "seconds"),
        )
    }
}

/// Result of an uptime query: the record or its sentence form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Uptime {
    Indexed(UptimeStats),
    Formatted(String),
}
