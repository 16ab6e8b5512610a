use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tracking status of a watchlist entry. Any transition between the four
/// values is allowed; there is no status state machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
    Watching,
    Completed,
    PlanToWatch,
    Dropped,
}

impl WatchStatus {
    /// Every status, in the order the original app laid out its tabs.
    pub const ALL: [WatchStatus; 4] = [
        WatchStatus::Watching,
        WatchStatus::Completed,
        WatchStatus::PlanToWatch,
        WatchStatus::Dropped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::Watching => "watching",
            WatchStatus::Completed => "completed",
            WatchStatus::PlanToWatch => "plan_to_watch",
            WatchStatus::Dropped => "dropped",
        }
    }
}

impl Default for WatchStatus {
    fn default() -> Self {
        WatchStatus::PlanToWatch
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "watching" => Ok(WatchStatus::Watching),
            "completed" => Ok(WatchStatus::Completed),
            "plan_to_watch" => Ok(WatchStatus::PlanToWatch),
            "dropped" => Ok(WatchStatus::Dropped),
            other => Err(format!("unknown watch status: {}", other)),
        }
    }
}
