use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single flight of a launch vehicle.
///
/// A launch is identified by its `id` alone: two values with the same id are
/// the same launch even if one of them carries stale details. This is what
/// [`Rocket`](super::Rocket) uses to suppress duplicates in its launch set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Launch {
    pub id: Uuid,
    pub launch_date: NaiveDate,
    pub launch_site: String,
    /// Target orbit, e.g. `LEO` or `GTO`.
    pub orbit: String,
    /// Mission purpose, e.g. `communications satellite`.
    pub function: Option<String>,
    pub outcome: LaunchOutcome,
}

impl PartialEq for Launch {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Launch {}

impl Hash for Launch {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// How a launch ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LaunchOutcome {
    Failed,
    Successful,
}

impl LaunchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Failed => "failed",
            Self::Successful => "successful",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "failed" => Some(Self::Failed),
            "successful" => Some(Self::Successful),
            _ => None,
        }
    }
}

/// Input for recording a launch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLaunchInput {
    pub launch_date: NaiveDate,
    pub launch_site: String,
    pub orbit: String,
    pub function: Option<String>,
    pub outcome: LaunchOutcome,
}
