use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A line of related launch vehicles, e.g. "Falcon" or "Soyuz".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RocketFamily {
    pub id: Uuid,
    pub name: String,
}

/// Input for creating a new family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFamilyInput {
    pub name: String,
}
