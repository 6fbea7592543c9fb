use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An organization that builds or operates launch vehicles.
///
/// Rockets hold providers behind an `Arc`, so one provider value is shared by
/// every rocket it manufactures. Provider equality compares every field, but a
/// rocket's identity only looks at the provider's `id`, like the store's
/// `manufacturer_id` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaunchServiceProvider {
    pub id: Uuid,
    pub name: String,
    pub year_founded: i32,
    pub country: String,
    pub headquarters: Option<String>,
}

impl std::fmt::Display for LaunchServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.country, self.year_founded)
    }
}

/// Input for registering a new provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProviderInput {
    pub name: String,
    pub year_founded: i32,
    pub country: String,
    pub headquarters: Option<String>,
}
