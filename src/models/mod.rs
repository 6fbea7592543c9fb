//! Domain models for the rocket catalog.
//!
//! # Core Concepts
//!
//! - [`Rocket`]: A launch vehicle. Identified by its [`RocketKey`]
//!   (name, country, manufacturer); everything else is validated field by field.
//! - [`RocketDraft`]: Empty-then-populated construction path used when mapping
//!   stored rows or deserializing payloads.
//! - [`LaunchServiceProvider`]: Manufacturer shared by many rockets.
//! - [`Launch`]: A flight provided by a rocket.
//! - [`RocketFamily`]: Optional grouping of related rockets.
//! - [`RocketRecord`]: A rocket paired with its store id.

mod family;
mod launch;
mod provider;
mod rocket;
pub mod validation;

pub use family::*;
pub use launch::*;
pub use provider::*;
pub use rocket::*;

use serde::Serialize;
use uuid::Uuid;

/// A rocket as held by the store, used for detailed responses.
#[derive(Debug, Clone, Serialize)]
pub struct RocketRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub rocket: Rocket,
}
