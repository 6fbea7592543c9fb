use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::validation::{check_mass, check_not_blank};
use super::{Launch, LaunchServiceProvider, RocketFamily};
use crate::error::{ModelError, ModelResult};

/// The identity of a rocket: name, country and manufacturer.
///
/// The manufacturer takes part by id only, matching the store's unique index
/// over `(name, country, manufacturer_id)`: two keys compare equal here exactly
/// when the store refuses to hold both rows.
#[derive(Debug, Clone, Serialize)]
pub struct RocketKey {
    name: String,
    country: String,
    manufacturer: Arc<LaunchServiceProvider>,
}

impl RocketKey {
    pub fn new(
        name: impl Into<String>,
        country: impl Into<String>,
        manufacturer: Arc<LaunchServiceProvider>,
    ) -> ModelResult<Self> {
        let name = name.into();
        let country = country.into();
        check_not_blank("name", &name)?;
        check_not_blank("country", &country)?;

        Ok(Self {
            name,
            country,
            manufacturer,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn manufacturer(&self) -> &Arc<LaunchServiceProvider> {
        &self.manufacturer
    }
}

impl PartialEq for RocketKey {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.country == other.country
            && self.manufacturer.id == other.manufacturer.id
    }
}

impl Eq for RocketKey {}

impl Hash for RocketKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.country.hash(state);
        self.manufacturer.id.hash(state);
    }
}

/// A launch vehicle in the catalog.
///
/// Identity fields live in a [`RocketKey`]; `PartialEq`, `Eq` and `Hash`
/// look at the key only, so mass, flight-year, family and launch data never
/// affect whether two rockets are the same.
///
/// # Validation
/// Construction requires name, country and manufacturer. An empty or
/// whitespace-only name or country counts as absent and is rejected, both here
/// and in [`RocketDraft::build`]. The remaining fields
/// start unset and are checked one at a time as they are assigned:
///
/// - `set_mass_to_*` reject blank values and anything that is not a numeric
///   quantity, storing accepted strings unchanged.
/// - `set_family` rejects an absent family.
/// - Flight years and the launch set are assigned as given.
///
/// A rejected call leaves the rocket untouched.
///
/// # Serialization
/// Every field except `launches` is serialized. Deserializing goes through
/// [`RocketDraft`] and applies the same checks as the setters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RocketDraft")]
pub struct Rocket {
    #[serde(flatten)]
    key: RocketKey,
    mass_to_leo: Option<String>,
    mass_to_gto: Option<String>,
    mass_to_other: Option<String>,
    first_year_flight: Option<i32>,
    latest_year_flight: Option<i32>,
    family: Option<RocketFamily>,
    #[serde(skip)]
    launches: Vec<Launch>,
}

impl Rocket {
    pub fn new(
        name: impl Into<String>,
        country: impl Into<String>,
        manufacturer: Arc<LaunchServiceProvider>,
    ) -> ModelResult<Self> {
        Ok(Self::from_key(RocketKey::new(name, country, manufacturer)?))
    }

    pub fn from_key(key: RocketKey) -> Self {
        Self {
            key,
            mass_to_leo: None,
            mass_to_gto: None,
            mass_to_other: None,
            first_year_flight: None,
            latest_year_flight: None,
            family: None,
            launches: Vec::new(),
        }
    }

    pub fn key(&self) -> &RocketKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn country(&self) -> &str {
        &self.key.country
    }

    pub fn manufacturer(&self) -> &Arc<LaunchServiceProvider> {
        &self.key.manufacturer
    }

    pub fn mass_to_leo(&self) -> Option<&str> {
        self.mass_to_leo.as_deref()
    }

    pub fn mass_to_gto(&self) -> Option<&str> {
        self.mass_to_gto.as_deref()
    }

    pub fn mass_to_other(&self) -> Option<&str> {
        self.mass_to_other.as_deref()
    }

    pub fn first_year_flight(&self) -> Option<i32> {
        self.first_year_flight
    }

    pub fn latest_year_flight(&self) -> Option<i32> {
        self.latest_year_flight
    }

    pub fn family(&self) -> Option<&RocketFamily> {
        self.family.as_ref()
    }

    /// Launches provided by this rocket, in the order they were added.
    pub fn launches(&self) -> &[Launch] {
        &self.launches
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> ModelResult<()> {
        let name = name.into();
        check_not_blank("name", &name)?;
        self.key.name = name;
        Ok(())
    }

    pub fn set_country(&mut self, country: impl Into<String>) -> ModelResult<()> {
        let country = country.into();
        check_not_blank("country", &country)?;
        self.key.country = country;
        Ok(())
    }

    pub fn set_manufacturer(&mut self, manufacturer: Arc<LaunchServiceProvider>) {
        self.key.manufacturer = manufacturer;
    }

    pub fn set_mass_to_leo(&mut self, value: impl Into<String>) -> ModelResult<()> {
        self.mass_to_leo = Some(checked_mass("mass_to_leo", value.into())?);
        Ok(())
    }

    pub fn set_mass_to_gto(&mut self, value: impl Into<String>) -> ModelResult<()> {
        self.mass_to_gto = Some(checked_mass("mass_to_gto", value.into())?);
        Ok(())
    }

    pub fn set_mass_to_other(&mut self, value: impl Into<String>) -> ModelResult<()> {
        self.mass_to_other = Some(checked_mass("mass_to_other", value.into())?);
        Ok(())
    }

    pub fn set_first_year_flight(&mut self, year: i32) {
        self.first_year_flight = Some(year);
    }

    pub fn set_latest_year_flight(&mut self, year: i32) {
        self.latest_year_flight = Some(year);
    }

    /// Assigns the family. Passing `None` is rejected rather than clearing it.
    pub fn set_family(&mut self, family: impl Into<Option<RocketFamily>>) -> ModelResult<()> {
        self.family = Some(checked_family(family.into())?);
        Ok(())
    }

    /// Replaces the launch set. Repeated launches keep their first position.
    pub fn set_launches(&mut self, launches: impl IntoIterator<Item = Launch>) {
        self.launches.clear();
        for launch in launches {
            self.add_launch(launch);
        }
    }

    /// Appends a launch, returning `false` if it is already in the set.
    pub fn add_launch(&mut self, launch: Launch) -> bool {
        if self.launches.contains(&launch) {
            return false;
        }
        self.launches.push(launch);
        true
    }
}

impl PartialEq for Rocket {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Rocket {}

impl Hash for Rocket {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Rocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rocket{{name='{}', country='{}', manufacturer='{}', mass_to_leo={}, mass_to_gto={}, mass_to_other={}, first_year_flight={}, latest_year_flight={}}}",
            self.key.name,
            self.key.country,
            self.key.manufacturer,
            DisplayOpt(self.mass_to_leo.as_deref().map(Quoted)),
            DisplayOpt(self.mass_to_gto.as_deref().map(Quoted)),
            DisplayOpt(self.mass_to_other.as_deref().map(Quoted)),
            DisplayOpt(self.first_year_flight),
            DisplayOpt(self.latest_year_flight),
        )
    }
}

struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.0)
    }
}

struct DisplayOpt<T>(Option<T>);

impl<T: fmt::Display> fmt::Display for DisplayOpt<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => fmt::Display::fmt(value, f),
            None => f.write_str("unset"),
        }
    }
}

fn checked_mass(field: &'static str, value: String) -> ModelResult<String> {
    check_mass(field, &value)?;
    Ok(value)
}

fn checked_family(family: Option<RocketFamily>) -> ModelResult<RocketFamily> {
    family.ok_or_else(|| ModelError::invalid("family", "cannot be null"))
}

/// A rocket under construction.
///
/// Starts empty and is filled field by field, the way the store maps a row or
/// serde maps a payload. Guarded fields are checked on assignment just like on
/// [`Rocket`]; the identity fields are only required once [`build`](Self::build)
/// is called.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RocketDraft {
    name: Option<String>,
    country: Option<String>,
    manufacturer: Option<Arc<LaunchServiceProvider>>,
    mass_to_leo: Option<String>,
    mass_to_gto: Option<String>,
    mass_to_other: Option<String>,
    first_year_flight: Option<i32>,
    latest_year_flight: Option<i32>,
    family: Option<RocketFamily>,
    #[serde(skip)]
    launches: Vec<Launch>,
}

impl RocketDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn set_country(&mut self, country: impl Into<String>) {
        self.country = Some(country.into());
    }

    pub fn set_manufacturer(&mut self, manufacturer: Arc<LaunchServiceProvider>) {
        self.manufacturer = Some(manufacturer);
    }

    pub fn set_mass_to_leo(&mut self, value: impl Into<String>) -> ModelResult<()> {
        self.mass_to_leo = Some(checked_mass("mass_to_leo", value.into())?);
        Ok(())
    }

    pub fn set_mass_to_gto(&mut self, value: impl Into<String>) -> ModelResult<()> {
        self.mass_to_gto = Some(checked_mass("mass_to_gto", value.into())?);
        Ok(())
    }

    pub fn set_mass_to_other(&mut self, value: impl Into<String>) -> ModelResult<()> {
        self.mass_to_other = Some(checked_mass("mass_to_other", value.into())?);
        Ok(())
    }

    pub fn set_first_year_flight(&mut self, year: i32) {
        self.first_year_flight = Some(year);
    }

    pub fn set_latest_year_flight(&mut self, year: i32) {
        self.latest_year_flight = Some(year);
    }

    pub fn set_family(&mut self, family: impl Into<Option<RocketFamily>>) -> ModelResult<()> {
        self.family = Some(checked_family(family.into())?);
        Ok(())
    }

    pub fn set_launches(&mut self, launches: impl IntoIterator<Item = Launch>) {
        self.launches = launches.into_iter().collect();
    }

    /// Finishes the rocket, failing if any identity field is missing.
    ///
    /// Mass values are re-checked here because serde fills the draft without
    /// going through the setters.
    pub fn build(self) -> ModelResult<Rocket> {
        let name = self
            .name
            .ok_or_else(|| ModelError::invalid("name", "cannot be null"))?;
        let country = self
            .country
            .ok_or_else(|| ModelError::invalid("country", "cannot be null"))?;
        let manufacturer = self
            .manufacturer
            .ok_or_else(|| ModelError::invalid("manufacturer", "cannot be null"))?;

        let mut rocket = Rocket::new(name, country, manufacturer)?;
        if let Some(value) = self.mass_to_leo {
            rocket.set_mass_to_leo(value)?;
        }
        if let Some(value) = self.mass_to_gto {
            rocket.set_mass_to_gto(value)?;
        }
        if let Some(value) = self.mass_to_other {
            rocket.set_mass_to_other(value)?;
        }
        rocket.first_year_flight = self.first_year_flight;
        rocket.latest_year_flight = self.latest_year_flight;
        rocket.family = self.family;
        rocket.set_launches(self.launches);

        Ok(rocket)
    }
}

impl TryFrom<RocketDraft> for Rocket {
    type Error = ModelError;

    fn try_from(draft: RocketDraft) -> Result<Self, Self::Error> {
        draft.build()
    }
}
