//! SQLite-backed store for the catalog.
//!
//! The store owns what the models leave out: row ids, the unique index over
//! a rocket's (name, country, manufacturer) key, and the foreign keys that
//! tie rockets to their manufacturer, family and launches. Loading a rocket
//! materializes all three relationships.

mod schema;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Params, Row};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::*;

pub type Result<T> = std::result::Result<T, StoreError>;

const ROCKET_COLUMNS: &str = "id, name, country, manufacturer_id, mass_to_leo, mass_to_gto, \
     mass_to_other, first_year_flight, latest_year_flight, family_id";

const LAUNCH_COLUMNS: &str = "id, launch_date, launch_site, orbit, function, outcome";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "rocket-catalog")
            .ok_or(StoreError::NoDataDir)?;
        let db_path = dirs.data_dir().join("catalog.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn init_schema(&self) -> Result<()> {
        let conn = self.lock();
        schema::init_schema(&conn)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database lock poisoned")
    }

    // ============================================================
    // Provider operations
    // ============================================================

    pub fn create_provider(&self, input: CreateProviderInput) -> Result<LaunchServiceProvider> {
        let conn = self.lock();
        let id = Uuid::new_v4();

        conn.execute(
            "INSERT INTO providers (id, name, year_founded, country, headquarters)
             VALUES (?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &input.name,
                input.year_founded,
                &input.country,
                &input.headquarters,
            ),
        )?;

        tracing::info!(provider_id = %id, "Created provider {}", input.name);

        Ok(LaunchServiceProvider {
            id,
            name: input.name,
            year_founded: input.year_founded,
            country: input.country,
            headquarters: input.headquarters,
        })
    }

    pub fn get_provider(&self, id: Uuid) -> Result<Option<LaunchServiceProvider>> {
        let conn = self.lock();
        load_provider(&conn, id)
    }

    pub fn get_all_providers(&self) -> Result<Vec<LaunchServiceProvider>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name, year_founded, country, headquarters
             FROM providers ORDER BY name",
        )?;

        let providers = stmt
            .query_map([], provider_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(providers)
    }

    // ============================================================
    // Family operations
    // ============================================================

    pub fn create_family(&self, input: CreateFamilyInput) -> Result<RocketFamily> {
        let conn = self.lock();
        let id = Uuid::new_v4();

        conn.execute(
            "INSERT INTO families (id, name) VALUES (?, ?)",
            (id.to_string(), &input.name),
        )
        .map_err(|e| unique_violation(e, "family", || input.name.clone()))?;

        Ok(RocketFamily {
            id,
            name: input.name,
        })
    }

    pub fn get_family(&self, id: Uuid) -> Result<Option<RocketFamily>> {
        let conn = self.lock();
        load_family(&conn, id)
    }

    pub fn get_all_families(&self) -> Result<Vec<RocketFamily>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, name FROM families ORDER BY name")?;

        let families = stmt
            .query_map([], |row| {
                Ok(RocketFamily {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(families)
    }

    // ============================================================
    // Launch operations
    // ============================================================

    /// Records a launch that is not yet attached to any rocket.
    pub fn create_launch(&self, input: CreateLaunchInput) -> Result<Launch> {
        let launch = Launch {
            id: Uuid::new_v4(),
            launch_date: input.launch_date,
            launch_site: input.launch_site,
            orbit: input.orbit,
            function: input.function,
            outcome: input.outcome,
        };

        let conn = self.lock();
        insert_launch(&conn, &launch)?;
        Ok(launch)
    }

    pub fn get_launch(&self, id: Uuid) -> Result<Option<Launch>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM launches WHERE id = ?",
            LAUNCH_COLUMNS
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(launch_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Appends a launch to a rocket's launch set.
    ///
    /// Returns `false` if the launch already belongs to this rocket. A launch
    /// attached to another rocket is moved.
    pub fn attach_launch(&self, rocket_id: Uuid, launch_id: Uuid) -> Result<bool> {
        let conn = self.lock();
        if !rocket_exists(&conn, rocket_id)? {
            return Err(StoreError::not_found("rocket", rocket_id));
        }

        let current: Option<Option<String>> = {
            let mut stmt = conn.prepare("SELECT rocket_id FROM launches WHERE id = ?")?;
            let mut rows = stmt.query([launch_id.to_string()])?;
            let owner = match rows.next()? {
                Some(row) => Some(row.get(0)?),
                None => None,
            };
            owner
        };

        match current {
            None => return Err(StoreError::not_found("launch", launch_id)),
            Some(Some(owner)) if owner == rocket_id.to_string() => return Ok(false),
            Some(_) => {}
        }

        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(rocket_position) + 1, 0) FROM launches WHERE rocket_id = ?",
            [rocket_id.to_string()],
            |row| row.get(0),
        )?;

        conn.execute(
            "UPDATE launches SET rocket_id = ?, rocket_position = ? WHERE id = ?",
            (rocket_id.to_string(), position, launch_id.to_string()),
        )?;

        tracing::debug!(%rocket_id, %launch_id, position, "Attached launch");
        Ok(true)
    }

    // ============================================================
    // Rocket operations
    // ============================================================

    /// Stores a new rocket together with its launch set.
    ///
    /// Fails with [`StoreError::Duplicate`] if a rocket with the same key is
    /// already stored, and with [`StoreError::NotFound`] if the manufacturer or
    /// family has not been stored first.
    pub fn insert_rocket(&self, rocket: &Rocket) -> Result<RocketRecord> {
        let conn = self.lock();
        check_references(&conn, rocket)?;

        let id = Uuid::new_v4();
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            &format!(
                "INSERT INTO rockets ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                ROCKET_COLUMNS
            ),
            (
                id.to_string(),
                rocket.name(),
                rocket.country(),
                rocket.manufacturer().id.to_string(),
                rocket.mass_to_leo(),
                rocket.mass_to_gto(),
                rocket.mass_to_other(),
                rocket.first_year_flight(),
                rocket.latest_year_flight(),
                rocket.family().map(|f| f.id.to_string()),
            ),
        )
        .map_err(|e| rocket_conflict(e, rocket.key()))?;

        replace_launches(&tx, id, rocket.launches())?;
        tx.commit()?;

        tracing::info!(rocket_id = %id, "Inserted {}", rocket);

        Ok(RocketRecord {
            id,
            rocket: rocket.clone(),
        })
    }

    pub fn get_rocket(&self, id: Uuid) -> Result<Option<RocketRecord>> {
        let conn = self.lock();
        let mut records = load_rockets(
            &conn,
            &format!("SELECT {} FROM rockets WHERE id = ?", ROCKET_COLUMNS),
            [id.to_string()],
        )?;
        Ok(records.pop())
    }

    /// Looks a rocket up by its identity key.
    pub fn find_rocket(&self, key: &RocketKey) -> Result<Option<RocketRecord>> {
        let conn = self.lock();
        let mut records = load_rockets(
            &conn,
            &format!(
                "SELECT {} FROM rockets WHERE name = ? AND country = ? AND manufacturer_id = ?",
                ROCKET_COLUMNS
            ),
            (
                key.name(),
                key.country(),
                key.manufacturer().id.to_string(),
            ),
        )?;
        Ok(records.pop())
    }

    pub fn get_all_rockets(&self) -> Result<Vec<RocketRecord>> {
        let conn = self.lock();
        load_rockets(
            &conn,
            &format!("SELECT {} FROM rockets ORDER BY name, country", ROCKET_COLUMNS),
            [],
        )
    }

    pub fn get_rockets_by_manufacturer(&self, provider_id: Uuid) -> Result<Vec<RocketRecord>> {
        let conn = self.lock();
        load_rockets(
            &conn,
            &format!(
                "SELECT {} FROM rockets WHERE manufacturer_id = ? ORDER BY name, country",
                ROCKET_COLUMNS
            ),
            [provider_id.to_string()],
        )
    }

    /// Rewrites a stored rocket, including its launch set, in one transaction.
    ///
    /// Returns `None` if no rocket has this id.
    pub fn update_rocket(&self, id: Uuid, rocket: &Rocket) -> Result<Option<RocketRecord>> {
        let conn = self.lock();
        if !rocket_exists(&conn, id)? {
            return Ok(None);
        }
        check_references(&conn, rocket)?;

        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE rockets SET name = ?, country = ?, manufacturer_id = ?, mass_to_leo = ?,
                 mass_to_gto = ?, mass_to_other = ?, first_year_flight = ?,
                 latest_year_flight = ?, family_id = ?
             WHERE id = ?",
            (
                rocket.name(),
                rocket.country(),
                rocket.manufacturer().id.to_string(),
                rocket.mass_to_leo(),
                rocket.mass_to_gto(),
                rocket.mass_to_other(),
                rocket.first_year_flight(),
                rocket.latest_year_flight(),
                rocket.family().map(|f| f.id.to_string()),
                id.to_string(),
            ),
        )
        .map_err(|e| rocket_conflict(e, rocket.key()))?;

        replace_launches(&tx, id, rocket.launches())?;
        tx.commit()?;

        tracing::info!(rocket_id = %id, "Updated {}", rocket);

        Ok(Some(RocketRecord {
            id,
            rocket: rocket.clone(),
        }))
    }

    /// Deletes a rocket. Its launches stay in the store, detached.
    pub fn delete_rocket(&self, id: Uuid) -> Result<bool> {
        let conn = self.lock();
        let rows = conn.execute("DELETE FROM rockets WHERE id = ?", [id.to_string()])?;
        if rows > 0 {
            tracing::info!(rocket_id = %id, "Deleted rocket");
        }
        Ok(rows > 0)
    }
}

struct RocketRow {
    id: Uuid,
    name: String,
    country: String,
    manufacturer_id: Uuid,
    mass_to_leo: Option<String>,
    mass_to_gto: Option<String>,
    mass_to_other: Option<String>,
    first_year_flight: Option<i32>,
    latest_year_flight: Option<i32>,
    family_id: Option<Uuid>,
}

impl RocketRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_uuid(row.get::<_, String>(0)?),
            name: row.get(1)?,
            country: row.get(2)?,
            manufacturer_id: parse_uuid(row.get::<_, String>(3)?),
            mass_to_leo: row.get(4)?,
            mass_to_gto: row.get(5)?,
            mass_to_other: row.get(6)?,
            first_year_flight: row.get(7)?,
            latest_year_flight: row.get(8)?,
            family_id: row.get::<_, Option<String>>(9)?.map(parse_uuid),
        })
    }
}

/// Runs a rocket query and maps every row through [`RocketDraft`].
///
/// Rockets made by the same provider share one `Arc`.
fn load_rockets<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<RocketRecord>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, RocketRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut providers: HashMap<Uuid, Arc<LaunchServiceProvider>> = HashMap::new();
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let manufacturer = match providers.get(&row.manufacturer_id) {
            Some(provider) => Arc::clone(provider),
            None => {
                let provider = load_provider(conn, row.manufacturer_id)?
                    .ok_or_else(|| StoreError::not_found("provider", row.manufacturer_id))?;
                let provider = Arc::new(provider);
                providers.insert(row.manufacturer_id, Arc::clone(&provider));
                provider
            }
        };
        records.push(map_rocket(conn, row, manufacturer)?);
    }

    tracing::debug!(count = records.len(), "Loaded rockets");
    Ok(records)
}

fn map_rocket(
    conn: &Connection,
    row: RocketRow,
    manufacturer: Arc<LaunchServiceProvider>,
) -> Result<RocketRecord> {
    let mut draft = RocketDraft::new();
    draft.set_name(row.name);
    draft.set_country(row.country);
    draft.set_manufacturer(manufacturer);

    if let Some(value) = row.mass_to_leo {
        draft.set_mass_to_leo(value)?;
    }
    if let Some(value) = row.mass_to_gto {
        draft.set_mass_to_gto(value)?;
    }
    if let Some(value) = row.mass_to_other {
        draft.set_mass_to_other(value)?;
    }
    if let Some(year) = row.first_year_flight {
        draft.set_first_year_flight(year);
    }
    if let Some(year) = row.latest_year_flight {
        draft.set_latest_year_flight(year);
    }
    if let Some(family_id) = row.family_id {
        draft.set_family(load_family(conn, family_id)?)?;
    }
    draft.set_launches(load_launches(conn, row.id)?);

    Ok(RocketRecord {
        id: row.id,
        rocket: draft.build()?,
    })
}

fn load_provider(conn: &Connection, id: Uuid) -> Result<Option<LaunchServiceProvider>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, year_founded, country, headquarters
         FROM providers WHERE id = ?",
    )?;

    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        Ok(Some(provider_from_row(row)?))
    } else {
        Ok(None)
    }
}

fn provider_from_row(row: &Row<'_>) -> rusqlite::Result<LaunchServiceProvider> {
    Ok(LaunchServiceProvider {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        year_founded: row.get(2)?,
        country: row.get(3)?,
        headquarters: row.get(4)?,
    })
}

fn load_family(conn: &Connection, id: Uuid) -> Result<Option<RocketFamily>> {
    let mut stmt = conn.prepare("SELECT id, name FROM families WHERE id = ?")?;

    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        Ok(Some(RocketFamily {
            id: parse_uuid(row.get::<_, String>(0)?),
            name: row.get(1)?,
        }))
    } else {
        Ok(None)
    }
}

fn load_launches(conn: &Connection, rocket_id: Uuid) -> Result<Vec<Launch>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM launches WHERE rocket_id = ? ORDER BY rocket_position",
        LAUNCH_COLUMNS
    ))?;

    let launches = stmt
        .query_map([rocket_id.to_string()], launch_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(launches)
}

fn launch_from_row(row: &Row<'_>) -> rusqlite::Result<Launch> {
    Ok(Launch {
        id: parse_uuid(row.get::<_, String>(0)?),
        launch_date: row.get(1)?,
        launch_site: row.get(2)?,
        orbit: row.get(3)?,
        function: row.get(4)?,
        outcome: LaunchOutcome::from_str(&row.get::<_, String>(5)?)
            .unwrap_or(LaunchOutcome::Failed),
    })
}

fn insert_launch(conn: &Connection, launch: &Launch) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT OR IGNORE INTO launches ({}) VALUES (?, ?, ?, ?, ?, ?)",
            LAUNCH_COLUMNS
        ),
        (
            launch.id.to_string(),
            launch.launch_date,
            &launch.launch_site,
            &launch.orbit,
            &launch.function,
            launch.outcome.as_str(),
        ),
    )?;
    Ok(())
}

/// Makes `launches` the exact launch set of a rocket, in order.
///
/// Launches the store has not seen yet are inserted; launches previously
/// attached to the rocket but missing from `launches` are detached.
fn replace_launches(conn: &Connection, rocket_id: Uuid, launches: &[Launch]) -> Result<()> {
    conn.execute(
        "UPDATE launches SET rocket_id = NULL, rocket_position = NULL WHERE rocket_id = ?",
        [rocket_id.to_string()],
    )?;

    for (position, launch) in launches.iter().enumerate() {
        insert_launch(conn, launch)?;
        conn.execute(
            "UPDATE launches SET rocket_id = ?, rocket_position = ? WHERE id = ?",
            (rocket_id.to_string(), position as i64, launch.id.to_string()),
        )?;
    }

    Ok(())
}

fn rocket_exists(conn: &Connection, id: Uuid) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM rockets WHERE id = ?",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn check_references(conn: &Connection, rocket: &Rocket) -> Result<()> {
    let manufacturer_id = rocket.manufacturer().id;
    if load_provider(conn, manufacturer_id)?.is_none() {
        return Err(StoreError::not_found("provider", manufacturer_id));
    }
    if let Some(family) = rocket.family() {
        if load_family(conn, family.id)?.is_none() {
            return Err(StoreError::not_found("family", family.id));
        }
    }
    Ok(())
}

fn rocket_conflict(err: rusqlite::Error, key: &RocketKey) -> StoreError {
    let err = unique_violation(err, "rocket", || {
        format!(
            "{} / {} / {}",
            key.name(),
            key.country(),
            key.manufacturer().name
        )
    });
    if let StoreError::Duplicate { key, .. } = &err {
        tracing::warn!("Rejected duplicate rocket {}", key);
    }
    err
}

fn unique_violation(
    err: rusqlite::Error,
    entity: &'static str,
    key: impl FnOnce() -> String,
) -> StoreError {
    if let rusqlite::Error::SqliteFailure(e, _) = &err {
        if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
            return StoreError::Duplicate {
                entity,
                key: key(),
            };
        }
    }
    err.into()
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}
