//! Vehicle catalog: the four-column lookup table behind the cascading selector
//!
//! Every list query is `SELECT DISTINCT <level> FROM vehicles WHERE <ancestors> ORDER BY <level>`.
//! Filter values are always bound as parameters; column names only ever come
//! from [`Level::column`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

static CASCADE: [Level; 4] = Level::ALL;

/// One level of the cascade, root first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Fuel,
    Brand,
    Model,
    Version,
}

impl Level {
    /// All levels in cascade order
    pub const ALL: [Level; 4] = [Level::Fuel, Level::Brand, Level::Model, Level::Version];

    /// SQL column backing this level
    pub fn column(self) -> &'static str {
        match self {
            Level::Fuel => "fuel",
            Level::Brand => "brand",
            Level::Model => "model",
            Level::Version => "version",
        }
    }

    /// Zero-based position in the cascade
    pub fn index(self) -> usize {
        match self {
            Level::Fuel => 0,
            Level::Brand => 1,
            Level::Model => 2,
            Level::Version => 3,
        }
    }

    /// Levels that must be selected before this one, root first
    pub fn ancestors(self) -> &'static [Level] {
        &CASCADE[..self.index()]
    }

    /// Levels cleared when this one changes
    pub fn descendants(self) -> &'static [Level] {
        &CASCADE[self.index() + 1..]
    }

    pub fn parent(self) -> Option<Level> {
        self.ancestors().last().copied()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fuel" => Ok(Level::Fuel),
            "brand" => Ok(Level::Brand),
            "model" => Ok(Level::Model),
            "version" => Ok(Level::Version),
            other => Err(Error::InvalidInput(format!("unknown level '{}'", other))),
        }
    }
}

/// One row of the lookup table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vehicle {
    pub fuel: String,
    pub brand: String,
    pub model: String,
    pub version: String,
}

impl Vehicle {
    /// Build a vehicle from raw values, trimming each and rejecting empties
    pub fn new(
        fuel: impl AsRef<str>,
        brand: impl AsRef<str>,
        model: impl AsRef<str>,
        version: impl AsRef<str>,
    ) -> Result<Self> {
        let field = |level: Level, value: &str| -> Result<String> {
            let value = value.trim();
            if value.is_empty() {
                Err(Error::InvalidInput(format!("vehicle {} is empty", level)))
            } else {
                Ok(value.to_string())
            }
        };

        Ok(Self {
            fuel: field(Level::Fuel, fuel.as_ref())?,
            brand: field(Level::Brand, brand.as_ref())?,
            model: field(Level::Model, model.as_ref())?,
            version: field(Level::Version, version.as_ref())?,
        })
    }

    pub fn get(&self, level: Level) -> &str {
        match level {
            Level::Fuel => &self.fuel,
            Level::Brand => &self.brand,
            Level::Model => &self.model,
            Level::Version => &self.version,
        }
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / {}",
            self.fuel, self.brand, self.model, self.version
        )
    }
}

/// Ancestor choices used to filter a level's options
///
/// Empty or whitespace-only values count as unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VehicleFilter<'a> {
    pub fuel: Option<&'a str>,
    pub brand: Option<&'a str>,
    pub model: Option<&'a str>,
}

impl<'a> VehicleFilter<'a> {
    pub fn new(fuel: Option<&'a str>, brand: Option<&'a str>, model: Option<&'a str>) -> Self {
        Self { fuel, brand, model }
    }

    /// Trimmed value for an ancestor level; `Version` is never part of a filter
    pub fn get(&self, level: Level) -> Option<&'a str> {
        let value = match level {
            Level::Fuel => self.fuel,
            Level::Brand => self.brand,
            Level::Model => self.model,
            Level::Version => None,
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    /// Bound values for `level`'s ancestors, or `None` if any is unset
    pub fn ancestor_values(&self, level: Level) -> Option<Vec<&'a str>> {
        level.ancestors().iter().map(|a| self.get(*a)).collect()
    }

    /// First ancestor of `level` that is unset
    pub fn first_missing(&self, level: Level) -> Option<Level> {
        level
            .ancestors()
            .iter()
            .copied()
            .find(|a| self.get(*a).is_none())
    }
}

/// Sorted distinct options for `level` under `filter`
///
/// Returns an empty list without touching the database when an ancestor is unset.
pub async fn list_options(
    pool: &SqlitePool,
    level: Level,
    filter: &VehicleFilter<'_>,
) -> Result<Vec<String>> {
    let Some(values) = filter.ancestor_values(level) else {
        debug!("{} options gated: ancestor not selected", level);
        return Ok(Vec::new());
    };

    let column = level.column();
    let mut sql = format!("SELECT DISTINCT {} FROM vehicles", column);
    for (i, ancestor) in level.ancestors().iter().enumerate() {
        sql.push_str(if i == 0 { " WHERE " } else { " AND " });
        sql.push_str(ancestor.column());
        sql.push_str(" = ?");
    }
    sql.push_str(&format!(" ORDER BY {}", column));

    let mut query = sqlx::query_scalar::<_, String>(&sql);
    for value in values {
        query = query.bind(value);
    }

    Ok(query.fetch_all(pool).await?)
}

/// `SELECT DISTINCT fuel FROM vehicles ORDER BY fuel`
pub async fn list_fuels(pool: &SqlitePool) -> Result<Vec<String>> {
    list_options(pool, Level::Fuel, &VehicleFilter::default()).await
}

pub async fn list_brands(pool: &SqlitePool, fuel: &str) -> Result<Vec<String>> {
    list_options(pool, Level::Brand, &VehicleFilter::new(Some(fuel), None, None)).await
}

pub async fn list_models(pool: &SqlitePool, fuel: &str, brand: &str) -> Result<Vec<String>> {
    list_options(
        pool,
        Level::Model,
        &VehicleFilter::new(Some(fuel), Some(brand), None),
    )
    .await
}

pub async fn list_versions(
    pool: &SqlitePool,
    fuel: &str,
    brand: &str,
    model: &str,
) -> Result<Vec<String>> {
    list_options(
        pool,
        Level::Version,
        &VehicleFilter::new(Some(fuel), Some(brand), Some(model)),
    )
    .await
}

/// Exact four-column match
pub async fn vehicle_exists(pool: &SqlitePool, vehicle: &Vehicle) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM vehicles
            WHERE fuel = ? AND brand = ? AND model = ? AND version = ?
        )
        "#,
    )
    .bind(&vehicle.fuel)
    .bind(&vehicle.brand)
    .bind(&vehicle.model)
    .bind(&vehicle.version)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Insert one vehicle; returns `false` if it was already present
pub async fn insert_vehicle(pool: &SqlitePool, vehicle: &Vehicle) -> Result<bool> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO vehicles (fuel, brand, model, version) VALUES (?, ?, ?, ?)",
    )
    .bind(&vehicle.fuel)
    .bind(&vehicle.brand)
    .bind(&vehicle.model)
    .bind(&vehicle.version)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn count_vehicles(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vehicles")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Number of distinct values stored for a level
pub async fn count_distinct(pool: &SqlitePool, level: Level) -> Result<i64> {
    let sql = format!("SELECT COUNT(DISTINCT {}) FROM vehicles", level.column());
    let count: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;
    Ok(count)
}

/// Outcome of a catalog import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: u64,
    pub skipped: u64,
}

/// Bulk insert in a single transaction
///
/// Rows already present (or repeated within `vehicles`) are skipped.
/// Any database error rolls back the whole import.
pub async fn import_catalog(pool: &SqlitePool, vehicles: &[Vehicle]) -> Result<ImportSummary> {
    let mut tx = pool.begin().await?;
    let mut summary = ImportSummary::default();

    for vehicle in vehicles {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO vehicles (fuel, brand, model, version) VALUES (?, ?, ?, ?)",
        )
        .bind(&vehicle.fuel)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(&vehicle.version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 1 {
            summary.inserted += 1;
        } else {
            summary.skipped += 1;
        }
    }

    tx.commit().await?;

    info!(
        "Catalog import: {} inserted, {} skipped",
        summary.inserted, summary.skipped
    );
    Ok(summary)
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    vehicle: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(default)]
    fuel: String,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    version: String,
}

/// Parse a TOML catalog made of `[[vehicle]]` tables
///
/// ```toml
/// [[vehicle]]
/// fuel = "Diesel"
/// brand = "Audi"
/// model = "A4"
/// version = "2.0 TDI 150"
/// ```
pub fn parse_catalog(content: &str) -> Result<Vec<Vehicle>> {
    let file: CatalogFile = toml::from_str(content)
        .map_err(|e| Error::InvalidInput(format!("catalog is not valid TOML: {}", e)))?;

    file.vehicle
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            Vehicle::new(&entry.fuel, &entry.brand, &entry.model, &entry.version)
                .map_err(|e| Error::InvalidInput(format!("catalog entry #{}: {}", i + 1, e)))
        })
        .collect()
}

/// Read and parse a catalog file
pub fn load_catalog_file(path: &Path) -> Result<Vec<Vehicle>> {
    let content = std::fs::read_to_string(path)?;
    parse_catalog(&content)
}
