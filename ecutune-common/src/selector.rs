//! Cascading vehicle selector: fuel → brand → model → version
//!
//! Each level is gated on its parent being selected. Changing a level's
//! value clears every level below it (reset-on-change); re-selecting the
//! current value leaves the selection untouched.
//!
//! The selection itself is plain data passed in by the client on every
//! request. [`SelectorView::load`] pairs it with the option lists read
//! from the catalog.

use crate::vehicles::{list_options, Level, Vehicle, VehicleFilter};
use crate::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;

/// Selector state machine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// Tried to select a level before its ancestor
    #[error("cannot select {level} before {missing}")]
    AncestorMissing { level: Level, missing: Level },

    /// Value is not among the options currently offered for the level
    #[error("unknown {level} '{value}'")]
    UnknownOption { level: Level, value: String },
}

/// Current selections plus the "options loaded" flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSelection {
    #[serde(default)]
    pub fuel: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Set once the option lists for this exact selection have been loaded
    #[serde(default)]
    pub loaded: bool,
}

impl VehicleSelection {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, level: Level) -> &Option<String> {
        match level {
            Level::Fuel => &self.fuel,
            Level::Brand => &self.brand,
            Level::Model => &self.model,
            Level::Version => &self.version,
        }
    }

    fn slot_mut(&mut self, level: Level) -> &mut Option<String> {
        match level {
            Level::Fuel => &mut self.fuel,
            Level::Brand => &mut self.brand,
            Level::Model => &mut self.model,
            Level::Version => &mut self.version,
        }
    }

    /// Selected value for a level; empty strings count as unset
    pub fn get(&self, level: Level) -> Option<&str> {
        self.slot(level)
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Number of consecutive levels selected, counting from fuel
    pub fn depth(&self) -> usize {
        Level::ALL
            .iter()
            .take_while(|level| self.get(**level).is_some())
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.depth() == Level::ALL.len()
    }

    /// Deepest selected level of the consistent prefix
    pub fn current_level(&self) -> Option<Level> {
        self.depth().checked_sub(1).map(|i| Level::ALL[i])
    }

    /// Next level waiting for a choice, `None` once complete
    pub fn next_level(&self) -> Option<Level> {
        Level::ALL.get(self.depth()).copied()
    }

    /// The completed vehicle, if all four levels are selected
    pub fn to_vehicle(&self) -> Option<Vehicle> {
        if !self.is_complete() {
            return None;
        }
        Vehicle::new(
            self.get(Level::Fuel)?,
            self.get(Level::Brand)?,
            self.get(Level::Model)?,
            self.get(Level::Version)?,
        )
        .ok()
    }

    /// Ancestor filter for option queries
    pub fn filter(&self) -> VehicleFilter<'_> {
        VehicleFilter::new(
            self.get(Level::Fuel),
            self.get(Level::Brand),
            self.get(Level::Model),
        )
    }

    /// Set a level's value, clearing descendants when the value changes
    ///
    /// An empty value clears the level and everything below it.
    /// Returns whether anything changed.
    pub fn select(&mut self, level: Level, value: &str) -> std::result::Result<bool, SelectError> {
        let value = value.trim();

        if value.is_empty() {
            return Ok(self.clear_from(level));
        }

        if let Some(missing) = self.filter().first_missing(level) {
            return Err(SelectError::AncestorMissing { level, missing });
        }

        if self.get(level) == Some(value) {
            return Ok(false);
        }

        *self.slot_mut(level) = Some(value.to_string());
        for descendant in level.descendants() {
            *self.slot_mut(*descendant) = None;
        }
        self.loaded = false;
        Ok(true)
    }

    pub fn select_fuel(&mut self, fuel: &str) -> std::result::Result<bool, SelectError> {
        self.select(Level::Fuel, fuel)
    }

    pub fn select_brand(&mut self, brand: &str) -> std::result::Result<bool, SelectError> {
        self.select(Level::Brand, brand)
    }

    pub fn select_model(&mut self, model: &str) -> std::result::Result<bool, SelectError> {
        self.select(Level::Model, model)
    }

    pub fn select_version(&mut self, version: &str) -> std::result::Result<bool, SelectError> {
        self.select(Level::Version, version)
    }

    /// Clear `level` and all its descendants; returns whether anything was set
    fn clear_from(&mut self, level: Level) -> bool {
        let mut changed = false;
        for l in Level::ALL.iter().skip(level.index()) {
            changed |= self.slot_mut(*l).take().is_some();
        }
        if changed {
            self.loaded = false;
        }
        changed
    }

    /// Reset every selection
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Consistent copy of possibly inconsistent input
    ///
    /// Keeps the longest prefix of selected levels, trimmed; anything below
    /// the first gap is dropped. `loaded` is reset.
    pub fn normalized(&self) -> Self {
        let mut out = Self::default();
        for level in Level::ALL {
            match self.get(level) {
                Some(value) => *out.slot_mut(level) = Some(value.to_string()),
                None => break,
            }
        }
        out
    }
}

/// A selection plus the options offered at every level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorView {
    pub selection: VehicleSelection,
    pub fuels: Vec<String>,
    pub brands: Vec<String>,
    pub models: Vec<String>,
    pub versions: Vec<String>,
    pub complete: bool,
    pub next_level: Option<Level>,
}

impl SelectorView {
    /// Normalize `selection` and load the option list for each level
    ///
    /// A selected value that the catalog no longer offers is dropped along
    /// with its descendants, so the returned view is always consistent.
    pub async fn load(pool: &SqlitePool, selection: &VehicleSelection) -> Result<Self> {
        let mut selection = selection.normalized();
        let mut options: [Vec<String>; 4] = Default::default();

        for level in Level::ALL {
            let list = list_options(pool, level, &selection.filter()).await?;

            if let Some(value) = selection.get(level) {
                if !list.iter().any(|o| o == value) {
                    debug!("Dropping stale {} '{}' from selection", level, value);
                    selection.clear_from(level);
                }
            }

            options[level.index()] = list;
        }

        selection.loaded = true;
        let [fuels, brands, models, versions] = options;

        Ok(Self {
            complete: selection.is_complete(),
            next_level: selection.next_level(),
            selection,
            fuels,
            brands,
            models,
            versions,
        })
    }

    pub fn options(&self, level: Level) -> &[String] {
        match level {
            Level::Fuel => &self.fuels,
            Level::Brand => &self.brands,
            Level::Model => &self.models,
            Level::Version => &self.versions,
        }
    }
}

/// Apply one user choice and return the reloaded view
///
/// The value must be one of the options the catalog offers for `level`
/// under the current ancestors. An empty value clears the level.
pub async fn apply_choice(
    pool: &SqlitePool,
    selection: &VehicleSelection,
    level: Level,
    value: &str,
) -> Result<SelectorView> {
    let mut selection = selection.normalized();
    let value = value.trim();

    if !value.is_empty() {
        if let Some(missing) = selection.filter().first_missing(level) {
            return Err(SelectError::AncestorMissing { level, missing }.into());
        }

        let offered = list_options(pool, level, &selection.filter()).await?;
        if !offered.iter().any(|o| o == value) {
            return Err(SelectError::UnknownOption {
                level,
                value: value.to_string(),
            }
            .into());
        }
    }

    selection.select(level, value)?;
    SelectorView::load(pool, &selection).await
}
