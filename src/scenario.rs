//! The input data for one solved year of a capacity-expansion scenario.
use crate::asset::Legacy;
use crate::region::{RegionDefinitionMap, RegionID};
use crate::technology::{CategoryID, TechnologyMap};
use crate::transmission::{Converter, TransmissionLine};
use crate::units::Power;
use anyhow::{Result, ensure};
use indexmap::IndexMap;

pub mod parameters;
use parameters::ScenarioParameters;

/// Everything read from a scenario directory for one solve year and weather year
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Parameters from `scenario.toml`
    pub parameters: ScenarioParameters,
    /// AC regions, in model order
    pub regions: RegionDefinitionMap,
    /// Hourly load for each AC region
    pub load: IndexMap<RegionID, Vec<Power>>,
    /// Installed capacity rows for the solve year
    pub capacity: Vec<InstalledCapacity>,
    /// Classified technology categories
    pub technologies: TechnologyMap,
    /// Transmission lines in service in the solve year
    pub lines: Vec<TransmissionLine>,
    /// AC/DC converters in service in the solve year
    pub converters: Vec<Converter>,
    /// Hourly capacity factors for variable generation
    pub resource_profiles: ProfileTable,
    /// Hourly forced outage rates, where available
    pub forced_outage_profiles: ProfileTable,
    /// Hourly inflow capacity factors for dispatchable hydro
    pub hydro_inflow_profiles: ProfileTable,
}

/// A row of installed capacity
#[derive(Debug, Clone, PartialEq)]
pub struct InstalledCapacity {
    /// The region the capacity is in
    pub region: RegionID,
    /// The technology category
    pub category: CategoryID,
    /// Whether the capacity existed before the solve year
    pub legacy: Legacy,
    /// Installed capacity (MW)
    pub capacity: Power,
}

/// A set of hourly series, keyed by column name.
///
/// Columns for a category in a region are named `<category>|<region>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileTable {
    horizon: usize,
    columns: IndexMap<String, Vec<f64>>,
}

impl ProfileTable {
    /// Create an empty table for series of the given length
    pub fn new(horizon: usize) -> Self {
        Self {
            horizon,
            columns: IndexMap::new(),
        }
    }

    /// Add a column, checking its length and that it is not a duplicate
    pub fn insert(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        ensure!(
            values.len() == self.horizon,
            "Column {name} has {} values but {} were expected",
            values.len(),
            self.horizon
        );
        ensure!(
            self.columns.insert(name.to_string(), values).is_none(),
            "Duplicate column {name}"
        );

        Ok(())
    }

    /// Get the series for a column, if present
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Iterate over the column names
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Whether the table has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
