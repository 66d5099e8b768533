//! Technology categories and the reliability parameters attached to them.
//!
//! Every category of installed capacity belongs to exactly one [`TechnologyClass`], which decides
//! which kind of asset it becomes in the reliability model.
use crate::error::BuildError;
use crate::id::define_id_type;
use crate::units::{Dimensionless, Hours, Power};
use indexmap::IndexMap;

define_id_type! {CategoryID}

/// A map of [`Technology`]s, keyed by category
pub type TechnologyMap = IndexMap<CategoryID, Technology>;

/// The mutually exclusive sets a technology category can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum TechnologyClass {
    /// Generation with a time-varying resource (wind, solar, non-dispatchable hydro)
    #[strum(serialize = "variable generation")]
    Variable,
    /// Dispatchable generation with constant capacity
    #[strum(serialize = "thermal")]
    Thermal,
    /// Standalone storage
    #[strum(serialize = "storage")]
    Storage,
    /// Dispatchable hydro, subject to an energy limit from inflows
    #[strum(serialize = "dispatchable hydro")]
    HydroDispatchable,
}

/// Membership flags from the technology classification table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassificationFlags {
    /// Variable generation
    pub variable_generation: bool,
    /// Standalone storage
    pub storage: bool,
    /// Dispatchable hydro
    pub hydro_dispatchable: bool,
    /// Non-dispatchable hydro
    pub hydro_non_dispatchable: bool,
}

impl ClassificationFlags {
    /// Resolve the flags into a single [`TechnologyClass`].
    ///
    /// Non-dispatchable hydro is treated as variable generation. A category with no flags is
    /// thermal. Flags which place a category in more than one class are an error.
    pub fn classify(self, category: &CategoryID) -> Result<TechnologyClass, BuildError> {
        let mut classes = Vec::new();
        if self.variable_generation || self.hydro_non_dispatchable {
            classes.push(TechnologyClass::Variable);
        }
        if self.storage {
            classes.push(TechnologyClass::Storage);
        }
        if self.hydro_dispatchable {
            classes.push(TechnologyClass::HydroDispatchable);
        }

        match classes.as_slice() {
            [] => Ok(TechnologyClass::Thermal),
            [class] => Ok(*class),
            _ => Err(BuildError::configuration(
                category,
                format!(
                    "category belongs to more than one technology class ({})",
                    classes.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
                ),
            )),
        }
    }
}

/// Reliability parameters for a technology category
#[derive(Debug, Clone, PartialEq)]
pub struct TechnologyParameters {
    /// Fraction of time unavailable due to unplanned outages
    pub forced_outage_rate: Dimensionless,
    /// Mean time to repair. If absent, the scenario default is used.
    pub mean_time_to_repair: Option<Hours>,
    /// Fraction of capacity lost to planned maintenance
    pub scheduled_outage_rate: Dimensionless,
    /// Size of individual units for disaggregating dispatchable capacity
    pub unit_size: Option<Power>,
    /// Ratio of energy capacity to power capacity
    pub storage_duration: Option<Hours>,
    /// Charging efficiency
    pub charge_efficiency: Dimensionless,
    /// Discharging efficiency
    pub discharge_efficiency: Dimensionless,
    /// Fraction of stored energy kept from one timestep to the next
    pub carryover_efficiency: Dimensionless,
}

impl Default for TechnologyParameters {
    fn default() -> Self {
        Self {
            forced_outage_rate: Dimensionless(0.0),
            mean_time_to_repair: None,
            scheduled_outage_rate: Dimensionless(0.0),
            unit_size: None,
            storage_duration: None,
            charge_efficiency: Dimensionless(1.0),
            discharge_efficiency: Dimensionless(1.0),
            carryover_efficiency: Dimensionless(1.0),
        }
    }
}

/// A classified technology category
#[derive(Debug, Clone, PartialEq)]
pub struct Technology {
    /// The category name (e.g. "gas-ct")
    pub id: CategoryID,
    /// Which kind of asset this category becomes
    pub class: TechnologyClass,
    /// Reliability parameters
    pub parameters: TechnologyParameters,
}

/// Get the column name used for a category and region in hourly profile tables
pub fn profile_key(category: &str, region: &str) -> String {
    format!("{category}|{region}")
}
