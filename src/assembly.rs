//! Turning installed capacity into reliability assets.
//!
//! Installed capacity rows are grouped into blocks by region, category and legacy. Each block is
//! then built into one or more assets, depending on the technology class of its category.
use crate::asset::{AssetInfo, Legacy};
use crate::error::BuildError;
use crate::outage::{ForcedOutageRate, OutageParameters, OutageProcess, to_outage_process};
use crate::region::{RegionID, Regions};
use crate::scenario::Scenario;
use crate::scenario::parameters::BuildOptions;
use crate::technology::{Technology, TechnologyClass, profile_key};
use crate::units::{Dimensionless, Power};
use anyhow::Result;
use indexmap::IndexMap;
use log::debug;

pub mod generator;
pub mod generator_storage;
pub mod storage;

/// Installed capacity of one category in one region, of the same legacy
#[derive(Debug, Clone)]
pub struct CapacityBlock<'a> {
    /// The region's name
    pub region_id: RegionID,
    /// Index of the region in the model
    pub region: usize,
    /// The classified technology
    pub technology: &'a Technology,
    /// Whether the capacity is existing or new
    pub legacy: Legacy,
    /// Total installed capacity (MW)
    pub capacity: Power,
}

impl CapacityBlock<'_> {
    /// The name given to assets built from this block
    pub fn asset_name(&self) -> String {
        format!("{}|{}|{}", self.technology.id, self.region_id, self.legacy)
    }

    /// The column name for this block in hourly profile tables
    pub fn profile_key(&self) -> String {
        profile_key(&self.technology.id.0, &self.region_id.0)
    }

    /// Common asset properties for an asset with the given name and nameplate capacity
    pub fn asset_info(&self, name: String, nameplate: Power) -> AssetInfo {
        AssetInfo {
            name,
            category: self.technology.id.clone(),
            region: self.region,
            legacy: self.legacy,
            nameplate,
        }
    }

    /// The factor power and energy capacity are scaled by to account for scheduled outages
    pub fn derate_factor(&self, options: &BuildOptions) -> Dimensionless {
        if options.apply_scheduled_outage_derate {
            Dimensionless(1.0) - self.technology.parameters.scheduled_outage_rate
        } else {
            Dimensionless(1.0)
        }
    }

    /// Derive the outage process for assets built from this block.
    ///
    /// An hourly forced outage rate is used if the scenario has one for the category and region,
    /// otherwise the category's static rate.
    pub fn outage_process(&self, scenario: &Scenario) -> Result<OutageProcess, BuildError> {
        let parameters = &self.technology.parameters;
        let forced_outage_rate = match scenario
            .forced_outage_profiles
            .get(&self.profile_key())
        {
            Some(rates) => {
                ForcedOutageRate::Hourly(rates.iter().copied().map(Dimensionless).collect())
            }
            None => ForcedOutageRate::Static(parameters.forced_outage_rate),
        };
        let mean_time_to_repair = parameters
            .mean_time_to_repair
            .unwrap_or(scenario.parameters.default_mean_time_to_repair);

        to_outage_process(
            &self.asset_name(),
            &OutageParameters {
                forced_outage_rate,
                mean_time_to_repair,
            },
            scenario.parameters.horizon,
        )
    }
}

/// Group a scenario's installed capacity into blocks for one technology class.
///
/// Every row is validated, whatever its class, so that the same errors are raised whichever kind
/// of asset is being built. Rows with the same region, category and legacy are summed. Blocks with
/// zero capacity are dropped.
///
/// # Returns
///
/// The blocks for `class`, ordered by first appearance in the capacity table. Fails with
/// [`BuildError::InvalidCapacity`] for negative or non-finite capacity,
/// [`BuildError::Configuration`] for an undefined region and [`BuildError::UnclassifiedCategory`]
/// for a category missing from the classification table.
pub fn capacity_blocks<'a>(
    regions: &Regions,
    scenario: &'a Scenario,
    class: TechnologyClass,
) -> Result<Vec<CapacityBlock<'a>>> {
    let mut blocks: IndexMap<_, CapacityBlock<'a>> = IndexMap::new();
    for row in &scenario.capacity {
        let subject = format!("{}|{}|{}", row.category, row.region, row.legacy);
        if !row.capacity.is_valid_magnitude() {
            Err(BuildError::invalid_capacity(&subject, row.capacity.value()))?;
        }
        if !scenario.regions.contains_key(&row.region) {
            Err(BuildError::configuration(
                &subject,
                format!("region {} is not defined", row.region),
            ))?;
        }
        let technology =
            scenario
                .technologies
                .get(&row.category)
                .ok_or_else(|| BuildError::UnclassifiedCategory {
                    category: row.category.to_string(),
                    region: row.region.to_string(),
                })?;
        if technology.class != class {
            continue;
        }

        let region = regions.try_index_of(&row.region.0)?;
        blocks
            .entry((region, technology.id.clone(), row.legacy))
            .and_modify(|block| block.capacity = block.capacity + row.capacity)
            .or_insert_with(|| CapacityBlock {
                region_id: row.region.clone(),
                region,
                technology,
                legacy: row.legacy,
                capacity: row.capacity,
            });
    }

    Ok(blocks
        .into_values()
        .filter(|block| {
            let keep = block.capacity > Power(0.0);
            if !keep {
                debug!("Skipping {}: no installed capacity", block.asset_name());
            }
            keep
        })
        .collect())
}
