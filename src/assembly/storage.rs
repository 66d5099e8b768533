//! Building standalone storage devices.
use super::{CapacityBlock, capacity_blocks};
use crate::asset::{AssetCollection, Storage};
use crate::error::BuildError;
use crate::region::Regions;
use crate::scenario::Scenario;
use crate::scenario::parameters::BuildOptions;
use crate::technology::TechnologyClass;
use anyhow::{Context, Result};
use log::info;

/// Build a storage device for each block of storage capacity.
///
/// Charge and discharge capacity both equal the installed power capacity and energy capacity is
/// power capacity times the technology's storage duration. All are scaled by the scheduled outage
/// derate, if enabled.
pub fn build_storages(
    regions: &Regions,
    scenario: &Scenario,
    options: &BuildOptions,
) -> Result<AssetCollection<Storage>> {
    let storages = capacity_blocks(regions, scenario, TechnologyClass::Storage)?
        .iter()
        .map(|block| {
            storage(block, scenario, options)
                .with_context(|| format!("Failed to build storage {}", block.asset_name()))
        })
        .collect::<Result<Vec<_>>>()?;

    info!("Built {} storage devices", storages.len());
    Ok(AssetCollection::from_assets(storages, regions.len())?)
}

fn storage(
    block: &CapacityBlock,
    scenario: &Scenario,
    options: &BuildOptions,
) -> Result<Storage, BuildError> {
    let name = block.asset_name();
    let parameters = &block.technology.parameters;
    let duration = parameters.storage_duration.ok_or_else(|| {
        BuildError::configuration(
            &block.technology.id,
            "storage_duration is required for storage technologies",
        )
    })?;

    let horizon = scenario.parameters.horizon;
    let power = block.capacity * block.derate_factor(options);
    let energy = power * duration;

    Ok(Storage {
        outage: block.outage_process(scenario)?,
        info: block.asset_info(name, block.capacity),
        charge_capacity: vec![power; horizon],
        discharge_capacity: vec![power; horizon],
        energy_capacity: vec![energy; horizon],
        charge_efficiency: parameters.charge_efficiency,
        discharge_efficiency: parameters.discharge_efficiency,
        carryover_efficiency: parameters.carryover_efficiency,
    })
}
