//! Building dispatchable hydro as generator-storage assets.
//!
//! The reservoir is filled by the inflow and drained to the grid. Hydro plants cannot draw power
//! from the grid, so grid withdrawal capacity is always zero.
use super::{CapacityBlock, capacity_blocks};
use crate::asset::{AssetCollection, GeneratorStorage};
use crate::error::BuildError;
use crate::region::Regions;
use crate::scenario::Scenario;
use crate::scenario::parameters::{BuildOptions, MissingInflow};
use crate::technology::TechnologyClass;
use crate::units::{Dimensionless, Hours, Power};
use anyhow::{Context, Result};
use log::{info, warn};

/// Build a generator-storage asset for each block of dispatchable hydro capacity.
///
/// With the hydro energy limit enabled, the inflow in each timestep is installed capacity times the
/// inflow capacity factor, with negative factors treated as zero. Inflow is not limited by power
/// capacity and is not derated by scheduled outages. Blocks without inflow data fall back to the
/// scenario's `missing_inflow` setting. With the limit disabled, the inflow always equals the
/// installed capacity.
pub fn build_generator_storages(
    regions: &Regions,
    scenario: &Scenario,
    options: &BuildOptions,
) -> Result<AssetCollection<GeneratorStorage>> {
    let assets = capacity_blocks(regions, scenario, TechnologyClass::HydroDispatchable)?
        .iter()
        .map(|block| {
            generator_storage(block, scenario, options).with_context(|| {
                format!("Failed to build generator-storage {}", block.asset_name())
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!("Built {} generator-storage assets", assets.len());
    Ok(AssetCollection::from_assets(assets, regions.len())?)
}

fn generator_storage(
    block: &CapacityBlock,
    scenario: &Scenario,
    options: &BuildOptions,
) -> Result<GeneratorStorage, BuildError> {
    let horizon = scenario.parameters.horizon;
    let parameters = &block.technology.parameters;
    let power = block.capacity * block.derate_factor(options);
    let energy = power * parameters.storage_duration.unwrap_or(Hours(0.0));
    let inflow = if options.apply_hydro_energy_limit {
        inflow(block, scenario)?
    } else {
        vec![block.capacity; horizon]
    };

    Ok(GeneratorStorage {
        outage: block.outage_process(scenario)?,
        info: block.asset_info(block.asset_name(), block.capacity),
        inflow,
        grid_injection_capacity: vec![power; horizon],
        grid_withdrawal_capacity: vec![Power(0.0); horizon],
        charge_capacity: vec![power; horizon],
        discharge_capacity: vec![power; horizon],
        energy_capacity: vec![energy; horizon],
        charge_efficiency: parameters.charge_efficiency,
        discharge_efficiency: parameters.discharge_efficiency,
        carryover_efficiency: parameters.carryover_efficiency,
    })
}

/// The hourly inflow for a block
fn inflow(block: &CapacityBlock, scenario: &Scenario) -> Result<Vec<Power>, BuildError> {
    let horizon = scenario.parameters.horizon;
    let Some(factors) = scenario.hydro_inflow_profiles.get(&block.profile_key()) else {
        let fallback = scenario.parameters.missing_inflow;
        warn!(
            "No inflow data for {}; assuming {fallback} inflow",
            block.asset_name()
        );
        return Ok(match fallback {
            MissingInflow::Zero => vec![Power(0.0); horizon],
            MissingInflow::Flat => vec![block.capacity; horizon],
        });
    };

    factors
        .iter()
        .map(|factor| {
            if !factor.is_finite() {
                return Err(BuildError::configuration(
                    block.asset_name(),
                    format!("inflow capacity factors must be numbers (got {factor})"),
                ));
            }
            Ok(block.capacity * Dimensionless(factor.max(0.0)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Legacy, ReliabilityAsset};
    use crate::fixture::scenario;
    use crate::region::build_regions;
    use crate::scenario::{InstalledCapacity, ProfileTable};
    use crate::units::Energy;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn add_hydro(scenario: &mut Scenario, region: &str) {
        scenario.capacity.push(InstalledCapacity {
            region: region.into(),
            category: "hydED".into(),
            legacy: Legacy::Existing,
            capacity: Power(100.0),
        });
    }

    fn options(derate: bool, energy_limit: bool) -> BuildOptions {
        BuildOptions {
            apply_scheduled_outage_derate: derate,
            apply_hydro_energy_limit: energy_limit,
        }
    }

    #[rstest]
    fn test_build_generator_storages(mut scenario: Scenario) {
        add_hydro(&mut scenario, "p2");
        let regions = build_regions(&scenario).unwrap();
        let assets = build_generator_storages(&regions, &scenario, &options(false, true)).unwrap();

        assert_eq!(assets.len(), 1);
        let hydro = assets.get(0).unwrap();
        assert_eq!(hydro.name(), "hydED|p2|existing");
        assert_eq!(hydro.region(), 1);

        // Factors of 0.5, 2.0, -0.1 and 0.0; only negative inflow is clamped
        assert_eq!(hydro.inflow, [50.0, 200.0, 0.0, 0.0].map(Power).to_vec());
        assert_eq!(hydro.grid_injection_capacity, vec![Power(100.0); 4]);
        assert_eq!(hydro.grid_withdrawal_capacity, vec![Power(0.0); 4]);
        assert_eq!(hydro.energy_capacity, vec![Energy(800.0); 4]);
    }

    #[rstest]
    fn test_build_generator_storages_no_energy_limit(mut scenario: Scenario) {
        add_hydro(&mut scenario, "p2");
        let regions = build_regions(&scenario).unwrap();
        let assets =
            build_generator_storages(&regions, &scenario, &options(false, false)).unwrap();
        assert_eq!(assets.get(0).unwrap().inflow, vec![Power(100.0); 4]);
    }

    #[rstest]
    #[case(MissingInflow::Zero, Power(0.0))]
    #[case(MissingInflow::Flat, Power(100.0))]
    fn test_build_generator_storages_missing_inflow(
        mut scenario: Scenario,
        #[case] missing_inflow: MissingInflow,
        #[case] expected: Power,
    ) {
        add_hydro(&mut scenario, "p1");
        scenario.parameters.missing_inflow = missing_inflow;
        let regions = build_regions(&scenario).unwrap();
        let assets = build_generator_storages(&regions, &scenario, &options(false, true)).unwrap();
        assert_eq!(assets.get(0).unwrap().inflow, vec![expected; 4]);
    }

    #[rstest]
    fn test_build_generator_storages_derated(mut scenario: Scenario) {
        add_hydro(&mut scenario, "p2");
        let regions = build_regions(&scenario).unwrap();
        let derated = build_generator_storages(&regions, &scenario, &options(true, true)).unwrap();
        let full = build_generator_storages(&regions, &scenario, &options(false, true)).unwrap();
        let (derated, full) = (derated.get(0).unwrap(), full.get(0).unwrap());

        // Natural inflow is not affected by scheduled outages
        assert_eq!(derated.inflow, full.inflow);
        for (derated, full) in derated.energy_capacity.iter().zip(&full.energy_capacity) {
            assert!(derated < full);
        }
        assert!(derated.grid_injection_capacity[0] < full.grid_injection_capacity[0]);
    }

    #[rstest]
    fn test_build_generator_storages_inflow_above_capacity(mut scenario: Scenario) {
        add_hydro(&mut scenario, "p2");
        scenario.hydro_inflow_profiles = ProfileTable::new(4);
        scenario
            .hydro_inflow_profiles
            .insert("hydED|p2", vec![2.0, 1.0, 0.98, 0.5])
            .unwrap();
        let regions = build_regions(&scenario).unwrap();

        for derate in [false, true] {
            let assets =
                build_generator_storages(&regions, &scenario, &options(derate, true)).unwrap();
            let hydro = assets.get(0).unwrap();
            let total: Power = hydro.inflow.iter().copied().sum();
            assert_approx_eq!(f64, total.value(), 448.0, epsilon = 1e-9);
        }
    }
}
