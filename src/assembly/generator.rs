//! Building generators from variable and thermal capacity.
use super::{CapacityBlock, capacity_blocks};
use crate::asset::{AssetCollection, Generator};
use crate::error::BuildError;
use crate::region::Regions;
use crate::scenario::Scenario;
use crate::scenario::parameters::BuildOptions;
use crate::technology::TechnologyClass;
use crate::units::{Dimensionless, Power};
use anyhow::{Context, Result};
use log::{debug, info};

/// Remainders smaller than this are treated as rounding error when splitting capacity into units
const UNIT_REMAINDER_TOLERANCE: Power = Power(1e-6);

/// The most units a single block of capacity can be split into
const MAX_UNITS_PER_BLOCK: usize = 100_000;

/// Build generators for all variable and thermal capacity.
///
/// Variable generation gets one generator per block, with capacity following the block's
/// capacity factor profile. Thermal capacity has a constant capacity and is split into units if
/// the technology has a unit size.
///
/// # Arguments
///
/// * `regions` - The model's regions
/// * `scenario` - The scenario data
/// * `options` - Which derates to apply
pub fn build_generators(
    regions: &Regions,
    scenario: &Scenario,
    options: &BuildOptions,
) -> Result<AssetCollection<Generator>> {
    let mut generators = Vec::new();
    for block in capacity_blocks(regions, scenario, TechnologyClass::Variable)? {
        let generator = variable_generator(&block, scenario, options)
            .with_context(|| format!("Failed to build generator {}", block.asset_name()))?;
        generators.push(generator);
    }
    for block in capacity_blocks(regions, scenario, TechnologyClass::Thermal)? {
        let units = thermal_generators(&block, scenario, options)
            .with_context(|| format!("Failed to build generator {}", block.asset_name()))?;
        generators.extend(units);
    }

    info!("Built {} generators", generators.len());
    Ok(AssetCollection::from_assets(generators, regions.len())?)
}

/// A generator whose capacity follows an hourly capacity factor profile
fn variable_generator(
    block: &CapacityBlock,
    scenario: &Scenario,
    options: &BuildOptions,
) -> Result<Generator, BuildError> {
    let name = block.asset_name();
    let key = block.profile_key();
    let profile = scenario.resource_profiles.get(&key).ok_or_else(|| {
        BuildError::configuration(&name, format!("no capacity factor profile {key}"))
    })?;
    if let Some(value) = profile.iter().find(|value| !(value.is_finite() && **value >= 0.0)) {
        return Err(BuildError::configuration(
            &name,
            format!("capacity factors must be non-negative numbers (got {value})"),
        ));
    }

    let derate = block.derate_factor(options);
    let capacity = profile
        .iter()
        .map(|factor| block.capacity * Dimensionless(*factor) * derate)
        .collect();

    Ok(Generator {
        outage: block.outage_process(scenario)?,
        info: block.asset_info(name, block.capacity),
        capacity,
    })
}

/// Constant-capacity generators, one per unit if the technology has a unit size
fn thermal_generators(
    block: &CapacityBlock,
    scenario: &Scenario,
    options: &BuildOptions,
) -> Result<Vec<Generator>, BuildError> {
    let horizon = scenario.parameters.horizon;
    let derate = block.derate_factor(options);
    let outage = block.outage_process(scenario)?;
    let name = block.asset_name();

    let unit_sizes = match block.technology.parameters.unit_size {
        Some(unit_size) => split_into_units(&name, block.capacity, unit_size)?,
        None => vec![block.capacity],
    };
    if unit_sizes.len() > 1 {
        debug!("Split {name} into {} units", unit_sizes.len());
    }

    let suffix_units = unit_sizes.len() > 1;
    Ok(unit_sizes
        .into_iter()
        .enumerate()
        .map(|(index, nameplate)| {
            let unit_name = if suffix_units {
                format!("{name}|{}", index + 1)
            } else {
                name.clone()
            };
            Generator {
                info: block.asset_info(unit_name, nameplate),
                capacity: vec![nameplate * derate; horizon],
                outage: outage.clone(),
            }
        })
        .collect())
}

/// Split capacity into whole units of `unit_size` plus a smaller unit for any remainder.
///
/// Fails if this would give [`MAX_UNITS_PER_BLOCK`] or more whole units.
fn split_into_units(
    subject: &str,
    capacity: Power,
    unit_size: Power,
) -> Result<Vec<Power>, BuildError> {
    let whole_units = (capacity.value() / unit_size.value()).floor();
    if !(whole_units >= 0.0 && whole_units < MAX_UNITS_PER_BLOCK as f64) {
        return Err(BuildError::configuration(
            subject,
            format!(
                "a unit size of {unit_size} MW splits {capacity} MW into at least \
                {MAX_UNITS_PER_BLOCK} units"
            ),
        ));
    }

    let num_units = whole_units as usize;
    let remainder = capacity - unit_size * Dimensionless(whole_units);
    let mut units = vec![unit_size; num_units];
    if remainder > UNIT_REMAINDER_TOLERANCE {
        units.push(remainder);
    }

    Ok(units)
}
