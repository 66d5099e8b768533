//! The assembled reliability model for a whole system.
use crate::assembly::generator::build_generators;
use crate::assembly::generator_storage::build_generator_storages;
use crate::assembly::storage::build_storages;
use crate::asset::{AssetCollection, Generator, GeneratorStorage, ReliabilityAsset, Storage};
use crate::error::BuildError;
use crate::interface::{Interface, build_interfaces};
use crate::region::{Regions, build_regions};
use crate::scenario::Scenario;
use crate::scenario::parameters::BuildOptions;
use anyhow::{Context, Result};
use float_cmp::approx_eq;
use log::info;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Largest allowed difference between the capacity in the model and the installed capacity (MW)
const CAPACITY_TOLERANCE: f64 = 1.0;

/// A complete reliability model, ready to hand to an adequacy engine.
///
/// Instances can only be created through [`SystemModel::assemble`], which checks that everything
/// is consistent, and are never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemModel {
    horizon: usize,
    regions: Regions,
    generators: AssetCollection<Generator>,
    storages: AssetCollection<Storage>,
    generator_storages: AssetCollection<GeneratorStorage>,
    interfaces: Vec<Interface>,
}

impl SystemModel {
    /// Assemble a model from its parts.
    ///
    /// Fails with [`BuildError::Integrity`] if any region index is out of range, any series does not
    /// have `horizon` timesteps, an asset collection's region membership does not partition its
    /// assets, or an interface joins a region to itself or repeats another interface.
    pub fn assemble(
        horizon: usize,
        regions: Regions,
        generators: AssetCollection<Generator>,
        storages: AssetCollection<Storage>,
        generator_storages: AssetCollection<GeneratorStorage>,
        interfaces: Vec<Interface>,
    ) -> Result<Self, BuildError> {
        check_regions(&regions, horizon)?;
        check_assets(&generators, regions.len(), horizon)?;
        check_assets(&storages, regions.len(), horizon)?;
        check_assets(&generator_storages, regions.len(), horizon)?;
        check_interfaces(&interfaces, regions.len(), horizon)?;

        Ok(Self {
            horizon,
            regions,
            generators,
            storages,
            generator_storages,
            interfaces,
        })
    }

    /// Number of timesteps
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// The regions, AC first then DC pseudo-regions
    pub fn regions(&self) -> &Regions {
        &self.regions
    }

    /// Generators
    pub fn generators(&self) -> &AssetCollection<Generator> {
        &self.generators
    }

    /// Standalone storage
    pub fn storages(&self) -> &AssetCollection<Storage> {
        &self.storages
    }

    /// Generators with storage
    pub fn generator_storages(&self) -> &AssetCollection<GeneratorStorage> {
        &self.generator_storages
    }

    /// Interfaces, ordered by `(from, to)`
    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    /// Check that the model holds the scenario's installed capacity.
    ///
    /// For each region and category, the nameplate capacity of the model's assets must match the
    /// installed capacity to within 1 MW. Categories listed in the scenario's
    /// `capacity_check_exemptions` are skipped.
    pub fn check_capacity_totals(&self, scenario: &Scenario) -> Result<(), BuildError> {
        let parameters = &scenario.parameters;
        let mut installed: BTreeMap<(String, String), f64> = BTreeMap::new();
        for row in &scenario.capacity {
            if parameters.is_exempt_from_capacity_check(&row.category.0) {
                continue;
            }
            *installed
                .entry((row.region.to_string(), row.category.to_string()))
                .or_default() += row.capacity.value();
        }

        let mut modelled: BTreeMap<(String, String), f64> = BTreeMap::new();
        let infos = self
            .generators
            .iter()
            .map(ReliabilityAsset::info)
            .chain(self.storages.iter().map(ReliabilityAsset::info))
            .chain(self.generator_storages.iter().map(ReliabilityAsset::info));
        for info in infos {
            if parameters.is_exempt_from_capacity_check(&info.category.0) {
                continue;
            }
            let region = self
                .regions
                .get(info.region)
                .map_or_else(|| info.region.to_string(), |region| region.name.to_string());
            *modelled
                .entry((region, info.category.to_string()))
                .or_default() += info.nameplate.value();
        }

        let keys: BTreeSet<_> = installed.keys().chain(modelled.keys()).collect();
        for key in keys {
            let expected = installed.get(key).copied().unwrap_or(0.0);
            let found = modelled.get(key).copied().unwrap_or(0.0);
            if !approx_eq!(f64, expected, found, epsilon = CAPACITY_TOLERANCE) {
                let (region, category) = key;
                return Err(BuildError::Integrity(format!(
                    "{category} in {region} has {found} MW in the model but {expected} MW installed"
                )));
            }
        }

        Ok(())
    }
}

fn check_regions(regions: &Regions, horizon: usize) -> Result<(), BuildError> {
    for region in regions.iter() {
        if region.load.len() != horizon {
            return Err(BuildError::Integrity(format!(
                "load for region {} has {} timesteps but the model has {horizon}",
                region.name,
                region.load.len()
            )));
        }
    }

    Ok(())
}

fn check_assets<T: ReliabilityAsset>(
    assets: &AssetCollection<T>,
    num_regions: usize,
    horizon: usize,
) -> Result<(), BuildError> {
    let kind = T::KIND;
    for asset in assets.iter() {
        if asset.region() >= num_regions {
            return Err(BuildError::Integrity(format!(
                "{kind} {} is in region {} but there are only {num_regions} regions",
                asset.name(),
                asset.region()
            )));
        }
        for (label, len) in asset.series_lengths() {
            if len != horizon {
                return Err(BuildError::Integrity(format!(
                    "{label} of {kind} {} has {len} timesteps but the model has {horizon}",
                    asset.name()
                )));
            }
        }
        let outage = asset.outage();
        for len in [outage.failure_rate.series_len(), outage.repair_rate.series_len()]
            .into_iter()
            .flatten()
        {
            if len != horizon {
                return Err(BuildError::Integrity(format!(
                    "outage rates of {kind} {} have {len} timesteps but the model has {horizon}",
                    asset.name()
                )));
            }
        }
    }

    let members = assets.members();
    if members.len() != num_regions {
        return Err(BuildError::Integrity(format!(
            "{kind} membership covers {} regions but the model has {num_regions}",
            members.len()
        )));
    }
    let mut seen = vec![false; assets.len()];
    for (region, indices) in members.iter().enumerate() {
        for &index in indices {
            let asset = assets.get(index).ok_or_else(|| {
                BuildError::Integrity(format!(
                    "{kind} membership of region {region} refers to missing asset {index}"
                ))
            })?;
            if asset.region() != region {
                return Err(BuildError::Integrity(format!(
                    "{kind} {} is listed under region {region} but is in region {}",
                    asset.name(),
                    asset.region()
                )));
            }
            if std::mem::replace(&mut seen[index], true) {
                return Err(BuildError::Integrity(format!(
                    "{kind} {} is listed more than once",
                    asset.name()
                )));
            }
        }
    }
    if let Some(index) = seen.iter().position(|seen| !seen) {
        return Err(BuildError::Integrity(format!(
            "{kind} {index} is not listed under any region"
        )));
    }

    Ok(())
}

fn check_interfaces(
    interfaces: &[Interface],
    num_regions: usize,
    horizon: usize,
) -> Result<(), BuildError> {
    let mut pairs = HashSet::new();
    for interface in interfaces {
        let (from, to) = (interface.from, interface.to);
        if from >= num_regions || to >= num_regions {
            return Err(BuildError::Integrity(format!(
                "interface ({from}, {to}) refers to a region outside the model's {num_regions}"
            )));
        }
        if from == to {
            return Err(BuildError::Integrity(format!(
                "interface joins region {from} to itself"
            )));
        }
        if from > to {
            return Err(BuildError::Integrity(format!(
                "interface ({from}, {to}) must list the lower region index first"
            )));
        }
        if !pairs.insert((from, to)) {
            return Err(BuildError::Integrity(format!(
                "interface ({from}, {to}) is defined more than once"
            )));
        }
        for (label, series) in [("forward", &interface.forward), ("backward", &interface.backward)] {
            if series.len() != horizon {
                return Err(BuildError::Integrity(format!(
                    "{label} limit of interface ({from}, {to}) has {} timesteps but the model has \
                    {horizon}",
                    series.len()
                )));
            }
        }
    }

    Ok(())
}

/// Build a reliability model for a scenario.
///
/// # Arguments
///
/// * `scenario` - The loaded scenario data
/// * `options` - Which derates to apply
///
/// # Returns
///
/// The assembled [`SystemModel`], after checking it holds the scenario's installed capacity.
pub fn build_system_model(scenario: &Scenario, options: &BuildOptions) -> Result<SystemModel> {
    let horizon = scenario.parameters.horizon;
    let regions = build_regions(scenario).context("Failed to build regions")?;
    let generators = build_generators(&regions, scenario, options)?;
    let storages = build_storages(&regions, scenario, options)?;
    let generator_storages = build_generator_storages(&regions, scenario, options)?;
    let interfaces =
        build_interfaces(&regions, scenario, horizon).context("Failed to build interfaces")?;

    let model = SystemModel::assemble(
        horizon,
        regions,
        generators,
        storages,
        generator_storages,
        interfaces,
    )?;
    model.check_capacity_totals(scenario)?;

    info!(
        "Built reliability model with {} regions, {} generators, {} storage devices, \
        {} generator-storage assets and {} interfaces",
        model.regions().len(),
        model.generators().len(),
        model.storages().len(),
        model.generator_storages().len(),
        model.interfaces().len()
    );

    Ok(model)
}
