//! Assets are the units of a reliability model which can fail: generators, storage devices and
//! generators with attached storage (e.g. dispatchable hydro).
//!
//! Assets of each kind are held in an [`AssetCollection`], a flat list with a per-region index.
use crate::error::BuildError;
use crate::outage::OutageProcess;
use crate::technology::CategoryID;
use crate::units::{Dimensionless, Energy, Power};
use serde_string_enum::DeserializeLabeledStringEnum;

/// Whether capacity was installed before or during the solve year
#[derive(
    DeserializeLabeledStringEnum,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
)]
pub enum Legacy {
    /// Capacity carried over from earlier years
    #[string = "existing"]
    #[strum(serialize = "existing")]
    Existing,
    /// Capacity built by the capacity-expansion model
    #[string = "new"]
    #[strum(serialize = "new")]
    New,
}

/// The kinds of asset in a reliability model
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum AssetKind {
    /// See [`Generator`]
    #[strum(serialize = "generator")]
    Generator,
    /// See [`Storage`]
    #[strum(serialize = "storage")]
    Storage,
    /// See [`GeneratorStorage`]
    #[strum(serialize = "generator-storage")]
    GeneratorStorage,
}

/// Properties common to all assets
#[derive(Debug, Clone, PartialEq)]
pub struct AssetInfo {
    /// Unique name, `<category>|<region>|<legacy>` with a `|<n>` suffix for individual units
    pub name: String,
    /// The technology category
    pub category: CategoryID,
    /// Index of the region the asset is in
    pub region: usize,
    /// Whether the capacity is existing or new
    pub legacy: Legacy,
    /// Installed capacity before any derating (MW)
    pub nameplate: Power,
}

/// Behaviour shared by all kinds of asset
pub trait ReliabilityAsset {
    /// The kind of asset
    const KIND: AssetKind;

    /// Common asset properties
    fn info(&self) -> &AssetInfo;

    /// The asset's outage process
    fn outage(&self) -> &OutageProcess;

    /// The length of each of the asset's time series, with a label for each
    fn series_lengths(&self) -> Vec<(&'static str, usize)>;

    /// The asset's name
    fn name(&self) -> &str {
        &self.info().name
    }

    /// Index of the region the asset is in
    fn region(&self) -> usize {
        self.info().region
    }
}

/// A generator with an available capacity in each timestep
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    /// Common properties
    pub info: AssetInfo,
    /// Available capacity when not on outage (MW)
    pub capacity: Vec<Power>,
    /// Outage process
    pub outage: OutageProcess,
}

impl ReliabilityAsset for Generator {
    const KIND: AssetKind = AssetKind::Generator;

    fn info(&self) -> &AssetInfo {
        &self.info
    }

    fn outage(&self) -> &OutageProcess {
        &self.outage
    }

    fn series_lengths(&self) -> Vec<(&'static str, usize)> {
        vec![("capacity", self.capacity.len())]
    }
}

/// A storage device which charges from and discharges to the grid
#[derive(Debug, Clone, PartialEq)]
pub struct Storage {
    /// Common properties
    pub info: AssetInfo,
    /// Maximum charging rate (MW)
    pub charge_capacity: Vec<Power>,
    /// Maximum discharging rate (MW)
    pub discharge_capacity: Vec<Power>,
    /// Maximum state of charge (MWh)
    pub energy_capacity: Vec<Energy>,
    /// Charging efficiency
    pub charge_efficiency: Dimensionless,
    /// Discharging efficiency
    pub discharge_efficiency: Dimensionless,
    /// Fraction of stored energy kept between timesteps
    pub carryover_efficiency: Dimensionless,
    /// Outage process
    pub outage: OutageProcess,
}

impl ReliabilityAsset for Storage {
    const KIND: AssetKind = AssetKind::Storage;

    fn info(&self) -> &AssetInfo {
        &self.info
    }

    fn outage(&self) -> &OutageProcess {
        &self.outage
    }

    fn series_lengths(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("charge capacity", self.charge_capacity.len()),
            ("discharge capacity", self.discharge_capacity.len()),
            ("energy capacity", self.energy_capacity.len()),
        ]
    }
}

/// A generator whose output passes through an energy store fed by an inflow
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorStorage {
    /// Common properties
    pub info: AssetInfo,
    /// Energy arriving at the store in each timestep (MW)
    pub inflow: Vec<Power>,
    /// Maximum output to the grid (MW)
    pub grid_injection_capacity: Vec<Power>,
    /// Maximum intake from the grid (MW)
    pub grid_withdrawal_capacity: Vec<Power>,
    /// Maximum charging rate of the store (MW)
    pub charge_capacity: Vec<Power>,
    /// Maximum discharging rate of the store (MW)
    pub discharge_capacity: Vec<Power>,
    /// Maximum state of charge (MWh)
    pub energy_capacity: Vec<Energy>,
    /// Charging efficiency
    pub charge_efficiency: Dimensionless,
    /// Discharging efficiency
    pub discharge_efficiency: Dimensionless,
    /// Fraction of stored energy kept between timesteps
    pub carryover_efficiency: Dimensionless,
    /// Outage process
    pub outage: OutageProcess,
}

impl ReliabilityAsset for GeneratorStorage {
    const KIND: AssetKind = AssetKind::GeneratorStorage;

    fn info(&self) -> &AssetInfo {
        &self.info
    }

    fn outage(&self) -> &OutageProcess {
        &self.outage
    }

    fn series_lengths(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("inflow", self.inflow.len()),
            ("grid injection capacity", self.grid_injection_capacity.len()),
            ("grid withdrawal capacity", self.grid_withdrawal_capacity.len()),
            ("charge capacity", self.charge_capacity.len()),
            ("discharge capacity", self.discharge_capacity.len()),
            ("energy capacity", self.energy_capacity.len()),
        ]
    }
}

/// Assets of one kind, with the indices of the assets in each region
#[derive(Debug, Clone, PartialEq)]
pub struct AssetCollection<T> {
    assets: Vec<T>,
    members: Vec<Vec<usize>>,
}

impl<T: ReliabilityAsset> AssetCollection<T> {
    /// Create a collection, grouping assets by region.
    ///
    /// Fails if an asset's region index is not less than `num_regions`.
    pub fn from_assets(assets: Vec<T>, num_regions: usize) -> Result<Self, BuildError> {
        let mut members = vec![Vec::new(); num_regions];
        for (index, asset) in assets.iter().enumerate() {
            let region_members = members.get_mut(asset.region()).ok_or_else(|| {
                BuildError::Integrity(format!(
                    "{} {} is in region {}, but there are only {num_regions} regions",
                    T::KIND,
                    asset.name(),
                    asset.region()
                ))
            })?;
            region_members.push(index);
        }

        Ok(Self { assets, members })
    }

    /// Create a collection from assets and per-region membership, without any checks
    pub fn from_parts(assets: Vec<T>, members: Vec<Vec<usize>>) -> Self {
        Self { assets, members }
    }

    /// The number of assets
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether there are no assets
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Iterate over all assets
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.assets.iter()
    }

    /// Get an asset by index
    pub fn get(&self, index: usize) -> Option<&T> {
        self.assets.get(index)
    }

    /// The indices of the assets in each region
    pub fn members(&self) -> &[Vec<usize>] {
        &self.members
    }

    /// Iterate over the assets in a region
    pub fn in_region(&self, region: usize) -> impl Iterator<Item = &T> {
        self.members
            .get(region)
            .into_iter()
            .flatten()
            .map(|index| &self.assets[*index])
    }
}
