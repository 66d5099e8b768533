//! Regions represent the electrical zones between which power can be transferred.
//!
//! As well as the AC regions defined by the scenario, a synthetic DC pseudo-region is created for
//! each AC region which is an endpoint of a VSC (converter-based) corridor. Power moves between an
//! AC region and its DC twin through the converter, and between DC regions along VSC lines.
use crate::error::BuildError;
use crate::id::define_id_type;
use crate::scenario::Scenario;
use crate::transmission::TransferType;
use crate::units::Power;
use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::Deserialize;

define_id_type! {RegionID}

/// The prefix used to name DC pseudo-regions
pub const DC_REGION_PREFIX: &str = "DC|";

/// A map of [`RegionDefinition`]s, keyed by region ID
pub type RegionDefinitionMap = IndexMap<RegionID, RegionDefinition>;

/// An AC region as defined in the scenario's input files
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RegionDefinition {
    /// A unique identifier for a region (e.g. "p1")
    pub id: RegionID,
    /// A text description of the region
    pub description: String,
}

/// Get the name of the DC pseudo-region paired with the given AC region
pub fn dc_region_name(ac_region: &str) -> RegionID {
    format!("{DC_REGION_PREFIX}{ac_region}").into()
}

/// Whether the name is that of a DC pseudo-region
pub fn is_dc_region_name(name: &str) -> bool {
    name.starts_with(DC_REGION_PREFIX)
}

/// A region of the reliability model
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// The region's name
    pub name: RegionID,
    /// Position of the region in the model. All per-region collections are aligned with this.
    pub index: usize,
    /// Whether this is a synthetic DC pseudo-region
    pub is_dc: bool,
    /// Load in each timestep. Always zero for DC pseudo-regions.
    pub load: Vec<Power>,
}

impl Region {
    /// For a DC pseudo-region, the name of the AC region it is paired with
    pub fn paired_ac_region(&self) -> Option<&str> {
        if self.is_dc {
            self.name.0.strip_prefix(DC_REGION_PREFIX)
        } else {
            None
        }
    }
}

/// The ordered regions of a reliability model.
///
/// AC regions come first, followed by DC pseudo-regions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Regions(IndexMap<RegionID, Region>);

impl Regions {
    /// Create from regions already in model order.
    ///
    /// Each region's `index` field is set from its position.
    pub fn from_ordered<I>(regions: I) -> Result<Self>
    where
        I: IntoIterator<Item = Region>,
    {
        let mut map = IndexMap::new();
        for (index, mut region) in regions.into_iter().enumerate() {
            region.index = index;
            let name = region.name.clone();
            if map.insert(name.clone(), region).is_some() {
                Err(BuildError::Integrity(format!("Region {name} is defined twice")))?;
            }
        }

        Ok(Self(map))
    }

    /// The number of regions
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no regions
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the index of a region by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.0.get_index_of(name)
    }

    /// Get the index of a region by name, raising an error if it doesn't exist
    pub fn try_index_of(&self, name: &str) -> Result<usize> {
        let index = self
            .index_of(name)
            .ok_or_else(|| BuildError::Integrity(format!("Region {name} is not in the model")))?;
        Ok(index)
    }

    /// Get a region by index
    pub fn get(&self, index: usize) -> Option<&Region> {
        self.0.get_index(index).map(|(_, region)| region)
    }

    /// Iterate over the regions in order
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.0.values()
    }

    /// Iterate over the AC regions
    pub fn iter_ac(&self) -> impl Iterator<Item = &Region> {
        self.iter().filter(|region| !region.is_dc)
    }

    /// Iterate over the DC pseudo-regions
    pub fn iter_dc(&self) -> impl Iterator<Item = &Region> {
        self.iter().filter(|region| region.is_dc)
    }
}

/// Build the ordered regions for a scenario.
///
/// AC regions are taken in the order of the scenario's region definitions. A DC pseudo-region is
/// then appended for each AC endpoint of a VSC line (in file order) and for each converter
/// location, skipping any already created.
pub fn build_regions(scenario: &Scenario) -> Result<Regions> {
    let horizon = scenario.parameters.horizon;

    let ac_regions = scenario
        .regions
        .keys()
        .map(|id| -> Result<_> {
            let load = scenario
                .load
                .get(id)
                .with_context(|| format!("No load data for region {id}"))?;
            Ok(Region {
                name: id.clone(),
                index: 0,
                is_dc: false,
                load: load.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let dc_regions = converter_endpoints(scenario)
        .into_iter()
        .map(|ac_region| Region {
            name: dc_region_name(&ac_region.0),
            index: 0,
            is_dc: true,
            load: vec![Power(0.0); horizon],
        })
        .collect::<Vec<_>>();

    debug!(
        "Created {} AC regions and {} DC pseudo-regions",
        ac_regions.len(),
        dc_regions.len()
    );

    Regions::from_ordered(ac_regions.into_iter().chain(dc_regions))
}

/// Get the AC regions which need a paired DC pseudo-region, in discovery order
fn converter_endpoints(scenario: &Scenario) -> IndexSet<RegionID> {
    let line_endpoints = scenario
        .lines
        .iter()
        .filter(|line| line.transfer_type == TransferType::Vsc)
        .flat_map(|line| [line.from_region.clone(), line.to_region.clone()]);
    let converter_regions = scenario
        .converters
        .iter()
        .map(|converter| converter.region.clone());

    line_endpoints.chain(converter_regions).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, scenario};
    use crate::transmission::{Converter, TransmissionLine};
    use rstest::rstest;

    #[test]
    fn test_dc_region_name() {
        assert_eq!(dc_region_name("p1"), RegionID::new("DC|p1"));
        assert!(is_dc_region_name("DC|p1"));
        assert!(!is_dc_region_name("p1"));
    }

    #[rstest]
    fn test_build_regions_ac_only(scenario: Scenario) {
        let regions = build_regions(&scenario).unwrap();
        assert_eq!(
            regions.iter().map(|r| r.name.to_string()).collect::<Vec<_>>(),
            ["p1", "p2"]
        );
        assert!(regions.iter_dc().next().is_none());
        assert_eq!(regions.index_of("p2"), Some(1));
    }

    #[rstest]
    fn test_build_regions_with_converter(mut scenario: Scenario) {
        scenario.converters.push(Converter {
            region: "p1".into(),
            capacity: Power(300.0),
        });
        let regions = build_regions(&scenario).unwrap();

        assert_eq!(
            regions.iter().map(|r| r.name.to_string()).collect::<Vec<_>>(),
            ["p1", "p2", "DC|p1"]
        );
        let dc = regions.get(2).unwrap();
        assert!(dc.is_dc);
        assert_eq!(dc.index, 2);
        assert_eq!(dc.paired_ac_region(), Some("p1"));
        assert!(dc.load.iter().all(|load| *load == Power(0.0)));
        assert_eq!(dc.load.len(), scenario.parameters.horizon);

        // AC regions have positive load
        for region in regions.iter_ac() {
            assert!(region.load.iter().all(|load| *load > Power(0.0)));
        }
    }

    #[rstest]
    fn test_build_regions_discovery_order(mut scenario: Scenario) {
        // VSC line endpoints come before converter locations and are deduplicated
        scenario.lines.push(TransmissionLine {
            from_region: "p2".into(),
            to_region: "p1".into(),
            transfer_type: TransferType::Vsc,
            capacity: Power(100.0),
        });
        scenario.converters.push(Converter {
            region: "p1".into(),
            capacity: Power(300.0),
        });
        scenario.converters.push(Converter {
            region: "p2".into(),
            capacity: Power(300.0),
        });
        let regions = build_regions(&scenario).unwrap();
        assert_eq!(
            regions.iter().map(|r| r.name.to_string()).collect::<Vec<_>>(),
            ["p1", "p2", "DC|p2", "DC|p1"]
        );

        // Identical inputs give identical regions
        assert_eq!(regions, build_regions(&scenario).unwrap());
    }

    #[rstest]
    fn test_build_regions_missing_load(mut scenario: Scenario) {
        scenario.load.shift_remove("p2");
        assert_error!(build_regions(&scenario), "No load data for region p2");
    }

    #[test]
    fn test_regions_from_ordered_duplicate() {
        let region = Region {
            name: "p1".into(),
            index: 0,
            is_dc: false,
            load: vec![Power(1.0)],
        };
        assert!(Regions::from_ordered([region.clone(), region]).is_err());
    }
}
