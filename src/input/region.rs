//! Code for reading region-related information from CSV files.
use super::*;
use crate::error::BuildError;
use crate::region::{RegionDefinition, RegionDefinitionMap, is_dc_region_name};
use std::path::Path;

const REGIONS_FILE_NAME: &str = "regions.csv";

/// Reads the AC regions of the scenario from a CSV file.
///
/// The order of rows in the file fixes the order (and therefore the index) of the AC regions in the
/// reliability model.
///
/// # Arguments
///
/// * `scenario_dir` - Folder containing scenario input files
///
/// # Returns
///
/// A map of [`RegionDefinition`]s keyed by region ID, in file order, or an error
pub fn read_regions(scenario_dir: &Path) -> Result<RegionDefinitionMap> {
    let file_path = scenario_dir.join(REGIONS_FILE_NAME);
    let regions_csv = read_csv(&file_path)?;
    read_regions_from_iter(regions_csv).with_context(|| input_err_msg(&file_path))
}

fn read_regions_from_iter<I>(iter: I) -> Result<RegionDefinitionMap>
where
    I: Iterator<Item = RegionDefinition>,
{
    let mut map = RegionDefinitionMap::new();
    for region in iter {
        if is_dc_region_name(&region.id.0) {
            Err(BuildError::configuration(
                &region.id,
                "AC region names cannot use the prefix reserved for DC pseudo-regions",
            ))?;
        }

        try_insert(&mut map, region.id.clone(), region)?;
    }

    Ok(map)
}
