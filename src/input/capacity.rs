//! Code for reading installed capacity from a CSV file.
use super::*;
use crate::asset::Legacy;
use crate::region::RegionID;
use crate::scenario::InstalledCapacity;
use crate::technology::CategoryID;
use crate::units::Power;
use serde::Deserialize;
use std::path::Path;

const CAPACITY_FILE_NAME: &str = "capacity.csv";

#[derive(Deserialize)]
struct InstalledCapacityRaw {
    region: RegionID,
    category: CategoryID,
    legacy: Legacy,
    year: u32,
    capacity: Power,
}

/// Read the installed capacity for the solve year.
///
/// Rows are returned in file order. Regions, categories and capacity values are checked later, when
/// assets are built, so that errors can name the asset concerned.
///
/// # Arguments
///
/// * `scenario_dir` - Folder containing scenario input files
/// * `solve_year` - Only rows for this year are kept
pub fn read_installed_capacity(
    scenario_dir: &Path,
    solve_year: u32,
) -> Result<Vec<InstalledCapacity>> {
    let file_path = scenario_dir.join(CAPACITY_FILE_NAME);
    let capacity_csv = read_csv(&file_path)?;
    let capacity = read_installed_capacity_from_iter(capacity_csv, solve_year);
    ensure!(
        !capacity.is_empty(),
        "{}: no installed capacity for solve year {solve_year}",
        input_err_msg(&file_path)
    );

    Ok(capacity)
}

fn read_installed_capacity_from_iter<I>(iter: I, solve_year: u32) -> Vec<InstalledCapacity>
where
    I: Iterator<Item = InstalledCapacityRaw>,
{
    iter.filter(|row| row.year == solve_year)
        .map(|row| InstalledCapacity {
            region: row.region,
            category: row.category,
            legacy: row.legacy,
            capacity: row.capacity,
        })
        .collect()
}
