//! Code for reading hourly profile tables.
//!
//! Profile tables are "wide" CSV files: the first column gives the weather year of each row and
//! every other column is a series, with one row per timestep.
use super::*;
use crate::error::BuildError;
use crate::region::{RegionDefinitionMap, RegionID};
use crate::scenario::ProfileTable;
use crate::units::Power;
use csv::StringRecord;
use std::path::Path;

const LOAD_FILE_NAME: &str = "load.csv";
const WEATHER_YEAR_COLUMN: &str = "weather_year";

/// Read a profile table, keeping only the rows for the given weather year.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
/// * `weather_year` - The weather year to select
/// * `horizon` - The number of timesteps expected for the weather year
pub fn read_profile_table(
    file_path: &Path,
    weather_year: u32,
    horizon: usize,
) -> Result<ProfileTable> {
    let mut reader = csv_reader(file_path)?;
    let headers = reader
        .headers()
        .with_context(|| input_err_msg(file_path))?
        .clone();
    profile_table_from_records(&headers, reader.records(), weather_year, horizon)
        .with_context(|| input_err_msg(file_path))
}

/// Read a profile table if the file exists, otherwise return an empty table
pub fn read_profile_table_optional(
    file_path: &Path,
    weather_year: u32,
    horizon: usize,
) -> Result<ProfileTable> {
    if !file_path.exists() {
        debug!("Optional file {} not found", file_path.display());
        return Ok(ProfileTable::new(horizon));
    }

    read_profile_table(file_path, weather_year, horizon)
}

fn profile_table_from_records<I>(
    headers: &StringRecord,
    records: I,
    weather_year: u32,
    horizon: usize,
) -> Result<ProfileTable>
where
    I: Iterator<Item = csv::Result<StringRecord>>,
{
    ensure!(
        headers.get(0) == Some(WEATHER_YEAR_COLUMN),
        "The first column must be {WEATHER_YEAR_COLUMN}"
    );
    let names = headers.iter().skip(1).collect_vec();
    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(horizon); names.len()];

    for (row, record) in records.enumerate() {
        let record = record?;
        let year: u32 = record[0]
            .parse()
            .with_context(|| format!("Invalid weather year '{}' on row {row}", &record[0]))?;
        if year != weather_year {
            continue;
        }

        ensure!(
            record.len() == headers.len(),
            "Row {row} has {} values but there are {} columns",
            record.len(),
            headers.len()
        );
        for (column, value) in columns.iter_mut().zip(record.iter().skip(1)) {
            let value: f64 = value
                .parse()
                .with_context(|| format!("Invalid value '{value}' on row {row}"))?;
            column.push(value);
        }
    }

    let found = columns.first().map_or(horizon, Vec::len);
    if found != horizon {
        Err(BuildError::shape_mismatch(
            format!("Profile data for weather year {weather_year}"),
            horizon,
            found,
        ))?;
    }

    let mut table = ProfileTable::new(horizon);
    for (name, values) in names.into_iter().zip(columns) {
        table.insert(name, values)?;
    }

    Ok(table)
}

/// Read the hourly load for every AC region.
///
/// # Arguments
///
/// * `scenario_dir` - Folder containing scenario input files
/// * `regions` - The scenario's AC regions
/// * `weather_year` - The weather year to select
/// * `horizon` - The number of timesteps expected
///
/// # Returns
///
/// Load series in the order of `regions`. Every value is strictly positive.
pub fn read_load(
    scenario_dir: &Path,
    regions: &RegionDefinitionMap,
    weather_year: u32,
    horizon: usize,
) -> Result<IndexMap<RegionID, Vec<Power>>> {
    let file_path = scenario_dir.join(LOAD_FILE_NAME);
    let table = read_profile_table(&file_path, weather_year, horizon)?;
    load_from_table(&table, regions).with_context(|| input_err_msg(&file_path))
}

fn load_from_table(
    table: &ProfileTable,
    regions: &RegionDefinitionMap,
) -> Result<IndexMap<RegionID, Vec<Power>>> {
    for name in table.column_names() {
        ensure!(
            regions.contains_key(name),
            "Load given for unknown region {name}"
        );
    }

    regions
        .keys()
        .map(|region_id| -> Result<_> {
            let values = table
                .get(&region_id.0)
                .with_context(|| format!("No load data for region {region_id}"))?;
            if let Some((timestep, value)) = values
                .iter()
                .enumerate()
                .find(|(_, value)| !(value.is_finite() && **value > 0.0))
            {
                Err(BuildError::configuration(
                    format!("load in region {region_id}"),
                    format!("load must be positive in every timestep (got {value} at timestep {timestep})"),
                ))?;
            }

            Ok((region_id.clone(), values.iter().copied().map(Power).collect()))
        })
        .try_collect()
}
