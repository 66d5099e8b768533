//! Common routines for handling input data.
use crate::id::IDLike;
use crate::scenario::Scenario;
use crate::scenario::parameters::ScenarioParameters;
use anyhow::{Context, Result, bail, ensure};
use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, info};
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fs;
use std::path::Path;

pub mod capacity;
use capacity::read_installed_capacity;
pub mod profile;
use profile::{read_load, read_profile_table_optional};
pub mod region;
use region::read_regions;
pub mod technology;
use technology::read_technologies;
pub mod transmission;
use transmission::{read_converters, read_transmission_lines};

const RESOURCE_PROFILES_FILE_NAME: &str = "resource_profiles.csv";
const FORCED_OUTAGE_HOURLY_FILE_NAME: &str = "forced_outage_hourly.csv";
const HYDRO_INFLOW_FILE_NAME: &str = "hydro_inflow.csv";

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<impl Iterator<Item = T>> {
    let vec = read_csv_internal(file_path)?;
    if vec.is_empty() {
        bail!("CSV file {} cannot be empty", file_path.display());
    }

    Ok(vec.into_iter())
}

/// Read a series of type `T`s from a CSV file.
///
/// If the file does not exist, an empty iterator is returned.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv_optional<T: DeserializeOwned>(file_path: &Path) -> Result<impl Iterator<Item = T>> {
    if !file_path.exists() {
        debug!("Optional file {} not found", file_path.display());
        return Ok(Vec::new().into_iter());
    }

    Ok(read_csv_internal(file_path)?.into_iter())
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = csv_reader(file_path)?
        .into_deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Open a CSV file for reading, trimming whitespace from fields
pub(crate) fn csv_reader(file_path: &Path) -> Result<csv::Reader<fs::File>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read a flag, accepting either `true`/`false` or `1`/`0`
pub fn deserialise_flag<'de, D>(deserialiser: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value: String = Deserialize::deserialize(deserialiser)?;
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "Invalid flag value '{other}': expected true/false or 1/0"
        ))),
    }
}

/// Insert a key-value pair into a map, raising an error if the key already exists
pub fn try_insert<K, V>(map: &mut IndexMap<K, V>, key: K, value: V) -> Result<()>
where
    K: IDLike,
{
    let existing = map.insert(key.clone(), value).is_some();
    ensure!(!existing, "Key {key} already exists in the map");
    Ok(())
}

/// Load all of the tabular inputs for a scenario.
///
/// # Arguments
///
/// * `scenario_dir` - Folder containing the scenario's input files
/// * `weather_year` - Overrides the weather year given in `scenario.toml`, if provided
///
/// # Returns
///
/// The fully loaded [`Scenario`] or an error.
pub fn load_scenario(scenario_dir: &Path, weather_year: Option<u32>) -> Result<Scenario> {
    let mut parameters = ScenarioParameters::from_path(scenario_dir)?;
    if let Some(weather_year) = weather_year {
        parameters.weather_year = weather_year;
    }
    info!(
        "Loading scenario from {} (solve year {}, weather year {})",
        scenario_dir.display(),
        parameters.solve_year,
        parameters.weather_year
    );

    let regions = read_regions(scenario_dir)?;
    let capacity = read_installed_capacity(scenario_dir, parameters.solve_year)?;
    let technologies = read_technologies(scenario_dir)?;
    let lines = read_transmission_lines(scenario_dir, &regions, parameters.solve_year)?;
    let converters = read_converters(scenario_dir, &regions, parameters.solve_year)?;

    let weather_year = parameters.weather_year;
    let horizon = parameters.horizon;
    let load = read_load(scenario_dir, &regions, weather_year, horizon)?;
    let read_profiles = |file_name: &str| {
        read_profile_table_optional(&scenario_dir.join(file_name), weather_year, horizon)
    };
    let resource_profiles = read_profiles(RESOURCE_PROFILES_FILE_NAME)?;
    let forced_outage_profiles = read_profiles(FORCED_OUTAGE_HOURLY_FILE_NAME)?;
    let hydro_inflow_profiles = read_profiles(HYDRO_INFLOW_FILE_NAME)?;

    Ok(Scenario {
        parameters,
        regions,
        load,
        capacity,
        technologies,
        lines,
        converters,
        resource_profiles,
        forced_outage_profiles,
        hydro_inflow_profiles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technology::CategoryID;
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: String,
        value: u32,
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct FlagRecord {
        #[serde(deserialize_with = "deserialise_flag")]
        flag: bool,
    }

    /// Create an example CSV file in dir_path
    fn create_csv_file(dir_path: &Path, contents: &str) -> std::path::PathBuf {
        let file_path = dir_path.join("test.csv");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "{contents}").unwrap();
        file_path
    }

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let file_path = create_csv_file(dir.path(), "id,value\nhello, 1\nworld,2");
        let records: Vec<Record> = read_csv(&file_path).unwrap().collect();
        assert_eq!(
            records,
            &[
                Record {
                    id: "hello".to_string(),
                    value: 1,
                },
                Record {
                    id: "world".to_string(),
                    value: 2,
                }
            ]
        );

        // File with no data (only column headers)
        let file_path = create_csv_file(dir.path(), "id,value");
        assert!(read_csv::<Record>(&file_path).is_err());
        assert!(
            read_csv_optional::<Record>(&file_path)
                .unwrap()
                .next()
                .is_none()
        );
    }

    #[test]
    fn test_read_csv_optional_missing_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("missing.csv");
        assert!(
            read_csv_optional::<Record>(&file_path)
                .unwrap()
                .next()
                .is_none()
        );
        assert!(read_csv::<Record>(&file_path).is_err());
    }

    #[test]
    fn test_deserialise_flag() {
        let dir = tempdir().unwrap();
        let file_path = create_csv_file(dir.path(), "flag\ntrue\n0\n1\nFALSE");
        let flags: Vec<bool> = read_csv::<FlagRecord>(&file_path)
            .unwrap()
            .map(|record| record.flag)
            .collect();
        assert_eq!(flags, [true, false, true, false]);

        let file_path = create_csv_file(dir.path(), "flag\nmaybe");
        assert!(read_csv::<FlagRecord>(&file_path).is_err());
    }

    #[test]
    fn test_read_toml() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Value {
            value: u32,
        }

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.toml");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "value = 1").unwrap();
        }
        assert_eq!(read_toml::<Value>(&file_path).unwrap(), Value { value: 1 });

        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "bad toml syntax").unwrap();
        }
        assert!(read_toml::<Value>(&file_path).is_err());
    }

    #[test]
    fn test_try_insert() {
        let mut map: IndexMap<CategoryID, u32> = IndexMap::new();
        try_insert(&mut map, "2012".into(), 1).unwrap();
        assert!(try_insert(&mut map, "2012".into(), 2).is_err());
    }
}
