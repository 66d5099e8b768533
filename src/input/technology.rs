//! Code for reading the technology classification and parameter tables.
use super::*;
use crate::error::BuildError;
use crate::id::IDCollection;
use crate::technology::{
    CategoryID, ClassificationFlags, Technology, TechnologyMap, TechnologyParameters,
};
use crate::units::{Dimensionless, Hours, Power};
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const TECHNOLOGIES_FILE_NAME: &str = "technologies.csv";
const TECHNOLOGY_PARAMETERS_FILE_NAME: &str = "technology_parameters.csv";

#[derive(Deserialize)]
struct TechnologyRaw {
    category: CategoryID,
    #[serde(deserialize_with = "deserialise_flag")]
    variable_generation: bool,
    #[serde(deserialize_with = "deserialise_flag")]
    storage: bool,
    #[serde(deserialize_with = "deserialise_flag")]
    hydro_dispatchable: bool,
    #[serde(deserialize_with = "deserialise_flag")]
    hydro_non_dispatchable: bool,
}

#[derive(Deserialize, Default)]
struct TechnologyParametersRaw {
    category: String,
    forced_outage_rate: Option<f64>,
    mean_time_to_repair: Option<f64>,
    scheduled_outage_rate: Option<f64>,
    unit_size: Option<f64>,
    storage_duration: Option<f64>,
    charge_efficiency: Option<f64>,
    discharge_efficiency: Option<f64>,
    carryover_efficiency: Option<f64>,
}

impl TechnologyParametersRaw {
    /// Check values which don't feed the outage model and fill in defaults.
    ///
    /// Forced outage rates and repair times are checked when outage processes are derived.
    fn into_parameters(self) -> Result<TechnologyParameters, BuildError> {
        let category = &self.category;
        let defaults = TechnologyParameters::default();

        let check_fraction = |name: &str, value: f64, allow_zero: bool| {
            let lower_ok = value > 0.0 || (allow_zero && value >= 0.0);
            let valid = value.is_finite() && value <= 1.0 && lower_ok;
            if valid {
                Ok(Dimensionless(value))
            } else {
                Err(BuildError::configuration(
                    category,
                    format!("{name} must be between 0 and 1 (got {value})"),
                ))
            }
        };

        let scheduled_outage_rate = self
            .scheduled_outage_rate
            .map(|value| check_fraction("scheduled_outage_rate", value, true))
            .transpose()?
            .unwrap_or(defaults.scheduled_outage_rate);
        let charge_efficiency = self
            .charge_efficiency
            .map(|value| check_fraction("charge_efficiency", value, false))
            .transpose()?
            .unwrap_or(defaults.charge_efficiency);
        let discharge_efficiency = self
            .discharge_efficiency
            .map(|value| check_fraction("discharge_efficiency", value, false))
            .transpose()?
            .unwrap_or(defaults.discharge_efficiency);
        let carryover_efficiency = self
            .carryover_efficiency
            .map(|value| check_fraction("carryover_efficiency", value, false))
            .transpose()?
            .unwrap_or(defaults.carryover_efficiency);

        if let Some(unit_size) = self.unit_size {
            if !(unit_size.is_finite() && unit_size > 0.0) {
                return Err(BuildError::configuration(
                    category,
                    format!("unit_size must be a positive number (got {unit_size})"),
                ));
            }
        }
        if let Some(duration) = self.storage_duration {
            if !(duration.is_finite() && duration >= 0.0) {
                return Err(BuildError::configuration(
                    category,
                    format!("storage_duration must be a non-negative number (got {duration})"),
                ));
            }
        }

        Ok(TechnologyParameters {
            forced_outage_rate: self
                .forced_outage_rate
                .map_or(defaults.forced_outage_rate, Dimensionless),
            mean_time_to_repair: self.mean_time_to_repair.map(Hours),
            scheduled_outage_rate,
            unit_size: self.unit_size.map(Power),
            storage_duration: self.storage_duration.map(Hours),
            charge_efficiency,
            discharge_efficiency,
            carryover_efficiency,
        })
    }
}

/// Read the technology classification and parameter tables.
///
/// # Arguments
///
/// * `scenario_dir` - Folder containing scenario input files
///
/// # Returns
///
/// A map of classified [`Technology`]s keyed by category, in classification-table order.
pub fn read_technologies(scenario_dir: &Path) -> Result<TechnologyMap> {
    let classification_path = scenario_dir.join(TECHNOLOGIES_FILE_NAME);
    let classification_csv = read_csv(&classification_path)?;
    let flags = read_classification_from_iter(classification_csv)
        .with_context(|| input_err_msg(&classification_path))?;

    let parameters_path = scenario_dir.join(TECHNOLOGY_PARAMETERS_FILE_NAME);
    let parameters_csv = read_csv_optional(&parameters_path)?;
    let mut parameters = read_parameters_from_iter(parameters_csv, &flags)
        .with_context(|| input_err_msg(&parameters_path))?;

    flags
        .into_iter()
        .map(|(id, flags)| -> Result<_> {
            let class = flags.classify(&id)?;
            let parameters = parameters.remove(&id).unwrap_or_else(|| {
                debug!("No reliability parameters for category {id}; using defaults");
                TechnologyParameters::default()
            });
            Ok((
                id.clone(),
                Technology {
                    id,
                    class,
                    parameters,
                },
            ))
        })
        .process_results(|iter| iter.collect())
        .with_context(|| input_err_msg(&classification_path))
}

fn read_classification_from_iter<I>(iter: I) -> Result<IndexMap<CategoryID, ClassificationFlags>>
where
    I: Iterator<Item = TechnologyRaw>,
{
    let mut map = IndexMap::new();
    for row in iter {
        let flags = ClassificationFlags {
            variable_generation: row.variable_generation,
            storage: row.storage,
            hydro_dispatchable: row.hydro_dispatchable,
            hydro_non_dispatchable: row.hydro_non_dispatchable,
        };
        try_insert(&mut map, row.category, flags)?;
    }

    Ok(map)
}

fn read_parameters_from_iter<I>(
    iter: I,
    classified: &IndexMap<CategoryID, ClassificationFlags>,
) -> Result<HashMap<CategoryID, TechnologyParameters>>
where
    I: Iterator<Item = TechnologyParametersRaw>,
{
    let mut map = HashMap::new();
    for row in iter {
        let id = classified.get_id(&row.category).with_context(|| {
            format!(
                "Parameters given for category {} which is not in the classification table",
                row.category
            )
        })?;
        let parameters = row.into_parameters()?;
        ensure!(
            map.insert(id.clone(), parameters).is_none(),
            "Duplicate parameters for category {id}"
        );
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technology::TechnologyClass;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = File::create(dir.join(name)).unwrap();
        writeln!(file, "{contents}").unwrap();
    }

    #[test]
    fn test_read_technologies() {
        let dir = tempdir().unwrap();
        write_file(
            dir.path(),
            TECHNOLOGIES_FILE_NAME,
            "category,variable_generation,storage,hydro_dispatchable,hydro_non_dispatchable
gas-ct,0,0,0,0
wind-ons,1,0,0,0
battery_4,0,1,0,0
hydED,0,0,1,0",
        );
        write_file(
            dir.path(),
            TECHNOLOGY_PARAMETERS_FILE_NAME,
            "category,forced_outage_rate,mean_time_to_repair,scheduled_outage_rate,unit_size,storage_duration,charge_efficiency,discharge_efficiency,carryover_efficiency
gas-ct,0.05,20,0.1,,,,,
battery_4,0.02,,,,4,0.9,0.95,",
        );

        let technologies = read_technologies(dir.path()).unwrap();
        assert_eq!(
            technologies
                .values()
                .map(|tech| tech.class)
                .collect::<Vec<_>>(),
            [
                TechnologyClass::Thermal,
                TechnologyClass::Variable,
                TechnologyClass::Storage,
                TechnologyClass::HydroDispatchable
            ]
        );

        let gas = &technologies["gas-ct"].parameters;
        assert_eq!(gas.forced_outage_rate, Dimensionless(0.05));
        assert_eq!(gas.mean_time_to_repair, Some(Hours(20.0)));
        assert_eq!(gas.scheduled_outage_rate, Dimensionless(0.1));

        let battery = &technologies["battery_4"].parameters;
        assert_eq!(battery.mean_time_to_repair, None);
        assert_eq!(battery.storage_duration, Some(Hours(4.0)));
        assert_eq!(battery.charge_efficiency, Dimensionless(0.9));
        assert_eq!(battery.carryover_efficiency, Dimensionless(1.0));

        // No parameters given
        assert_eq!(
            technologies["wind-ons"].parameters,
            TechnologyParameters::default()
        );
        assert!(technologies.get_id("hydED").is_ok());
    }

    #[test]
    fn test_read_technologies_unknown_category_in_parameters() {
        let dir = tempdir().unwrap();
        write_file(
            dir.path(),
            TECHNOLOGIES_FILE_NAME,
            "category,variable_generation,storage,hydro_dispatchable,hydro_non_dispatchable
gas-ct,0,0,0,0",
        );
        write_file(
            dir.path(),
            TECHNOLOGY_PARAMETERS_FILE_NAME,
            "category,forced_outage_rate
coal,0.05",
        );
        assert!(read_technologies(dir.path()).is_err());
    }

    #[test]
    fn test_read_technologies_conflicting_flags() {
        let dir = tempdir().unwrap();
        write_file(
            dir.path(),
            TECHNOLOGIES_FILE_NAME,
            "category,variable_generation,storage,hydro_dispatchable,hydro_non_dispatchable
pvb,1,1,0,0",
        );
        let err = read_technologies(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::Configuration { .. })
        ));
    }

    #[rstest]
    #[case::scheduled_outage_too_large(TechnologyParametersRaw {
        scheduled_outage_rate: Some(1.5),
        ..Default::default()
    })]
    #[case::zero_efficiency(TechnologyParametersRaw {
        charge_efficiency: Some(0.0),
        ..Default::default()
    })]
    #[case::nan_carryover(TechnologyParametersRaw {
        carryover_efficiency: Some(f64::NAN),
        ..Default::default()
    })]
    #[case::negative_unit_size(TechnologyParametersRaw {
        unit_size: Some(-10.0),
        ..Default::default()
    })]
    #[case::negative_duration(TechnologyParametersRaw {
        storage_duration: Some(-1.0),
        ..Default::default()
    })]
    fn test_into_parameters_invalid(#[case] raw: TechnologyParametersRaw) {
        assert!(matches!(
            raw.into_parameters(),
            Err(BuildError::Configuration { .. })
        ));
    }
}
