//! Defines the `ScenarioParameters` struct, which represents the contents of `scenario.toml`.
use crate::input::{input_err_msg, read_toml};
use crate::units::Hours;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::path::Path;

const SCENARIO_PARAMETERS_FILE_NAME: &str = "scenario.toml";

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_apply_scheduled_outage_derate, bool, true);
define_param_default!(default_apply_hydro_energy_limit, bool, true);
define_param_default!(default_mean_time_to_repair, Hours, Hours(24.0));

/// Represents the contents of the entire scenario file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScenarioParameters {
    /// The year of the capacity-expansion solution to translate
    pub solve_year: u32,
    /// The weather year whose hourly profiles are used
    pub weather_year: u32,
    /// Number of hourly timesteps in the reliability model
    pub horizon: usize,
    /// Whether to derate capacity by scheduled outage rates
    #[serde(default = "default_apply_scheduled_outage_derate")]
    pub apply_scheduled_outage_derate: bool,
    /// Whether to limit dispatchable hydro by its inflows
    #[serde(default = "default_apply_hydro_energy_limit")]
    pub apply_hydro_energy_limit: bool,
    /// What to do with dispatchable hydro which has no inflow data
    #[serde(default)]
    pub missing_inflow: MissingInflow,
    /// Repair time used for categories without their own
    #[serde(default = "default_mean_time_to_repair")]
    pub default_mean_time_to_repair: Hours,
    /// Categories whose capacity is left out of the reliability model on purpose (e.g.
    /// distributed PV, which is netted out of load)
    #[serde(default)]
    pub capacity_check_exemptions: Vec<String>,
}

/// How to fill inflows for dispatchable hydro without inflow data
#[derive(DeserializeLabeledStringEnum, Debug, Clone, Copy, PartialEq, Default, strum::Display)]
pub enum MissingInflow {
    /// No inflow, so the plant can only discharge what it starts with
    #[string = "zero"]
    #[strum(serialize = "zero")]
    Zero,
    /// Inflow equal to installed power capacity in every timestep
    #[default]
    #[string = "flat"]
    #[strum(serialize = "flat")]
    Flat,
}

/// Switches for the optional derates applied when building assets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    /// Derate capacity by scheduled outage rates
    pub apply_scheduled_outage_derate: bool,
    /// Limit dispatchable hydro by its inflows
    pub apply_hydro_energy_limit: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            apply_scheduled_outage_derate: true,
            apply_hydro_energy_limit: true,
        }
    }
}

/// Check that the `horizon` parameter is valid
fn check_horizon(horizon: usize) -> Result<()> {
    ensure!(horizon > 0, "horizon must be at least one timestep");

    Ok(())
}

/// Check that the `default_mean_time_to_repair` parameter is valid
fn check_default_mean_time_to_repair(value: Hours) -> Result<()> {
    ensure!(
        value.is_finite() && value > Hours(0.0),
        "default_mean_time_to_repair must be a finite number greater than zero"
    );

    Ok(())
}

impl ScenarioParameters {
    /// Read a scenario file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `scenario_dir` - Folder containing scenario input files
    ///
    /// # Returns
    ///
    /// The file contents as a [`ScenarioParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(scenario_dir: P) -> Result<ScenarioParameters> {
        let file_path = scenario_dir.as_ref().join(SCENARIO_PARAMETERS_FILE_NAME);
        let parameters: ScenarioParameters = read_toml(&file_path)?;

        parameters
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(parameters)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        check_horizon(self.horizon)?;
        check_default_mean_time_to_repair(self.default_mean_time_to_repair)?;

        Ok(())
    }

    /// The derate switches given in the file
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            apply_scheduled_outage_derate: self.apply_scheduled_outage_derate,
            apply_hydro_energy_limit: self.apply_hydro_energy_limit,
        }
    }

    /// Whether a category is exempt from the capacity totals check
    pub fn is_exempt_from_capacity_check(&self, category: &str) -> bool {
        self.capacity_check_exemptions
            .iter()
            .any(|exempt| exempt == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_scenario_file(dir: &Path, contents: &str) {
        let mut file = File::create(dir.join(SCENARIO_PARAMETERS_FILE_NAME)).unwrap();
        writeln!(file, "{contents}").unwrap();
    }

    #[test]
    fn test_scenario_params_from_path() {
        let dir = tempdir().unwrap();
        write_scenario_file(
            dir.path(),
            "solve_year = 2030\nweather_year = 2012\nhorizon = 8760",
        );

        let parameters = ScenarioParameters::from_path(dir.path()).unwrap();
        assert_eq!(parameters.solve_year, 2030);
        assert_eq!(parameters.weather_year, 2012);
        assert_eq!(parameters.horizon, 8760);
        assert!(parameters.apply_scheduled_outage_derate);
        assert!(parameters.apply_hydro_energy_limit);
        assert_eq!(parameters.missing_inflow, MissingInflow::Flat);
        assert_eq!(parameters.default_mean_time_to_repair, Hours(24.0));
        assert!(parameters.capacity_check_exemptions.is_empty());
        assert_eq!(parameters.build_options(), BuildOptions::default());
    }

    #[test]
    fn test_scenario_params_from_path_overrides() {
        let dir = tempdir().unwrap();
        write_scenario_file(
            dir.path(),
            r#"solve_year = 2030
weather_year = 2012
horizon = 24
apply_hydro_energy_limit = false
missing_inflow = "zero"
capacity_check_exemptions = ["distpv"]"#,
        );

        let parameters = ScenarioParameters::from_path(dir.path()).unwrap();
        assert_eq!(parameters.missing_inflow, MissingInflow::Zero);
        assert!(!parameters.build_options().apply_hydro_energy_limit);
        assert!(parameters.is_exempt_from_capacity_check("distpv"));
        assert!(!parameters.is_exempt_from_capacity_check("upv"));
    }

    #[test]
    fn test_scenario_params_missing_field() {
        let dir = tempdir().unwrap();
        write_scenario_file(dir.path(), "solve_year = 2030\nhorizon = 24");
        assert!(ScenarioParameters::from_path(dir.path()).is_err());
    }

    #[test]
    fn test_check_horizon() {
        assert!(check_horizon(1).is_ok());
        assert!(check_horizon(0).is_err());
    }

    #[rstest]
    #[case(24.0, true)]
    #[case(1e-3, true)]
    #[case(0.0, false)]
    #[case(-1.0, false)]
    #[case(f64::INFINITY, false)]
    #[case(f64::NAN, false)]
    fn test_check_default_mean_time_to_repair(#[case] value: f64, #[case] expected_valid: bool) {
        assert_eq!(
            check_default_mean_time_to_repair(Hours(value)).is_ok(),
            expected_valid
        );
    }
}
