//! Fixtures for tests

use crate::asset::Legacy;
use crate::region::{RegionDefinition, RegionDefinitionMap, RegionID};
use crate::scenario::parameters::{MissingInflow, ScenarioParameters};
use crate::scenario::{InstalledCapacity, ProfileTable, Scenario};
use crate::technology::{Technology, TechnologyClass, TechnologyMap, TechnologyParameters};
use crate::units::{Dimensionless, Hours, Power};
use indexmap::{IndexMap, indexmap};
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Number of timesteps in the test scenario
pub const HORIZON: usize = 4;

#[fixture]
pub fn region_definitions() -> RegionDefinitionMap {
    ["p1", "p2"]
        .into_iter()
        .map(|id| {
            let id = RegionID::new(id);
            let definition = RegionDefinition {
                id: id.clone(),
                description: format!("Region {id}"),
            };
            (id, definition)
        })
        .collect()
}

#[fixture]
pub fn scenario_parameters() -> ScenarioParameters {
    ScenarioParameters {
        solve_year: 2030,
        weather_year: 2012,
        horizon: HORIZON,
        apply_scheduled_outage_derate: true,
        apply_hydro_energy_limit: true,
        missing_inflow: MissingInflow::Flat,
        default_mean_time_to_repair: Hours(24.0),
        capacity_check_exemptions: Vec::new(),
    }
}

fn technology(id: &str, class: TechnologyClass, parameters: TechnologyParameters) -> Technology {
    Technology {
        id: id.into(),
        class,
        parameters,
    }
}

#[fixture]
pub fn technologies() -> TechnologyMap {
    [
        technology(
            "gas-ct",
            TechnologyClass::Thermal,
            TechnologyParameters {
                forced_outage_rate: Dimensionless(0.05),
                mean_time_to_repair: Some(Hours(20.0)),
                scheduled_outage_rate: Dimensionless(0.1),
                ..Default::default()
            },
        ),
        technology(
            "upv",
            TechnologyClass::Variable,
            TechnologyParameters::default(),
        ),
        technology(
            "battery_4",
            TechnologyClass::Storage,
            TechnologyParameters {
                forced_outage_rate: Dimensionless(0.02),
                storage_duration: Some(Hours(4.0)),
                charge_efficiency: Dimensionless(0.9),
                discharge_efficiency: Dimensionless(0.95),
                ..Default::default()
            },
        ),
        technology(
            "hydED",
            TechnologyClass::HydroDispatchable,
            TechnologyParameters {
                forced_outage_rate: Dimensionless(0.03),
                scheduled_outage_rate: Dimensionless(0.05),
                storage_duration: Some(Hours(8.0)),
                ..Default::default()
            },
        ),
    ]
    .into_iter()
    .map(|tech| (tech.id.clone(), tech))
    .collect()
}

/// A two-region scenario with a single gas turbine block in `p1`
#[fixture]
pub fn scenario(
    scenario_parameters: ScenarioParameters,
    region_definitions: RegionDefinitionMap,
    technologies: TechnologyMap,
) -> Scenario {
    let load: IndexMap<RegionID, Vec<Power>> = indexmap! {
        "p1".into() => [100.0, 110.0, 120.0, 130.0].map(Power).to_vec(),
        "p2".into() => [50.0, 55.0, 60.0, 65.0].map(Power).to_vec(),
    };

    let mut resource_profiles = ProfileTable::new(HORIZON);
    resource_profiles
        .insert("upv|p2", vec![0.0, 0.5, 1.0, 0.25])
        .unwrap();
    let mut hydro_inflow_profiles = ProfileTable::new(HORIZON);
    hydro_inflow_profiles
        .insert("hydED|p2", vec![0.5, 2.0, -0.1, 0.0])
        .unwrap();

    Scenario {
        parameters: scenario_parameters,
        regions: region_definitions,
        load,
        capacity: vec![InstalledCapacity {
            region: "p1".into(),
            category: "gas-ct".into(),
            legacy: Legacy::Existing,
            capacity: Power(500.0),
        }],
        technologies,
        lines: Vec::new(),
        converters: Vec::new(),
        resource_profiles,
        forced_outage_profiles: ProfileTable::new(HORIZON),
        hydro_inflow_profiles,
    }
}
