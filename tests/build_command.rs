//! Integration tests for the `build` command.
use adequacy::cli::{BuildOpts, handle_build_command};
use adequacy::log::is_logger_initialised;
use adequacy::settings::Settings;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the demo scenario.
fn get_scenario_dir() -> PathBuf {
    PathBuf::from("demos/two_region")
}

/// An integration test for the `build` command.
///
/// We also check that the logger is initialised and writes its log files.
#[test]
fn test_handle_build_command() {
    unsafe { std::env::set_var("ADEQUACY_LOG_LEVEL", "off") };

    assert!(!is_logger_initialised());

    let log_dir = tempdir().unwrap();
    let opts = BuildOpts {
        log_dir: Some(log_dir.path().to_path_buf()),
        ..Default::default()
    };
    let model =
        handle_build_command(&get_scenario_dir(), &opts, Some(Settings::default())).unwrap();

    assert!(is_logger_initialised());
    assert!(log_dir.path().join("adequacy_info.log").is_file());
    assert!(log_dir.path().join("adequacy_error.log").is_file());
    assert_eq!(model.regions().len(), 4);

    // Running again reuses the existing logger
    let opts = BuildOpts {
        weather_year: Some(2013),
        no_scheduled_outage_derate: true,
        ..Default::default()
    };
    let other =
        handle_build_command(&get_scenario_dir(), &opts, Some(Settings::default())).unwrap();
    assert_ne!(model, other);
}
