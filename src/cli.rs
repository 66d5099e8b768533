//! The command line interface for building reliability models.
use crate::input::load_scenario;
use crate::log;
use crate::scenario::parameters::BuildOptions;
use crate::settings::Settings;
use crate::system::{SystemModel, build_system_model};
use crate::units::Power;
use ::log::info;
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for building reliability models.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options for the build command
#[derive(Args, Default)]
pub struct BuildOpts {
    /// Use this weather year instead of the one in `scenario.toml`
    #[arg(long)]
    pub weather_year: Option<u32>,
    /// Don't derate capacity by scheduled outage rates
    #[arg(long)]
    pub no_scheduled_outage_derate: bool,
    /// Don't limit dispatchable hydro by its inflows
    #[arg(long)]
    pub no_hydro_energy_limit: bool,
    /// Directory to write log files to
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl BuildOpts {
    /// Apply the command-line overrides to the scenario's build options
    fn apply_to(&self, mut options: BuildOptions) -> BuildOptions {
        if self.no_scheduled_outage_derate {
            options.apply_scheduled_outage_derate = false;
        }
        if self.no_hydro_energy_limit {
            options.apply_hydro_energy_limit = false;
        }

        options
    }
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Build a reliability model from a scenario.
    Build {
        /// Path to the scenario directory.
        scenario_dir: PathBuf,
        /// Other build options
        #[command(flatten)]
        opts: BuildOpts,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Build { scenario_dir, opts } => {
                handle_build_command(&scenario_dir, &opts, None).map(|_| ())
            }
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and run the requested command
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Handle the `build` command.
///
/// # Returns
///
/// The assembled model, after logging a summary of each region.
pub fn handle_build_command(
    scenario_dir: &Path,
    opts: &BuildOpts,
    settings: Option<Settings>,
) -> Result<SystemModel> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Initialise program logger, unless a previous command has already done so
    if !log::is_logger_initialised() {
        log::init(settings.log_level.as_deref(), opts.log_dir.as_deref())
            .context("Failed to initialise logging.")?;
    }

    let scenario =
        load_scenario(scenario_dir, opts.weather_year).context("Failed to load scenario.")?;
    let options = opts.apply_to(scenario.parameters.build_options());
    let model = build_system_model(&scenario, &options).context("Failed to build model.")?;

    log_summary(&model);
    info!("Model built successfully!");

    Ok(model)
}

/// Log the load and capacity in each region
fn log_summary(model: &SystemModel) {
    for region in model.regions().iter() {
        let peak_load = region
            .load
            .iter()
            .copied()
            .reduce(|a, b| if b > a { b } else { a })
            .unwrap_or_default();
        let generation: Power = model
            .generators()
            .in_region(region.index)
            .map(|generator| generator.info.nameplate)
            .sum();
        let storage: Power = model
            .storages()
            .in_region(region.index)
            .map(|storage| storage.info.nameplate)
            .sum();
        let hydro: Power = model
            .generator_storages()
            .in_region(region.index)
            .map(|hydro| hydro.info.nameplate)
            .sum();
        info!(
            "Region {}: peak load {peak_load} MW; generation {generation} MW, storage {storage} MW, \
            hydro {hydro} MW",
            region.name
        );
    }
}
