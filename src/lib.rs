//! Translate a solved capacity-expansion scenario into a probabilistic resource adequacy model.
//!
//! A scenario directory is loaded with [`input::load_scenario`] and turned into a
//! [`system::SystemModel`] with [`system::build_system_model`]. The model can then be handed to
//! anything implementing [`engine::AdequacyEngine`].
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod assembly;
pub mod asset;
pub mod cli;
pub mod engine;
pub mod error;
pub mod id;
pub mod input;
pub mod interface;
pub mod log;
pub mod outage;
pub mod region;
pub mod scenario;
pub mod settings;
pub mod system;
pub mod technology;
pub mod transmission;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the config dir for the program, falling back to the working directory if the platform has
/// none
pub fn get_config_dir() -> PathBuf {
    let mut dir = dirs::config_dir().unwrap_or_default();
    dir.push("adequacy");
    dir
}
