//! Code for reading transmission lines and converters from CSV files.
use super::*;
use crate::error::BuildError;
use crate::id::IDCollection;
use crate::region::RegionDefinitionMap;
use crate::transmission::{Converter, TransferType, TransmissionLine};
use crate::units::Power;
use serde::Deserialize;
use std::path::Path;

const TRANSMISSION_FILE_NAME: &str = "transmission.csv";
const CONVERTERS_FILE_NAME: &str = "converters.csv";

#[derive(Deserialize)]
struct TransmissionLineRaw {
    from_region: String,
    to_region: String,
    transfer_type: TransferType,
    year: u32,
    capacity: Power,
}

#[derive(Deserialize)]
struct ConverterRaw {
    region: String,
    year: u32,
    capacity: Power,
}

/// Read the transmission lines in service in the solve year.
///
/// Capacities are not validated here; that happens when interfaces are built.
///
/// # Arguments
///
/// * `scenario_dir` - Folder containing scenario input files
/// * `regions` - The scenario's AC regions
/// * `solve_year` - Only rows for this year are kept
pub fn read_transmission_lines(
    scenario_dir: &Path,
    regions: &RegionDefinitionMap,
    solve_year: u32,
) -> Result<Vec<TransmissionLine>> {
    let file_path = scenario_dir.join(TRANSMISSION_FILE_NAME);
    let lines_csv = read_csv_optional(&file_path)?;
    read_transmission_lines_from_iter(lines_csv, regions, solve_year)
        .with_context(|| input_err_msg(&file_path))
}

fn read_transmission_lines_from_iter<I>(
    iter: I,
    regions: &RegionDefinitionMap,
    solve_year: u32,
) -> Result<Vec<TransmissionLine>>
where
    I: Iterator<Item = TransmissionLineRaw>,
{
    iter.filter(|line| line.year == solve_year)
        .map(|line| -> Result<_> {
            let from_region = regions.get_id(&line.from_region)?;
            let to_region = regions.get_id(&line.to_region)?;
            if from_region == to_region {
                Err(BuildError::configuration(
                    &from_region,
                    "transmission line starts and ends in the same region",
                ))?;
            }

            Ok(TransmissionLine {
                from_region,
                to_region,
                transfer_type: line.transfer_type,
                capacity: line.capacity,
            })
        })
        .try_collect()
}

/// Read the AC/DC converters in service in the solve year.
///
/// # Arguments
///
/// * `scenario_dir` - Folder containing scenario input files
/// * `regions` - The scenario's AC regions
/// * `solve_year` - Only rows for this year are kept
pub fn read_converters(
    scenario_dir: &Path,
    regions: &RegionDefinitionMap,
    solve_year: u32,
) -> Result<Vec<Converter>> {
    let file_path = scenario_dir.join(CONVERTERS_FILE_NAME);
    let converters_csv = read_csv_optional(&file_path)?;
    read_converters_from_iter(converters_csv, regions, solve_year)
        .with_context(|| input_err_msg(&file_path))
}

fn read_converters_from_iter<I>(
    iter: I,
    regions: &RegionDefinitionMap,
    solve_year: u32,
) -> Result<Vec<Converter>>
where
    I: Iterator<Item = ConverterRaw>,
{
    iter.filter(|converter| converter.year == solve_year)
        .map(|converter| -> Result<_> {
            Ok(Converter {
                region: regions.get_id(&converter.region)?,
                capacity: converter.capacity,
            })
        })
        .try_collect()
}
