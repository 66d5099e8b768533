//! Transfer limits between pairs of regions.
//!
//! There are three kinds of interface:
//!
//! * AC lines between two AC regions
//! * converters between an AC region and its DC pseudo-region
//! * VSC lines between two DC pseudo-regions
use crate::error::BuildError;
use crate::region::{Regions, dc_region_name};
use crate::scenario::Scenario;
use crate::transmission::TransferType;
use crate::units::Power;
use anyhow::Result;
use log::debug;
use std::collections::BTreeMap;

/// Transfer limits between two regions
#[derive(Debug, Clone, PartialEq)]
pub struct Interface {
    /// Index of the first region. Always less than `to`.
    pub from: usize,
    /// Index of the second region
    pub to: usize,
    /// Limit on transfers from `from` to `to` in each timestep (MW)
    pub forward: Vec<Power>,
    /// Limit on transfers from `to` to `from` in each timestep (MW)
    pub backward: Vec<Power>,
}

/// Build the interfaces between the model's regions.
///
/// Line capacities are summed per direction for each unordered pair of regions. Each converter
/// adds its capacity in both directions between its region and the paired DC pseudo-region. Pairs
/// with no capability in either direction are left out.
///
/// # Arguments
///
/// * `regions` - The model's regions, including DC pseudo-regions
/// * `scenario` - The scenario data
/// * `horizon` - Number of timesteps in the model
///
/// # Returns
///
/// Interfaces ordered by `(from, to)`. Fails with [`BuildError::InvalidCapacity`] for a negative or
/// non-finite line or converter capacity.
pub fn build_interfaces(
    regions: &Regions,
    scenario: &Scenario,
    horizon: usize,
) -> Result<Vec<Interface>> {
    let mut limits: BTreeMap<(usize, usize), (Power, Power)> = BTreeMap::new();
    let mut add_limit = |from: usize, to: usize, forward: Power, backward: Power| {
        let (key, forward, backward) = if from < to {
            ((from, to), forward, backward)
        } else {
            ((to, from), backward, forward)
        };
        let entry = limits.entry(key).or_insert((Power(0.0), Power(0.0)));
        entry.0 = entry.0 + forward;
        entry.1 = entry.1 + backward;
    };

    for line in &scenario.lines {
        let subject = format!(
            "{} line {} -> {}",
            line.transfer_type, line.from_region, line.to_region
        );
        if !line.capacity.is_valid_magnitude() {
            Err(BuildError::invalid_capacity(&subject, line.capacity.value()))?;
        }

        let (from, to) = match line.transfer_type {
            TransferType::Ac => (
                regions.try_index_of(&line.from_region.0)?,
                regions.try_index_of(&line.to_region.0)?,
            ),
            TransferType::Vsc => (
                regions.try_index_of(&dc_region_name(&line.from_region.0).0)?,
                regions.try_index_of(&dc_region_name(&line.to_region.0).0)?,
            ),
        };
        if from == to {
            Err(BuildError::Integrity(format!("{subject} connects a region to itself")))?;
        }
        add_limit(from, to, line.capacity, Power(0.0));
    }

    for converter in &scenario.converters {
        if !converter.capacity.is_valid_magnitude() {
            Err(BuildError::invalid_capacity(
                format!("converter in {}", converter.region),
                converter.capacity.value(),
            ))?;
        }

        let ac = regions.try_index_of(&converter.region.0)?;
        let dc = regions.try_index_of(&dc_region_name(&converter.region.0).0)?;
        add_limit(ac, dc, converter.capacity, converter.capacity);
    }

    let interfaces: Vec<_> = limits
        .into_iter()
        .filter(|(_, (forward, backward))| *forward + *backward > Power(0.0))
        .map(|((from, to), (forward, backward))| Interface {
            from,
            to,
            forward: vec![forward; horizon],
            backward: vec![backward; horizon],
        })
        .collect();

    debug!("Built {} interfaces", interfaces.len());
    Ok(interfaces)
}
