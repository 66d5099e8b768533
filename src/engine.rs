//! The interface to Monte Carlo adequacy engines.
//!
//! This crate builds the reliability model only. Engines which sample outages and dispatch the
//! system implement [`AdequacyEngine`].
use crate::system::SystemModel;
use crate::units::Energy;
use anyhow::Result;

/// Options for Monte Carlo sampling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    /// Number of sample years to simulate
    pub samples: usize,
    /// Seed for the random number generator
    pub seed: u64,
}

/// Summary adequacy metrics for a system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShortfallReport {
    /// Loss of load expectation (event-hours per sample)
    pub lole: f64,
    /// Expected unserved energy per sample
    pub eue: Energy,
}

/// Something which can assess the resource adequacy of a [`SystemModel`]
pub trait AdequacyEngine {
    /// Sample the model and report its expected shortfalls
    fn assess(&self, model: &SystemModel, config: &SamplingConfig) -> Result<ShortfallReport>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::ReliabilityAsset;
    use crate::fixture::scenario;
    use crate::outage::TIMESTEP;
    use crate::scenario::Scenario;
    use crate::scenario::parameters::BuildOptions;
    use crate::system::build_system_model;
    use crate::units::Power;
    use rstest::rstest;

    /// Treats every asset as always available and counts hours where load exceeds capacity
    struct NoOutageEngine;

    impl AdequacyEngine for NoOutageEngine {
        fn assess(&self, model: &SystemModel, _config: &SamplingConfig) -> Result<ShortfallReport> {
            let mut lole = 0.0;
            let mut eue = Energy(0.0);
            for region in model.regions().iter() {
                for (timestep, load) in region.load.iter().enumerate() {
                    let capacity: Power = model
                        .generators()
                        .in_region(region.index)
                        .map(|generator| generator.capacity[timestep])
                        .sum();
                    if *load > capacity {
                        lole += 1.0;
                        eue = eue + (*load - capacity) * TIMESTEP;
                    }
                }
            }

            Ok(ShortfallReport { lole, eue })
        }
    }

    #[rstest]
    fn test_engine_seam(scenario: Scenario) {
        let model = build_system_model(&scenario, &BuildOptions::default()).unwrap();
        assert!(model.generators().iter().all(|g| g.region() == 0));

        let report = NoOutageEngine
            .assess(
                &model,
                &SamplingConfig {
                    samples: 1,
                    seed: 42,
                },
            )
            .unwrap();

        // p2 has load but no capacity
        assert_eq!(report.lole, 4.0);
        assert_eq!(report.eue, Energy(230.0));
    }
}
