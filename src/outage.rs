//! Two-state Markov outage processes for reliability assets.
//!
//! Each asset is either available or on forced outage. The transition rates are derived from a
//! forced outage rate (the long-run fraction of time unavailable) and a mean time to repair:
//!
//! * repair rate μ = 1 / MTTR
//! * failure rate λ = FOR · μ / (1 − FOR)
//!
//! so that the steady-state unavailability λ / (λ + μ) equals the forced outage rate.
use crate::error::{BuildError, check_series_len};
use crate::units::{Dimensionless, Hours, PerHour};

/// The length of one timestep of the reliability model
pub const TIMESTEP: Hours = Hours(1.0);

/// A transition rate which is either constant or varies by timestep
#[derive(Debug, Clone, PartialEq)]
pub enum RateSeries {
    /// The same rate in every timestep
    Flat(PerHour),
    /// One rate per timestep
    Hourly(Vec<PerHour>),
}

impl RateSeries {
    /// The rate in the given timestep
    pub fn at(&self, timestep: usize) -> PerHour {
        match self {
            Self::Flat(rate) => *rate,
            Self::Hourly(rates) => rates[timestep],
        }
    }

    /// The number of timesteps covered, if the series varies by timestep
    pub fn series_len(&self) -> Option<usize> {
        match self {
            Self::Flat(_) => None,
            Self::Hourly(rates) => Some(rates.len()),
        }
    }
}

/// Failure and repair rates of a two-state outage process
#[derive(Debug, Clone, PartialEq)]
pub struct OutageProcess {
    /// Rate of transition from available to unavailable (λ)
    pub failure_rate: RateSeries,
    /// Rate of transition from unavailable to available (μ)
    pub repair_rate: RateSeries,
}

impl OutageProcess {
    /// A process for an asset which never fails
    pub fn never_fails(mean_time_to_repair: Hours) -> Self {
        Self {
            failure_rate: RateSeries::Flat(PerHour(0.0)),
            repair_rate: RateSeries::Flat(mean_time_to_repair.reciprocal()),
        }
    }
}

/// The forced outage rate for an asset
#[derive(Debug, Clone, PartialEq)]
pub enum ForcedOutageRate {
    /// A single rate for all timesteps
    Static(Dimensionless),
    /// A rate for each timestep
    Hourly(Vec<Dimensionless>),
}

/// The reliability parameters an outage process is derived from
#[derive(Debug, Clone, PartialEq)]
pub struct OutageParameters {
    /// Fraction of time unavailable due to forced outages
    pub forced_outage_rate: ForcedOutageRate,
    /// Mean time to repair
    pub mean_time_to_repair: Hours,
}

/// Derive the outage process for an asset.
///
/// # Arguments
///
/// * `subject` - Name of the asset, used in error messages
/// * `parameters` - Forced outage rate and mean time to repair
/// * `horizon` - Number of timesteps in the model
///
/// # Returns
///
/// The [`OutageProcess`], which is flat unless an hourly forced outage rate was given. Fails with
/// [`BuildError::Configuration`] if the repair time is not positive, a forced outage rate is
/// outside [0, 1) or the resulting failure probability per timestep exceeds one, and with
/// [`BuildError::ShapeMismatch`] if an hourly series has the wrong length.
pub fn to_outage_process(
    subject: &str,
    parameters: &OutageParameters,
    horizon: usize,
) -> Result<OutageProcess, BuildError> {
    let mttr = parameters.mean_time_to_repair;
    if !(mttr.is_finite() && mttr > Hours(0.0)) {
        return Err(BuildError::configuration(
            subject,
            format!("mean time to repair must be a positive number of hours (got {mttr})"),
        ));
    }
    let repair_rate = mttr.reciprocal();

    let failure_rate = match &parameters.forced_outage_rate {
        ForcedOutageRate::Static(rate) => {
            RateSeries::Flat(failure_rate(subject, *rate, repair_rate)?)
        }
        ForcedOutageRate::Hourly(rates) => {
            check_series_len(&format!("Forced outage rates for {subject}"), rates, horizon)?;
            let rates = rates
                .iter()
                .map(|rate| failure_rate(subject, *rate, repair_rate))
                .collect::<Result<Vec<_>, _>>()?;
            RateSeries::Hourly(rates)
        }
    };

    Ok(OutageProcess {
        failure_rate,
        repair_rate: RateSeries::Flat(repair_rate),
    })
}

/// Failure rate giving the forced outage rate at steady state for the given repair rate
fn failure_rate(
    subject: &str,
    forced_outage_rate: Dimensionless,
    repair_rate: PerHour,
) -> Result<PerHour, BuildError> {
    let f = forced_outage_rate.value();
    if !(f.is_finite() && (0.0..1.0).contains(&f)) {
        return Err(BuildError::configuration(
            subject,
            format!("forced outage rate must be at least 0 and less than 1 (got {f})"),
        ));
    }

    let rate = PerHour(f * repair_rate.value() / (1.0 - f));
    let probability = rate * TIMESTEP;
    if probability.value() > 1.0 {
        return Err(BuildError::configuration(
            subject,
            format!(
                "forced outage rate {f} gives a failure probability of {} per timestep",
                probability.value()
            ),
        ));
    }

    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn static_parameters(forced_outage_rate: f64, mttr: f64) -> OutageParameters {
        OutageParameters {
            forced_outage_rate: ForcedOutageRate::Static(Dimensionless(forced_outage_rate)),
            mean_time_to_repair: Hours(mttr),
        }
    }

    #[test]
    fn test_to_outage_process_static() {
        let process = to_outage_process("gas-ct|p1|existing", &static_parameters(0.05, 20.0), 24)
            .unwrap();
        assert_eq!(process.repair_rate, RateSeries::Flat(PerHour(0.05)));
        let RateSeries::Flat(failure_rate) = process.failure_rate else {
            panic!("Expected flat failure rate");
        };
        assert_approx_eq!(f64, failure_rate.value(), 0.05 * 0.05 / 0.95);
        assert_approx_eq!(f64, failure_rate.value(), 0.002_63, epsilon = 1e-5);
    }

    #[test]
    fn test_to_outage_process_exact_repair_rate() {
        let process =
            to_outage_process("battery_4|p1|new", &static_parameters(0.02, 24.0), 24).unwrap();
        assert_eq!(process.repair_rate, RateSeries::Flat(PerHour(1.0 / 24.0)));
    }

    #[test]
    fn test_to_outage_process_zero_for() {
        let process = to_outage_process("upv|p1|new", &static_parameters(0.0, 24.0), 24).unwrap();
        assert_eq!(process, OutageProcess::never_fails(Hours(24.0)));
    }

    #[test]
    fn test_to_outage_process_hourly() {
        let parameters = OutageParameters {
            forced_outage_rate: ForcedOutageRate::Hourly(vec![
                Dimensionless(0.0),
                Dimensionless(0.5),
                Dimensionless(0.2),
            ]),
            mean_time_to_repair: Hours(10.0),
        };
        let process = to_outage_process("coal|p1|existing", &parameters, 3).unwrap();

        assert_eq!(process.repair_rate, RateSeries::Flat(PerHour(0.1)));
        assert_eq!(process.failure_rate.series_len(), Some(3));
        assert_eq!(process.failure_rate.at(0), PerHour(0.0));
        assert_approx_eq!(f64, process.failure_rate.at(1).value(), 0.1);
        assert_approx_eq!(f64, process.failure_rate.at(2).value(), 0.025);
    }

    #[test]
    fn test_to_outage_process_hourly_wrong_length() {
        let parameters = OutageParameters {
            forced_outage_rate: ForcedOutageRate::Hourly(vec![Dimensionless(0.1); 2]),
            mean_time_to_repair: Hours(10.0),
        };
        assert!(matches!(
            to_outage_process("coal|p1|existing", &parameters, 3),
            Err(BuildError::ShapeMismatch {
                expected: 3,
                found: 2,
                ..
            })
        ));
    }

    #[rstest]
    #[case::zero_mttr(0.05, 0.0)]
    #[case::negative_mttr(0.05, -5.0)]
    #[case::nan_mttr(0.05, f64::NAN)]
    #[case::for_one(1.0, 24.0)]
    #[case::negative_for(-0.1, 24.0)]
    #[case::nan_for(f64::NAN, 24.0)]
    #[case::failure_probability_above_one(0.9, 0.5)]
    fn test_to_outage_process_invalid(#[case] forced_outage_rate: f64, #[case] mttr: f64) {
        assert!(matches!(
            to_outage_process("gas-ct|p1|new", &static_parameters(forced_outage_rate, mttr), 24),
            Err(BuildError::Configuration { .. })
        ));
    }
}
