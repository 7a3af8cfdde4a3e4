//! Model parameters.
//!
//! Every field has a default that reproduces the reference disease model, so a
//! configuration file only needs to name what it changes. Durations are in
//! days (see [`crate::time`]); transmissivities are exposure attempts per day
//! per infectious occupant.

use std::fs;
use std::path::Path;

use log::debug;
use rand_distr::LogNormal;
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::EpisimError;
use crate::time::{DAY, MINUTE, WEEK};

/// A log-normal distribution described the way people describe human
/// timescales: a typical value (`median`) and a spread (`scatter`).
///
/// A draw is `median * exp(sigma * z)` where `z` is standard normal and
/// `sigma = ln((median + scatter) / median)`. A scatter of zero always
/// yields the median.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogNormalParams {
    pub median: f64,
    pub scatter: f64,
}

impl LogNormalParams {
    #[must_use]
    pub const fn new(median: f64, scatter: f64) -> Self {
        LogNormalParams { median, scatter }
    }

    /// Builds the distribution, rejecting parameters that do not describe one.
    pub fn distribution(&self) -> Result<LogNormal<f64>, EpisimError> {
        if !(self.median.is_finite() && self.median > 0.0) {
            return Err(EpisimError::ParameterError(format!(
                "log-normal median must be positive and finite, got {}",
                self.median
            )));
        }
        if !(self.scatter.is_finite() && self.scatter >= 0.0) {
            return Err(EpisimError::ParameterError(format!(
                "log-normal scatter must be non-negative and finite, got {}",
                self.scatter
            )));
        }
        let sigma = ((self.median + self.scatter) / self.median).ln();
        LogNormal::new(self.median.ln(), sigma)
            .map_err(|e| EpisimError::ParameterError(format!("{self:?}: {e}")))
    }
}

/// Timing and outcome probabilities of the infection state machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiseaseParameters {
    pub latent: LogNormalParams,
    pub bedridden_probability: f64,
    pub infectious_to_recovered: LogNormalParams,
    pub infectious_to_bedridden: LogNormalParams,
    pub death_probability: f64,
    pub bedridden_to_recovered: LogNormalParams,
    pub bedridden_to_dead: LogNormalParams,
}

impl Default for DiseaseParameters {
    fn default() -> Self {
        DiseaseParameters {
            latent: LogNormalParams::new(2.0 * DAY, 1.0 * DAY),
            bedridden_probability: 0.7,
            infectious_to_recovered: LogNormalParams::new(1.0 * WEEK, 6.0 * DAY),
            infectious_to_bedridden: LogNormalParams::new(3.0 * DAY, 5.0 * DAY),
            death_probability: 0.2,
            bedridden_to_recovered: LogNormalParams::new(2.0 * WEEK, 1.0 * WEEK),
            bedridden_to_dead: LogNormalParams::new(1.5 * WEEK, 1.0 * WEEK),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaceParameters {
    /// Distribution from which each place draws its fixed transmissivity.
    pub transmissivity: LogNormalParams,
}

impl PlaceParameters {
    fn home() -> Self {
        PlaceParameters {
            transmissivity: LogNormalParams::new(1.0, 0.5),
        }
    }

    fn workplace() -> Self {
        PlaceParameters {
            transmissivity: LogNormalParams::new(2.0, 2.0),
        }
    }
}

/// Shape of the synthetic population built by `population_loader`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PopulationParameters {
    pub size: usize,
    pub household_size: LogNormalParams,
    pub employed_fraction: f64,
    pub workplace_size: LogNormalParams,
    pub initially_infected: usize,
}

impl Default for PopulationParameters {
    fn default() -> Self {
        PopulationParameters {
            size: 1000,
            household_size: LogNormalParams::new(3.0, 2.0),
            employed_fraction: 0.7,
            workplace_size: LogNormalParams::new(10.0, 3.0),
            initially_infected: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    pub seed: u64,
    /// The simulation is shut down at this time.
    pub max_time: f64,
    /// Interval between population reports.
    pub report_period: f64,
    pub disease: DiseaseParameters,
    /// Travel time for every trip between places.
    pub commute: LogNormalParams,
    pub home: PlaceParameters,
    pub workplace: PlaceParameters,
    pub population: PopulationParameters,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            seed: 0,
            max_time: 30.0 * DAY,
            report_period: 1.0 * DAY,
            disease: DiseaseParameters::default(),
            commute: LogNormalParams::new(20.0 * MINUTE, 3.0 * MINUTE),
            home: PlaceParameters::home(),
            workplace: PlaceParameters::workplace(),
            population: PopulationParameters::default(),
        }
    }
}

fn check_probability(name: &str, p: f64) -> Result<(), EpisimError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(EpisimError::ParameterError(format!(
            "{name} must be in [0, 1], got {p}"
        )))
    }
}

fn check_distribution(name: &str, params: &LogNormalParams) -> Result<(), EpisimError> {
    params
        .distribution()
        .map(|_| ())
        .map_err(|e| EpisimError::ParameterError(format!("{name}: {e}")))
}

fn check_positive(name: &str, value: f64) -> Result<(), EpisimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EpisimError::ParameterError(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

impl Parameters {
    /// Reads parameters from a JSON file and validates them.
    ///
    /// # Errors
    ///
    /// Returns an `EpisimError` if the file cannot be read, is not valid JSON
    /// for `Parameters`, or fails [`Parameters::validate`].
    pub fn from_json_file(path: &Path) -> Result<Parameters, EpisimError> {
        debug!("loading parameters from {}", path.display());
        let data = fs::read_to_string(path)?;
        let parameters: Parameters = serde_json::from_str(&data)?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// # Errors
    ///
    /// Returns an `EpisimError::ParameterError` naming the first invalid field.
    pub fn validate(&self) -> Result<(), EpisimError> {
        check_positive("max_time", self.max_time)?;
        check_positive("report_period", self.report_period)?;

        let disease = &self.disease;
        check_distribution("disease.latent", &disease.latent)?;
        check_probability("disease.bedridden_probability", disease.bedridden_probability)?;
        check_distribution(
            "disease.infectious_to_recovered",
            &disease.infectious_to_recovered,
        )?;
        check_distribution(
            "disease.infectious_to_bedridden",
            &disease.infectious_to_bedridden,
        )?;
        check_probability("disease.death_probability", disease.death_probability)?;
        check_distribution(
            "disease.bedridden_to_recovered",
            &disease.bedridden_to_recovered,
        )?;
        check_distribution("disease.bedridden_to_dead", &disease.bedridden_to_dead)?;

        check_distribution("commute", &self.commute)?;
        check_distribution("home.transmissivity", &self.home.transmissivity)?;
        check_distribution("workplace.transmissivity", &self.workplace.transmissivity)?;

        let population = &self.population;
        check_distribution("population.household_size", &population.household_size)?;
        check_distribution("population.workplace_size", &population.workplace_size)?;
        check_probability("population.employed_fraction", population.employed_fraction)?;
        if population.initially_infected > population.size {
            return Err(EpisimError::ParameterError(format!(
                "population.initially_infected ({}) exceeds population.size ({})",
                population.initially_infected, population.size
            )));
        }
        Ok(())
    }
}

pub trait ContextParametersExt {
    /// Replaces the model parameters after validating them.
    ///
    /// # Errors
    ///
    /// Returns the validation error and leaves the current parameters in place.
    fn set_parameters(&mut self, parameters: Parameters) -> Result<(), EpisimError>;

    fn get_parameters(&self) -> &Parameters;
}

impl ContextParametersExt for Context {
    fn set_parameters(&mut self, parameters: Parameters) -> Result<(), EpisimError> {
        parameters.validate()?;
        self.parameters = parameters;
        Ok(())
    }

    fn get_parameters(&self) -> &Parameters {
        &self.parameters
    }
}
