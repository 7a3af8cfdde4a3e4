//! A discrete-event simulation of an epidemic spreading through households
//! and workplaces.
//!
//! The central object of a simulation is the [`Context`]. It keeps the
//! logical clock (one unit is one day), a queue of planned [`Action`]s, and
//! every person and place in the model. Running the simulation means
//! executing planned actions in time order; each action may plan more.
//!
//! The model is split into modules that extend `Context` through traits:
//! * [`people`]: people, employees and their infection status
//! * [`places`]: homes and workplaces, who is present and who is infectious
//! * [`infection_manager`]: progression from latent to recovered or dead
//! * [`transmission_manager`]: exposure of occupants to infectious people
//! * [`movement`]: commuting between home and work
//! * [`report`]: periodic population counts
//! * [`population_loader`]: builds a town from [`Parameters`]
//!
//! A minimal run:
//!
//! ```
//! use episim::{population_loader, Context, ContextParametersExt, Parameters};
//!
//! let mut context = Context::new();
//! let mut parameters = Parameters::default();
//! parameters.population.size = 50;
//! parameters.max_time = 5.0;
//! context.set_parameters(parameters).unwrap();
//! population_loader::init(&mut context);
//! context.execute();
//! assert_eq!(context.get_current_time(), 5.0);
//! ```
pub mod context;
pub use context::{Action, Context, Event};

pub mod error;
pub use error::EpisimError;

pub mod hashing;
pub mod infection_manager;
pub use infection_manager::ContextInfectionExt;

pub mod log;
pub mod movement;

pub mod parameters;
pub use parameters::{ContextParametersExt, LogNormalParams, Parameters};

pub mod people;
pub use people::{ContextPeopleExt, InfectionStatus, PersonId, PopulationCounts};

pub mod places;
pub use places::{ContextPlacesExt, PlaceId, PlaceKind};

pub mod plan;
pub mod population_loader;

pub mod random;
pub use random::ContextRandomExt;

pub mod report;
pub use report::{ConsoleReport, ContextReportExt, CsvReport, ReportOptions, ReportSink};

pub mod runner;
pub use runner::{run_with_args, BaseArgs};

pub mod time;
pub mod transmission_manager;

// Re-exported for `define_rng!`
pub use rand;
