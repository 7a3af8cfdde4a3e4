//! Diagnostic logging for the simulator. This is separate from _reporting_
//! (see [`crate::report`]), which records model output.
//!
//! Modules log through the `log` macros re-exported here. State transitions, trips and exposure
//! attempts are logged at `trace`, setup milestones at `info`.
//!
//! Logging is off until a level is set. The `episim` binary sets it with `--log-level <level>`
//! and adds per-module filters with `--log-filter <module>=<level>`:
//!
//! ```rust
//! use episim::log::{set_log_level, set_module_filter, LevelFilter};
//!
//! set_log_level(LevelFilter::Info);
//! // Follow every trip.
//! set_module_filter("episim::movement", LevelFilter::Trace);
//! ```
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(not(feature = "logging"))]
mod null_logger;

pub use log::{debug, error, info, trace, warn, LevelFilter};

use std::str::FromStr;
use std::sync::{LazyLock, Mutex, MutexGuard};

use crate::error::EpisimError;
use crate::hashing::HashMap;

/// Upper bounds for noisy modules, applied unless a filter is set for the module explicitly.
const DEFAULT_MODULE_CAPS: [(&str, LevelFilter); 1] = [
    // One line per exposure attempt.
    ("episim::transmission_manager", LevelFilter::Debug),
];

static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// The global level and the explicit per-module levels, plus the installed logger.
#[derive(Debug)]
struct LogConfiguration {
    level: LevelFilter,
    module_filters: HashMap<String, LevelFilter>,

    #[cfg(feature = "logging")]
    handle: Option<log4rs::Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            level: LevelFilter::Off,
            module_filters: HashMap::default(),

            #[cfg(feature = "logging")]
            handle: None,
        }
    }
}

impl LogConfiguration {
    /// The level each configured module logs at. Explicit filters win; a capped module never logs
    /// above the global level.
    fn module_levels(&self) -> Vec<(String, LevelFilter)> {
        let mut levels: Vec<(String, LevelFilter)> = self
            .module_filters
            .iter()
            .map(|(module, level)| (module.clone(), *level))
            .collect();
        for (module, cap) in DEFAULT_MODULE_CAPS {
            if !self.module_filters.contains_key(module) {
                levels.push((module.to_string(), cap.min(self.level)));
            }
        }
        levels.sort();
        levels
    }
}

/// Sets the level for every module without a filter of its own. `LevelFilter::Off` disables
/// logging.
pub fn set_log_level(level: LevelFilter) {
    let mut configuration = get_log_configuration();
    configuration.level = level;
    configuration.apply();
}

/// Sets the level for a module path such as `"episim::movement"`, overriding the global level
/// for that module and its submodules.
pub fn set_module_filter(module: &str, level: LevelFilter) {
    let mut configuration = get_log_configuration();
    if configuration
        .module_filters
        .insert(module.to_string(), level)
        != Some(level)
    {
        configuration.apply();
    }
}

/// Parses a `module=level` filter, as passed to `--log-filter`.
///
/// # Errors
/// Returns `EpisimError::EpisimError` if the module is missing or the level is unknown.
pub fn parse_module_filter(filter: &str) -> Result<(String, LevelFilter), EpisimError> {
    let invalid = || EpisimError::EpisimError(format!("invalid log filter: {filter}"));
    let (module, level) = filter.split_once('=').ok_or_else(invalid)?;
    let module = module.trim();
    if module.is_empty() {
        return Err(invalid());
    }
    let level = LevelFilter::from_str(level.trim()).map_err(|_| invalid())?;
    Ok((module.to_string(), level))
}

fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}
