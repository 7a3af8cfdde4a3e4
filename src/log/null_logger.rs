//! Stand-in used when the `logging` feature is off: nothing is printed, but
//! the levels still gate the `log` macros.

use crate::log::LogConfiguration;

impl LogConfiguration {
    pub(super) fn apply(&mut self) {
        let max_level = self
            .module_levels()
            .into_iter()
            .map(|(_, level)| level)
            .fold(self.level, Ord::max);
        log::set_max_level(max_level);
    }
}
