use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;

use crate::log::LogConfiguration;

// ISO 8601 timestamp, color coded level, then the module path
const LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";

impl LogConfiguration {
    /// Installs the `log4rs` logger on first use and swaps its config afterwards.
    /// Log lines go to stderr so they never mix with the console report.
    pub(super) fn apply(&mut self) {
        let stderr = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        let loggers = self
            .module_levels()
            .into_iter()
            .map(|(module, level)| Logger::builder().build(module, level));
        let config = Config::builder()
            .appender(Appender::builder().build("stderr", Box::new(stderr)))
            .loggers(loggers)
            .build(Root::builder().appender("stderr").build(self.level));
        let config = match config {
            Ok(config) => config,
            Err(e) => panic!("failed to build log config: {e}"),
        };

        match &self.handle {
            Some(handle) => handle.set_config(config),
            None => match log4rs::init_config(config) {
                Ok(handle) => self.handle = Some(handle),
                // Another logger owns the global slot; leave it alone.
                Err(e) => eprintln!("could not install logger: {e}"),
            },
        }
    }
}
