use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "clview_engine=debug,opencl3=warn"). When it is unset, `RUST_LOG` is
/// consulted, then `default_level`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    pub fn with_default_level(mut self, level: LevelFilter) -> Self {
        self.default_level = level;
        self
    }

    fn builder(&self, rust_log: Option<String>) -> env_logger::Builder {
        let mut builder = env_logger::Builder::new();

        match self.env_filter.clone().or(rust_log) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(self.default_level);
            }
        }

        builder.write_style(self.write_style);
        builder
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Subsequent calls are ignored. Call early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = config.builder(std::env::var("RUST_LOG").ok());
        if builder.try_init().is_err() {
            // Another logger was installed by the host application.
            return;
        }
        log::debug!("logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_beats_rust_log() {
        let logger = LoggingConfig::default()
            .with_filter("clview_engine=trace")
            .builder(Some("error".into()))
            .build();
        assert_eq!(logger.filter(), LevelFilter::Trace);
    }

    #[test]
    fn rust_log_beats_default_level() {
        let logger = LoggingConfig::default()
            .with_default_level(LevelFilter::Debug)
            .builder(Some("warn".into()))
            .build();
        assert_eq!(logger.filter(), LevelFilter::Warn);
    }

    #[test]
    fn default_level_applies_last() {
        let logger = LoggingConfig::default()
            .with_default_level(LevelFilter::Error)
            .builder(None)
            .build();
        assert_eq!(logger.filter(), LevelFilter::Error);
    }
}
