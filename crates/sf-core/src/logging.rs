//! Logging infrastructure for strikeflow

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Config, DebugConfig, LogLevel};

/// Map a configured level onto a tracing level; `None` disables logging
pub fn level_for(level: LogLevel) -> Option<Level> {
    match level {
        LogLevel::Off => None,
        LogLevel::Error => Some(Level::ERROR),
        LogLevel::Warn => Some(Level::WARN),
        LogLevel::Info => Some(Level::INFO),
        LogLevel::Debug => Some(Level::DEBUG),
        LogLevel::Trace => Some(Level::TRACE),
    }
}

/// Target of the `provider_*` macros
pub const PROVIDER_TARGET: &str = "provider";
/// Target of the `coordinator_*` macros
pub const COORDINATOR_TARGET: &str = "coordinator";

fn level_name(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Off => "off",
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

/// Filter for the global level plus the `[debug.components]` overrides.
///
/// Targets already named in `RUST_LOG` keep the environment's level.
pub fn filter_for(debug: &DebugConfig, level: Level) -> EnvFilter {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let mut filter = EnvFilter::from_default_env().add_directive(level.into());

    for (target, component) in &debug.components {
        if env.split(',').any(|d| d.trim().starts_with(target.as_str())) {
            continue;
        }
        match format!("{}={}", target, level_name(*component)).parse::<Directive>() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("Ignoring log override for {}: {}", target, e),
        }
    }
    filter
}

/// Initialize the logging system based on configuration
pub fn init(config: &Config) {
    let Some(level) = level_for(config.debug.log_level) else {
        return;
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter_for(&config.debug, level))
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        );

    let file = if config.debug.log_to_file {
        std::fs::File::create(&config.debug.log_path)
            .map_err(|e| eprintln!("Cannot open {}: {}", config.debug.log_path.display(), e))
            .ok()
    } else {
        None
    };

    let file_layer = file.map(|file| fmt::layer().with_writer(file).with_ansi(false));
    let _ = subscriber.with(file_layer).try_init();
}

/// Initialize logging with default settings (for tests and quick starts)
pub fn init_default() {
    let _ = tracing_subscriber::registry()
        .with(filter_for(&DebugConfig::default(), Level::INFO))
        .with(fmt::layer())
        .try_init();
}

// Component-specific logging

/// Log a provider trace message
#[macro_export]
macro_rules! provider_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: $crate::logging::PROVIDER_TARGET, $($arg)*)
    };
}

/// Log a provider debug message
#[macro_export]
macro_rules! provider_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: $crate::logging::PROVIDER_TARGET, $($arg)*)
    };
}

/// Log a coordinator trace message
#[macro_export]
macro_rules! coordinator_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: $crate::logging::COORDINATOR_TARGET, $($arg)*)
    };
}

/// Log a coordinator debug message
#[macro_export]
macro_rules! coordinator_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: $crate::logging::COORDINATOR_TARGET, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_levels() {
        assert_eq!(level_for(LogLevel::Off), None);
        assert_eq!(level_for(LogLevel::Warn), Some(Level::WARN));
        assert_eq!(level_for(LogLevel::Trace), Some(Level::TRACE));
    }

    #[test]
    fn component_overrides_become_directives() {
        let mut debug = DebugConfig::default();
        debug
            .components
            .insert(COORDINATOR_TARGET.to_string(), LogLevel::Trace);
        debug.components.insert(PROVIDER_TARGET.to_string(), LogLevel::Off);

        let rendered = filter_for(&debug, Level::WARN).to_string();
        assert!(rendered.contains("coordinator=trace"), "{}", rendered);
        assert!(rendered.contains("provider=off"), "{}", rendered);
    }

    #[test]
    fn init_twice_is_harmless() {
        init_default();
        init(&Config::default());
    }
}
