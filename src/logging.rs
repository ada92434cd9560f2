// src/logging.rs

//! Structured logging setup
//!
//! Builds the global `tracing` subscriber from [`LoggingConfig`]: an
//! `EnvFilter` (honouring `RUST_LOG` first), a console layer on stderr and an
//! optional rolling file layer. File output goes through a non-blocking
//! writer whose guards live as long as the [`LoggingManager`].

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};
use uuid::Uuid;

use crate::config::{FileLogConfig, LogFormat, LogRotation, LoggingConfig};
use crate::error::{Error, Result};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[derive(Debug)]
pub struct LoggingManager {
    config: LoggingConfig,
    _guards: Vec<WorkerGuard>,
}

impl LoggingManager {
    pub fn new(config: LoggingConfig) -> Self {
        Self {
            config,
            _guards: Vec::new(),
        }
    }

    /// Installs the global subscriber.
    ///
    /// A subscriber installed earlier (by a test harness or embedding
    /// application) is left in place.
    pub fn initialize(&mut self) -> Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.config.level))
            .map_err(|e| {
                Error::config(format!("Invalid log level '{}': {}", self.config.level, e))
            })?;

        let mut layers: Vec<BoxedLayer> = Vec::new();

        if self.config.console.enabled {
            layers.push(format_layer(
                self.config.format,
                std::io::stderr,
                self.config.console.colored,
            ));
        }

        if let Some(file_config) = &self.config.file {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(file_config));
            self._guards.push(guard);
            layers.push(format_layer(self.config.format, writer, false));
        }

        match tracing_subscriber::registry().with(layers).with(filter).try_init() {
            Ok(()) => {
                tracing::debug!(level = %self.config.level, "logging initialized");
            }
            Err(e) => {
                tracing::debug!("global subscriber already set: {}", e);
            }
        }

        Ok(())
    }

    pub fn create_logger(&self, component: impl Into<String>) -> Logger {
        Logger::new(component)
    }
}

fn file_appender(config: &FileLogConfig) -> rolling::RollingFileAppender {
    let directory = config
        .path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let file_name = config
        .path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("storefront.log"));

    match config.rotation {
        LogRotation::Hourly => rolling::hourly(directory, file_name),
        LogRotation::Daily => rolling::daily(directory, file_name),
        LogRotation::Never => rolling::never(directory, file_name),
    }
}

fn format_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true);

    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

/// Component-scoped logger carrying an optional correlation id
#[derive(Debug, Clone)]
pub struct Logger {
    component: String,
    correlation_id: Option<Uuid>,
}

impl Logger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            correlation_id: None,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn correlation_id(&self) -> Option<Uuid> {
        self.correlation_id
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warn, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message.as_ref());
    }

    fn log(&self, level: LogLevel, message: &str) {
        let component = self.component.as_str();
        let correlation_id = self
            .correlation_id
            .map(|id| id.to_string())
            .unwrap_or_default();

        match level {
            LogLevel::Trace => tracing::trace!(component, %correlation_id, "{}", message),
            LogLevel::Debug => tracing::debug!(component, %correlation_id, "{}", message),
            LogLevel::Info => tracing::info!(component, %correlation_id, "{}", message),
            LogLevel::Warn => tracing::warn!(component, %correlation_id, "{}", message),
            LogLevel::Error => tracing::error!(component, %correlation_id, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleLogConfig;

    #[test]
    fn test_logging_manager_initialization_is_repeatable() {
        let mut first = LoggingManager::new(LoggingConfig::default());
        first.initialize().unwrap();

        let mut second = LoggingManager::new(LoggingConfig {
            format: LogFormat::Json,
            ..LoggingConfig::default()
        });
        assert!(second.initialize().is_ok());
    }

    #[test]
    fn test_file_output_writes_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: LogFormat::Compact,
            console: ConsoleLogConfig {
                enabled: false,
                colored: false,
            },
            file: Some(FileLogConfig {
                path: dir.path().join("query.log"),
                rotation: LogRotation::Never,
            }),
        };
        let mut manager = LoggingManager::new(config);
        manager.initialize().unwrap();
        drop(manager);

        assert!(dir.path().join("query.log").exists());
    }

    #[test]
    fn test_logger_with_context() {
        let id = Uuid::new_v4();
        let logger = LoggingManager::new(LoggingConfig::default())
            .create_logger("catalog_source")
            .with_correlation_id(id);
        assert_eq!(logger.component(), "catalog_source");
        assert_eq!(logger.correlation_id(), Some(id));
        logger.info("snapshot loaded");
        logger.warn("falling back to cache");
    }
}
