//! Tracing configuration module for structured logging
//!
//! The library only emits tracing events and spans; the CLI installs the
//! subscriber configured here.

#[cfg(feature = "cli")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Configuration for tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable console output with colors
    Console,
    /// Compact console output without colors, for CI logs
    Compact,
    /// JSON structured logging
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Configuration for tracing output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TracingOutput {
    /// Output to stderr (default)
    Console,
    /// Output to a file
    #[cfg(feature = "tracing-files")]
    File(std::path::PathBuf),
}

/// Tracing configuration builder
#[derive(Debug)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    /// Output format
    pub format: TracingFormat,
    /// Output destination
    pub output: TracingOutput,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
    /// Session ID for correlation
    pub session_id: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            format: TracingFormat::Console,
            output: TracingOutput::Console,
            env_filter: None,
            session_id: None,
        }
    }
}

impl TracingConfig {
    /// Create a new tracing configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level (0-2+)
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Set custom environment filter
    #[must_use]
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Set session ID for run correlation
    #[must_use]
    pub fn with_session_id<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Convert verbosity level to tracing filter string
    #[must_use]
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Initialize tracing subscriber based on configuration
    #[cfg(feature = "cli")]
    pub fn init(self) -> anyhow::Result<()> {
        use tracing_subscriber::fmt;

        let filter = if let Some(env_filter) = &self.env_filter {
            EnvFilter::try_new(env_filter)?
        } else {
            EnvFilter::try_new(self.verbosity_to_filter())?
        };

        let registry = Registry::default().with(filter);

        match (&self.format, &self.output) {
            (TracingFormat::Console, TracingOutput::Console) => {
                let fmt_layer = fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(false)
                    .with_level(true)
                    .compact();

                registry.with(fmt_layer).try_init()?;
            },

            (TracingFormat::Compact, TracingOutput::Console) => {
                let fmt_layer = fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(false)
                    .compact();

                registry.with(fmt_layer).try_init()?;
            },

            #[cfg(feature = "tracing-json")]
            (TracingFormat::Json, TracingOutput::Console) => {
                let fmt_layer = fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true);

                registry.with(fmt_layer).try_init()?;
            },

            #[cfg(feature = "tracing-files")]
            (format, TracingOutput::File(path)) => {
                use tracing_appender::rolling::{RollingFileAppender, Rotation};

                let directory = match path.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent,
                    _ => std::path::Path::new("."),
                };
                let file_name = path
                    .file_name()
                    .map_or_else(|| "flickr-imagefolder.log".to_string(), |name| {
                        name.to_string_lossy().into_owned()
                    });

                // Blocking writer: the run is short and single-threaded
                let file_appender = RollingFileAppender::builder()
                    .rotation(Rotation::NEVER)
                    .filename_prefix(file_name)
                    .build(directory)?;

                match format {
                    TracingFormat::Console | TracingFormat::Compact => {
                        let fmt_layer = fmt::layer()
                            .with_ansi(false)
                            .with_writer(file_appender)
                            .compact();
                        registry.with(fmt_layer).try_init()?;
                    },
                    #[cfg(feature = "tracing-json")]
                    TracingFormat::Json => {
                        let fmt_layer = fmt::layer()
                            .json()
                            .with_writer(file_appender)
                            .with_current_span(true)
                            .with_span_list(true);
                        registry.with(fmt_layer).try_init()?;
                    },
                }
            },
        }

        if let Some(session_id) = &self.session_id {
            tracing::debug!(session_id = %session_id, "Preparation session started");
        }

        Ok(())
    }
}

/// Pick the output destination for an optional `--log-file` path
#[cfg(feature = "cli")]
pub fn output_for_log_file(log_file: Option<std::path::PathBuf>) -> anyhow::Result<TracingOutput> {
    match log_file {
        None => Ok(TracingOutput::Console),
        #[cfg(feature = "tracing-files")]
        Some(path) => Ok(TracingOutput::File(path)),
        #[cfg(not(feature = "tracing-files"))]
        Some(path) => anyhow::bail!(
            "Logging to {} requires the 'tracing-files' feature",
            path.display()
        ),
    }
}

/// Initialize tracing with CLI-friendly defaults and a fresh session id
///
/// Logs go to stderr unless `log_file` is given.
#[cfg(feature = "cli")]
pub fn init_cli_tracing(verbosity: u8, log_file: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let session_id = uuid::Uuid::new_v4().to_string();

    TracingConfig::new()
        .with_verbosity(verbosity)
        .with_format(TracingFormat::Console)
        .with_output(output_for_log_file(log_file)?)
        .with_session_id(session_id)
        .init()
}

/// Span creation helpers for pipeline phases
pub mod spans {
    use tracing::{Level, Span};

    /// Span for a named pipeline stage
    pub fn stage(name: &str) -> Span {
        tracing::span!(Level::INFO, "stage", name = %name)
    }

    /// Span covering the export loop
    pub fn export(split: &str, count: usize) -> Span {
        tracing::span!(Level::INFO, "export", split = %split, count = count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_mapping() {
        assert_eq!(TracingConfig::new().with_verbosity(0).verbosity_to_filter(), "info");
        assert_eq!(TracingConfig::new().with_verbosity(1).verbosity_to_filter(), "debug");
        assert_eq!(TracingConfig::new().with_verbosity(2).verbosity_to_filter(), "trace");
        assert_eq!(TracingConfig::new().with_verbosity(10).verbosity_to_filter(), "trace");
    }

    #[test]
    fn test_config_builder() {
        let config = TracingConfig::new()
            .with_verbosity(2)
            .with_format(TracingFormat::Compact)
            .with_env_filter("flickr_imagefolder=debug")
            .with_session_id("test-session");

        assert_eq!(config.verbosity, 2);
        assert_eq!(config.format, TracingFormat::Compact);
        assert_eq!(config.env_filter.as_deref(), Some("flickr_imagefolder=debug"));
        assert_eq!(config.session_id.as_deref(), Some("test-session"));
    }

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.verbosity, 0);
        assert_eq!(config.format, TracingFormat::Console);
        assert_eq!(config.output, TracingOutput::Console);
        assert!(config.env_filter.is_none());
        assert!(config.session_id.is_none());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_console_output_without_log_file() {
        assert_eq!(output_for_log_file(None).unwrap(), TracingOutput::Console);
    }

    #[cfg(all(feature = "cli", feature = "tracing-files"))]
    #[test]
    fn test_log_file_selects_file_output() {
        let path = std::path::PathBuf::from("logs/run.log");
        assert_eq!(
            output_for_log_file(Some(path.clone())).unwrap(),
            TracingOutput::File(path)
        );
    }

    #[cfg(all(feature = "cli", not(feature = "tracing-files")))]
    #[test]
    fn test_log_file_needs_feature() {
        let err = output_for_log_file(Some("run.log".into())).unwrap_err();
        assert!(err.to_string().contains("tracing-files"));
    }
}
