//! Logging Configuration and Initialization
//!
//! Centralized `tracing` setup for every plazas binary. It supports:
//!
//! - Console output (stderr, so command output on stdout stays clean)
//! - Daily rotating log files
//! - Text or JSON formatting
//! - Environment-based configuration
//!
//! Use the structured macros (`debug!`, `info!`, `warn!`, `error!`) with fields
//! rather than formatting values into the message:
//!
//! ```rust
//! use tracing::info;
//!
//! let rows = 42;
//! info!(rows, source = "plazas.csv", "Store rebuilt");
//! ```
//!
//! # Example
//!
//! ```no_run
//! use plazas_common::logging::{init_logging, LogConfig, LogLevel};
//!
//! let config = LogConfig::builder().level(LogLevel::Debug).build();
//! let _guard = init_logging(&config).unwrap();
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Parse a case-insensitive keyword against a table of accepted spellings.
fn parse_keyword<T: Copy>(kind: &str, raw: &str, table: &[(&str, T)]) -> Result<T> {
    let wanted = raw.trim().to_ascii_lowercase();
    table
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, value)| *value)
        .ok_or_else(|| anyhow::anyhow!("Invalid log {kind}: '{raw}'"))
}

/// Minimum severity that reaches the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const KEYWORDS: [(&'static str, LogLevel); 6] = [
        ("trace", LogLevel::Trace),
        ("debug", LogLevel::Debug),
        ("info", LogLevel::Info),
        ("warn", LogLevel::Warn),
        ("warning", LogLevel::Warn),
        ("error", LogLevel::Error),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_keyword("level", s, &Self::KEYWORDS)
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where events are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// stderr only; stdout carries command output
    #[default]
    Console,
    /// Daily rolling file under `log_dir`
    File,
    Both,
}

impl LogOutput {
    const KEYWORDS: [(&'static str, LogOutput); 5] = [
        ("console", LogOutput::Console),
        ("stderr", LogOutput::Console),
        ("file", LogOutput::File),
        ("both", LogOutput::Both),
        ("all", LogOutput::Both),
    ];

    fn wants_console(self) -> bool {
        matches!(self, LogOutput::Console | LogOutput::Both)
    }

    fn wants_file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

impl std::str::FromStr for LogOutput {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_keyword("output", s, &Self::KEYWORDS)
    }
}

/// Line format of each event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_keyword(
            "format",
            s,
            &[
                ("text", LogFormat::Text),
                ("pretty", LogFormat::Text),
                ("json", LogFormat::Json),
            ],
        )
    }
}

/// Subscriber settings shared by the plazas binaries.
///
/// Every field has a default, so a partial TOML/JSON table deserializes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub output: LogOutput,
    pub format: LogFormat,
    /// Used only when `output` includes a file
    pub log_dir: PathBuf,
    /// Rolling file name stem (`plazas-cli` -> `plazas-cli.2026-10-14`)
    pub log_file_prefix: String,
    /// Extra `EnvFilter` directives, comma separated (`rusqlite=warn,plazas_core=trace`)
    pub filter_directives: Option<String>,
    /// Source file and line in each event
    pub include_location: bool,
    pub include_targets: bool,
    /// Emit an event carrying the elapsed time when an instrumented span closes
    pub span_close_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            output: LogOutput::Console,
            format: LogFormat::Text,
            log_dir: PathBuf::from("./logs"),
            log_file_prefix: "plazas".to_string(),
            filter_directives: None,
            include_location: false,
            include_targets: true,
            span_close_events: false,
        }
    }
}

impl LogConfig {
    /// Defaults overridden by the `PLAZAS_LOG_*` variables; see [`LogConfig::merge_env`].
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Override fields from the environment:
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `PLAZAS_LOG_LEVEL` | `level` |
    /// | `PLAZAS_LOG_OUTPUT` | `output` |
    /// | `PLAZAS_LOG_FORMAT` | `format` |
    /// | `PLAZAS_LOG_DIR` | `log_dir` |
    /// | `PLAZAS_LOG_FILTER` | `filter_directives` |
    ///
    /// Unset and empty variables leave the field alone. An unparsable value is
    /// an error.
    pub fn merge_env(self) -> Result<Self> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(level) = var("PLAZAS_LOG_LEVEL") {
            self.level = level.parse()?;
        }
        if let Some(output) = var("PLAZAS_LOG_OUTPUT") {
            self.output = output.parse()?;
        }
        if let Some(format) = var("PLAZAS_LOG_FORMAT") {
            self.format = format.parse()?;
        }
        if let Some(dir) = var("PLAZAS_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(filter) = var("PLAZAS_LOG_FILTER") {
            self.filter_directives = Some(filter);
        }
        Ok(self)
    }

    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }
}

/// Fluent construction of a [`LogConfig`]
#[derive(Default)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.config.output = output;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = dir.into();
        self
    }

    pub fn log_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.log_file_prefix = prefix.into();
        self
    }

    pub fn filter_directives(mut self, filter: impl Into<String>) -> Self {
        self.config.filter_directives = Some(filter.into());
        self
    }

    pub fn include_location(mut self, include: bool) -> Self {
        self.config.include_location = include;
        self
    }

    pub fn span_close_events(mut self, enabled: bool) -> Self {
        self.config.span_close_events = enabled;
        self
    }

    pub fn build(self) -> LogConfig {
        self.config
    }
}

/// Keeps the non-blocking file writer alive.
///
/// Buffered file output is flushed when this guard is dropped, so hold it for
/// the lifetime of the program.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file_writer: Option<WorkerGuard>,
}

/// Initialize logging with the given configuration
///
/// This installs the global tracing subscriber and fails if one is already
/// installed. Call it once at application startup.
pub fn init_logging(config: &LogConfig) -> Result<LoggingGuard> {
    let filter = build_filter(config)?;

    let console = config
        .output
        .wants_console()
        .then(|| fmt_layer(config, std::io::stderr, true));

    let (file, file_guard) = if config.output.wants_file() {
        std::fs::create_dir_all(&config.log_dir).context("Failed to create log directory")?;
        let appender = tracing_appender::rolling::daily(&config.log_dir, &config.log_file_prefix);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (Some(fmt_layer(config, writer, false)), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LoggingGuard {
        _file_writer: file_guard,
    })
}

fn build_filter(config: &LogConfig) -> Result<EnvFilter> {
    let mut filter =
        EnvFilter::from_default_env().add_directive(config.level.to_tracing_level().into());

    if let Some(ref directives) = config.filter_directives {
        for directive in directives.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            filter = filter.add_directive(
                directive
                    .parse()
                    .with_context(|| format!("Failed to parse filter directive '{directive}'"))?,
            );
        }
    }

    Ok(filter)
}

/// Build one formatting layer; ANSI colors only make sense on a terminal.
fn fmt_layer<S, W>(config: &LogConfig, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let span_events = if config.span_close_events {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(config.include_targets)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_span_events(span_events);

    match config.format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}
