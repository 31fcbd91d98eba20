//! The logger handle and its builder.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use coppice_error::{CoppiceError, Result};

use crate::format::LineFormat;
use crate::sink::{ConsoleSink, FileSink};
use crate::{LogSink, Severity};

const SEVERITY_COUNT: usize = Severity::ALL.len();

struct LoggerInner {
    format: LineFormat,
    routes: [Vec<Arc<dyn LogSink>>; SEVERITY_COUNT],
}

/// A cheap-to-clone handle that renders diagnostic lines and routes them to
/// the sinks registered for each severity.
///
/// A severity with no sinks costs one array index and a branch; the line is
/// not rendered. Nothing a sink does can fail a caller: the logger has no
/// fallible surface after construction.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    /// Start building a logger.
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Whether any sink is registered for `severity`.
    #[must_use]
    pub fn enabled(&self, severity: Severity) -> bool {
        !self.inner.routes[severity.index()].is_empty()
    }

    /// Render `message` once and deliver it to every sink routed for
    /// `severity`.
    pub fn log(&self, severity: Severity, message: &str) {
        let sinks = &self.inner.routes[severity.index()];
        if sinks.is_empty() {
            return;
        }
        let line = self.inner.format.render(severity, message);
        for sink in sinks {
            sink.write_line(severity, &line);
        }
    }

    /// Log at [`Severity::Trace`].
    pub fn trace(&self, message: &str) {
        self.log(Severity::Trace, message);
    }

    /// Log at [`Severity::Debug`].
    pub fn debug(&self, message: &str) {
        self.log(Severity::Debug, message);
    }

    /// Log at [`Severity::Information`].
    pub fn info(&self, message: &str) {
        self.log(Severity::Information, message);
    }

    /// Log at [`Severity::Warning`].
    pub fn warn(&self, message: &str) {
        self.log(Severity::Warning, message);
    }

    /// Log at [`Severity::Error`].
    pub fn error(&self, message: &str) {
        self.log(Severity::Error, message);
    }

    /// Log at [`Severity::Critical`].
    pub fn critical(&self, message: &str) {
        self.log(Severity::Critical, message);
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut counts = [0usize; SEVERITY_COUNT];
        for (i, route) in self.inner.routes.iter().enumerate() {
            counts[i] = route.len();
        }
        f.debug_struct("Logger")
            .field("sinks_per_severity", &counts)
            .finish()
    }
}

// ── Builder ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct RouteSpec {
    files: Vec<PathBuf>,
    console: bool,
    console_stderr: bool,
    sinks: Vec<Arc<dyn LogSink>>,
}

/// Accumulates routes and a format pattern, then opens the sinks.
///
/// `build` borrows the builder, so one configuration can produce several
/// loggers; file sinks opened twice for the same path share one stream.
pub struct LoggerBuilder {
    pattern: String,
    routes: [RouteSpec; SEVERITY_COUNT],
}

impl LoggerBuilder {
    /// A builder with no routes and the default `%m` format.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pattern: LineFormat::DEFAULT_PATTERN.to_owned(),
            routes: Default::default(),
        }
    }

    /// Route `severity` lines into the file at `path`. Adding a path a
    /// second time for the same severity is a no-op.
    #[must_use]
    pub fn add_file(mut self, path: impl Into<PathBuf>, severity: Severity) -> Self {
        let path = path.into();
        let spec = &mut self.routes[severity.index()];
        if !spec.files.contains(&path) {
            spec.files.push(path);
        }
        self
    }

    /// Route `severity` lines to standard output.
    #[must_use]
    pub fn add_console(mut self, severity: Severity) -> Self {
        self.routes[severity.index()].console = true;
        self
    }

    /// Route `severity` lines to standard error.
    #[must_use]
    pub fn add_console_stderr(mut self, severity: Severity) -> Self {
        self.routes[severity.index()].console_stderr = true;
        self
    }

    /// Route `severity` lines to an arbitrary sink.
    #[must_use]
    pub fn add_sink(mut self, severity: Severity, sink: Arc<dyn LogSink>) -> Self {
        self.routes[severity.index()].sinks.push(sink);
        self
    }

    /// Set the line format pattern (see [`LineFormat`]).
    #[must_use]
    pub fn format(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Drop every accumulated route and reset the format to `%m`.
    #[must_use]
    pub fn clear(mut self) -> Self {
        self.pattern = LineFormat::DEFAULT_PATTERN.to_owned();
        self.routes = Default::default();
        self
    }

    /// Merge configuration from a JSON document. `pointer` is a JSON
    /// pointer (`""` selects the document root, `"/app/log"` a nested
    /// object) naming the configuration object to read.
    pub fn with_config_str(self, json: &str, pointer: &str) -> Result<Self> {
        let doc: serde_json::Value = serde_json::from_str(json)
            .map_err(|err| CoppiceError::log_config(format!("invalid JSON: {err}")))?;
        let node = doc.pointer(pointer).ok_or_else(|| {
            CoppiceError::log_config(format!("no configuration at JSON pointer '{pointer}'"))
        })?;
        let config: LoggerConfig = serde_json::from_value(node.clone())
            .map_err(|err| CoppiceError::log_config(format!("bad configuration shape: {err}")))?;
        Ok(self.apply(config))
    }

    /// Merge configuration read from a JSON file.
    pub fn with_config_file(self, path: impl AsRef<Path>, pointer: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        self.with_config_str(&text, pointer)
    }

    /// Compile the format, open the sinks, and produce a logger.
    pub fn build(&self) -> Result<Logger> {
        let format = LineFormat::compile(&self.pattern)?;
        let mut routes: [Vec<Arc<dyn LogSink>>; SEVERITY_COUNT] = Default::default();
        for severity in Severity::ALL {
            let spec = &self.routes[severity.index()];
            let route = &mut routes[severity.index()];
            let mut opened: Vec<PathBuf> = Vec::new();
            for path in &spec.files {
                // Same file through different spellings still gets one sink.
                let abs = std::path::absolute(path)?;
                if opened.contains(&abs) {
                    continue;
                }
                route.push(Arc::new(FileSink::open(&abs)?));
                opened.push(abs);
            }
            if spec.console {
                route.push(Arc::new(ConsoleSink::stdout()));
            }
            if spec.console_stderr {
                route.push(Arc::new(ConsoleSink::stderr()));
            }
            route.extend(spec.sinks.iter().cloned());
        }
        Ok(Logger {
            inner: Arc::new(LoggerInner { format, routes }),
        })
    }

    fn apply(mut self, config: LoggerConfig) -> Self {
        if let Some(pattern) = config.format {
            self = self.format(pattern);
        }
        for (severity, route) in config.severities {
            for path in route.file_paths {
                self = self.add_file(path, severity);
            }
            if route.console {
                self = self.add_console(severity);
            }
        }
        self
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut counts = [0usize; SEVERITY_COUNT];
        for (i, spec) in self.routes.iter().enumerate() {
            counts[i] = spec.files.len()
                + usize::from(spec.console)
                + usize::from(spec.console_stderr)
                + spec.sinks.len();
        }
        f.debug_struct("LoggerBuilder")
            .field("pattern", &self.pattern)
            .field("routes_per_severity", &counts)
            .finish()
    }
}

/// JSON configuration shape: an optional format pattern plus one route
/// object per severity name.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggerConfig {
    format: Option<String>,
    #[serde(default)]
    severities: BTreeMap<Severity, SeverityRoute>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeverityRoute {
    #[serde(default)]
    file_paths: Vec<PathBuf>,
    #[serde(default)]
    console: bool,
}
