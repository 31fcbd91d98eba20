//! Severity-routed diagnostic logging.
//!
//! A [`Logger`] is a cheap-to-clone handle that routes free-text lines,
//! tagged with a [`Severity`], to the sinks registered for that severity.
//! Sinks are deliberately dumb: they receive one formatted line at a time
//! and must never let a write failure escape (failures are counted and
//! reported through `tracing`, nothing more).
//!
//! ```text
//!   Logger ──render(LineFormat)──▶ "2026-01-01 12:00:00 [ERROR] ..."
//!      │
//!      ├─▶ FileSink      (shared per-path stream registry)
//!      ├─▶ ConsoleSink   (stdout / stderr)
//!      ├─▶ TracingSink   (bridge into the `tracing` ecosystem)
//!      └─▶ MemorySink    (bounded in-memory ring, used by tests)
//! ```
//!
//! Configuration can come from code via [`LoggerBuilder`] or from a JSON
//! document addressed by a JSON pointer, with one object per severity:
//!
//! ```json
//! { "format": "[%d %t][%s] %m",
//!   "severities": {
//!     "debug":   { "file_paths": ["coppice.log"], "console": false },
//!     "warning": { "file_paths": [],              "console": true  } } }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

mod format;
mod logger;
mod sink;

pub use format::LineFormat;
pub use logger::{Logger, LoggerBuilder};
pub use sink::{
    ConsoleSink, FileSink, MemorySink, TracingSink, dropped_lines_total, reset_dropped_lines,
};

/// Severity of a diagnostic line, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    Information,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// All severities, least severe first.
    pub const ALL: [Self; 6] = [
        Self::Trace,
        Self::Debug,
        Self::Information,
        Self::Warning,
        Self::Error,
        Self::Critical,
    ];

    /// The lowercase name used in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Information => "information",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Trace => 0,
            Self::Debug => 1,
            Self::Information => 2,
            Self::Warning => 3,
            Self::Error => 4,
            Self::Critical => 5,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let upper = match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Information => "INFORMATION",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        };
        f.write_str(upper)
    }
}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "information" => Ok(Self::Information),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            _ => Err(UnknownSeverity(s.to_owned())),
        }
    }
}

/// Error returned when parsing an unrecognized severity name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSeverity(pub String);

impl fmt::Display for UnknownSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown severity name '{}'", self.0)
    }
}

impl std::error::Error for UnknownSeverity {}

/// A destination for formatted diagnostic lines.
///
/// Implementations must absorb their own failures: `write_line` has no
/// return value, and a sink that cannot deliver a line records the drop
/// (see [`dropped_lines_total`]) instead of propagating anything to the
/// code that logged.
pub trait LogSink: Send + Sync {
    /// Deliver one already-formatted line.
    ///
    /// The severity is the line's routing tag, passed through so sinks
    /// that keep structure (ring buffers, bridges) do not have to re-parse
    /// the rendered text.
    fn write_line(&self, severity: Severity, line: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_order_tracks_increasing_urgency() {
        assert!(Severity::Trace < Severity::Debug);
        assert!(Severity::Debug < Severity::Information);
        assert!(Severity::Information < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
    }

    #[test]
    fn severity_names_round_trip() {
        for sev in Severity::ALL {
            assert_eq!(sev.name().parse::<Severity>(), Ok(sev));
        }
    }

    #[test]
    fn severity_parse_is_case_insensitive() {
        assert_eq!("WARNING".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("Critical".parse::<Severity>(), Ok(Severity::Critical));
    }

    #[test]
    fn severity_parse_rejects_unknown_names() {
        let err = "loud".parse::<Severity>().expect_err("'loud' is not a severity");
        assert_eq!(err.to_string(), "unknown severity name 'loud'");
    }

    #[test]
    fn severity_display_is_uppercase() {
        assert_eq!(Severity::Information.to_string(), "INFORMATION");
        assert_eq!(Severity::Trace.to_string(), "TRACE");
    }

    #[test]
    fn severity_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Severity::Warning).expect("serialize");
        assert_eq!(json, "\"warning\"");
        let back: Severity = serde_json::from_str("\"critical\"").expect("deserialize");
        assert_eq!(back, Severity::Critical);
    }

    #[test]
    fn severity_indices_are_dense() {
        for (expected, sev) in Severity::ALL.into_iter().enumerate() {
            assert_eq!(sev.index(), expected);
        }
    }
}
