//! Line formatting: compiles a `%`-directive pattern once, renders many.
//!
//! Directives: `%d` (UTC date `YYYY-MM-DD`), `%t` (UTC time `HH:MM:SS`),
//! `%s` (severity), `%m` (message), `%%` (literal percent). Anything else
//! after `%` is a configuration error, caught at compile time rather than
//! producing garbled lines later.

use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

use coppice_error::{CoppiceError, Result};

use crate::Severity;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Date,
    Time,
    Severity,
    Message,
}

/// A compiled line format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFormat {
    segments: Vec<Segment>,
}

impl LineFormat {
    /// The default pattern: just the message.
    pub const DEFAULT_PATTERN: &'static str = "%m";

    /// Compile a pattern string.
    pub fn compile(pattern: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            let directive = chars.next().ok_or_else(|| {
                CoppiceError::log_config(format!("dangling '%' at end of format '{pattern}'"))
            })?;
            if directive == '%' {
                literal.push('%');
                continue;
            }
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(match directive {
                'd' => Segment::Date,
                't' => Segment::Time,
                's' => Segment::Severity,
                'm' => Segment::Message,
                other => {
                    return Err(CoppiceError::log_config(format!(
                        "unknown format directive '%{other}' in '{pattern}'"
                    )));
                }
            });
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Render one line at the current wall-clock time.
    #[must_use]
    pub fn render(&self, severity: Severity, message: &str) -> String {
        let unix_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs() as i64);
        self.render_at(severity, message, unix_secs)
    }

    fn render_at(&self, severity: Severity, message: &str, unix_secs: i64) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Date => {
                    let (y, m, d) = civil_from_days(unix_secs.div_euclid(86_400));
                    let _ = write!(out, "{y:04}-{m:02}-{d:02}");
                }
                Segment::Time => {
                    let tod = unix_secs.rem_euclid(86_400);
                    let _ = write!(
                        out,
                        "{:02}:{:02}:{:02}",
                        tod / 3600,
                        tod % 3600 / 60,
                        tod % 60
                    );
                }
                Segment::Severity => {
                    let _ = write!(out, "{severity}");
                }
                Segment::Message => out.push_str(message),
            }
        }
        out
    }
}

impl Default for LineFormat {
    fn default() -> Self {
        Self::compile(Self::DEFAULT_PATTERN).unwrap_or(Self {
            segments: vec![Segment::Message],
        })
    }
}

/// Days since the Unix epoch to a proleptic-Gregorian (year, month, day).
///
/// Integer form of the standard era/day-of-era decomposition; valid far
/// beyond any timestamp a logger will meet.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { yoe + era * 400 + 1 } else { yoe + era * 400 };
    (year, month as u32, day as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pattern_is_message_only() {
        let fmt = LineFormat::default();
        assert_eq!(fmt.render_at(Severity::Debug, "hello", 0), "hello");
    }

    #[test]
    fn full_pattern_renders_all_directives() {
        let fmt = LineFormat::compile("[%d %t][%s] %m").expect("pattern is valid");
        assert_eq!(
            fmt.render_at(Severity::Error, "disk on fire", 0),
            "[1970-01-01 00:00:00][ERROR] disk on fire"
        );
    }

    #[test]
    fn renders_a_modern_timestamp() {
        let fmt = LineFormat::compile("%d %t").expect("pattern is valid");
        // 2026-08-23 07:30:15 UTC.
        assert_eq!(
            fmt.render_at(Severity::Trace, "", 1_787_470_215),
            "2026-08-23 07:30:15"
        );
    }

    #[test]
    fn escaped_percent_is_literal() {
        let fmt = LineFormat::compile("100%% sure: %m").expect("pattern is valid");
        assert_eq!(fmt.render_at(Severity::Information, "yes", 0), "100% sure: yes");
    }

    #[test]
    fn unknown_directive_is_rejected_at_compile_time() {
        let err = LineFormat::compile("%q").expect_err("%q is not a directive");
        assert!(err.to_string().contains("unknown format directive '%q'"));
    }

    #[test]
    fn dangling_percent_is_rejected() {
        let err = LineFormat::compile("oops %").expect_err("trailing % is invalid");
        assert!(err.to_string().contains("dangling '%'"));
    }

    #[test]
    fn civil_conversion_handles_epoch_and_leap_years() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        // 2000-02-29 (leap day): 11_016 days after the epoch.
        assert_eq!(civil_from_days(11_016), (2000, 2, 29));
        // Day before the epoch.
        assert_eq!(civil_from_days(-1), (1969, 12, 31));
    }
}
