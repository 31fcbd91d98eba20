//! Sink implementations.
//!
//! All sinks follow the same contract: a failed write is counted and
//! surfaced once through `tracing`, never returned to the logging caller.

use std::collections::{HashMap, VecDeque};
use std::fs::OpenOptions;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Weak};

use parking_lot::Mutex;

use coppice_error::Result;

use crate::{LogSink, Severity};

// ── Drop accounting ──────────────────────────────────────────────────────

static LINES_DROPPED_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Total lines dropped process-wide because a sink write failed.
#[must_use]
pub fn dropped_lines_total() -> u64 {
    LINES_DROPPED_TOTAL.load(Ordering::Relaxed)
}

/// Reset the dropped-line counter.
pub fn reset_dropped_lines() {
    LINES_DROPPED_TOTAL.store(0, Ordering::Relaxed);
}

fn note_dropped(sink: &str, err: &io::Error) {
    LINES_DROPPED_TOTAL.fetch_add(1, Ordering::Relaxed);
    tracing::warn!(sink, error = %err, "log sink dropped a line");
}

// ── File sink ────────────────────────────────────────────────────────────

struct SharedFile {
    path: PathBuf,
    file: Mutex<std::fs::File>,
}

/// One open stream per absolute path, shared by every [`FileSink`] on it.
/// Entries are weak so the stream closes when the last sink drops, and the
/// path starts fresh (truncated) if it is ever opened again.
static FILE_REGISTRY: LazyLock<Mutex<HashMap<PathBuf, Weak<SharedFile>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// A sink appending formatted lines to a file.
///
/// The first sink to open a path in this process creates or truncates the
/// file; later sinks on the same path join the existing stream, so lines
/// from different loggers land whole, in write order.
#[derive(Clone)]
pub struct FileSink {
    shared: Arc<SharedFile>,
}

impl FileSink {
    /// Open (or join) the shared stream for `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let key = std::path::absolute(path.as_ref())?;
        let mut registry = FILE_REGISTRY.lock();
        if let Some(existing) = registry.get(&key).and_then(Weak::upgrade) {
            return Ok(Self { shared: existing });
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&key)?;
        let shared = Arc::new(SharedFile {
            path: key.clone(),
            file: Mutex::new(file),
        });
        registry.insert(key, Arc::downgrade(&shared));
        Ok(Self { shared })
    }

    /// The absolute path this sink writes to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.shared.path
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink")
            .field("path", &self.shared.path)
            .finish()
    }
}

impl LogSink for FileSink {
    fn write_line(&self, _severity: Severity, line: &str) {
        let mut file = self.shared.file.lock();
        if let Err(err) = writeln!(file, "{line}") {
            note_dropped(&self.shared.path.to_string_lossy(), &err);
        }
    }
}

// ── Console sink ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsoleTarget {
    Stdout,
    Stderr,
}

/// A sink writing lines to the process console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleSink {
    target: ConsoleTarget,
}

impl ConsoleSink {
    /// Write to standard output.
    #[must_use]
    pub const fn stdout() -> Self {
        Self {
            target: ConsoleTarget::Stdout,
        }
    }

    /// Write to standard error.
    #[must_use]
    pub const fn stderr() -> Self {
        Self {
            target: ConsoleTarget::Stderr,
        }
    }

    const fn target_name(self) -> &'static str {
        match self.target {
            ConsoleTarget::Stdout => "<stdout>",
            ConsoleTarget::Stderr => "<stderr>",
        }
    }
}

impl LogSink for ConsoleSink {
    fn write_line(&self, _severity: Severity, line: &str) {
        let result = match self.target {
            ConsoleTarget::Stdout => writeln!(io::stdout().lock(), "{line}"),
            ConsoleTarget::Stderr => writeln!(io::stderr().lock(), "{line}"),
        };
        if let Err(err) = result {
            note_dropped(self.target_name(), &err);
        }
    }
}

// ── Tracing bridge ───────────────────────────────────────────────────────

/// Forwards lines into the `tracing` ecosystem instead of a local stream,
/// mapping [`Severity`] onto [`tracing::Level`]. `Critical` has no level of
/// its own; it becomes an error event carrying a `critical` marker field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write_line(&self, severity: Severity, line: &str) {
        match severity {
            Severity::Trace => tracing::trace!(target: "coppice", "{line}"),
            Severity::Debug => tracing::debug!(target: "coppice", "{line}"),
            Severity::Information => tracing::info!(target: "coppice", "{line}"),
            Severity::Warning => tracing::warn!(target: "coppice", "{line}"),
            Severity::Error => tracing::error!(target: "coppice", "{line}"),
            Severity::Critical => tracing::error!(target: "coppice", critical = true, "{line}"),
        }
    }
}

// ── Memory sink ──────────────────────────────────────────────────────────

/// A bounded in-memory ring of the most recent lines.
///
/// Primarily test support: attach one through an `Arc`, run the code under
/// test, then inspect [`MemorySink::snapshot`]. The ring keeps the last
/// `capacity` lines and silently evicts the oldest.
pub struct MemorySink {
    capacity: usize,
    lines: Mutex<VecDeque<(Severity, String)>>,
}

impl MemorySink {
    /// Default ring capacity.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Create a ring holding at most `capacity` lines.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            lines: Mutex::new(VecDeque::new()),
        }
    }

    /// Copy out the buffered lines, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(Severity, String)> {
        self.lines.lock().iter().cloned().collect()
    }

    /// Number of buffered lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Whether the ring holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    /// Drop all buffered lines.
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for MemorySink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySink")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, severity: Severity, line: &str) {
        let mut lines = self.lines.lock();
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back((severity, line.to_owned()));
    }
}
