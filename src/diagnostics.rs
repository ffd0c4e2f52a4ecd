// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Diagnostics sink for long-running germ selection.
//!
//! The optimizer and the Jacobian engine report through a [`Diagnostics`]
//! value passed in by the caller instead of writing to a global logger.
//! [`TracingDiagnostics`] forwards to `tracing`; [`RecordingDiagnostics`]
//! keeps everything in memory for inspection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

/// Receiver for leveled messages, warnings, progress and stop requests.
pub trait Diagnostics: Send + Sync {
    /// Emit `message` if `level` is within the sink's verbosity (1 = coarse).
    fn log(&self, level: u8, message: &str);

    /// Report a non-fatal numerical inconsistency.
    fn warn(&self, message: &str);

    /// Report progress through an iterative loop.
    fn progress(&self, iteration: usize, total: usize, suffix: &str);

    /// Whether the caller asked the run to stop early.
    fn interrupted(&self) -> bool {
        false
    }
}

/// Cloneable stop request shared with a running optimizer.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Diagnostics forwarded to `tracing`.
///
/// Verbosity 1 maps to `info`, 2 to `debug`, 3 and above to `trace`;
/// messages above the configured verbosity are dropped.
#[derive(Debug, Clone, Default)]
pub struct TracingDiagnostics {
    verbosity: u8,
    stop: Option<StopFlag>,
}

impl TracingDiagnostics {
    pub fn new(verbosity: u8) -> Self {
        Self {
            verbosity,
            stop: None,
        }
    }

    /// Attach a stop flag polled by [`Diagnostics::interrupted`].
    pub fn with_stop_flag(mut self, flag: StopFlag) -> Self {
        self.stop = Some(flag);
        self
    }
}

impl Diagnostics for TracingDiagnostics {
    fn log(&self, level: u8, message: &str) {
        if level > self.verbosity {
            return;
        }
        match level {
            0 | 1 => info!("{}", message),
            2 => debug!("{}", message),
            _ => trace!("{}", message),
        }
    }

    fn warn(&self, message: &str) {
        warn!("{}", message);
    }

    fn progress(&self, iteration: usize, total: usize, suffix: &str) {
        if self.verbosity == 0 {
            return;
        }
        info!(iteration, total, "{}", suffix);
    }

    fn interrupted(&self) -> bool {
        self.stop.as_ref().is_some_and(StopFlag::is_set)
    }
}

/// A message captured by [`RecordingDiagnostics`].
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Log { level: u8, message: String },
    Warning(String),
    Progress { iteration: usize, total: usize },
}

/// In-memory sink; optionally requests a stop after a number of
/// progress reports.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    records: Mutex<Vec<Record>>,
    stop_after_progress: Option<usize>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `interrupted()` once `count` progress calls have been seen.
    pub fn stopping_after(count: usize) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            stop_after_progress: Some(count),
        }
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter_map(|r| match r {
                Record::Warning(w) => Some(w.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether any logged message contains `needle`.
    pub fn logged(&self, needle: &str) -> bool {
        self.records.lock().iter().any(|r| match r {
            Record::Log { message, .. } => message.contains(needle),
            _ => false,
        })
    }

    fn progress_count(&self) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| matches!(r, Record::Progress { .. }))
            .count()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn log(&self, level: u8, message: &str) {
        self.records.lock().push(Record::Log {
            level,
            message: message.to_string(),
        });
    }

    fn warn(&self, message: &str) {
        self.records.lock().push(Record::Warning(message.to_string()));
    }

    fn progress(&self, iteration: usize, total: usize, _suffix: &str) {
        self.records
            .lock()
            .push(Record::Progress { iteration, total });
    }

    fn interrupted(&self) -> bool {
        self.stop_after_progress
            .is_some_and(|limit| self.progress_count() >= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_flag_shared_between_clones() {
        let flag = StopFlag::new();
        let diag = TracingDiagnostics::new(1).with_stop_flag(flag.clone());
        assert!(!diag.interrupted());
        flag.request_stop();
        assert!(diag.interrupted());
    }

    #[test]
    fn test_tracing_diagnostics_without_flag_never_interrupts() {
        let diag = TracingDiagnostics::new(3);
        diag.log(1, "hello");
        diag.progress(1, 10, "iter");
        assert!(!diag.interrupted());
    }

    #[test]
    fn test_recording_diagnostics_captures_everything() {
        let diag = RecordingDiagnostics::new();
        diag.log(1, "Starting search");
        diag.warn("bulk and single derivatives differ");
        diag.progress(3, 100, "");
        assert_eq!(diag.records().len(), 3);
        assert_eq!(diag.warnings(), vec!["bulk and single derivatives differ"]);
        assert!(diag.logged("Starting"));
        assert!(!diag.logged("Stationary"));
    }

    #[test]
    fn test_recording_diagnostics_stop_after() {
        let diag = RecordingDiagnostics::stopping_after(2);
        diag.progress(0, 5, "");
        assert!(!diag.interrupted());
        diag.progress(1, 5, "");
        assert!(diag.interrupted());
    }
}
