//! Capture Registry: the set of `CapturePoint`s a host wires up, ordered
//! by priority at registration time and brought up/down in lockstep.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{error, info, warn};

/// Per-point error, swallowed by the registry at init/shutdown time
/// (logged, never propagated — one misbehaving capture point must not
/// take the others down with it).
#[derive(Debug, Clone, thiserror::Error)]
#[error("capture point '{point_id}' failed: {message}")]
pub struct CapturePointError {
    pub point_id: String,
    pub message: String,
}

/// Running counters for one capture point.
#[derive(Debug, Default)]
pub struct CaptureStats {
    pub total_captured: AtomicU64,
    pub filtered: AtomicU64,
    pub sampled: AtomicU64,
    pub total_capture_time_ms: AtomicU64,
    pub error_count: AtomicU64,
}

impl CaptureStats {
    pub fn snapshot(&self) -> CaptureStatsSnapshot {
        CaptureStatsSnapshot {
            total_captured: self.total_captured.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
            sampled: self.sampled.load(Ordering::Relaxed),
            total_capture_time_ms: self.total_capture_time_ms.load(Ordering::Relaxed),
            error_count: self.error_count.load(Ordering::Relaxed),
        }
    }

    pub fn record_capture(&self, duration_ms: u64) {
        self.total_captured.fetch_add(1, Ordering::Relaxed);
        self.total_capture_time_ms.fetch_add(duration_ms, Ordering::Relaxed);
    }

    pub fn record_filtered(&self) {
        self.filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sampled(&self) {
        self.sampled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }
}

/// An immutable snapshot of [`CaptureStats`] suitable for reporting.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct CaptureStatsSnapshot {
    pub total_captured: u64,
    pub filtered: u64,
    pub sampled: u64,
    pub total_capture_time_ms: u64,
    pub error_count: u64,
}

impl std::ops::Add for CaptureStatsSnapshot {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            total_captured: self.total_captured + rhs.total_captured,
            filtered: self.filtered + rhs.filtered,
            sampled: self.sampled + rhs.sampled,
            total_capture_time_ms: self.total_capture_time_ms + rhs.total_capture_time_ms,
            error_count: self.error_count + rhs.error_count,
        }
    }
}

/// A registered origin of events. A `CapturePoint` itself does nothing
/// beyond identity, priority, and lifecycle hooks the registry invokes;
/// the actual host-side hook wiring is a consumer concern.
pub struct CapturePoint {
    pub id: String,
    pub description: String,
    pub initialization_priority: i32,
    enabled: bool,
    stats: CaptureStats,
    on_initialize: Option<Box<dyn FnMut() -> Result<(), String> + Send>>,
    on_shutdown: Option<Box<dyn FnMut() -> Result<(), String> + Send>>,
}

impl CapturePoint {
    pub fn new(id: impl Into<String>, description: impl Into<String>, initialization_priority: i32) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            initialization_priority,
            enabled: true,
            stats: CaptureStats::default(),
            on_initialize: None,
            on_shutdown: None,
        }
    }

    pub fn with_initialize<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> Result<(), String> + Send + 'static,
    {
        self.on_initialize = Some(Box::new(f));
        self
    }

    pub fn with_shutdown<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> Result<(), String> + Send + 'static,
    {
        self.on_shutdown = Some(Box::new(f));
        self
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn stats(&self) -> &CaptureStats {
        &self.stats
    }
}

/// Registry of capture points. Registration sorts by descending
/// `initialization_priority`; `initialize_all` walks that order,
/// `shutdown_all` walks it in reverse. Per-point failures are logged and
/// do not stop the remaining points from running.
#[derive(Default)]
pub struct CaptureRegistry {
    points: Vec<CapturePoint>,
}

impl CaptureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a point, re-sorting by descending priority.
    pub fn register(&mut self, point: CapturePoint) {
        self.points.push(point);
        self.points
            .sort_by(|a, b| b.initialization_priority.cmp(&a.initialization_priority));
    }

    pub fn points(&self) -> &[CapturePoint] {
        &self.points
    }

    pub fn find(&self, id: &str) -> Option<&CapturePoint> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut CapturePoint> {
        self.points.iter_mut().find(|p| p.id == id)
    }

    /// Initialize every enabled point in priority order. A point whose
    /// hook errors is logged and skipped; the rest still run.
    pub fn initialize_all(&mut self) -> Vec<CapturePointError> {
        let mut errors = Vec::new();
        for point in self.points.iter_mut() {
            if !point.enabled {
                continue;
            }
            if let Some(hook) = point.on_initialize.as_mut() {
                if let Err(message) = hook() {
                    point.stats.record_error();
                    error!(point_id = %point.id, %message, "capture point failed to initialize");
                    errors.push(CapturePointError {
                        point_id: point.id.clone(),
                        message,
                    });
                    continue;
                }
            }
            info!(point_id = %point.id, "capture point initialized");
        }
        errors
    }

    /// Shut down every enabled point in reverse priority order.
    pub fn shutdown_all(&mut self) -> Vec<CapturePointError> {
        let mut errors = Vec::new();
        for point in self.points.iter_mut().rev() {
            if !point.enabled {
                continue;
            }
            if let Some(hook) = point.on_shutdown.as_mut() {
                if let Err(message) = hook() {
                    point.stats.record_error();
                    warn!(point_id = %point.id, %message, "capture point failed to shut down cleanly");
                    errors.push(CapturePointError {
                        point_id: point.id.clone(),
                        message,
                    });
                    continue;
                }
            }
            info!(point_id = %point.id, "capture point shut down");
        }
        errors
    }

    /// Aggregate statistics across every registered point.
    pub fn aggregate_stats(&self) -> CaptureStatsSnapshot {
        self.points
            .iter()
            .map(|p| p.stats().snapshot())
            .fold(CaptureStatsSnapshot::default(), |acc, s| acc + s)
    }
}
