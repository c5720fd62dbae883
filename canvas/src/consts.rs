//! Shared constants for the canvas crate.

// ── Math ────────────────────────────────────────────────────────

/// 2π, a full circle sweep for `arc`.
pub const PI_2: f64 = std::f64::consts::PI * 2.0;

// ── Statistics ──────────────────────────────────────────────────

/// Number of trailing samples kept per metric.
pub const MAX_HISTORY: usize = 30;

/// Metric key carrying the run timestamp in a time update.
pub const TIME_KEY: &str = "time";

// ── Object defaults ─────────────────────────────────────────────

/// Default font for text objects.
pub const DEFAULT_FONT: &str = "12px sans-serif";

// ── Display labels ──────────────────────────────────────────────

/// Run-time label shown before any program has been opened.
pub const NO_PROGRAM_LABEL: &str = "No program loaded";

/// Run-time label shown once the engine reports the program halted.
pub const DONE_LABEL: &str = "Done";

// ── Viewport ────────────────────────────────────────────────────

/// Surface size assumed until the shell reports its own.
pub const DEFAULT_WIDTH: f64 = 800.0;
pub const DEFAULT_HEIGHT: f64 = 600.0;

// ── Console ─────────────────────────────────────────────────────

/// Console lines retained before the oldest are dropped.
pub const MAX_CONSOLE_LINES: usize = 500;
