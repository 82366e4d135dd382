//! Hifz Core - Memorization progress aggregation and Qibla direction.
//!
//! Pure domain logic: nothing here performs I/O or reads the clock. The
//! storage trait is the only seam to the outside world.

pub mod entry;
pub mod error;
pub mod heatmap;
pub mod qibla;
pub mod storage;
pub mod streak;
pub mod validation;

// Re-exports for convenience
pub use entry::{format_day, parse_entry_date, Attendance, EntryDraft, MemorizationEntry};
pub use error::{CoreError, ValidationError};
pub use heatmap::{compute_heatmap, HeatmapCell, DEFAULT_HEATMAP_DAYS};
pub use qibla::{
    compass_heading_from_alpha, compute_qibla_bearing, compute_relative_heading,
    normalize_degrees, relative_heading_stream, Bearing, GeoPoint, HeadingTracker, KAABA,
};
pub use storage::{EntryStore, UpsertOutcome};
pub use streak::{
    compute_stats_report, compute_streak_stats, compute_streak_stats_lenient,
    AttendanceBreakdown, MalformedRecords, SkippedRecord, StatsReport, StreakStats,
};
pub use validation::Validator;

#[cfg(any(test, feature = "test-utils"))]
pub use storage::memory::InMemoryEntryStore;
