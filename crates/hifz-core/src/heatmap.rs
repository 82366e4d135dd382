use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::entry::MemorizationEntry;

/// Twelve weeks.
pub const DEFAULT_HEATMAP_DAYS: u32 = 84;

pub const MAX_HEATMAP_DAYS: u32 = 366;

/// One day of the activity heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub pages: f64,
    pub intensity: u8,
}

/// Intensity bucket (0-4) for the pages memorized on a day.
pub fn intensity_for(pages: f64) -> u8 {
    match pages {
        p if p <= 0.0 => 0,
        p if p <= 3.0 => 1,
        p if p <= 7.0 => 2,
        p if p <= 10.0 => 3,
        _ => 4,
    }
}

/// One cell per day for the `days` days ending at `as_of`, oldest first.
///
/// Entries with unparsable dates are skipped with a warning; `days` is clamped
/// to `1..=366`.
pub fn compute_heatmap(
    entries: &[MemorizationEntry],
    as_of: NaiveDate,
    days: u32,
) -> Vec<HeatmapCell> {
    let days = days.clamp(1, MAX_HEATMAP_DAYS);
    let Some(start) = as_of.checked_sub_days(Days::new(u64::from(days - 1))) else {
        return Vec::new();
    };

    let mut pages_by_day: HashMap<NaiveDate, f64> = HashMap::new();
    for entry in entries {
        match entry.day() {
            Ok(day) if day >= start && day <= as_of => {
                *pages_by_day.entry(day).or_insert(0.0) += entry.pages;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(entry_id = %entry.id, "Skipping entry in heatmap: {}", e);
            }
        }
    }

    start
        .iter_days()
        .take(days as usize)
        .map(|date| {
            let pages = pages_by_day.get(&date).copied().unwrap_or(0.0);
            HeatmapCell {
                date,
                pages,
                intensity: intensity_for(pages),
            }
        })
        .collect()
}
