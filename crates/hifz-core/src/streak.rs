//! Attendance and progress aggregation over a snapshot of memorization entries.
//!
//! Every function here is pure: the caller supplies the snapshot and the
//! "as of" day, and gets fresh totals back. Re-run after every store write.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entry::{Attendance, MemorizationEntry};
use crate::error::CoreError;

/// Totals and streaks derived from a user's entries.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StreakStats {
    pub total_pages: f64,
    pub total_hours: f64,
    pub total_days: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Number of distinct days per attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttendanceBreakdown {
    pub present: u32,
    pub absent: u32,
    pub partial: u32,
}

/// A record left out of a lenient computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub id: Uuid,
    pub date: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsReport {
    pub stats: StreakStats,
    pub attendance: AttendanceBreakdown,
    pub skipped: Vec<SkippedRecord>,
}

/// What to do with a record whose date does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedRecords {
    /// Fail the whole computation with `CoreError::InvalidDate`.
    Reject,
    /// Leave the record out, log a warning and list it in the report.
    #[default]
    SkipAndWarn,
}

/// Compute totals and streaks as of `as_of`.
///
/// Fails with `CoreError::InvalidDate` on the first entry whose date cannot be parsed.
pub fn compute_streak_stats(
    entries: &[MemorizationEntry],
    as_of: NaiveDate,
) -> Result<StreakStats, CoreError> {
    compute_stats_report(entries, as_of, MalformedRecords::Reject).map(|report| report.stats)
}

/// Like [`compute_streak_stats`], but malformed records are skipped and reported.
pub fn compute_streak_stats_lenient(
    entries: &[MemorizationEntry],
    as_of: NaiveDate,
) -> StatsReport {
    let mut skipped = Vec::new();
    let dated = entries
        .iter()
        .filter_map(|entry| match entry.day() {
            Ok(day) => Some((day, entry)),
            Err(e) => {
                tracing::warn!(
                    entry_id = %entry.id,
                    date = %entry.date,
                    "Skipping memorization entry: {}",
                    e
                );
                skipped.push(SkippedRecord {
                    id: entry.id,
                    date: entry.date.clone(),
                    reason: e.to_string(),
                });
                None
            }
        })
        .collect::<Vec<_>>();

    let (stats, attendance) = summarize(&dated, as_of);
    StatsReport {
        stats,
        attendance,
        skipped,
    }
}

/// Full report (stats plus attendance breakdown) under the given policy.
pub fn compute_stats_report(
    entries: &[MemorizationEntry],
    as_of: NaiveDate,
    policy: MalformedRecords,
) -> Result<StatsReport, CoreError> {
    match policy {
        MalformedRecords::SkipAndWarn => Ok(compute_streak_stats_lenient(entries, as_of)),
        MalformedRecords::Reject => {
            let dated = entries
                .iter()
                .map(|entry| entry.day().map(|day| (day, entry)))
                .collect::<Result<Vec<_>, _>>()?;
            let (stats, attendance) = summarize(&dated, as_of);
            Ok(StatsReport {
                stats,
                attendance,
                skipped: Vec::new(),
            })
        }
    }
}

fn summarize(
    dated: &[(NaiveDate, &MemorizationEntry)],
    as_of: NaiveDate,
) -> (StreakStats, AttendanceBreakdown) {
    let total_pages: f64 = dated.iter().map(|(_, e)| e.pages).sum();
    let total_minutes: u64 = dated.iter().map(|(_, e)| u64::from(e.time_minutes)).sum();

    // Later records for the same day win the attendance slot.
    let mut by_day: BTreeMap<NaiveDate, Attendance> = BTreeMap::new();
    for (day, entry) in dated {
        by_day.insert(*day, entry.attendance);
    }

    let mut attendance = AttendanceBreakdown::default();
    for status in by_day.values() {
        match status {
            Attendance::Present => attendance.present += 1,
            Attendance::Absent => attendance.absent += 1,
            Attendance::Partial => attendance.partial += 1,
        }
    }

    let days_desc: Vec<NaiveDate> = by_day.keys().rev().copied().collect();
    let current_streak = current_streak(&days_desc, as_of);
    let longest_streak = longest_streak(&days_desc, current_streak);

    let stats = StreakStats {
        total_pages,
        total_hours: total_minutes as f64 / 60.0,
        total_days: days_desc.len() as u32,
        current_streak,
        longest_streak,
    };
    (stats, attendance)
}

fn gap_days(later: NaiveDate, earlier: NaiveDate) -> i64 {
    later.signed_duration_since(earlier).num_days()
}

/// Run of consecutive days ending at the most recent entry, provided that entry
/// is no older than yesterday. `days_desc` must be distinct and sorted descending.
fn current_streak(days_desc: &[NaiveDate], as_of: NaiveDate) -> u32 {
    let Some(&most_recent) = days_desc.first() else {
        return 0;
    };
    if gap_days(as_of, most_recent) > 1 {
        return 0;
    }

    let mut streak = 1;
    for pair in days_desc.windows(2) {
        if gap_days(pair[0], pair[1]) == 1 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

fn longest_streak(days_desc: &[NaiveDate], current: u32) -> u32 {
    if days_desc.is_empty() {
        return 0;
    }

    let mut longest = 0;
    let mut running = 1;
    for pair in days_desc.windows(2) {
        if gap_days(pair[0], pair[1]) == 1 {
            running += 1;
        } else {
            longest = longest.max(running);
            running = 1;
        }
    }
    longest.max(running).max(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use proptest::prelude::*;

    fn day(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    }

    fn entry_on(date: NaiveDate, pages: f64, minutes: u32) -> MemorizationEntry {
        MemorizationEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date: date.format("%Y-%m-%d").to_string(),
            pages,
            time_minutes: minutes,
            attendance: Attendance::Present,
            notes: None,
        }
    }

    fn entries_on(offsets: &[u64]) -> Vec<MemorizationEntry> {
        offsets.iter().map(|&o| entry_on(day(o), 1.0, 30)).collect()
    }

    #[test]
    fn test_empty_is_all_zero() {
        let stats = compute_streak_stats(&[], day(10)).unwrap();
        assert_eq!(stats, StreakStats::default());
    }

    #[test]
    fn test_three_consecutive_days() {
        let stats = compute_streak_stats(&entries_on(&[0, 1, 2]), day(2)).unwrap();
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.longest_streak, 3);
        assert_eq!(stats.total_days, 3);
    }

    #[test]
    fn test_one_day_gap_breaks_streak() {
        let stats = compute_streak_stats(&entries_on(&[0, 2]), day(2)).unwrap();
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 1);
    }

    #[test]
    fn test_streak_counts_when_last_entry_was_yesterday() {
        let stats = compute_streak_stats(&entries_on(&[4, 5, 6]), day(7)).unwrap();
        assert_eq!(stats.current_streak, 3);
    }

    #[test]
    fn test_stale_history_has_no_current_streak() {
        let stats = compute_streak_stats(&entries_on(&[0, 1, 2, 3]), day(5)).unwrap();
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 4);
    }

    #[test]
    fn test_longest_run_in_the_middle() {
        let entries = entries_on(&[0, 1, 5, 6, 7, 8, 12, 13]);
        let stats = compute_streak_stats(&entries, day(13)).unwrap();
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 4);
    }

    #[test]
    fn test_longest_run_at_oldest_end_is_counted() {
        let entries = entries_on(&[0, 1, 2, 3, 4, 10]);
        let stats = compute_streak_stats(&entries, day(30)).unwrap();
        assert_eq!(stats.longest_streak, 5);
    }

    #[test]
    fn test_duplicate_dates_count_once() {
        let mut entries = entries_on(&[0, 1, 1, 2]);
        entries.push(entry_on(day(2), 0.5, 15));
        let stats = compute_streak_stats(&entries, day(2)).unwrap();

        assert_eq!(stats.total_days, 3);
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.longest_streak, 3);
        assert_eq!(stats.total_pages, 4.5);
    }

    #[test]
    fn test_totals() {
        let entries = vec![
            entry_on(day(0), 1.5, 45),
            entry_on(day(1), 0.5, 15),
            entry_on(day(3), 2.0, 60),
        ];
        let stats = compute_streak_stats(&entries, day(3)).unwrap();
        assert_eq!(stats.total_pages, 4.0);
        assert_eq!(stats.total_hours, 2.0);
        assert_eq!(stats.total_days, 3);
    }

    #[test]
    fn test_time_of_day_is_ignored() {
        let mut entries = entries_on(&[0]);
        entries.push(MemorizationEntry {
            date: "2024-01-02T23:45:00".to_string(),
            ..entry_on(day(1), 1.0, 10)
        });
        let stats = compute_streak_stats(&entries, day(1)).unwrap();
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn test_entry_after_as_of_counts_as_today() {
        let stats = compute_streak_stats(&entries_on(&[3, 4]), day(2)).unwrap();
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let mut entries = entries_on(&[0, 1]);
        entries.push(MemorizationEntry {
            date: "yesterday".to_string(),
            ..entry_on(day(0), 1.0, 10)
        });
        assert_eq!(
            compute_streak_stats(&entries, day(1)),
            Err(CoreError::InvalidDate("yesterday".to_string()))
        );
    }

    #[test]
    fn test_lenient_skips_and_reports() {
        let mut entries = entries_on(&[0, 1]);
        let bad = MemorizationEntry {
            date: "2024-13-40".to_string(),
            ..entry_on(day(0), 9.0, 90)
        };
        let bad_id = bad.id;
        entries.push(bad);

        let report = compute_streak_stats_lenient(&entries, day(1));
        assert_eq!(report.stats.total_days, 2);
        assert_eq!(report.stats.total_pages, 2.0);
        assert_eq!(report.stats.current_streak, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].id, bad_id);
        assert_eq!(report.skipped[0].date, "2024-13-40");
    }

    #[test]
    fn test_attendance_breakdown_per_distinct_day() {
        let mut entries = vec![
            entry_on(day(0), 1.0, 10),
            entry_on(day(1), 0.0, 0),
            entry_on(day(2), 0.5, 10),
        ];
        entries[1].attendance = Attendance::Absent;
        entries[2].attendance = Attendance::Partial;
        // Later record for day 0 overrides the earlier one.
        let mut dup = entry_on(day(0), 0.0, 0);
        dup.attendance = Attendance::Partial;
        entries.push(dup);

        let report = compute_stats_report(&entries, day(2), MalformedRecords::Reject).unwrap();
        assert_eq!(
            report.attendance,
            AttendanceBreakdown {
                present: 0,
                absent: 1,
                partial: 2,
            }
        );
        // Absent days still carry an entry, so they keep the streak alive.
        assert_eq!(report.stats.current_streak, 3);
    }

    proptest! {
        #[test]
        fn prop_streak_invariants(
            offsets in proptest::collection::vec(0u64..90, 0..60),
            as_of in 0u64..120,
        ) {
            let entries = entries_on(&offsets);
            let stats = compute_streak_stats(&entries, day(as_of)).unwrap();

            let mut distinct = offsets.clone();
            distinct.sort_unstable();
            distinct.dedup();

            prop_assert_eq!(stats.total_days as usize, distinct.len());
            prop_assert!(stats.longest_streak >= stats.current_streak);
            prop_assert!(stats.longest_streak <= stats.total_days);
        }

        #[test]
        fn prop_input_order_does_not_matter(
            offsets in proptest::collection::vec(0u64..60, 0..40),
            as_of in 0u64..70,
        ) {
            let entries = entries_on(&offsets);
            let mut reversed = entries.clone();
            reversed.reverse();

            let a = compute_streak_stats(&entries, day(as_of)).unwrap();
            let b = compute_streak_stats(&reversed, day(as_of)).unwrap();
            prop_assert_eq!(a.current_streak, b.current_streak);
            prop_assert_eq!(a.longest_streak, b.longest_streak);
            prop_assert_eq!(a.total_days, b.total_days);
        }
    }
}
