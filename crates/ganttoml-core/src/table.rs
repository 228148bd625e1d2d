//! Derived plotting table.
//!
//! `Table::build` turns loaded records into one row per task with the
//! numeric columns the renderer needs: day offsets from the earliest start,
//! durations, completion-weighted bar lengths, a color per row, and a
//! stable vertical index per distinct task label. The table is rebuilt
//! fresh for every plot; nothing is cached across calls.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::Record;

/// RGBA color, each channel in 0.0..=1.0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }
}

/// Color for a completion percentage.
///
/// Exactly 60 falls into the red branch, and out-of-range values are not
/// validated: anything that is neither `== 100` nor strictly inside
/// (60, 100) is red.
pub fn completion_color(complete: i64) -> Rgba {
    if complete == 100 {
        Rgba::new(0.3, 0.3, 0.3, 1.0)
    } else if complete > 60 && complete < 100 {
        Rgba::new(0.0, 0.5, 0.3, complete as f64 / 100.0)
    } else {
        Rgba::new(0.7, 0.0, 0.0, 0.8)
    }
}

/// One derived row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableRow {
    pub task: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub complete: i64,
    /// Days between this row's start and the earliest start in the table.
    pub start_num: i64,
    /// Days between start and end.
    pub start_end: i64,
    /// `start_num + start_end`.
    pub end_num: i64,
    /// `start_end * complete / 100`: length of the solid progress bar.
    pub current_num: f64,
    pub color: Rgba,
    /// Vertical bar index: position of this task label among the distinct
    /// labels in final row order. Repeated labels reuse their first index.
    pub uid: usize,
}

/// The derived dataset for one plot invocation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

/// Table derivation error
#[derive(Debug, Error)]
pub enum TableError {
    #[error("no task records to plot")]
    Empty,
}

/// One x-axis tick: a day offset paired with its date label.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    pub offset: f64,
    pub date: NaiveDate,
}

impl Table {
    /// Derive the table from raw records.
    ///
    /// With `sort_by_start` the rows are stable-sorted ascending by start
    /// date before uid assignment, so "first seen" means post-sort order.
    /// An empty record set is rejected up front; every downstream
    /// computation divides by row aggregates.
    pub fn build(mut records: Vec<Record>, sort_by_start: bool) -> Result<Self, TableError> {
        let min_start = records
            .iter()
            .map(|r| r.start)
            .min()
            .ok_or(TableError::Empty)?;

        if sort_by_start {
            records.sort_by_key(|r| r.start);
        }

        let mut labels: Vec<String> = Vec::new();
        let rows = records
            .into_iter()
            .map(|record| {
                let start_num = (record.start - min_start).num_days();
                let start_end = (record.end - record.start).num_days();
                let uid = match labels.iter().position(|label| *label == record.task) {
                    Some(index) => index,
                    None => {
                        labels.push(record.task.clone());
                        labels.len() - 1
                    }
                };
                TableRow {
                    start_num,
                    start_end,
                    end_num: start_num + start_end,
                    current_num: start_end as f64 * record.complete as f64 / 100.0,
                    color: completion_color(record.complete),
                    uid,
                    task: record.task,
                    start: record.start,
                    end: record.end,
                    complete: record.complete,
                }
            })
            .collect();

        Ok(Self { rows })
    }

    /// Earliest start date across all rows.
    pub fn min_start(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|r| r.start).min()
    }

    /// Latest end date across all rows.
    pub fn max_end(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|r| r.end).max()
    }

    pub fn min_start_num(&self) -> i64 {
        self.rows.iter().map(|r| r.start_num).min().unwrap_or(0)
    }

    pub fn max_end_num(&self) -> i64 {
        self.rows.iter().map(|r| r.end_num).max().unwrap_or(0)
    }

    /// Longest single-row duration, used to pad the percent labels.
    pub fn max_duration(&self) -> i64 {
        self.rows.iter().map(|r| r.start_end).max().unwrap_or(0)
    }

    /// Number of distinct vertical positions.
    pub fn lane_count(&self) -> usize {
        self.rows.iter().map(|r| r.uid + 1).max().unwrap_or(0)
    }

    /// Evenly spaced x-axis ticks.
    ///
    /// Positions step by `(max(end_num) - min(start_num)) / count` from 0 up
    /// to (excluding) `max(end_num)`. Labels are `count` evenly spaced
    /// calendar dates from the earliest start to the latest end, paired with
    /// positions by index; the two sequences are computed independently,
    /// matching the historical axis layout.
    pub fn tick_marks(&self, count: usize) -> Vec<Tick> {
        let (Some(first), Some(last)) = (self.min_start(), self.max_end()) else {
            return Vec::new();
        };

        let span = (self.max_end_num() - self.min_start_num()) as f64;
        if count < 2 || span <= 0.0 {
            return vec![Tick {
                offset: 0.0,
                date: first,
            }];
        }

        let step = span / count as f64;
        let label_span = (last - first).num_days() as f64;
        let max_end = self.max_end_num() as f64;

        let mut ticks = Vec::with_capacity(count);
        for i in 0..count {
            let offset = i as f64 * step;
            if offset >= max_end {
                break;
            }
            let label_days = (i as f64 * label_span / (count - 1) as f64).round() as i64;
            ticks.push(Tick {
                offset,
                date: first + Duration::days(label_days),
            });
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn record(task: &str, start: NaiveDate, end: NaiveDate, complete: i64) -> Record {
        Record {
            task: task.into(),
            start,
            end,
            complete,
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            record("A", date(2018, 6, 27), date(2018, 6, 30), 55),
            record("B", date(2018, 6, 20), date(2018, 6, 28), 100),
            record("C", date(2018, 6, 25), date(2018, 7, 2), 70),
        ]
    }

    #[test]
    fn color_done_is_gray() {
        assert_eq!(completion_color(100), Rgba::new(0.3, 0.3, 0.3, 1.0));
    }

    #[test]
    fn color_in_progress_scales_alpha() {
        assert_eq!(completion_color(61), Rgba::new(0.0, 0.5, 0.3, 0.61));
        assert_eq!(completion_color(99), Rgba::new(0.0, 0.5, 0.3, 0.99));
    }

    #[test]
    fn color_boundary_60_is_red() {
        assert_eq!(completion_color(60), Rgba::new(0.7, 0.0, 0.0, 0.8));
    }

    #[test]
    fn color_zero_and_out_of_range_are_red() {
        let red = Rgba::new(0.7, 0.0, 0.0, 0.8);
        assert_eq!(completion_color(0), red);
        assert_eq!(completion_color(-5), red);
        assert_eq!(completion_color(120), red);
    }

    #[test]
    fn earliest_row_starts_at_zero() {
        let table = Table::build(sample(), true).unwrap();
        assert_eq!(table.rows[0].start_num, 0);
        assert_eq!(table.min_start_num(), 0);
    }

    #[test]
    fn sorts_ascending_by_start() {
        let table = Table::build(sample(), true).unwrap();
        let starts: Vec<NaiveDate> = table.rows.iter().map(|r| r.start).collect();
        assert_eq!(
            starts,
            vec![date(2018, 6, 20), date(2018, 6, 25), date(2018, 6, 27)]
        );
    }

    #[test]
    fn unsorted_keeps_input_order() {
        let table = Table::build(sample(), false).unwrap();
        let tasks: Vec<&str> = table.rows.iter().map(|r| r.task.as_str()).collect();
        assert_eq!(tasks, vec!["A", "B", "C"]);
        // start_num still measures from the global minimum
        assert_eq!(table.rows[0].start_num, 7);
        assert_eq!(table.rows[1].start_num, 0);
    }

    #[test]
    fn end_num_is_start_num_plus_duration() {
        let table = Table::build(sample(), true).unwrap();
        for row in &table.rows {
            assert_eq!(row.end_num, row.start_num + row.start_end);
            assert_eq!(row.start_end, (row.end - row.start).num_days());
        }
    }

    #[test]
    fn current_num_bounded_by_duration() {
        let table = Table::build(sample(), true).unwrap();
        for row in &table.rows {
            assert!(row.current_num >= 0.0);
            assert!(row.current_num <= row.start_end as f64);
        }
        // B: 8 days, 100% complete
        assert_eq!(table.rows[0].current_num, 8.0);
    }

    #[test]
    fn uid_counts_distinct_labels_in_row_order() {
        let mut records = sample();
        // A second "B" row later in time reuses B's uid
        records.push(record("B", date(2018, 7, 1), date(2018, 7, 3), 10));
        let table = Table::build(records, true).unwrap();

        let uids: Vec<(&str, usize)> = table
            .rows
            .iter()
            .map(|r| (r.task.as_str(), r.uid))
            .collect();
        assert_eq!(uids, vec![("B", 0), ("C", 1), ("A", 2), ("B", 0)]);
        assert_eq!(table.lane_count(), 3);
    }

    #[test]
    fn empty_records_are_rejected() {
        assert!(matches!(
            Table::build(Vec::new(), true),
            Err(TableError::Empty)
        ));
    }

    #[test]
    fn tick_marks_cover_the_span() {
        let table = Table::build(sample(), true).unwrap();
        let ticks = table.tick_marks(10);
        assert_eq!(ticks.len(), 10);
        assert_eq!(ticks[0].offset, 0.0);
        assert_eq!(ticks[0].date, date(2018, 6, 20));
        // Last label reaches the maximum end date
        assert_eq!(ticks[9].date, date(2018, 7, 2));
        // Positions stay strictly below max(end_num)
        let max_end = table.max_end_num() as f64;
        assert!(ticks.iter().all(|t| t.offset < max_end));
    }

    #[test]
    fn tick_marks_degenerate_span() {
        let day = date(2020, 3, 3);
        let table = Table::build(vec![record("A", day, day, 50)], true).unwrap();
        let ticks = table.tick_marks(10);
        assert_eq!(ticks, vec![Tick { offset: 0.0, date: day }]);
    }
}
