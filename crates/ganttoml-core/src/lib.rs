//! # ganttoml-core
//!
//! Domain model for ganttoml: loading task records from TOML and deriving
//! the numeric table the chart renderer draws from.
//!
//! This crate provides:
//! - `Record`: one task's raw input data (label, start, end, completion %)
//! - `load_records` / `parse_records`: ordered record-id -> `Record` loading
//! - `Table`: the derived dataset with computed plotting columns
//! - `completion_color`: the completion-status color rule
//!
//! ## Example
//!
//! ```rust
//! use ganttoml_core::{parse_records, Table};
//!
//! let input = r#"
//! [1]
//! task = "Design"
//! start = 2018-06-20
//! end = 2018-06-25
//! complete = 80
//! "#;
//!
//! let records = parse_records(input).unwrap();
//! let table = Table::build(records.into_iter().map(|(_, r)| r).collect(), true).unwrap();
//! assert_eq!(table.rows[0].start_num, 0);
//! ```

pub mod table;

pub use table::{completion_color, Rgba, Table, TableError, TableRow, Tick};

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml::Value;

/// Identifier keying one record's TOML table (`[1]`, `[backend]`, ...)
pub type RecordId = String;

/// One task's raw input data, as read from the source file.
///
/// Task labels are not required to be unique; repeated labels share a
/// vertical position in the rendered chart.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Record {
    pub task: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Completion percentage. Expected 0-100 but not validated; out-of-range
    /// values flow through the color rule's red branch.
    pub complete: i64,
}

/// Loading error
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("record {id}: expected a table of task fields")]
    NotATable { id: String },

    #[error("record {id}: missing or invalid field `{field}`")]
    Field { id: String, field: &'static str },

    #[error("record {id}: `{field}` is not a calendar date")]
    NotADate { id: String, field: &'static str },
}

/// Load all records from a TOML file, preserving file order.
///
/// The file holds one top-level table per record, keyed by an arbitrary
/// identifier:
///
/// ```toml
/// [1]
/// task = "Design"
/// start = 2018-06-20
/// end = 2018-06-25
/// complete = 80
/// ```
pub fn load_records(path: &Path) -> Result<Vec<(RecordId, Record)>, LoadError> {
    let input = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&input)
}

/// Parse records from TOML text, preserving input order.
pub fn parse_records(input: &str) -> Result<Vec<(RecordId, Record)>, LoadError> {
    let root: toml::Table = input.parse()?;
    let mut records = Vec::with_capacity(root.len());
    for (id, value) in &root {
        records.push((id.clone(), record_from_value(id, value)?));
    }
    Ok(records)
}

fn record_from_value(id: &str, value: &Value) -> Result<Record, LoadError> {
    let fields = value.as_table().ok_or_else(|| LoadError::NotATable {
        id: id.to_string(),
    })?;

    let task = field(id, fields, "task", Value::as_str)?.to_string();
    let start = date_field(id, fields, "start")?;
    let end = date_field(id, fields, "end")?;
    let complete = field(id, fields, "complete", Value::as_integer)?;

    Ok(Record {
        task,
        start,
        end,
        complete,
    })
}

fn field<'a, T>(
    id: &str,
    fields: &'a toml::Table,
    name: &'static str,
    as_type: impl Fn(&'a Value) -> Option<T>,
) -> Result<T, LoadError> {
    fields
        .get(name)
        .and_then(as_type)
        .ok_or_else(|| LoadError::Field {
            id: id.to_string(),
            field: name,
        })
}

/// Read a date field. TOML date and datetime values are accepted (datetimes
/// truncate to their date part), as are `YYYY-MM-DD` strings.
fn date_field(id: &str, fields: &toml::Table, name: &'static str) -> Result<NaiveDate, LoadError> {
    let not_a_date = || LoadError::NotADate {
        id: id.to_string(),
        field: name,
    };

    match fields.get(name) {
        Some(Value::Datetime(dt)) => {
            let date = dt.date.ok_or_else(not_a_date)?;
            NaiveDate::from_ymd_opt(i32::from(date.year), u32::from(date.month), u32::from(date.day))
                .ok_or_else(not_a_date)
        }
        Some(Value::String(s)) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| not_a_date())
        }
        Some(_) => Err(not_a_date()),
        None => Err(LoadError::Field {
            id: id.to_string(),
            field: name,
        }),
    }
}
