//! Load cash flow series from CSV
//!
//! Format: no header row, one series per line, variable length.
//! First field is the label, remaining fields are per-period amounts:
//!
//! ```text
//! project-a,-100,39,59,55,20
//! project-b,-100,110
//! ```
//!
//! Lines starting with `#` are skipped. Blank trailing fields are ignored;
//! a blank field before the last amount is a zero flow for that period.

use super::CashFlowSeries;
use csv::{ReaderBuilder, Trim};
use std::path::Path;
use thiserror::Error;

/// Errors reading cash flow input
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: cannot parse amount {value:?} for period {period}")]
    BadAmount {
        line: u64,
        period: usize,
        value: String,
    },

    #[error("Line {line}: series {label:?} has no cash flow amounts")]
    EmptyRow { line: u64, label: String },
}

/// Parse per-period amount fields. Trailing blanks are dropped, interior
/// blanks count as 0.0 so later amounts keep their period index.
fn parse_fields<'a, I>(fields: I, line: u64) -> Result<Vec<f64>, LoadError>
where
    I: IntoIterator<Item = &'a str>,
{
    let fields: Vec<&str> = fields.into_iter().map(str::trim).collect();
    let end = fields
        .iter()
        .rposition(|field| !field.is_empty())
        .map_or(0, |last| last + 1);

    fields[..end]
        .iter()
        .enumerate()
        .map(|(period, field)| {
            if field.is_empty() {
                return Ok(0.0);
            }
            field.parse::<f64>().map_err(|_| LoadError::BadAmount {
                line,
                period,
                value: field.to_string(),
            })
        })
        .collect()
}

/// Parse a comma-separated list of amounts, e.g. `"-100, 39, 59"`
pub fn parse_amounts(text: &str) -> Result<Vec<f64>, LoadError> {
    parse_fields(text.split(','), 1)
}

/// Load all series from a CSV file
pub fn load_series<P: AsRef<Path>>(path: P) -> Result<Vec<CashFlowSeries>, LoadError> {
    let file = std::fs::File::open(path)?;
    load_series_from_reader(file)
}

/// Load series from any reader (e.g., string buffer, stdin)
pub fn load_series_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<CashFlowSeries>, LoadError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut series = Vec::new();

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let mut fields = record.iter();
        let label = match fields.next() {
            Some(label) => label.to_string(),
            None => continue,
        };

        // Blank lines come through as a single empty field
        if label.is_empty() && record.len() == 1 {
            continue;
        }

        let amounts = parse_fields(fields, line)?;

        if amounts.is_empty() {
            return Err(LoadError::EmptyRow { line, label });
        }

        series.push(CashFlowSeries::new(label, amounts));
    }

    Ok(series)
}
