//! Delimited text loading.
//!
//! Reads a CSV file with a header row into a [`Table`]. Every column is kept
//! as raw text except the ones named in [`LoadOptions::parse_dates`], which
//! are parsed into timestamps.

use crate::error::{PipelineError, Result};
use crate::table::{Column, Table, Timestamp};
use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Options controlling how a file is loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Columns to parse as timestamps
    pub parse_dates: Vec<String>,
    /// Encoding label (`utf-8`, `sjis`, `windows-1252`, ...); UTF-8 if unset
    pub encoding: Option<String>,
    /// Field delimiter
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            parse_dates: vec!["timestamp".to_string()],
            encoding: None,
            delimiter: b',',
        }
    }
}

/// Load a delimited file from disk.
pub fn load_csv(path: &Path, options: &LoadOptions) -> Result<Table> {
    let bytes = std::fs::read(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = decode(&bytes, options.encoding.as_deref(), path)?;

    tracing::debug!(
        path = %path.display(),
        bytes = bytes.len(),
        "Decoded input file"
    );

    read_table(text.as_bytes(), options, path)
}

/// Parse already-decoded delimited text. `path` is only used in errors.
pub fn read_table<R: Read>(input: R, options: &LoadOptions, path: &Path) -> Result<Table> {
    let csv_error = |source: csv::Error| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(input);

    let headers = reader.headers().map_err(csv_error)?.clone();
    if headers.is_empty() {
        return Err(PipelineError::EmptyInput(path.to_path_buf()));
    }
    let names = dedupe_headers(headers.iter());

    for wanted in &options.parse_dates {
        if !names.iter().any(|name| name == wanted) {
            return Err(PipelineError::MissingColumn(wanted.clone()));
        }
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        for (column, field) in cells.iter_mut().zip(record.iter()) {
            column.push(field.to_string());
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| {
            if options.parse_dates.contains(&name) {
                let stamps = parse_timestamps(&name, &values)?;
                Ok(Column::new(name, stamps))
            } else {
                Ok(Column::new(name, values))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let table = Table::from_columns(columns)?;
    tracing::debug!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        "Loaded table"
    );
    Ok(table)
}

/// Resolve an encoding label and decode `bytes`. A byte order mark, if
/// present, wins over the label and is stripped.
fn decode<'a>(bytes: &'a [u8], label: Option<&str>, path: &Path) -> Result<Cow<'a, str>> {
    let encoding = match label {
        Some(label) => Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| PipelineError::UnknownEncoding(label.to_string()))?,
        None => UTF_8,
    };

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(PipelineError::Decode {
            path: path.to_path_buf(),
            encoding: used.name().to_string(),
        });
    }
    Ok(text)
}

/// Rename repeated headers `a, a, a` to `a, a.1, a.2`.
fn dedupe_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    headers
        .map(|header| {
            let mut name = header.to_string();
            let mut count = counts.get(&name).copied().unwrap_or(0);
            while count > 0 {
                counts.insert(name.clone(), count + 1);
                name = format!("{name}.{count}");
                count = counts.get(&name).copied().unwrap_or(0);
            }
            counts.insert(name.clone(), count + 1);
            name
        })
        .collect()
}

fn parse_timestamps(column: &str, values: &[String]) -> Result<Vec<Timestamp>> {
    values
        .iter()
        .enumerate()
        .map(|(row, value)| {
            Timestamp::parse(value).ok_or_else(|| PipelineError::InvalidTimestamp {
                column: column.to_string(),
                row: row + 1,
                value: value.clone(),
            })
        })
        .collect()
}
