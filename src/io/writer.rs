//! Delimited text output.

use crate::error::{PipelineError, Result};
use crate::table::{Precision, Table};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Options controlling how a table is written.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Header cell for the index column; empty when unset
    pub index_label: Option<String>,
    /// Field delimiter
    pub delimiter: u8,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            index_label: None,
            delimiter: b',',
        }
    }
}

/// Write `table` to `path`, creating or truncating the file.
pub fn write_csv(table: &Table, path: &Path, options: &WriteOptions) -> Result<()> {
    let file = File::create(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::new(file);
    write_table(table, &mut out, options, path)?;
    out.flush().map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), rows = table.num_rows(), "Wrote table");
    Ok(())
}

/// Serialize `table` into any writer: header first, then one record per row
/// with the index (if any) as the leading field.
pub fn write_table<W: Write>(
    table: &Table,
    out: W,
    options: &WriteOptions,
    path: &Path,
) -> Result<()> {
    let csv_error = |source: csv::Error| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(out);

    let index = table.index();
    let precision = index.map(|i| i.precision()).unwrap_or(Precision::Seconds);

    let mut header: Vec<&str> = Vec::with_capacity(table.num_columns() + 1);
    if index.is_some() {
        header.push(options.index_label.as_deref().unwrap_or(""));
    }
    header.extend(table.column_names());
    writer.write_record(&header).map_err(csv_error)?;

    let renderers: Vec<_> = table.columns().iter().map(|c| c.renderer()).collect();
    let mut record: Vec<String> = Vec::with_capacity(header.len());
    for row in 0..table.num_rows() {
        record.clear();
        if let Some(index) = index {
            record.push(index[row].format(precision));
        }
        record.extend(renderers.iter().map(|r| r.cell(row).into_owned()));
        writer.write_record(&record).map_err(csv_error)?;
    }

    writer.flush().map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
