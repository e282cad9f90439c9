//! The in-memory table: named columns plus an optional timestamp row key.

use crate::error::{PipelineError, Result};
use crate::table::series::Series;
use crate::table::timestamp::{Precision, Timestamp, TimestampIndex};
use std::borrow::Cow;

/// Cell text treated as a missing number.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Parse a numeric cell, mapping missing-value markers to NaN.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if NA_MARKERS.contains(&text) {
        return Some(f64::NAN);
    }
    text.parse::<f64>().ok()
}

/// Format a float the way it should appear in output: shortest round-trip
/// form, `.0` kept on integral values, NaN as an empty cell.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{value:?}")
    }
}

/// Typed storage for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// Raw cell text, written back verbatim.
    Text(Vec<String>),
    Timestamp(Vec<Timestamp>),
    Float(Vec<f64>),
    Int(Vec<i64>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Text(v) => v.len(),
            ColumnValues::Timestamp(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Int(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<String>> for ColumnValues {
    fn from(values: Vec<String>) -> Self {
        ColumnValues::Text(values)
    }
}

impl From<Vec<Timestamp>> for ColumnValues {
    fn from(values: Vec<Timestamp>) -> Self {
        ColumnValues::Timestamp(values)
    }
}

impl From<Vec<f64>> for ColumnValues {
    fn from(values: Vec<f64>) -> Self {
        ColumnValues::Float(values)
    }
}

impl From<Vec<i64>> for ColumnValues {
    fn from(values: Vec<i64>) -> Self {
        ColumnValues::Int(values)
    }
}

impl From<Vec<u8>> for ColumnValues {
    fn from(values: Vec<u8>) -> Self {
        ColumnValues::Int(values.into_iter().map(i64::from).collect())
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: ColumnValues,
}

impl Column {
    pub fn new(name: impl Into<String>, values: impl Into<ColumnValues>) -> Self {
        Self {
            name: name.into(),
            values: values.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Render one cell for output.
    pub fn cell(&self, row: usize) -> Cow<'_, str> {
        self.renderer().cell(row)
    }

    /// A renderer for writing many cells of this column.
    pub fn renderer(&self) -> CellRenderer<'_> {
        let precision = match &self.values {
            ColumnValues::Timestamp(v) => Precision::for_values(v),
            _ => Precision::Seconds,
        };
        CellRenderer {
            values: &self.values,
            precision,
        }
    }
}

/// Renders the cells of one column, with timestamp precision fixed per column.
pub struct CellRenderer<'a> {
    values: &'a ColumnValues,
    precision: Precision,
}

impl<'a> CellRenderer<'a> {
    pub fn cell(&self, row: usize) -> Cow<'a, str> {
        match self.values {
            ColumnValues::Text(v) => Cow::Borrowed(v[row].as_str()),
            ColumnValues::Timestamp(v) => Cow::Owned(v[row].format(self.precision)),
            ColumnValues::Float(v) => Cow::Owned(format_float(v[row])),
            ColumnValues::Int(v) => Cow::Owned(v[row].to_string()),
        }
    }
}

/// Ordered named columns, all of the same length, with an optional row key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    index: Option<TimestampIndex>,
    rows: usize,
}

impl Table {
    /// Build a table from columns. All columns must have the same length and
    /// distinct names.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        for (i, column) in columns.iter().enumerate() {
            if column.len() != rows {
                return Err(PipelineError::LengthMismatch {
                    expected: rows,
                    actual: column.len(),
                });
            }
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(PipelineError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self {
            columns,
            index: None,
            rows,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn index(&self) -> Option<&TimestampIndex> {
        self.index.as_ref()
    }

    /// Promote a timestamp column to the row key, removing it from the
    /// regular columns.
    pub fn set_index(&mut self, name: &str) -> Result<()> {
        let position = self
            .columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))?;

        if !matches!(self.columns[position].values, ColumnValues::Timestamp(_)) {
            return Err(PipelineError::NotTimestampColumn(name.to_string()));
        }

        let column = self.columns.remove(position);
        if let ColumnValues::Timestamp(values) = column.values {
            self.index = Some(TimestampIndex::new(values));
        }
        Ok(())
    }

    /// Extract a column as floating point values labelled by the index.
    pub fn series_f64(&self, name: &str) -> Result<Series<f64>> {
        let index = self.index.clone().ok_or(PipelineError::IndexNotSet)?;
        let column = self
            .column(name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))?;

        let values = match &column.values {
            ColumnValues::Float(v) => v.clone(),
            ColumnValues::Int(v) => v.iter().map(|&x| x as f64).collect(),
            ColumnValues::Text(cells) => cells
                .iter()
                .enumerate()
                .map(|(row, cell)| {
                    parse_number(cell).ok_or_else(|| PipelineError::InvalidNumber {
                        column: name.to_string(),
                        row: row + 1,
                        value: cell.clone(),
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            ColumnValues::Timestamp(v) => {
                return Err(PipelineError::InvalidNumber {
                    column: name.to_string(),
                    row: 1,
                    value: v.first().map(Timestamp::to_string).unwrap_or_default(),
                })
            }
        };

        Series::new(index, values)
    }

    /// Insert a series as a new column at position `loc`.
    ///
    /// The series must carry the table's index.
    pub fn insert<T>(&mut self, loc: usize, name: &str, series: Series<T>) -> Result<()>
    where
        ColumnValues: From<Vec<T>>,
    {
        let index = self.index.as_ref().ok_or(PipelineError::IndexNotSet)?;
        if self.column(name).is_some() {
            return Err(PipelineError::DuplicateColumn(name.to_string()));
        }
        if !index.is_aligned_with(series.index()) {
            return Err(PipelineError::IndexMismatch(name.to_string()));
        }

        let loc = loc.min(self.columns.len());
        self.columns
            .insert(loc, Column::new(name, series.into_values()));
        Ok(())
    }

    /// Append a series as the last column.
    pub fn push_series<T>(&mut self, name: &str, series: Series<T>) -> Result<()>
    where
        ColumnValues: From<Vec<T>>,
    {
        self.insert(self.columns.len(), name, series)
    }
}
