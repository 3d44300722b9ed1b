// src/core/table.rs

//! A small in-memory table and its CSV encoding.
//!
//! Tables are written without an index column. Text cells are always quoted so
//! that they read back as text; unquoted fields are type-inferred on read.

use std::fmt;
use thiserror::Error;

/// Errors raised while building or decoding a table.
#[derive(Error, Debug)]
pub enum TableError {
    /// A row does not have one cell per column.
    #[error("Row {row} has {found} cells but the table has {expected} columns.")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// The input ended inside a quoted field.
    #[error("Unterminated quoted field on line {line}.")]
    UnterminatedQuote { line: usize },
    /// Text followed a closing quote before the next separator.
    #[error("Unexpected character after closing quote on line {line}.")]
    TrailingAfterQuote { line: usize },
    /// The bytes read back are not UTF-8.
    #[error("Table data is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A single table value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// A missing value, written as an empty field.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// Text, always quoted on write.
    Text(String),
}

impl Cell {
    /// Infers the type of an unquoted CSV field.
    fn infer(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::Null;
        }
        match raw {
            "true" | "True" => return Self::Bool(true),
            "false" | "False" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            return Self::Float(f);
        }
        Self::Text(raw.to_string())
    }

    fn write_csv(&self, out: &mut String) {
        match self {
            Self::Null => {}
            Self::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Self::Int(i) => out.push_str(&i.to_string()),
            // Debug keeps the fractional part (`1.0`), so the value reads back as a float.
            Self::Float(f) => out.push_str(&format!("{:?}", f)),
            Self::Text(s) => write_quoted(s, out),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Cell {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Self>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Rows of cells under named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Creates an empty table with the given column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. The row must have one cell per column.
    pub fn push_row<I, C>(&mut self, row: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        let row: Vec<Cell> = row.into_iter().map(Into::into).collect();
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Builder form of [`Table::push_row`].
    pub fn with_row<I, C>(mut self, row: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        self.push_row(row)?;
        Ok(self)
    }

    /// The column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The rows, in insertion order.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Returns the cells of a column by name, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().filter_map(|row| row.get(idx)).collect())
    }

    /// The number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Encodes the table as CSV: a header line, then one line per row.
    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(64 * (self.rows.len() + 1));
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            if needs_quoting(column) {
                write_quoted(column, &mut out);
            } else {
                out.push_str(column);
            }
        }
        out.push('\n');
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                cell.write_csv(&mut out);
            }
            out.push('\n');
        }
        out
    }

    /// Decodes CSV produced by [`Table::to_csv`] (or any RFC 4180 style CSV with a header).
    pub fn from_csv(text: &str) -> Result<Self, TableError> {
        let mut records = parse_records(text)?.into_iter();
        let columns: Vec<String> = match records.next() {
            Some(header) => header.into_iter().map(|field| field.text).collect(),
            None => return Ok(Self::default()),
        };
        let mut table = Self::new(columns);
        for record in records {
            let row = record.into_iter().map(Field::into_cell);
            table.push_row(row)?;
        }
        Ok(table)
    }
}

// --- CSV CODEC ---

/// A decoded CSV field, remembering whether it was quoted.
#[derive(Debug)]
struct Field {
    text: String,
    quoted: bool,
}

impl Field {
    fn into_cell(self) -> Cell {
        if self.quoted {
            Cell::Text(self.text)
        } else {
            Cell::infer(&self.text)
        }
    }
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s.contains([',', '"', '\n', '\r'])
        || s.starts_with(' ')
        || s.ends_with(' ')
}

fn write_quoted(s: &str, out: &mut String) {
    out.push('"');
    out.push_str(&s.replace('"', "\"\""));
    out.push('"');
}

/// Splits CSV text into records of fields, one per line. The newline that
/// ends the input closes the last record and opens no new one.
fn parse_records(text: &str) -> Result<Vec<Vec<Field>>, TableError> {
    let mut records = Vec::new();
    let mut record: Vec<Field> = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut after_quote = false;
    let mut line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => {
                    in_quotes = false;
                    after_quote = true;
                }
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !quoted => {
                in_quotes = true;
                quoted = true;
            }
            ',' => {
                record.push(Field {
                    text: std::mem::take(&mut field),
                    quoted,
                });
                quoted = false;
                after_quote = false;
            }
            '\r' => {}
            '\n' => {
                // An empty line is a record: the null row of a one-column table.
                record.push(Field {
                    text: std::mem::take(&mut field),
                    quoted,
                });
                records.push(std::mem::take(&mut record));
                quoted = false;
                after_quote = false;
                line += 1;
            }
            _ if after_quote => return Err(TableError::TrailingAfterQuote { line }),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(TableError::UnterminatedQuote { line });
    }
    if !record.is_empty() || !field.is_empty() || quoted {
        record.push(Field { text: field, quoted });
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy_table() -> Table {
        Table::new(["X", "Y"])
            .with_row([Cell::from(1), Cell::from("a")])
            .unwrap()
            .with_row([Cell::from(2), Cell::from("b")])
            .unwrap()
    }

    #[test]
    fn test_to_csv_has_no_index_column() {
        let csv = xy_table().to_csv();
        assert_eq!(csv, "X,Y\n1,\"a\"\n2,\"b\"\n");
    }

    #[test]
    fn test_csv_round_trip_keeps_types() {
        let mut table = Table::new(["int", "float", "text", "flag", "missing"]);
        table
            .push_row([
                Cell::Int(-3),
                Cell::Float(1.0),
                Cell::Text("12".to_string()),
                Cell::Bool(true),
                Cell::Null,
            ])
            .unwrap();
        table
            .push_row([
                Cell::Int(7),
                Cell::Float(0.25),
                Cell::Text("with, comma and \"quotes\"\nand a newline".to_string()),
                Cell::Bool(false),
                Cell::Text(String::new()),
            ])
            .unwrap();

        let parsed = Table::from_csv(&table.to_csv()).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_single_column_null_row_survives_round_trip() {
        let mut table = Table::new(["X"]);
        table.push_row([Cell::Int(1)]).unwrap();
        table.push_row([Cell::Null]).unwrap();
        table.push_row([Cell::Int(3)]).unwrap();

        let csv = table.to_csv();
        assert_eq!(csv, "X\n1\n\n3\n");

        let parsed = Table::from_csv(&csv).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_push_row_rejects_wrong_width() {
        let mut table = Table::new(["a", "b"]);
        let err = table.push_row([Cell::Int(1)]).unwrap_err();
        assert!(matches!(
            err,
            TableError::RowWidth {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_from_csv_infers_unquoted_fields() {
        let table = Table::from_csv("a,b,c\r\n1,2.5,hello\r\n").unwrap();
        assert_eq!(
            table.rows(),
            &[vec![
                Cell::Int(1),
                Cell::Float(2.5),
                Cell::Text("hello".to_string())
            ]]
        );
    }

    #[test]
    fn test_from_csv_unterminated_quote() {
        let err = Table::from_csv("a\n\"oops\n").unwrap_err();
        assert!(matches!(err, TableError::UnterminatedQuote { .. }));
    }

    #[test]
    fn test_column_lookup() {
        let table = xy_table();
        let xs = table.column("X").unwrap();
        assert_eq!(xs, vec![&Cell::Int(1), &Cell::Int(2)]);
        assert!(table.column("Z").is_none());
    }
}
