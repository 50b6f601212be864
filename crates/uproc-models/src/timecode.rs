//! Timecode table: the ordered clip-length specifications shared by
//! every job. Loaded once at startup and read-only afterwards; a
//! timecode's position in the table is its slot index.

use std::io::Read;
use std::path::Path;

use thiserror::Error;

/// A single clip-length specification, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timecode {
    pub length: f64,
}

#[derive(Debug, Error)]
pub enum TimecodeError {
    #[error("row {row} of timecode csv is empty")]
    EmptyRow { row: usize },

    #[error("row {row} of timecode csv is not a positive length: {value:?}")]
    InvalidLength { row: usize, value: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ordered, immutable sequence of timecodes.
#[derive(Debug, Clone)]
pub struct TimecodeTable {
    entries: Vec<Timecode>,
}

impl TimecodeTable {
    /// Load a table from single-column CSV: one clip length per row,
    /// first column only, no header.
    pub fn from_reader(reader: impl Read) -> Result<Self, TimecodeError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut entries = Vec::new();

        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;
            let field = record
                .get(0)
                .filter(|f| !f.trim().is_empty())
                .ok_or(TimecodeError::EmptyRow { row })?;

            let length: f64 = field.trim().parse().map_err(|_| {
                TimecodeError::InvalidLength {
                    row,
                    value: field.to_string(),
                }
            })?;

            if length <= 0.0 {
                return Err(TimecodeError::InvalidLength {
                    row,
                    value: field.to_string(),
                });
            }

            entries.push(Timecode { length });
        }

        Ok(Self { entries })
    }

    /// Load a table from a CSV file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TimecodeError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Number of slots this table defines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries with their slot index.
    pub fn slots(&self) -> impl Iterator<Item = (usize, Timecode)> + '_ {
        self.entries.iter().copied().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_single_column() {
        let table = TimecodeTable::from_reader("10.0\n80.0\n5.5\n".as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        let entries: Vec<_> = table.slots().collect();
        assert_eq!(entries[0], (0, Timecode { length: 10.0 }));
        assert_eq!(entries[1], (1, Timecode { length: 80.0 }));
        assert_eq!(entries[2], (2, Timecode { length: 5.5 }));
    }

    #[test]
    fn test_extra_columns_ignored() {
        let table = TimecodeTable::from_reader("10.0,comment\n20,other\n".as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_invalid_length_rejected() {
        assert!(matches!(
            TimecodeTable::from_reader("10.0\nabc\n".as_bytes()),
            Err(TimecodeError::InvalidLength { row: 1, .. })
        ));
        assert!(matches!(
            TimecodeTable::from_reader("0\n".as_bytes()),
            Err(TimecodeError::InvalidLength { row: 0, .. })
        ));
        assert!(matches!(
            TimecodeTable::from_reader("-3.5\n".as_bytes()),
            Err(TimecodeError::InvalidLength { row: 0, .. })
        ));
    }

    #[test]
    fn test_empty_table() {
        let table = TimecodeTable::from_reader("".as_bytes()).unwrap();
        assert!(table.is_empty());
    }
}
