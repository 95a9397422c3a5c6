//! Simple-table support: column detection and row accumulation.
//!
//! Columns come from the first separator line (`=====  ======`); every
//! maximal run of `=` starts a column. Positions are counted in characters so
//! that non-ASCII cell text does not split inside a code point.

use std::mem;

/// A non-blank line made only of spaces and `=`.
pub fn is_separator(line: &str) -> bool {
    !line.trim().is_empty() && line.chars().all(|ch| ch == '=' || ch == ' ')
}

/// Character columns where each run of `=` starts.
pub fn columns_from_separator(line: &str) -> Vec<usize> {
    let mut columns = Vec::new();
    let mut previous = ' ';
    for (col, ch) in line.chars().enumerate() {
        if ch == '=' && previous != '=' {
            columns.push(col);
        }
        previous = ch;
    }
    columns
}

/// Column layout of the open table plus the row being collected.
#[derive(Debug, Default)]
pub struct TableBuilder {
    columns: Vec<usize>,
    pending_row: Option<Vec<String>>,
}

impl TableBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the column layout of a new table.
    pub fn start(&mut self, separator: &str) {
        self.columns = columns_from_separator(separator);
        self.pending_row = None;
    }

    /// Cut `line` at the column offsets.
    ///
    /// Only columns the line reaches are returned; trailing whitespace is
    /// dropped, leading whitespace is kept.
    pub fn split(&self, line: &str) -> Vec<String> {
        let chars: Vec<char> = line.chars().collect();
        let mut cells = Vec::with_capacity(self.columns.len());
        for (idx, &start) in self.columns.iter().enumerate() {
            if start >= chars.len() {
                break;
            }
            let end = match self.columns.get(idx + 1) {
                Some(&next) => next.min(chars.len()),
                None => chars.len(),
            };
            let cell: String = chars[start..end].iter().collect();
            cells.push(cell.trim_end().to_string());
        }
        cells
    }

    /// A body line whose first column holds text begins a new row.
    pub fn starts_row(&self, line: &str) -> bool {
        self.split(line)
            .first()
            .is_some_and(|cell| !cell.trim().is_empty())
    }

    /// Whether a row is being collected.
    pub fn has_pending_row(&self) -> bool {
        self.pending_row.is_some()
    }

    /// Begin a new row from `line`, returning the row it replaces.
    pub fn start_row(&mut self, line: &str) -> Option<Vec<String>> {
        let mut cells = self.split(line);
        cells.resize(self.columns.len(), String::new());
        mem::replace(&mut self.pending_row, Some(cells))
    }

    /// Add a continuation line to the pending row, one line per cell.
    pub fn append(&mut self, line: &str) {
        let parts = self.split(line);
        let Some(row) = self.pending_row.as_mut() else {
            return;
        };
        for (idx, cell) in row.iter_mut().enumerate() {
            cell.push('\n');
            if let Some(part) = parts.get(idx) {
                cell.push_str(part);
            }
        }
    }

    /// Hand out the pending row, leaving none behind.
    pub fn take_row(&mut self) -> Option<Vec<String>> {
        self.pending_row.take()
    }
}
