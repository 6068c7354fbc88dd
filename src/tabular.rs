//! Tabular rendering shared by the catalog preview and the query console.
//!
//! Columns come from the first row only, in the order the service returned
//! its keys. Later rows are not reconciled against it: a missing key renders
//! as an empty cell and extra keys are ignored.

use crate::gateway::RowSet;

/// Display form of a row set: column headers plus stringified cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularView {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    nulls: Vec<Vec<bool>>,
}

impl TabularView {
    /// Derives the display table from a row set.
    ///
    /// Returns `None` for an empty row set: nothing is rendered at all.
    pub fn from_rows(rows: &RowSet) -> Option<Self> {
        let first = rows.first()?;
        let columns: Vec<String> = first.keys().cloned().collect();

        let mut cells = Vec::with_capacity(rows.len());
        let mut nulls = Vec::with_capacity(rows.len());
        for row in rows.rows() {
            let mut line = Vec::with_capacity(columns.len());
            let mut null_line = Vec::with_capacity(columns.len());
            for column in &columns {
                match row.get(column) {
                    Some(value) => {
                        line.push(value.to_display_string());
                        null_line.push(value.is_null());
                    }
                    None => {
                        line.push(String::new());
                        null_line.push(false);
                    }
                }
            }
            cells.push(line);
            nulls.push(null_line);
        }

        Some(Self {
            columns,
            rows: cells,
            nulls,
        })
    }

    /// Column headers.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Display cells, one vector per row.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the display cell at the given position.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// Returns true if the cell at the given position holds a NULL value.
    pub fn is_null(&self, row: usize, column: usize) -> bool {
        self.nulls
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .unwrap_or(false)
    }

    /// Width of each column in characters, wide enough for header and cells.
    pub fn column_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Renders an aligned plain-text table with a row count footer.
    pub fn to_plain_text(&self) -> String {
        let widths = self.column_widths();
        let mut out = String::new();

        push_line(&mut out, &self.columns, &widths);
        let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, &separator, &widths);
        for row in &self.rows {
            push_line(&mut out, row, &widths);
        }

        let count = self.rows.len();
        out.push_str(&format!(
            "({} row{})\n",
            count,
            if count == 1 { "" } else { "s" }
        ));
        out
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}
