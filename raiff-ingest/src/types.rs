use serde::{Deserialize, Serialize};

/// Number of columns every statement page table is read into.
pub const RAW_COLUMN_COUNT: usize = 9;

/// Columns of a raw page table, in statement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawColumn {
    TransactionDate = 0,
    CompletionDate = 1,
    CardNumber = 2,
    Description = 3,
    ForeignAmount = 4,
    OriginalAmount = 5,
    Expense = 6,
    Income = 7,
    Balance = 8,
}

/// One row as the table extractor saw it: trimmed text, empty cells as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawRow {
    cells: [Option<String>; RAW_COLUMN_COUNT],
}

impl RawRow {
    /// Build a row from extracted cells. Short rows are padded with empty
    /// cells; a row wider than the schema is rejected with its width.
    pub fn from_cells<I, S>(cells: I) -> Result<Self, usize>
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let cells: Vec<Option<String>> = cells
            .into_iter()
            .map(|c| {
                c.map(|s| s.as_ref().trim().to_string())
                    .filter(|s| !s.is_empty())
            })
            .collect();
        if cells.len() > RAW_COLUMN_COUNT {
            return Err(cells.len());
        }
        let mut row = RawRow::default();
        for (slot, cell) in row.cells.iter_mut().zip(cells) {
            *slot = cell;
        }
        Ok(row)
    }

    pub fn get(&self, column: RawColumn) -> Option<&str> {
        self.cells[column as usize].as_deref()
    }
}

/// Rows extracted from one page, keyed by 1-based page number.
#[derive(Debug, Clone, PartialEq)]
pub struct PageTable {
    pub page: u32,
    pub rows: Vec<RawRow>,
}
