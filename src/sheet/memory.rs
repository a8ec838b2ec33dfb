//! A worksheet kept in process memory.

use std::sync::{
    Arc, Mutex, MutexGuard,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;

use crate::{
    Error,
    config::HEADER,
    sheet::{CellValue, SheetGateway, Worksheet, ensure_header},
};

type Rows = Vec<Vec<String>>;

/// A [SheetGateway] whose worksheet lives in memory.
///
/// Every acquired worksheet shares the same rows, so changes made through one
/// worksheet are visible to the next, like a remote spreadsheet.
#[derive(Debug, Clone)]
pub struct MemorySheetGateway {
    rows: Arc<Mutex<Rows>>,
    header: Vec<String>,
    available: Arc<AtomicBool>,
}

impl Default for MemorySheetGateway {
    fn default() -> Self {
        Self::with_rows(Vec::new())
    }
}

impl MemorySheetGateway {
    /// Create a gateway whose worksheet starts with `rows`.
    pub fn with_rows(rows: Rows) -> Self {
        Self {
            rows: Arc::new(Mutex::new(rows)),
            header: HEADER.iter().map(|column| column.to_string()).collect(),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// A copy of the worksheet's rows.
    pub fn rows(&self) -> Rows {
        match self.rows.lock() {
            Ok(rows) => rows.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Make [SheetGateway::acquire] fail, as if the spreadsheet could not be reached.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

#[async_trait]
impl SheetGateway for MemorySheetGateway {
    async fn acquire(&self) -> Result<Box<dyn Worksheet>, Error> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(Error::GatewayUnavailable(
                "the in-memory worksheet is switched off".to_owned(),
            ));
        }

        let worksheet = MemoryWorksheet {
            rows: self.rows.clone(),
        };
        ensure_header(&worksheet, &self.header)
            .await
            .map_err(|error| Error::GatewayUnavailable(error.to_string()))?;

        Ok(Box::new(worksheet))
    }
}

struct MemoryWorksheet {
    rows: Arc<Mutex<Rows>>,
}

impl MemoryWorksheet {
    fn lock(&self) -> Result<MutexGuard<'_, Rows>, Error> {
        self.rows
            .lock()
            .map_err(|error| Error::Sheet(format!("could not lock worksheet: {error}")))
    }
}

fn to_texts(cells: Vec<CellValue>) -> Vec<String> {
    cells.iter().map(CellValue::to_cell_text).collect()
}

#[async_trait]
impl Worksheet for MemoryWorksheet {
    async fn all_values(&self) -> Result<Rows, Error> {
        Ok(self.lock()?.clone())
    }

    async fn row_values(&self, row: usize) -> Result<Vec<String>, Error> {
        let rows = self.lock()?;

        Ok(row
            .checked_sub(1)
            .and_then(|index| rows.get(index))
            .cloned()
            .unwrap_or_default())
    }

    async fn append_row(&self, cells: Vec<CellValue>) -> Result<(), Error> {
        self.lock()?.push(to_texts(cells));

        Ok(())
    }

    async fn insert_row(&self, cells: Vec<CellValue>, row: usize) -> Result<(), Error> {
        let index = row
            .checked_sub(1)
            .ok_or_else(|| Error::Sheet(format!("invalid row {row}")))?;
        let mut rows = self.lock()?;

        if index > rows.len() {
            rows.resize(index, Vec::new());
        }
        rows.insert(index, to_texts(cells));

        Ok(())
    }

    async fn update_cell(&self, row: usize, col: usize, cell: CellValue) -> Result<(), Error> {
        let (Some(row_index), Some(col_index)) = (row.checked_sub(1), col.checked_sub(1)) else {
            return Err(Error::Sheet(format!("invalid cell ({row}, {col})")));
        };
        let mut rows = self.lock()?;

        if row_index >= rows.len() {
            rows.resize(row_index + 1, Vec::new());
        }
        let cells = &mut rows[row_index];
        if col_index >= cells.len() {
            cells.resize(col_index + 1, String::new());
        }
        cells[col_index] = cell.to_cell_text();

        Ok(())
    }

    async fn delete_row(&self, row: usize) -> Result<(), Error> {
        let mut rows = self.lock()?;

        match row.checked_sub(1) {
            Some(index) if index < rows.len() => {
                rows.remove(index);
                Ok(())
            }
            _ => Err(Error::Sheet(format!("row {row} is out of range"))),
        }
    }

    async fn find_row(
        &self,
        col: usize,
        value: &str,
        from_row: usize,
    ) -> Result<Option<usize>, Error> {
        let Some(col_index) = col.checked_sub(1) else {
            return Err(Error::Sheet(format!("invalid column {col}")));
        };
        let rows = self.lock()?;

        Ok(rows
            .iter()
            .enumerate()
            .skip(from_row.saturating_sub(1))
            .find(|(_, cells)| cells.get(col_index).is_some_and(|cell| cell == value))
            .map(|(index, _)| index + 1))
    }
}
