//! Access to the worksheet that stores the transactions.
//!
//! A [SheetGateway] hands out a [Worksheet] per request. The worksheet's first
//! row is always the header, so transaction rows start at row 2. Rows and
//! columns are numbered from 1 like in the spreadsheet UI.

mod google;
mod memory;

use async_trait::async_trait;
use serde::{Serialize, Serializer};

use crate::Error;

pub use google::GoogleSheetGateway;
pub use memory::MemorySheetGateway;

/// The row number of the header row.
pub const HEADER_ROW: usize = 1;

/// The row number of the first transaction.
pub const FIRST_DATA_ROW: usize = 2;

/// Hands out authenticated worksheets.
#[async_trait]
pub trait SheetGateway: Send + Sync {
    /// Open the worksheet, creating the spreadsheet if it does not exist and
    /// making sure the first row is the expected header.
    ///
    /// # Errors
    /// Returns [Error::GatewayUnavailable] if the worksheet cannot be opened
    /// for any reason. Callers should respond with a server error.
    async fn acquire(&self) -> Result<Box<dyn Worksheet>, Error>;
}

/// The row operations the application needs from a worksheet.
#[async_trait]
pub trait Worksheet: Send + Sync {
    /// Every row of the worksheet, including the header.
    async fn all_values(&self) -> Result<Vec<Vec<String>>, Error>;

    /// The cells of a single row. Rows past the end of the sheet are empty.
    async fn row_values(&self, row: usize) -> Result<Vec<String>, Error>;

    /// Add a row after the last non-empty row.
    async fn append_row(&self, cells: Vec<CellValue>) -> Result<(), Error>;

    /// Insert a row at `row`, moving that row and those below it down by one.
    async fn insert_row(&self, cells: Vec<CellValue>, row: usize) -> Result<(), Error>;

    /// Overwrite a single cell.
    async fn update_cell(&self, row: usize, col: usize, cell: CellValue) -> Result<(), Error>;

    /// Remove a row, moving the rows below it up by one.
    async fn delete_row(&self, row: usize) -> Result<(), Error>;

    /// The number of the first row at or below `from_row` whose cell in
    /// column `col` is exactly `value`.
    async fn find_row(
        &self,
        col: usize,
        value: &str,
        from_row: usize,
    ) -> Result<Option<usize>, Error>;
}

/// A value written to a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Stored verbatim as a string.
    Text(String),
    /// Stored as a number.
    Number(f64),
    /// Clears the cell.
    Empty,
}

impl CellValue {
    /// The text the worksheet shows for this value.
    pub fn to_cell_text(&self) -> String {
        match self {
            CellValue::Text(text) => text.clone(),
            CellValue::Number(number) => number.to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

impl From<Option<f64>> for CellValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(CellValue::Empty, CellValue::Number)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

// The Sheets API skips `null` cells, so empty cells are sent as "".
impl Serialize for CellValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            CellValue::Text(text) => serializer.serialize_str(text),
            CellValue::Number(number) => serializer.serialize_f64(*number),
            CellValue::Empty => serializer.serialize_str(""),
        }
    }
}

/// Make sure the first row of `worksheet` is `header`.
///
/// If row 1 is anything else, including empty, the header is inserted above
/// it so that no existing row is overwritten.
pub async fn ensure_header(worksheet: &dyn Worksheet, header: &[String]) -> Result<(), Error> {
    let first_row = worksheet.row_values(HEADER_ROW).await?;

    if first_row == header {
        return Ok(());
    }

    if first_row.is_empty() {
        tracing::info!("Writing header to empty worksheet");
    } else {
        tracing::warn!("Worksheet header {first_row:?} does not match {header:?}, inserting header");
    }

    let cells = header.iter().map(|column| column.as_str().into()).collect();
    worksheet.insert_row(cells, HEADER_ROW).await
}

/// Convert a 1-based column number to its A1 notation letters, e.g. 1 -> "A", 27 -> "AA".
pub fn column_letter(col: usize) -> String {
    let mut letters = Vec::new();
    let mut remaining = col;

    while remaining > 0 {
        let offset = (remaining - 1) % 26;
        letters.push(char::from(b'A' + offset as u8));
        remaining = (remaining - 1) / 26;
    }

    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use crate::config::HEADER;

    use super::{
        CellValue, MemorySheetGateway, SheetGateway, Worksheet, column_letter, ensure_header,
    };

    fn header() -> Vec<String> {
        HEADER.iter().map(|column| column.to_string()).collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(7), "G");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(52), "AZ");
        assert_eq!(column_letter(703), "AAA");
    }

    #[test]
    fn numbers_show_without_trailing_zeros() {
        assert_eq!(CellValue::Number(1000.0).to_cell_text(), "1000");
        assert_eq!(CellValue::Number(2.5).to_cell_text(), "2.5");
        assert_eq!(CellValue::Empty.to_cell_text(), "");
    }

    #[test]
    fn empty_cells_serialize_as_empty_strings() {
        let json = serde_json::to_string(&vec![
            CellValue::Text("coffee".to_owned()),
            CellValue::Number(5.0),
            CellValue::Empty,
        ])
        .unwrap();

        assert_eq!(json, r#"["coffee",5.0,""]"#);
    }

    #[tokio::test]
    async fn writes_header_to_empty_worksheet() {
        let gateway = MemorySheetGateway::with_rows(Vec::new());

        gateway.acquire().await.unwrap();

        assert_eq!(gateway.rows(), vec![header()]);
    }

    #[tokio::test]
    async fn keeps_matching_header() {
        let data = row(&["1", "2025-01-01 00:00:00", "income", "salary", "10", "1", "10"]);
        let gateway = MemorySheetGateway::with_rows(vec![header(), data.clone()]);

        gateway.acquire().await.unwrap();

        assert_eq!(gateway.rows(), vec![header(), data]);
    }

    #[tokio::test]
    async fn inserts_header_above_mismatched_first_row() {
        let data = row(&["1", "2025-01-01 00:00:00", "income", "salary", "10", "1", "10"]);
        let gateway = MemorySheetGateway::with_rows(vec![data.clone()]);

        gateway.acquire().await.unwrap();

        assert_eq!(gateway.rows(), vec![header(), data]);
    }

    #[tokio::test]
    async fn ensure_header_is_idempotent() {
        let gateway = MemorySheetGateway::with_rows(Vec::new());
        let worksheet = gateway.acquire().await.unwrap();

        ensure_header(worksheet.as_ref(), &header()).await.unwrap();
        ensure_header(worksheet.as_ref(), &header()).await.unwrap();

        assert_eq!(worksheet.all_values().await.unwrap(), vec![header()]);
    }
}
