//! Exports every transaction to an Excel workbook with a summary of the totals.

use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rust_xlsxwriter::{Format, Workbook, Worksheet as XlsxWorksheet};

use crate::{
    AppState, Error,
    sheet::{SheetGateway, Worksheet},
    timezone::{format_file_stamp, now_local},
    transaction::parse_amount,
};

/// The MIME type of `.xlsx` files.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// The name of the worksheet in the exported workbook.
pub const EXPORT_SHEET_NAME: &str = "Transactions";

const SUMMARY_TITLE: &str = "RINGKASAN";
const INCOME_LABEL: &str = "Total Pemasukan";
const OUTCOME_LABEL: &str = "Total Pengeluaran";
const BALANCE_LABEL: &str = "Saldo Akhir";

/// The state needed to export transactions.
#[derive(Clone)]
pub struct ExportState {
    /// Opens the worksheet that stores the transactions.
    pub gateway: Arc<dyn SheetGateway>,

    /// The canonical timezone used for the file name timestamp.
    pub local_timezone: String,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            gateway: state.gateway.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler that responds with all transactions as an `.xlsx` download.
///
/// Responds with 400 Bad Request if there are no transactions.
pub async fn export_endpoint(State(state): State<ExportState>) -> Result<Response, Error> {
    let worksheet = state.gateway.acquire().await?;
    let table = ExportTable::read(worksheet.as_ref()).await?;
    let workbook = table.to_xlsx()?;

    let file_name = format!(
        "transactions_{}.xlsx",
        format_file_stamp(now_local(&state.local_timezone)?)
    );
    tracing::info!("Exporting {} transactions to {file_name}", table.rows.len());

    Ok((
        [
            (CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        workbook,
    )
        .into_response())
}

/// The income and outcome totals of an export.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExportSummary {
    /// The sum of `total_price` over rows of type "income".
    pub income: f64,
    /// The sum of `total_price` over rows of type "outcome".
    pub outcome: f64,
    /// `income - outcome`.
    pub balance: f64,
}

/// A snapshot of the worksheet: its header and the transaction rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    type_column: usize,
    total_column: usize,
}

impl ExportTable {
    /// Read the whole worksheet.
    pub async fn read(worksheet: &dyn Worksheet) -> Result<Self, Error> {
        Self::new(worksheet.all_values().await?)
    }

    /// Split `values` into the header (first row) and the transaction rows.
    ///
    /// Rows are padded with empty cells to the width of the header.
    ///
    /// # Errors
    /// Returns [Error::EmptyExport] if there are no rows after the header,
    /// or [Error::Export] if the header has no `type` or `total_price` column.
    pub fn new(values: Vec<Vec<String>>) -> Result<Self, Error> {
        let mut values = values.into_iter();
        let header = values.next().unwrap_or_default();
        let width = header.len();
        let rows: Vec<Vec<String>> = values
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, String::new());
                }
                row
            })
            .collect();

        if rows.is_empty() {
            return Err(Error::EmptyExport);
        }

        let column = |name: &str| {
            header
                .iter()
                .position(|column| column == name)
                .ok_or_else(|| Error::Export(format!("the header has no \"{name}\" column")))
        };
        let type_column = column("type")?;
        let total_column = column("total_price")?;

        Ok(Self {
            header,
            rows,
            type_column,
            total_column,
        })
    }

    fn total(&self, row: &[String]) -> f64 {
        parse_amount(&row[self.total_column]).unwrap_or(0.0)
    }

    /// Total the rows by type.
    pub fn summary(&self) -> ExportSummary {
        let mut summary = ExportSummary::default();

        for row in &self.rows {
            match row[self.type_column].as_str() {
                "income" => summary.income += self.total(row),
                "outcome" => summary.outcome += self.total(row),
                _ => {}
            }
        }
        summary.balance = summary.income - summary.outcome;

        summary
    }

    /// Write the table followed by a blank row and the summary block to an
    /// in-memory `.xlsx` file.
    pub fn to_xlsx(&self) -> Result<Vec<u8>, Error> {
        let mut workbook = Workbook::new();
        self.write_worksheet(workbook.add_worksheet())?;

        Ok(workbook.save_to_buffer()?)
    }

    fn write_worksheet(&self, worksheet: &mut XlsxWorksheet) -> Result<(), Error> {
        let bold = Format::new().set_bold();
        worksheet.set_name(EXPORT_SHEET_NAME)?;

        for (col, column) in self.header.iter().enumerate() {
            worksheet.write_string_with_format(0, to_col(col)?, column.as_str(), &bold)?;
        }

        for (index, row) in self.rows.iter().enumerate() {
            let row_number = to_row(index + 1)?;

            for (col, cell) in row.iter().enumerate() {
                let col_number = to_col(col)?;

                if col == self.total_column {
                    worksheet.write_number(row_number, col_number, self.total(row))?;
                    continue;
                }

                let numeric_column = matches!(
                    self.header.get(col).map(String::as_str),
                    Some("price" | "qty")
                );
                match parse_amount(cell) {
                    _ if cell.trim().is_empty() => {}
                    Some(amount) if numeric_column => {
                        worksheet.write_number(row_number, col_number, amount)?;
                    }
                    _ => {
                        worksheet.write_string(row_number, col_number, cell.as_str())?;
                    }
                }
            }
        }

        let summary = self.summary();
        let summary_row = to_row(self.rows.len() + 2)?;
        worksheet.write_string_with_format(summary_row, 0, SUMMARY_TITLE, &bold)?;
        for (offset, (label, amount)) in [
            (INCOME_LABEL, summary.income),
            (OUTCOME_LABEL, summary.outcome),
            (BALANCE_LABEL, summary.balance),
        ]
        .into_iter()
        .enumerate()
        {
            let row_number = summary_row + 1 + to_row(offset)?;
            worksheet.write_string(row_number, 0, label)?;
            worksheet.write_number(row_number, 1, amount)?;
        }

        worksheet.autofit();

        Ok(())
    }
}

fn to_row(index: usize) -> Result<u32, Error> {
    u32::try_from(index).map_err(|_| Error::Export(format!("row {index} is too large")))
}

fn to_col(index: usize) -> Result<u16, Error> {
    u16::try_from(index).map_err(|_| Error::Export(format!("column {index} is too large")))
}
