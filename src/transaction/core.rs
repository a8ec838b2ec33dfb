//! The transaction model and the operations on the transaction rows of the worksheet.
//!
//! Transactions are located by a linear scan of the ID column, so every
//! lookup is O(n) in the number of rows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    Error,
    config::HEADER,
    sheet::{CellValue, FIRST_DATA_ROW, HEADER_ROW, Worksheet},
};

/// The column holding the transaction ID.
pub const ID_COLUMN: usize = 1;

/// The first of the columns that can be edited after a transaction is created.
///
/// Columns `type` through `total_price` are editable, `id` and `date` are not.
pub const FIRST_EDITABLE_COLUMN: usize = 3;

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received, adds to the balance.
    Income,
    /// Money spent, subtracts from the balance.
    Outcome,
}

impl TransactionType {
    /// The text stored in the `type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Outcome => "outcome",
        }
    }
}

/// A transaction read from a worksheet row.
///
/// `kind` is kept as the raw cell text since the worksheet can be edited by
/// hand. Only "income" counts towards the balance positively.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The UUID generated when the transaction was created.
    pub id: String,
    /// When the transaction was created, as `YYYY-MM-DD HH:MM:SS`.
    pub date: String,
    /// Either "income" or "outcome".
    #[serde(rename = "type")]
    pub kind: String,
    /// A description of the transaction.
    pub detail: String,
    /// The unit price.
    pub price: f64,
    /// The quantity.
    pub qty: f64,
    /// The total as entered by the user, normally `price * qty`.
    pub total_price: f64,
}

impl Transaction {
    /// Build a transaction from the cells of a worksheet row.
    ///
    /// Missing cells are treated as empty. If any of the numeric cells is not
    /// a number, all three numeric fields are set to zero.
    pub fn from_row(row: &[String]) -> Self {
        let cell = |index: usize| row.get(index).cloned().unwrap_or_default();

        let amounts = (
            parse_amount(&cell(4)),
            parse_amount(&cell(5)),
            parse_amount(&cell(6)),
        );
        let (price, qty, total_price) = match amounts {
            (Some(price), Some(qty), Some(total_price)) => (price, qty, total_price),
            _ => (0.0, 0.0, 0.0),
        };

        Self {
            id: cell(0),
            date: cell(1),
            kind: cell(2),
            detail: cell(3),
            price,
            qty,
            total_price,
        }
    }

    /// The amount this transaction adds to the balance.
    pub fn signed_total(&self) -> f64 {
        if self.kind == TransactionType::Income.as_str() {
            self.total_price
        } else {
            -self.total_price
        }
    }
}

/// Parse a numeric cell. Empty cells are zero.
///
/// Returns `None` for text that is not a finite number.
pub fn parse_amount(cell: &str) -> Option<f64> {
    let cell = cell.trim();

    if cell.is_empty() {
        return Some(0.0);
    }

    cell.parse::<f64>().ok().filter(|amount| amount.is_finite())
}

/// The fields a client sends to create or edit a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionForm {
    /// Whether money came in or went out.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// A description of the transaction.
    #[serde(default)]
    pub detail: String,
    /// The unit price, `null` leaves the cell empty.
    #[serde(default)]
    pub price: Option<f64>,
    /// The quantity, `null` leaves the cell empty.
    #[serde(default)]
    pub qty: Option<f64>,
    /// The total, stored as sent.
    #[serde(default)]
    pub total_price: Option<f64>,
}

impl TransactionForm {
    /// The cells for the columns `type` through `total_price`.
    fn editable_cells(&self) -> Vec<CellValue> {
        vec![
            self.kind.as_str().into(),
            self.detail.as_str().into(),
            self.price.into(),
            self.qty.into(),
            self.total_price.into(),
        ]
    }
}

/// All transactions, newest first, and the resulting balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionList {
    /// The transactions in reverse worksheet order.
    pub transactions: Vec<Transaction>,
    /// The income total minus the total of everything else.
    pub total_balance: f64,
}

/// Read every transaction in the worksheet.
pub async fn list_transactions(worksheet: &dyn Worksheet) -> Result<TransactionList, Error> {
    let rows = worksheet.all_values().await?;

    let mut transactions: Vec<Transaction> = rows
        .iter()
        .skip(HEADER_ROW)
        .map(|row| Transaction::from_row(row))
        .collect();
    let total_balance = transactions.iter().map(Transaction::signed_total).sum();
    transactions.reverse();

    Ok(TransactionList {
        transactions,
        total_balance,
    })
}

/// Append a new transaction with a fresh ID and `date` as its timestamp.
///
/// Returns the new transaction's ID.
pub async fn create_transaction(
    worksheet: &dyn Worksheet,
    form: &TransactionForm,
    date: &str,
) -> Result<String, Error> {
    let id = Uuid::new_v4().to_string();

    let mut cells: Vec<CellValue> = vec![id.as_str().into(), date.into()];
    cells.extend(form.editable_cells());
    debug_assert_eq!(cells.len(), HEADER.len());

    worksheet.append_row(cells).await?;

    Ok(id)
}

/// Get the transaction with the ID `id` as a map from the worksheet's header to the row's cells.
///
/// # Errors
/// Returns [Error::NotFound] if no row has the ID `id`.
pub async fn get_transaction(
    worksheet: &dyn Worksheet,
    id: &str,
) -> Result<Map<String, Value>, Error> {
    let row = find_transaction_row(worksheet, id).await?;

    let cells = worksheet.row_values(row).await?;
    let header = worksheet.row_values(HEADER_ROW).await?;

    Ok(header
        .into_iter()
        .zip(cells)
        .map(|(column, cell)| (column, Value::String(cell)))
        .collect())
}

/// Overwrite the editable columns of the transaction with the ID `id`.
///
/// # Errors
/// Returns [Error::NotFound] if no row has the ID `id`, in which case the
/// worksheet is not changed.
pub async fn update_transaction(
    worksheet: &dyn Worksheet,
    id: &str,
    form: &TransactionForm,
) -> Result<(), Error> {
    let row = find_transaction_row(worksheet, id).await?;

    for (offset, cell) in form.editable_cells().into_iter().enumerate() {
        worksheet
            .update_cell(row, FIRST_EDITABLE_COLUMN + offset, cell)
            .await?;
    }

    Ok(())
}

/// Remove the row of the transaction with the ID `id`.
///
/// # Errors
/// Returns [Error::NotFound] if no row has the ID `id`.
pub async fn delete_transaction(worksheet: &dyn Worksheet, id: &str) -> Result<(), Error> {
    let row = find_transaction_row(worksheet, id).await?;

    worksheet.delete_row(row).await
}

async fn find_transaction_row(worksheet: &dyn Worksheet, id: &str) -> Result<usize, Error> {
    worksheet
        .find_row(ID_COLUMN, id, FIRST_DATA_ROW)
        .await?
        .ok_or(Error::NotFound)
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use crate::{
        Error,
        config::HEADER,
        sheet::{MemorySheetGateway, SheetGateway, Worksheet},
    };

    use super::{
        Transaction, TransactionForm, TransactionType, create_transaction, delete_transaction,
        get_transaction, list_transactions, parse_amount, update_transaction,
    };

    fn header() -> Vec<String> {
        HEADER.iter().map(|column| column.to_string()).collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    fn form(kind: TransactionType, detail: &str, price: f64, qty: f64) -> TransactionForm {
        TransactionForm {
            kind,
            detail: detail.to_owned(),
            price: Some(price),
            qty: Some(qty),
            total_price: Some(price * qty),
        }
    }

    async fn worksheet_with(gateway: &MemorySheetGateway) -> Box<dyn Worksheet> {
        gateway.acquire().await.expect("could not acquire test worksheet")
    }

    #[test]
    fn parses_amounts() {
        assert_eq!(parse_amount("12.5"), Some(12.5));
        assert_eq!(parse_amount(" 3 "), Some(3.0));
        assert_eq!(parse_amount(""), Some(0.0));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("NaN"), None);
    }

    #[test]
    fn pads_short_rows() {
        let transaction = Transaction::from_row(&row(&["abc", "2025-01-01 10:00:00", "income"]));

        assert_eq!(transaction.id, "abc");
        assert_eq!(transaction.detail, "");
        assert_eq!(transaction.total_price, 0.0);
    }

    #[test]
    fn malformed_amount_zeroes_all_amounts() {
        let transaction =
            Transaction::from_row(&row(&["a", "d", "income", "x", "5", "2", "abc"]));

        assert_eq!(
            (transaction.price, transaction.qty, transaction.total_price),
            (0.0, 0.0, 0.0)
        );
    }

    #[tokio::test]
    async fn empty_worksheet_lists_nothing() {
        let gateway = MemorySheetGateway::default();
        let worksheet = worksheet_with(&gateway).await;

        let list = list_transactions(worksheet.as_ref()).await.unwrap();

        assert!(list.transactions.is_empty());
        assert_eq!(list.total_balance, 0.0);
    }

    #[tokio::test]
    async fn lists_newest_first_with_balance() {
        let gateway = MemorySheetGateway::default();
        let worksheet = worksheet_with(&gateway).await;
        create_transaction(
            worksheet.as_ref(),
            &form(TransactionType::Income, "salary", 1000.0, 1.0),
            "2025-01-01 09:00:00",
        )
        .await
        .unwrap();
        create_transaction(
            worksheet.as_ref(),
            &form(TransactionType::Outcome, "coffee", 5.0, 2.0),
            "2025-01-01 10:00:00",
        )
        .await
        .unwrap();

        let list = list_transactions(worksheet.as_ref()).await.unwrap();

        let details: Vec<&str> = list
            .transactions
            .iter()
            .map(|transaction| transaction.detail.as_str())
            .collect();
        assert_eq!(details, vec!["coffee", "salary"]);
        assert_eq!(list.total_balance, 990.0);
    }

    #[tokio::test]
    async fn malformed_row_does_not_break_balance() {
        let gateway = MemorySheetGateway::with_rows(vec![
            header(),
            row(&["1", "d", "income", "salary", "100", "1", "100"]),
            row(&["2", "d", "outcome", "typo", "1", "1", "abc"]),
            row(&["3", "d", "outcome", "lunch", "20", "1", "20"]),
        ]);
        let worksheet = worksheet_with(&gateway).await;

        let list = list_transactions(worksheet.as_ref()).await.unwrap();

        assert_eq!(list.transactions.len(), 3);
        let malformed = &list.transactions[1];
        assert_eq!(malformed.id, "2");
        assert_eq!(
            (malformed.price, malformed.qty, malformed.total_price),
            (0.0, 0.0, 0.0)
        );
        assert_eq!(list.total_balance, 80.0);
    }

    #[tokio::test]
    async fn unknown_type_subtracts_from_balance() {
        let gateway = MemorySheetGateway::with_rows(vec![
            header(),
            row(&["1", "d", "refund", "x", "10", "1", "10"]),
        ]);
        let worksheet = worksheet_with(&gateway).await;

        let list = list_transactions(worksheet.as_ref()).await.unwrap();

        assert_eq!(list.total_balance, -10.0);
    }

    #[tokio::test]
    async fn create_generates_unique_ids() {
        let gateway = MemorySheetGateway::default();
        let worksheet = worksheet_with(&gateway).await;
        let transaction = form(TransactionType::Outcome, "tea", 2.0, 1.0);

        let first = create_transaction(worksheet.as_ref(), &transaction, "now")
            .await
            .unwrap();
        let second = create_transaction(worksheet.as_ref(), &transaction, "now")
            .await
            .unwrap();

        assert_ne!(first, second);
        let list = list_transactions(worksheet.as_ref()).await.unwrap();
        assert_eq!(list.transactions.len(), 2);
        assert_eq!(list.transactions[0].id, second);
        assert_eq!(list.transactions[1].id, first);
    }

    #[tokio::test]
    async fn create_writes_row_in_header_order() {
        let gateway = MemorySheetGateway::default();
        let worksheet = worksheet_with(&gateway).await;

        let id = create_transaction(
            worksheet.as_ref(),
            &TransactionForm {
                kind: TransactionType::Outcome,
                detail: "bus".to_owned(),
                price: Some(2.5),
                qty: None,
                total_price: Some(2.5),
            },
            "2025-02-03 04:05:06",
        )
        .await
        .unwrap();

        assert_eq!(
            gateway.rows()[1],
            row(&[&id, "2025-02-03 04:05:06", "outcome", "bus", "2.5", "", "2.5"])
        );
    }

    #[tokio::test]
    async fn get_zips_header_with_row() {
        let gateway = MemorySheetGateway::with_rows(vec![
            header(),
            row(&["abc", "2025-01-01 00:00:00", "income", "gift", "50", "1", "50"]),
        ]);
        let worksheet = worksheet_with(&gateway).await;

        let transaction = get_transaction(worksheet.as_ref(), "abc").await.unwrap();

        assert_eq!(transaction.len(), 7);
        assert_eq!(transaction["detail"], Value::String("gift".to_owned()));
        assert_eq!(transaction["total_price"], Value::String("50".to_owned()));
    }

    #[tokio::test]
    async fn get_missing_transaction_is_not_found() {
        let gateway = MemorySheetGateway::default();
        let worksheet = worksheet_with(&gateway).await;

        let result = get_transaction(worksheet.as_ref(), "missing").await;

        assert_eq!(result, Err(Error::NotFound));
    }

    #[tokio::test]
    async fn header_is_never_a_transaction() {
        let gateway = MemorySheetGateway::default();
        let worksheet = worksheet_with(&gateway).await;

        let result = delete_transaction(worksheet.as_ref(), "id").await;

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(gateway.rows(), vec![header()]);
    }

    #[tokio::test]
    async fn update_keeps_id_and_date() {
        let gateway = MemorySheetGateway::with_rows(vec![
            header(),
            row(&["abc", "2025-01-01 00:00:00", "income", "gift", "50", "1", "50"]),
        ]);
        let worksheet = worksheet_with(&gateway).await;

        update_transaction(
            worksheet.as_ref(),
            "abc",
            &form(TransactionType::Outcome, "groceries", 12.0, 3.0),
        )
        .await
        .unwrap();

        assert_eq!(
            gateway.rows()[1],
            row(&["abc", "2025-01-01 00:00:00", "outcome", "groceries", "12", "3", "36"])
        );
    }

    #[tokio::test]
    async fn update_missing_transaction_leaves_worksheet_unchanged() {
        let rows = vec![
            header(),
            row(&["abc", "2025-01-01 00:00:00", "income", "gift", "50", "1", "50"]),
        ];
        let gateway = MemorySheetGateway::with_rows(rows.clone());
        let worksheet = worksheet_with(&gateway).await;

        let result = update_transaction(
            worksheet.as_ref(),
            "missing",
            &form(TransactionType::Outcome, "x", 1.0, 1.0),
        )
        .await;

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(gateway.rows(), rows);
    }

    #[tokio::test]
    async fn delete_removes_only_that_row() {
        let first = row(&["1", "d", "income", "a", "1", "1", "1"]);
        let second = row(&["2", "d", "income", "b", "2", "1", "2"]);
        let third = row(&["3", "d", "income", "c", "3", "1", "3"]);
        let gateway = MemorySheetGateway::with_rows(vec![
            header(),
            first.clone(),
            second,
            third.clone(),
        ]);
        let worksheet = worksheet_with(&gateway).await;

        delete_transaction(worksheet.as_ref(), "2").await.unwrap();

        assert_eq!(gateway.rows(), vec![header(), first, third]);
    }

    #[tokio::test]
    async fn delete_missing_transaction_is_not_found() {
        let rows = vec![header(), row(&["1", "d", "income", "a", "1", "1", "1"])];
        let gateway = MemorySheetGateway::with_rows(rows.clone());
        let worksheet = worksheet_with(&gateway).await;

        let result = delete_transaction(worksheet.as_ref(), "2").await;

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(gateway.rows(), rows);
    }

    #[test]
    fn form_rejects_unknown_type() {
        let result = serde_json::from_str::<TransactionForm>(
            r#"{"type": "refund", "detail": "x", "price": 1, "qty": 1, "total_price": 1}"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn form_accepts_null_amounts() {
        let form: TransactionForm = serde_json::from_str(
            r#"{"type": "income", "detail": "x", "price": null, "qty": null, "total_price": null}"#,
        )
        .unwrap();

        assert_eq!(form.price, None);
    }
}
