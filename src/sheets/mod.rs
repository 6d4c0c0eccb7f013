//! Spreadsheet adapter: header initialization and row append on a [`SheetStore`].

use async_trait::async_trait;

use crate::errors::{BackendError, SpreadsheetError};
use crate::models::registration::{PersistedRow, SHEET_HEADERS};

/// Tab every registration sheet writes to.
pub const SHEET_NAME: &str = "Foglio1";

/// Tabular backend addressed by spreadsheet id and A1 range.
#[async_trait]
pub trait SheetStore: Send + Sync {
    async fn read_range(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, BackendError>;

    async fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), BackendError>;

    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), BackendError>;
}

fn header_row() -> Vec<String> {
    SHEET_HEADERS.iter().map(|h| h.to_string()).collect()
}

/// Write the header row if the first row of the sheet is empty.
///
/// Returns whether the header was written. Two concurrent callers may both
/// see an empty row and both write; the content is the same either way.
pub async fn ensure_headers(store: &dyn SheetStore, spreadsheet_id: &str) -> Result<bool, SpreadsheetError> {
    let first_row = store
        .read_range(spreadsheet_id, &format!("{SHEET_NAME}!A1:Z1"))
        .await
        .map_err(SpreadsheetError::Headers)?;

    if first_row.iter().any(|row| !row.is_empty()) {
        return Ok(false);
    }

    store
        .write_range(spreadsheet_id, &format!("{SHEET_NAME}!A1"), vec![header_row()])
        .await
        .map_err(SpreadsheetError::Headers)?;
    log::info!("Initialized headers of sheet {spreadsheet_id}");
    Ok(true)
}

/// Append all rows, in order, in a single call.
pub async fn append_registration(
    store: &dyn SheetStore,
    spreadsheet_id: &str,
    rows: Vec<PersistedRow>,
) -> Result<(), SpreadsheetError> {
    let values: Vec<Vec<String>> = rows.into_iter().map(PersistedRow::into_cells).collect();
    store
        .append_rows(spreadsheet_id, &format!("{SHEET_NAME}!A:M"), values)
        .await
        .map_err(SpreadsheetError::Append)
}
