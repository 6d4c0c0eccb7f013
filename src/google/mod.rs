//! Google Drive and Sheets clients backing the upload and spreadsheet adapters.

pub mod drive;
pub mod oauth;
pub mod sheets;

use reqwest::Response;

use crate::errors::BackendError;

/// Turn a non-2xx response into [`BackendError::Status`] with the response body.
async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status: status.as_u16(),
        body,
    })
}
