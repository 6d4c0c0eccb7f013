use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use super::check_status;
use super::oauth::TokenSource;
use crate::errors::BackendError;
use crate::sheets::SheetStore;

const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Serialize)]
struct ValueRangeBody<'a> {
    values: &'a [Vec<String>],
}

/// Google Sheets v4 `values` endpoints, writing with `USER_ENTERED`.
pub struct GoogleSheets {
    client: Client,
    tokens: Arc<TokenSource>,
}

impl GoogleSheets {
    pub fn new(client: Client, tokens: Arc<TokenSource>) -> Self {
        Self { client, tokens }
    }
}

/// `.../spreadsheets/{id}/values/{range}{suffix}`, with each segment percent-encoded.
fn values_url(spreadsheet_id: &str, range: &str, suffix: &str) -> Result<Url, BackendError> {
    let mut url = Url::parse(SHEETS_BASE).map_err(|e| BackendError::Other(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| BackendError::Other("invalid Sheets base URL".to_string()))?
        .pop_if_empty()
        .push(spreadsheet_id)
        .push("values")
        .push(&format!("{range}{suffix}"));
    Ok(url)
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetStore for GoogleSheets {
    async fn read_range(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, BackendError> {
        let token = self.tokens.access_token().await?;
        let url = values_url(spreadsheet_id, range, "")?;
        let response = self.client.get(url).bearer_auth(token).send().await?;
        let body: ValueRange = check_status(response).await?.json().await?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), BackendError> {
        let token = self.tokens.access_token().await?;
        let url = values_url(spreadsheet_id, range, "")?;
        let response = self
            .client
            .put(url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(token)
            .json(&ValueRangeBody { values: &values })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), BackendError> {
        let token = self.tokens.access_token().await?;
        let url = values_url(spreadsheet_id, range, ":append")?;
        let response = self
            .client
            .post(url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(token)
            .json(&ValueRangeBody { values: &values })
            .send()
            .await?;
        check_status(response).await?;
        log::info!("Appended {} row(s) to sheet {spreadsheet_id}", values.len());
        Ok(())
    }
}
