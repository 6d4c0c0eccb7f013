use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::check_status;
use super::oauth::TokenSource;
use crate::errors::BackendError;
use crate::storage::DocumentStore;

const UPLOAD_URL: &str =
    "https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart&fields=id,name";

#[derive(Deserialize)]
struct DriveFile {
    #[serde(default)]
    name: Option<String>,
}

/// Google Drive v3 file creation through a `multipart/related` upload.
pub struct GoogleDrive {
    client: Client,
    tokens: Arc<TokenSource>,
}

impl GoogleDrive {
    pub fn new(client: Client, tokens: Arc<TokenSource>) -> Self {
        Self { client, tokens }
    }
}

/// Body of a Drive multipart upload: JSON metadata part followed by the media part.
fn related_body(boundary: &str, metadata: &serde_json::Value, mime_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 512);
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("--{boundary}\r\nContent-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[async_trait]
impl DocumentStore for GoogleDrive {
    async fn create_file(
        &self,
        folder_id: &str,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Option<String>, BackendError> {
        let token = self.tokens.access_token().await?;
        let boundary = format!("sagra-{}", hex::encode(rand::random::<[u8; 12]>()));
        let metadata = serde_json::json!({ "name": name, "parents": [folder_id] });
        let body = related_body(&boundary, &metadata, mime_type, &bytes);

        let response = self
            .client
            .post(UPLOAD_URL)
            .bearer_auth(token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await?;
        let file: DriveFile = check_status(response).await?.json().await?;

        log::info!("Stored {} in Drive folder {folder_id}", file.name.as_deref().unwrap_or(name));
        Ok(file.name)
    }
}
