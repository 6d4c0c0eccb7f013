//! Browser-side half of the registration flow: the member editor, attachment
//! compression and the multipart encoder, plus an HTTP client that submits it.

pub mod compress;
pub mod editor;
pub mod encoder;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

pub use editor::{EditorError, MemberEditor, MemberField};
pub use encoder::EncodedSubmission;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Form(#[from] EditorError),
    #[error("Impossibile preparare l'iscrizione: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Errore di rete: {0}")]
    Http(#[from] reqwest::Error),
    /// The server refused the registration; `message` is its `error` text verbatim.
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Sends a registration to `POST <base>/api/register`, once, without retrying.
pub struct RegistrationClient {
    http: Client,
    endpoint: String,
}

impl RegistrationClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}/api/register", base_url.trim_end_matches('/')),
        }
    }

    /// Submit the editor's current state. The editor is only borrowed, so a
    /// failed attempt leaves the form intact for another try.
    pub async fn submit(&self, editor: &MemberEditor) -> Result<(), ClientError> {
        let submission = editor.build_submission()?;
        let encoded = encoder::encode(&submission).await?;
        let form = encoded.into_form()?;

        let response = self.http.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        if status.is_success() {
            log::info!("Registration for {} accepted", submission.sport_id);
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("Errore durante l'iscrizione ({status})"));
        log::warn!("Registration rejected with {status}: {message}");
        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
