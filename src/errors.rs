use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use std::error::Error as StdError;
use thiserror::Error;

/// Failure reported by a remote backend (Drive, Sheets, OAuth) or a fake standing in for one.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("{0}")]
    Other(String),
}

/// Upload of a member document failed.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Impossibile caricare il certificato su Google Drive.")]
    Upload(#[source] BackendError),
    #[error("Caricamento del certificato interrotto: {0}")]
    Interrupted(String),
}

/// Reading or writing the registration sheet failed.
#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("Impossibile accedere al foglio Google Sheets.")]
    Headers(#[source] BackendError),
    #[error("Impossibile salvare i dati dell'iscrizione sul foglio di calcolo.")]
    Append(#[source] BackendError),
}

/// Everything that can stop a registration on the server.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Client-correctable input problem.
    #[error("{0}")]
    Validation(String),
    /// Sport unknown or its destinations not configured.
    #[error("{0}")]
    Configuration(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ResponseError for RegistrationError {
    fn status_code(&self) -> StatusCode {
        match self {
            RegistrationError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = self.to_string();
        match self {
            RegistrationError::Validation(_) => log::warn!("Registration rejected: {message}"),
            _ => log::error!("Registration failed: {}", error_chain(self)),
        }
        HttpResponse::build(self.status_code()).json(ErrorBody { error: &message })
    }
}

/// Render an error and all of its sources as `outer: inner: ...` for logging.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.ends_with(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}
