//! Shared test infrastructure: in-memory Drive/Sheets fakes, a multipart
//! body builder and a helper that drives `/api/register` through actix.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_web::{App, http::StatusCode, http::header, test, web};
use async_trait::async_trait;
use serde_json::Value;

use sagra::errors::BackendError;
use sagra::handlers;
use sagra::intake::{Destination, DestinationTable, RegistrationService};
use sagra::sheets::SheetStore;
use sagra::storage::DocumentStore;

// ============================================================================
// FAKE BACKENDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCall {
    pub folder_id: String,
    pub name: String,
    pub mime_type: String,
    pub size: usize,
}

/// Records every file it is asked to create. Fails names containing the needle set by `fail_on`.
#[derive(Default)]
pub struct FakeDrive {
    pub uploads: Mutex<Vec<UploadCall>>,
    pub failing_name: Mutex<Option<String>>,
}

impl FakeDrive {
    pub fn uploads(&self) -> Vec<UploadCall> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn fail_on(&self, needle: &str) {
        *self.failing_name.lock().unwrap() = Some(needle.to_string());
    }
}

#[async_trait]
impl DocumentStore for FakeDrive {
    async fn create_file(
        &self,
        folder_id: &str,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Option<String>, BackendError> {
        if let Some(needle) = self.failing_name.lock().unwrap().as_deref() {
            if name.contains(needle) {
                return Err(BackendError::Other("quota exceeded".to_string()));
            }
        }
        self.uploads.lock().unwrap().push(UploadCall {
            folder_id: folder_id.to_string(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size: bytes.len(),
        });
        Ok(Some(name.to_string()))
    }
}

/// Spreadsheets as row vectors keyed by spreadsheet id.
#[derive(Default)]
pub struct FakeSheets {
    pub sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
    pub header_writes: Mutex<usize>,
    pub append_calls: Mutex<usize>,
    pub fail_append: Mutex<bool>,
    pub fail_read: Mutex<bool>,
}

impl FakeSheets {
    pub fn rows(&self, spreadsheet_id: &str) -> Vec<Vec<String>> {
        self.sheets
            .lock()
            .unwrap()
            .get(spreadsheet_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn header_writes(&self) -> usize {
        *self.header_writes.lock().unwrap()
    }

    pub fn append_calls(&self) -> usize {
        *self.append_calls.lock().unwrap()
    }

    pub fn touched(&self) -> bool {
        !self.sheets.lock().unwrap().is_empty() || self.append_calls() > 0
    }
}

#[async_trait]
impl SheetStore for FakeSheets {
    async fn read_range(&self, spreadsheet_id: &str, _range: &str) -> Result<Vec<Vec<String>>, BackendError> {
        if *self.fail_read.lock().unwrap() {
            return Err(BackendError::Status { status: 403, body: "permission denied".into() });
        }
        Ok(self.rows(spreadsheet_id).into_iter().take(1).collect())
    }

    async fn write_range(
        &self,
        spreadsheet_id: &str,
        _range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), BackendError> {
        *self.header_writes.lock().unwrap() += 1;
        let mut sheets = self.sheets.lock().unwrap();
        let sheet = sheets.entry(spreadsheet_id.to_string()).or_default();
        for (i, row) in values.into_iter().enumerate() {
            if i < sheet.len() {
                sheet[i] = row;
            } else {
                sheet.push(row);
            }
        }
        Ok(())
    }

    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        _range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), BackendError> {
        *self.append_calls.lock().unwrap() += 1;
        if *self.fail_append.lock().unwrap() {
            return Err(BackendError::Status { status: 503, body: "backend unavailable".into() });
        }
        self.sheets
            .lock()
            .unwrap()
            .entry(spreadsheet_id.to_string())
            .or_default()
            .extend(values);
        Ok(())
    }
}

// ============================================================================
// HARNESS
// ============================================================================

/// Service wired to fakes. Every sport is routed except `beachvolley`.
pub struct Harness {
    pub drive: Arc<FakeDrive>,
    pub sheets: Arc<FakeSheets>,
    pub service: web::Data<RegistrationService>,
}

pub fn sheet_id(sport: &str) -> String {
    format!("sheet-{sport}")
}

pub fn folder_id(sport: &str) -> String {
    format!("folder-{sport}")
}

impl Harness {
    pub fn new() -> Self {
        let drive = Arc::new(FakeDrive::default());
        let sheets = Arc::new(FakeSheets::default());
        let mut table = DestinationTable::from_lookup(|_| None);
        for sport in ["calcio", "4fogliano", "lodolata"] {
            table = table.with(
                sport,
                Destination { spreadsheet_id: sheet_id(sport), folder_id: folder_id(sport) },
            );
        }
        let service = web::Data::new(RegistrationService::new(
            table,
            drive.clone() as Arc<dyn DocumentStore>,
            sheets.clone() as Arc<dyn SheetStore>,
        ));
        Self { drive, sheets, service }
    }

    /// POST a multipart body to `/api/register`; returns status and JSON body.
    pub async fn post(&self, body: Multipart) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(self.service.clone())
                .configure(handlers::configure),
        )
        .await;
        let (content_type, payload) = body.finish();
        let req = test::TestRequest::post()
            .uri("/api/register")
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let json: Value = test::read_body_json(resp).await;
        (status, json)
    }
}

// ============================================================================
// MULTIPART BODIES
// ============================================================================

const BOUNDARY: &str = "----sagra-test-boundary-7MA4YWxk";

/// Hand-built `multipart/form-data` body.
#[derive(Default)]
pub struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, mime_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {mime_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={BOUNDARY}"), self.body)
    }
}

/// JSON for `n` members named `Nome<i> Cognome<i>`.
pub fn members_json(n: usize) -> String {
    let members: Vec<Value> = (0..n)
        .map(|i| {
            serde_json::json!({
                "firstName": format!("Nome{i}"),
                "lastName": format!("Cognome{i}"),
                "gender": if i % 2 == 0 { "M" } else { "F" },
                "birthDate": "2000-01-01",
                "birthPlace": "Fogliano",
                "address": format!("Via Roma {i}"),
            })
        })
        .collect();
    Value::Array(members).to_string()
}

/// All required scalar fields for `sport`, without members.
pub fn base_form(sport: &str, label: &str) -> Multipart {
    Multipart::new()
        .text("sport", sport)
        .text("sportLabel", label)
        .text("contactEmail", "referente@example.it")
        .text("contactPhone", "333 1234567")
}
