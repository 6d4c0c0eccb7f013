//! Registration intake: validation, certificate fan-out and sheet persistence.

pub mod destinations;
pub mod uploads;

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::RegistrationError;
use crate::models::registration::{Attachment, DEFAULT_TEAM_NAME, MemberDetails, PersistedRow};
use crate::sheets::{self, SheetStore};
use crate::storage::{self, DocumentStore};

pub use destinations::{Destination, DestinationTable};
pub use uploads::{StoredUpload, UploadBatch, UploadOutcome};

/// Same layout as the `it-IT` locale string: `19/10/2026, 14:03:05`.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

const MISSING_FIELDS: &str = "Dati mancanti: sport, email, telefono e membri sono obbligatori.";
const NO_MEMBERS: &str = "Devi inserire almeno un componente.";

/// Raw multipart content: text fields and file parts, keyed by part name.
#[derive(Debug, Default)]
pub struct IntakeForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, Attachment>,
}

impl IntakeForm {
    /// Trimmed text field; blank counts as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Remove and return the non-empty `certificate_<index>` part, if any.
    pub fn take_certificate(&mut self, index: usize) -> Option<Attachment> {
        self.files
            .remove(&format!("certificate_{index}"))
            .filter(|a| !a.is_empty())
    }
}

/// Validated scalar fields and member list of one registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub sport_id: String,
    pub sport_label: String,
    pub team_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub members: Vec<MemberDetails>,
}

impl RegistrationRequest {
    pub fn from_form(form: &IntakeForm) -> Result<Self, RegistrationError> {
        let missing = || RegistrationError::Validation(MISSING_FIELDS.to_string());

        let sport_id = form.text("sport").ok_or_else(missing)?;
        let sport_label = form.text("sportLabel").ok_or_else(missing)?;
        let contact_email = form.text("contactEmail").ok_or_else(missing)?;
        let contact_phone = form.text("contactPhone").ok_or_else(missing)?;
        let members_json = form.text("members").ok_or_else(missing)?;

        let members = parse_members(members_json)?;
        let team_name = form.text("teamName").unwrap_or(DEFAULT_TEAM_NAME);

        Ok(Self {
            sport_id: sport_id.to_string(),
            sport_label: sport_label.to_string(),
            team_name: team_name.to_string(),
            contact_email: contact_email.to_string(),
            contact_phone: contact_phone.to_string(),
            members,
        })
    }
}

fn parse_members(json: &str) -> Result<Vec<MemberDetails>, RegistrationError> {
    let invalid = |e: serde_json::Error| {
        RegistrationError::Validation(format!("Elenco componenti non valido: {e}"))
    };

    let value: serde_json::Value = serde_json::from_str(json).map_err(invalid)?;
    match value.as_array() {
        Some(items) if !items.is_empty() => {}
        _ => return Err(RegistrationError::Validation(NO_MEMBERS.to_string())),
    }
    serde_json::from_value(value).map_err(invalid)
}

/// What a successful registration produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReceipt {
    pub sport_id: &'static str,
    pub team_name: String,
    pub rows_written: usize,
    pub stored_files: Vec<String>,
    /// True when this registration wrote the sheet's header row.
    pub headers_initialized: bool,
}

/// Runs one registration end to end against the injected backends.
pub struct RegistrationService {
    destinations: DestinationTable,
    documents: Arc<dyn DocumentStore>,
    sheets: Arc<dyn SheetStore>,
}

impl RegistrationService {
    pub fn new(
        destinations: DestinationTable,
        documents: Arc<dyn DocumentStore>,
        sheets: Arc<dyn SheetStore>,
    ) -> Self {
        Self { destinations, documents, sheets }
    }

    /// Validate, upload certificates, make sure the sheet has headers, then
    /// append one row per member. The first failure aborts the request;
    /// files stored before it are not removed.
    pub async fn register(&self, mut form: IntakeForm) -> Result<RegistrationReceipt, RegistrationError> {
        let request = RegistrationRequest::from_form(&form)?;
        let (sport, destination) = self.destinations.resolve(&request.sport_id)?;

        let mut batch = UploadBatch::new(Arc::clone(&self.documents), &destination.folder_id);
        for (index, member) in request.members.iter().enumerate() {
            if let Some(certificate) = form.take_certificate(index) {
                let prefix =
                    storage::certificate_prefix(&request.sport_id, &member.last_name, &member.first_name);
                batch.spawn(index, prefix, certificate);
            }
        }

        let mut certificate_names = vec![String::new(); request.members.len()];
        let mut stored_files = Vec::with_capacity(batch.len());
        match batch.join().await {
            UploadOutcome::Complete(uploads) => {
                for upload in uploads {
                    certificate_names[upload.member_index] = upload.stored_name.clone();
                    stored_files.push(upload.stored_name);
                }
            }
            UploadOutcome::Partial { failed_member, error, orphaned } => {
                for upload in &orphaned {
                    log::warn!(
                        "Orphaned certificate {} for member {} of a failed {} registration",
                        upload.stored_name,
                        upload.member_index,
                        sport.id
                    );
                }
                log::error!(
                    "Certificate upload failed for member {:?} ({} file(s) orphaned)",
                    failed_member,
                    orphaned.len()
                );
                return Err(error.into());
            }
        }

        let headers_initialized =
            sheets::ensure_headers(self.sheets.as_ref(), &destination.spreadsheet_id).await?;

        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let rows: Vec<PersistedRow> = request
            .members
            .into_iter()
            .zip(certificate_names)
            .map(|(member, certificate_file_name)| PersistedRow {
                timestamp: timestamp.clone(),
                sport_label: request.sport_label.clone(),
                team_name: request.team_name.clone(),
                contact_email: request.contact_email.clone(),
                contact_phone: request.contact_phone.clone(),
                member,
                certificate_file_name,
            })
            .collect();
        let rows_written = rows.len();

        sheets::append_registration(self.sheets.as_ref(), &destination.spreadsheet_id, rows).await?;

        Ok(RegistrationReceipt {
            sport_id: sport.id,
            team_name: request.team_name,
            rows_written,
            stored_files,
            headers_initialized,
        })
    }
}
