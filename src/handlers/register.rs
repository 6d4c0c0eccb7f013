use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures_util::StreamExt;

use crate::errors::RegistrationError;
use crate::intake::{IntakeForm, RegistrationService};
use crate::models::registration::Attachment;

const DEFAULT_MIME: &str = "application/octet-stream";

/// Largest single part (field or file) accepted from a registration form.
pub const MAX_PART_BYTES: usize = 10 * 1024 * 1024;

/// POST /api/register
/// Multipart registration: scalar fields, `members` JSON, `certificate_<i>` files.
pub async fn submit(
    service: web::Data<RegistrationService>,
    mut payload: Multipart,
) -> Result<HttpResponse, RegistrationError> {
    let form = read_form(&mut payload).await?;
    let receipt = service.register(form).await?;
    log::info!(
        "Registered {} member(s) for {} (team {:?}, {} certificate(s){})",
        receipt.rows_written,
        receipt.sport_id,
        receipt.team_name,
        receipt.stored_files.len(),
        if receipt.headers_initialized { ", new sheet" } else { "" }
    );
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

fn malformed(e: impl std::fmt::Display) -> RegistrationError {
    RegistrationError::Validation(format!("Richiesta non valida: {e}"))
}

/// Drain the multipart stream. Parts with a filename become attachments,
/// everything else is read as UTF-8 text. Later parts win on duplicate names.
/// A part larger than [`MAX_PART_BYTES`] rejects the whole request.
async fn read_form(payload: &mut Multipart) -> Result<IntakeForm, RegistrationError> {
    let mut form = IntakeForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(malformed)?;
        let Some(disposition) = field.content_disposition() else {
            continue;
        };
        let Some(name) = disposition.get_name().map(str::to_owned) else {
            continue;
        };
        let file_name = disposition.get_filename().map(str::to_owned);
        let mime_type = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_else(|| DEFAULT_MIME.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(malformed)?;
            if bytes.len() + chunk.len() > MAX_PART_BYTES {
                return Err(RegistrationError::Validation(format!(
                    "Il file {} supera la dimensione massima di {} MB.",
                    file_name.as_deref().unwrap_or(&name),
                    MAX_PART_BYTES / (1024 * 1024)
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        match file_name {
            Some(file_name) => {
                form.files.insert(name, Attachment::new(file_name, mime_type, bytes));
            }
            None => {
                form.fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
            }
        }
    }

    Ok(form)
}
