//! Upload adapter: names member documents and hands them to a [`DocumentStore`].

use async_trait::async_trait;

use crate::errors::{BackendError, StorageError};

/// A backend able to create one file inside a folder.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create `name` in `folder_id`. Returns the name the backend stored, when it reports one.
    async fn create_file(
        &self,
        folder_id: &str,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Option<String>, BackendError>;
}

/// Replace every character other than ASCII letters, digits, `.` and `-` with `_`.
/// Characters outside the BMP become two underscores, one per UTF-16 unit,
/// so names match those produced by browser-side tooling.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
            out.push(c);
        } else {
            out.extend(std::iter::repeat_n('_', c.len_utf16()));
        }
    }
    out
}

/// `sport_lastName_firstName`, each whitespace run collapsed to one `_`.
pub fn certificate_prefix(sport: &str, last_name: &str, first_name: &str) -> String {
    let raw = format!("{sport}_{last_name}_{first_name}");
    let mut out = String::with_capacity(raw.len());
    let mut in_space = false;
    for c in raw.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Final stored name: `<prefix>_<millis>_<sanitized original>`.
pub fn stored_file_name(prefix: &str, millis: i64, original_name: &str) -> String {
    format!("{prefix}_{millis}_{}", sanitize_file_name(original_name))
}

/// Upload one member document and return the name it was stored under.
pub async fn upload_certificate(
    store: &dyn DocumentStore,
    folder_id: &str,
    bytes: Vec<u8>,
    original_name: &str,
    mime_type: &str,
    prefix: &str,
) -> Result<String, StorageError> {
    let file_name = stored_file_name(prefix, chrono::Utc::now().timestamp_millis(), original_name);

    match store.create_file(folder_id, &file_name, mime_type, bytes).await {
        Ok(stored) => Ok(stored.unwrap_or(file_name)),
        Err(e) => {
            log::error!("Upload of {file_name} to folder {folder_id} failed: {e}");
            Err(StorageError::Upload(e))
        }
    }
}
