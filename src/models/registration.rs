use serde::{Deserialize, Serialize};

/// Team name written when the form leaves it blank.
pub const DEFAULT_TEAM_NAME: &str = "Individuale";

/// Header row of every registration sheet, in column order.
pub const SHEET_HEADERS: [&str; 12] = [
    "Data Iscrizione",
    "Sport",
    "Nome Squadra",
    "Email Referente",
    "Telefono Referente",
    "Nome Componente",
    "Cognome Componente",
    "Sesso",
    "Data Nascita",
    "Luogo Nascita",
    "Indirizzo",
    "Nome File Certificato",
];

/// Identity fields of one participant, as sent in the `members` JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberDetails {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub birth_date: String,
    pub birth_place: String,
    pub address: String,
}

/// A binary document attached to a member (usually a medical certificate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One row of the member editor. `local_id` never leaves the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMember {
    pub local_id: String,
    pub details: MemberDetails,
    pub certificate: Option<Attachment>,
}

/// Snapshot of the form taken at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationSubmission {
    pub sport_id: String,
    pub sport_label: String,
    pub team_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub members: Vec<TeamMember>,
}

/// One spreadsheet row: the shared submission data plus a single member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedRow {
    pub timestamp: String,
    pub sport_label: String,
    pub team_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub member: MemberDetails,
    /// Empty when no document was attached.
    pub certificate_file_name: String,
}

impl PersistedRow {
    /// Cell values in [`SHEET_HEADERS`] order.
    pub fn into_cells(self) -> Vec<String> {
        vec![
            self.timestamp,
            self.sport_label,
            self.team_name,
            self.contact_email,
            self.contact_phone,
            self.member.first_name,
            self.member.last_name,
            self.member.gender,
            self.member.birth_date,
            self.member.birth_place,
            self.member.address,
            self.certificate_file_name,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_details_use_camel_case_keys() {
        let json = r#"{"firstName":"Anna","lastName":"Rossi","gender":"F",
            "birthDate":"2001-02-03","birthPlace":"Fogliano","address":"Via Roma 1"}"#;
        let m: MemberDetails = serde_json::from_str(json).unwrap();
        assert_eq!(m.first_name, "Anna");
        assert_eq!(m.birth_place, "Fogliano");
    }

    #[test]
    fn missing_member_fields_default_to_empty() {
        let m: MemberDetails = serde_json::from_str(r#"{"firstName":"Luca"}"#).unwrap();
        assert_eq!(m.first_name, "Luca");
        assert_eq!(m.address, "");
    }

    #[test]
    fn row_cells_follow_header_order() {
        let row = PersistedRow {
            timestamp: "01/06/2026, 10:00:00".into(),
            sport_label: "Beach Volley".into(),
            team_name: "Sabbia".into(),
            contact_email: "a@b.it".into(),
            contact_phone: "333".into(),
            member: MemberDetails {
                first_name: "Anna".into(),
                last_name: "Rossi".into(),
                gender: "F".into(),
                birth_date: "2001-02-03".into(),
                birth_place: "Fogliano".into(),
                address: "Via Roma 1".into(),
            },
            certificate_file_name: String::new(),
        };
        let cells = row.into_cells();
        assert_eq!(cells.len(), SHEET_HEADERS.len());
        assert_eq!(cells[2], "Sabbia");
        assert_eq!(cells[6], "Rossi");
        assert_eq!(cells[11], "");
    }

    #[test]
    fn attachment_detects_images() {
        assert!(Attachment::new("a.png", "image/png", vec![1]).is_image());
        assert!(!Attachment::new("a.pdf", "application/pdf", vec![1]).is_image());
    }
}
