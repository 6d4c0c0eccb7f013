use std::collections::HashMap;

use reqwest::multipart::{Form, Part};
use tokio::task::JoinSet;

use super::compress::{self, CompressionLimits};
use crate::models::registration::{Attachment, MemberDetails, RegistrationSubmission};

/// A submission ready to go on the wire: text fields plus `certificate_<i>` files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSubmission {
    pub fields: Vec<(&'static str, String)>,
    /// `(member index, attachment)`, in member order.
    pub certificates: Vec<(usize, Attachment)>,
}

impl EncodedSubmission {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn certificate(&self, member_index: usize) -> Option<&Attachment> {
        self.certificates
            .iter()
            .find(|(i, _)| *i == member_index)
            .map(|(_, a)| a)
    }

    pub fn into_form(self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for (index, attachment) in self.certificates {
            let part = Part::bytes(attachment.bytes)
                .file_name(attachment.file_name)
                .mime_str(&attachment.mime_type)?;
            form = form.part(format!("certificate_{index}"), part);
        }
        Ok(form)
    }
}

/// Encode with the default compression ceiling.
pub async fn encode(submission: &RegistrationSubmission) -> serde_json::Result<EncodedSubmission> {
    encode_with(submission, CompressionLimits::default()).await
}

/// Compress every image attachment concurrently, then lay out the fields.
/// A compression that fails or panics sends that member's original file.
pub async fn encode_with(
    submission: &RegistrationSubmission,
    limits: CompressionLimits,
) -> serde_json::Result<EncodedSubmission> {
    let details: Vec<&MemberDetails> = submission.members.iter().map(|m| &m.details).collect();
    let members_json = serde_json::to_string(&details)?;

    let originals: Vec<(usize, Attachment)> = submission
        .members
        .iter()
        .enumerate()
        .filter_map(|(i, m)| m.certificate.clone().filter(|c| !c.is_empty()).map(|c| (i, c)))
        .collect();

    let mut tasks = JoinSet::new();
    for (index, attachment) in &originals {
        let (index, attachment) = (*index, attachment.clone());
        tasks.spawn_blocking(move || (index, compress::compress_attachment(attachment, limits)));
    }
    let mut compressed = HashMap::with_capacity(originals.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, attachment)) => {
                compressed.insert(index, attachment);
            }
            Err(e) => log::warn!("Compression task failed, sending original: {e}"),
        }
    }

    let certificates = originals
        .into_iter()
        .map(|(index, original)| (index, compressed.remove(&index).unwrap_or(original)))
        .collect();

    Ok(EncodedSubmission {
        fields: vec![
            ("sport", submission.sport_id.clone()),
            ("sportLabel", submission.sport_label.clone()),
            ("teamName", submission.team_name.clone()),
            ("contactEmail", submission.contact_email.clone()),
            ("contactPhone", submission.contact_phone.clone()),
            ("members", members_json),
        ],
        certificates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::registration::TeamMember;

    fn member(first: &str, certificate: Option<Attachment>) -> TeamMember {
        TeamMember {
            local_id: format!("id-{first}"),
            details: MemberDetails {
                first_name: first.into(),
                last_name: "Verdi".into(),
                ..MemberDetails::default()
            },
            certificate,
        }
    }

    fn submission(members: Vec<TeamMember>) -> RegistrationSubmission {
        RegistrationSubmission {
            sport_id: "beachvolley".into(),
            sport_label: "Beach Volley".into(),
            team_name: "Onda".into(),
            contact_email: "onda@example.it".into(),
            contact_phone: "3330000000".into(),
            members,
        }
    }

    #[tokio::test]
    async fn fields_and_member_json() {
        let encoded = encode(&submission(vec![member("Ugo", None), member("Ida", None)]))
            .await
            .unwrap();
        assert_eq!(encoded.field("sport"), Some("beachvolley"));
        assert_eq!(encoded.field("teamName"), Some("Onda"));

        let members: Vec<serde_json::Value> =
            serde_json::from_str(encoded.field("members").unwrap()).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[1]["firstName"], "Ida");
        assert!(members[0].get("localId").is_none());
        assert!(encoded.certificates.is_empty());
    }

    #[tokio::test]
    async fn certificates_keep_member_index() {
        let pdf = Attachment::new("cert.pdf", "application/pdf", b"%PDF-1.7".to_vec());
        let encoded = encode(&submission(vec![
            member("Ugo", None),
            member("Ida", Some(pdf.clone())),
            member("Eva", Some(Attachment::new("vuoto.pdf", "application/pdf", Vec::new()))),
        ]))
        .await
        .unwrap();

        assert_eq!(encoded.certificates.len(), 1);
        assert_eq!(encoded.certificate(1), Some(&pdf));
        assert!(encoded.certificate(0).is_none());
        assert!(encoded.certificate(2).is_none());
    }

    #[tokio::test]
    async fn broken_image_is_sent_unmodified() {
        let broken = Attachment::new("foto.jpg", "image/jpeg", vec![9; 64]);
        let encoded = encode(&submission(vec![member("Ugo", Some(broken.clone()))]))
            .await
            .unwrap();
        assert_eq!(encoded.certificate(0), Some(&broken));
    }

    #[test]
    fn into_form_accepts_encoded_parts() {
        let encoded = EncodedSubmission {
            fields: vec![("sport", "calcio".into())],
            certificates: vec![(0, Attachment::new("a.pdf", "application/pdf", vec![1]))],
        };
        assert!(encoded.into_form().is_ok());
    }
}
