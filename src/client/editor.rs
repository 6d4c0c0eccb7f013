use thiserror::Error;

use crate::models::registration::{Attachment, MemberDetails, RegistrationSubmission, TeamMember};
use crate::models::sport::{self, SportDefinition};
use crate::validate;

/// Why the form cannot be turned into a submission yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("Sport sconosciuto: {0}")]
    UnknownSport(String),
    #[error("Seleziona un evento")]
    NoSport,
    #[error("Numero di componenti non valido: {count} (minimo {min}{})", .max.map(|m| format!(", massimo {m}")).unwrap_or_default())]
    MemberCount {
        count: usize,
        min: usize,
        max: Option<usize>,
    },
    #[error("{}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// One editable field of a member row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberField {
    FirstName,
    LastName,
    Gender,
    BirthDate,
    BirthPlace,
    Address,
}

impl MemberField {
    fn slot(self, details: &mut MemberDetails) -> &mut String {
        match self {
            MemberField::FirstName => &mut details.first_name,
            MemberField::LastName => &mut details.last_name,
            MemberField::Gender => &mut details.gender,
            MemberField::BirthDate => &mut details.birth_date,
            MemberField::BirthPlace => &mut details.birth_place,
            MemberField::Address => &mut details.address,
        }
    }
}

fn new_local_id() -> String {
    hex::encode(rand::random::<[u8; 8]>())
}

fn fresh_member() -> TeamMember {
    TeamMember {
        local_id: new_local_id(),
        details: MemberDetails::default(),
        certificate: None,
    }
}

/// Form state for one registration. The member list always stays within the
/// selected sport's bounds; operations that would break them return `false`.
#[derive(Debug, Clone, Default)]
pub struct MemberEditor {
    sport: Option<&'static SportDefinition>,
    pub team_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    members: Vec<TeamMember>,
}

impl MemberEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sport(&self) -> Option<&'static SportDefinition> {
        self.sport
    }

    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    /// Select a sport and reset the list to its minimum number of fresh rows.
    pub fn select_sport(&mut self, id: &str) -> Result<(), EditorError> {
        let sport = sport::find(id).ok_or_else(|| EditorError::UnknownSport(id.to_string()))?;
        self.sport = Some(sport);
        self.members = (0..sport.min_members).map(|_| fresh_member()).collect();
        Ok(())
    }

    pub fn can_add(&self) -> bool {
        self.sport.is_some_and(|s| s.has_room(self.members.len()))
    }

    pub fn can_remove(&self) -> bool {
        self.sport.is_some_and(|s| self.members.len() > s.min_members)
    }

    pub fn is_within_bounds(&self) -> bool {
        self.sport.is_some_and(|s| s.accepts(self.members.len()))
    }

    /// Append a fresh row. Returns the new row's id, or `None` at the maximum.
    pub fn add_member(&mut self) -> Option<String> {
        if !self.can_add() {
            return None;
        }
        let member = fresh_member();
        let id = member.local_id.clone();
        self.members.push(member);
        Some(id)
    }

    /// Remove a row unless that would drop below the minimum.
    pub fn remove_member(&mut self, local_id: &str) -> bool {
        if !self.can_remove() {
            return false;
        }
        let before = self.members.len();
        self.members.retain(|m| m.local_id != local_id);
        self.members.len() != before
    }

    pub fn update_member(&mut self, local_id: &str, field: MemberField, value: &str) -> bool {
        match self.member_mut(local_id) {
            Some(member) => {
                *field.slot(&mut member.details) = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn attach_certificate(&mut self, local_id: &str, attachment: Attachment) -> bool {
        match self.member_mut(local_id) {
            Some(member) => {
                member.certificate = Some(attachment);
                true
            }
            None => false,
        }
    }

    pub fn clear_certificate(&mut self, local_id: &str) -> bool {
        match self.member_mut(local_id) {
            Some(member) => member.certificate.take().is_some(),
            None => false,
        }
    }

    /// Back to an empty form with no sport selected.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn member_mut(&mut self, local_id: &str) -> Option<&mut TeamMember> {
        self.members.iter_mut().find(|m| m.local_id == local_id)
    }

    /// Snapshot the form for sending. Refuses incomplete or out-of-bounds state.
    pub fn build_submission(&self) -> Result<RegistrationSubmission, EditorError> {
        let sport = self.sport.ok_or(EditorError::NoSport)?;
        if !sport.accepts(self.members.len()) {
            return Err(EditorError::MemberCount {
                count: self.members.len(),
                min: sport.min_members,
                max: sport.max_members,
            });
        }

        let mut errors = Vec::new();
        errors.extend(validate::validate_email(&self.contact_email));
        errors.extend(validate::validate_phone(&self.contact_phone));
        for (i, member) in self.members.iter().enumerate() {
            let n = i + 1;
            errors.extend(validate::validate_required(
                &member.details.first_name,
                &format!("Nome del componente {n}"),
                100,
            ));
            errors.extend(validate::validate_required(
                &member.details.last_name,
                &format!("Cognome del componente {n}"),
                100,
            ));
        }
        if !errors.is_empty() {
            return Err(EditorError::Invalid(errors));
        }

        Ok(RegistrationSubmission {
            sport_id: sport.id.to_string(),
            sport_label: sport.label.to_string(),
            team_name: self.team_name.trim().to_string(),
            contact_email: self.contact_email.trim().to_string(),
            contact_phone: self.contact_phone.trim().to_string(),
            members: self.members.clone(),
        })
    }
}
