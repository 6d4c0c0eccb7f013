use serde::Serialize;

/// Whether a competition is entered by a team or by a single participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SportKind {
    Team,
    Individual,
}

/// A selectable competition and its team-size bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SportDefinition {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: SportKind,
    pub min_members: usize,
    /// `None` means no upper bound.
    pub max_members: Option<usize>,
    pub hint: &'static str,
}

impl SportDefinition {
    /// True when a registration with `count` members respects the bounds.
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_members && self.max_members.is_none_or(|max| count <= max)
    }

    /// True when one more member could be added to a list of `count`.
    pub fn has_room(&self, count: usize) -> bool {
        self.max_members.is_none_or(|max| count < max)
    }

    /// Key used for the per-sport environment variables (`SPORT_<KEY>_...`).
    pub fn env_key(&self) -> String {
        self.id.to_ascii_uppercase()
    }
}

static CATALOG: [SportDefinition; 4] = [
    SportDefinition {
        id: "calcio",
        label: "Calcio a 8",
        kind: SportKind::Team,
        min_members: 8,
        max_members: None,
        hint: "Minimo 8 giocatori per squadra",
    },
    SportDefinition {
        id: "beachvolley",
        label: "Beach Volley",
        kind: SportKind::Team,
        min_members: 2,
        max_members: Some(6),
        hint: "Minimo 2, massimo 6 giocatori per squadra",
    },
    SportDefinition {
        id: "4fogliano",
        label: "4Fogliano (Basket 4v4)",
        kind: SportKind::Team,
        min_members: 4,
        max_members: Some(6),
        hint: "Minimo 4, massimo 6 giocatori per squadra",
    },
    SportDefinition {
        id: "lodolata",
        label: "Lodolata (Corsa)",
        kind: SportKind::Individual,
        min_members: 1,
        max_members: Some(1),
        hint: "Iscrizione individuale",
    },
];

/// Alternative spellings accepted for a catalog id.
const ALIASES: &[(&str, &str)] = &[("quattro-fogliano", "4fogliano")];

/// All selectable competitions, in display order.
pub fn catalog() -> &'static [SportDefinition] {
    &CATALOG
}

/// Look up a sport by id, ignoring case and accepting known aliases.
pub fn find(id: &str) -> Option<&'static SportDefinition> {
    let normalized = id.trim().to_lowercase();
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, target)| *target)
        .unwrap_or(normalized.as_str());
    CATALOG.iter().find(|s| s.id == canonical)
}
