use std::collections::HashMap;

use crate::errors::RegistrationError;
use crate::models::sport::{self, SportDefinition};

/// Where one sport's registrations go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub spreadsheet_id: String,
    pub folder_id: String,
}

/// Sport id to destination map, built once at startup over the whole catalog.
#[derive(Debug, Clone, Default)]
pub struct DestinationTable {
    routes: HashMap<&'static str, Destination>,
    unconfigured: Vec<&'static str>,
}

impl DestinationTable {
    /// Build the table from `SPORT_<KEY>_SPREADSHEET_ID` and
    /// `SPORT_<KEY>_CERTIFICATI_FOLDER_ID` values. Blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut table = Self::default();
        for sport in sport::catalog() {
            let key = sport.env_key();
            let value = |suffix: &str| {
                lookup(&format!("SPORT_{key}_{suffix}"))
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
            };
            match (value("SPREADSHEET_ID"), value("CERTIFICATI_FOLDER_ID")) {
                (Some(spreadsheet_id), Some(folder_id)) => {
                    table.routes.insert(sport.id, Destination { spreadsheet_id, folder_id });
                }
                _ => {
                    log::warn!("No spreadsheet/folder configured for sport {}; its registrations will be refused", sport.id);
                    table.unconfigured.push(sport.id);
                }
            }
        }
        table
    }

    /// Route `sport_id` (a catalog id) to `destination`. Unknown ids are ignored.
    pub fn with(mut self, sport_id: &str, destination: Destination) -> Self {
        if let Some(sport) = sport::find(sport_id) {
            self.unconfigured.retain(|id| *id != sport.id);
            self.routes.insert(sport.id, destination);
        }
        self
    }

    /// Catalog ids that have no destination.
    pub fn unconfigured(&self) -> &[&'static str] {
        &self.unconfigured
    }

    /// Resolve a submitted sport id, case-insensitively. Fails closed.
    pub fn resolve(
        &self,
        sport_id: &str,
    ) -> Result<(&'static SportDefinition, &Destination), RegistrationError> {
        let sport = sport::find(sport_id).ok_or_else(|| {
            RegistrationError::Configuration(format!(
                "Sport non riconosciuto o non configurato: {sport_id}"
            ))
        })?;
        let destination = self.routes.get(sport.id).ok_or_else(|| {
            RegistrationError::Configuration(format!(
                "Configurazione Drive/Sheets mancante per lo sport: {sport_id}"
            ))
        })?;
        Ok((sport, destination))
    }
}
