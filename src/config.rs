use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use teloxide::types::ChatId;

use crate::draft::ReportDraft;
use crate::types::{Daytime, Location};

/// Everything the report flows read from configuration. Loaded once at
/// startup and shared read-only.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub locations: Vec<Location>,
    pub masters_categories: Vec<String>,
    pub clients_lost_categories: Vec<String>,
    /// Flows that get the solarium counter step at locations with a solarium.
    pub solarium_flows: Vec<Daytime>,
    pub daily_excel_min_photos: usize,
    pub album_window_ms: u64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        let labels = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();

        ReportSettings {
            locations: vec![
                Location {
                    id: 1,
                    name: "Салон 1".into(),
                    address: "ул. Мира 1".into(),
                    has_solarium: false,
                },
                Location {
                    id: 2,
                    name: "Салон 2".into(),
                    address: "ул. Вокзальная 2".into(),
                    has_solarium: true,
                },
                Location {
                    id: 3,
                    name: "Салон 3".into(),
                    address: "ул. Третья 3".into(),
                    has_solarium: false,
                },
            ],
            masters_categories: labels(&["Мужской зал", "Женский зал", "Маникюр", "Косметология"]),
            clients_lost_categories: labels(&[
                "Мужской зал",
                "Женский зал",
                "Маникюр",
                "Педикюр",
                "Косметология",
                "Солярий",
            ]),
            solarium_flows: vec![Daytime::Morning, Daytime::Evening],
            daily_excel_min_photos: 2,
            album_window_ms: 700,
        }
    }
}

impl ReportSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: ReportSettings =
            serde_json::from_str(json).context("Invalid report settings")?;
        Ok(settings)
    }

    pub fn location(&self, id: i64) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn categories(&self, daytime: Daytime) -> &[String] {
        match daytime {
            Daytime::Morning => &self.masters_categories,
            Daytime::Evening => &self.clients_lost_categories,
        }
    }

    /// Whether the solarium counter step is part of this draft's flow.
    pub fn has_solarium_step(&self, draft: &ReportDraft) -> bool {
        draft.has_solarium() && self.solarium_flows.contains(&draft.daytime())
    }

    pub fn album_window(&self) -> Duration {
        Duration::from_millis(self.album_window_ms)
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_location: String,
    pub admin_ids: Vec<ChatId>,
    pub report: ReportSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_location =
            std::env::var("DATABASE_LOCATION").context("DATABASE_LOCATION must be set")?;

        let admin_ids = parse_admin_ids(&std::env::var("ADMINS").unwrap_or_default())?;

        let report = match std::env::var("REPORT_SETTINGS") {
            Ok(path) => {
                log::debug!("Reading report settings from {:?}", path);
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("Could not read {}", path))?;
                ReportSettings::from_json(&json)?
            }
            Err(_) => {
                log::warn!("REPORT_SETTINGS not set, using built-in locations");
                ReportSettings::default()
            }
        };

        Ok(Config {
            database_location,
            admin_ids,
            report,
        })
    }
}

pub fn parse_admin_ids(value: &str) -> Result<Vec<ChatId>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map(ChatId)
                .with_context(|| format!("Invalid admin id {:?}", s))
        })
        .collect()
}
