use std::{fs, path::PathBuf, sync::Arc, sync::RwLock};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::schedule::{
    slots::{DEFAULT_END_HOUR, DEFAULT_FIRST_HOUR, DEFAULT_SLOT_MINUTES},
    DecodePolicy, SlotCatalog, SlotSetCodec,
};
use crate::error::ScheduleError;

/// Shape of the grid. Changing the window of a deployment with stored
/// schedules shifts every bit, so treat these as fixed once data exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub first_hour: u32,
    pub end_hour: u32,
    pub slot_minutes: u32,
    pub decode_policy: DecodePolicy,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            first_hour: DEFAULT_FIRST_HOUR,
            end_hour: DEFAULT_END_HOUR,
            slot_minutes: DEFAULT_SLOT_MINUTES,
            decode_policy: DecodePolicy::Lenient,
        }
    }
}

impl GridSettings {
    pub fn catalog(&self) -> Result<SlotCatalog, ScheduleError> {
        SlotCatalog::new(self.first_hour, self.end_hour, self.slot_minutes)
    }

    pub fn codec(&self) -> Result<SlotSetCodec, ScheduleError> {
        Ok(SlotSetCodec::new(
            Arc::new(self.catalog()?),
            self.decode_policy,
        ))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserSettings {
    #[serde(default)]
    grid: GridSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn grid(&self) -> GridSettings {
        self.data.read().unwrap().grid.clone()
    }

    pub fn update_grid(&self, settings: GridSettings) -> Result<()> {
        settings
            .catalog()
            .context("Refusing to store an unusable grid")?;
        {
            let mut guard = self.data.write().unwrap();
            guard.grid = settings;
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: UserSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", self.path.display()))?;
        let mut guard = self.data.write().unwrap();
        *guard = data;
        Ok(())
    }
}
