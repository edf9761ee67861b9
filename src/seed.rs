//! Initial data loaded at startup
//!
//! The seed file is a JSON object with one flat list per collection. Ids are integers and no
//! references between collections are enforced here; the only checks are the ones that would
//! otherwise break the schedule invariants.

use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    adapters::schedule::{InvalidBook, ScheduleBook},
    domain::{AdviceItem, Appointment, Availability, IdSequence, Ritual, User},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub rituals: Vec<Ritual>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub availabilities: Vec<Availability>,
    #[serde(default)]
    pub advice: Vec<AdviceItem>,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid seed data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate id {id} in {collection}")]
    DuplicateId { collection: &'static str, id: u64 },
    #[error("no ids left for new {0}")]
    IdsExhausted(&'static str),
    #[error("invalid schedule: {0}")]
    Schedule(#[from] InvalidBook),
}

impl SeedData {
    pub fn from_json_str(content: &str) -> Result<Self, SeedError> {
        let seed: Self = serde_json::from_str(content)?;
        seed.validate()?;
        Ok(seed)
    }

    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let content = fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), SeedError> {
        unique_ids("users", self.users.iter().map(|u| u.id.0))?;
        unique_ids("rituals", self.rituals.iter().map(|r| r.id.0))?;
        unique_ids("advice", self.advice.iter().map(|a| a.id.0))?;
        if IdSequence::starting_after(self.users.iter().map(|u| u.id.0)).is_exhausted() {
            return Err(SeedError::IdsExhausted("users"));
        }
        if IdSequence::starting_after(self.advice.iter().map(|a| a.id.0)).is_exhausted() {
            return Err(SeedError::IdsExhausted("advice"));
        }

        self.schedule_book().validate()?;
        Ok(())
    }

    pub fn schedule_book(&self) -> ScheduleBook {
        ScheduleBook::new(self.appointments.clone(), self.availabilities.clone())
    }
}

fn unique_ids(
    collection: &'static str,
    ids: impl Iterator<Item = u64>,
) -> Result<(), SeedError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(SeedError::DuplicateId { collection, id });
        }
    }
    Ok(())
}
