//! Wiring of adapters into the domain services, driven by [`BookingConfig`]

use std::sync::Arc;

use tracing::info;

use crate::{
    adapters::{
        advice::MemoryAdvice,
        catalog::StaticCatalog,
        identity::MemoryIdentity,
        schedule::{FileSchedule, MemorySchedule, ScheduleBook},
    },
    commands::{advice::AdviceLogic, DomainLogic},
    config::{BackendType, BookingConfig, ConfigError, StorageConfig},
    ports::{self, schedule::SchedulePort},
    seed::{SeedData, SeedError},
};

pub type BookingLogic = DomainLogic<dyn SchedulePort, MemoryIdentity, StaticCatalog>;

/// Everything a presentation layer needs
pub struct Services {
    pub booking: BookingLogic,
    pub advice: AdviceLogic<MemoryAdvice>,
    pub identity: Arc<MemoryIdentity>,
    pub catalog: Arc<StaticCatalog>,
}

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Seed(#[from] SeedError),
    #[error("failed to open schedule storage: {0}")]
    Schedule(#[from] ports::schedule::Error),
}

/// Create the schedule backend selected by `storage`
///
/// `seed` is used as-is by the memory backend. The file backend only uses it when no snapshot
/// exists yet; an existing snapshot always wins.
pub fn schedule_from_config(
    storage: &StorageConfig,
    seed: ScheduleBook,
) -> Result<Arc<dyn SchedulePort>, BootstrapError> {
    match storage.backend {
        BackendType::Memory => Ok(Arc::new(MemorySchedule::new(seed))),
        BackendType::File => {
            let path = storage
                .path
                .clone()
                .ok_or(ConfigError::MissingStoragePath)?;
            let schedule = FileSchedule::open(path, seed)?;
            info!(path = %schedule.path().display(), "opened schedule snapshot");
            Ok(Arc::new(schedule))
        }
    }
}

pub fn build(config: &BookingConfig) -> Result<Services, BootstrapError> {
    config.validate()?;
    let seed = match &config.seed_path {
        Some(path) => SeedData::load(path)?,
        None => SeedData::default(),
    };
    info!(
        users = seed.users.len(),
        rituals = seed.rituals.len(),
        appointments = seed.appointments.len(),
        backend = ?config.storage.backend,
        "bootstrapping booking services"
    );

    let schedule = schedule_from_config(&config.storage, seed.schedule_book())?;
    let identity = Arc::new(MemoryIdentity::new(seed.users));
    let catalog = Arc::new(StaticCatalog::new(seed.rituals));
    let advice = AdviceLogic::new(Arc::new(MemoryAdvice::new(seed.advice)));

    let booking = DomainLogic::new(schedule, identity.clone(), catalog.clone())
        .with_slot_policy(config.slot_policy);

    Ok(Services {
        booking,
        advice,
        identity,
        catalog,
    })
}
