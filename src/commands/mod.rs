use std::{fmt, future::Future, pin::Pin, sync::Arc};

use crate::{
    domain::{
        permissions::Denied, AdviceId, AppointmentId, AvailabilityId, InvalidTransition, Slot,
        SlotPolicy, UserId,
    },
    ports,
};

pub mod account;
pub mod advice;
pub mod availability;
pub mod cancel_appointment;
pub mod confirm_appointment;
pub mod create_appointment;

/// Future returned by every command and view service
pub type ServiceFuture<T> = Pin<Box<dyn Future<Output = Result<T, Error>>>>;

/// Appointment store and view projector over the schedule, identity and catalog ports
pub struct DomainLogic<S: ?Sized, I: ?Sized, C: ?Sized> {
    pub(crate) schedule: Arc<S>,
    pub(crate) identity: Arc<I>,
    pub(crate) catalog: Arc<C>,
    pub(crate) slot_policy: SlotPolicy,
}

impl<S: ?Sized, I: ?Sized, C: ?Sized> DomainLogic<S, I, C> {
    pub fn new(schedule: Arc<S>, identity: Arc<I>, catalog: Arc<C>) -> Self {
        Self {
            schedule,
            identity,
            catalog,
            slot_policy: SlotPolicy::default(),
        }
    }

    pub fn with_slot_policy(mut self, slot_policy: SlotPolicy) -> Self {
        self.slot_policy = slot_policy;
        self
    }
}

impl<S: ?Sized, I: ?Sized, C: ?Sized> Clone for DomainLogic<S, I, C> {
    fn clone(&self) -> Self {
        Self {
            schedule: self.schedule.clone(),
            identity: self.identity.clone(),
            catalog: self.catalog.clone(),
            slot_policy: self.slot_policy,
        }
    }
}

/// Record a command refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    Appointment(AppointmentId),
    Availability(AvailabilityId),
    Advice(AdviceId),
    User(UserId),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Appointment(id) => write!(f, "appointment {id}"),
            Resource::Availability(id) => write!(f, "availability {id}"),
            Resource::Advice(id) => write!(f, "advice {id}"),
            Resource::User(id) => write!(f, "user {id}"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("authentication required")]
    Unauthenticated,
    #[error("user {0} is not allowed to perform this action")]
    Forbidden(UserId),
    #[error("slot {slot} is already booked")]
    SlotConflict { slot: Slot },
    #[error("slot {0} is not open for booking")]
    SlotNotPublished(Slot),
    #[error("{0} does not exist")]
    NotFound(Resource),
    #[error(transparent)]
    InvalidTransition(InvalidTransition),
    #[error("email {0} is already registered")]
    DuplicateIdentity(String),
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("schedule port error: {0:?}")]
    Schedule(ports::schedule::Error),
    #[error("identity port error: {0:?}")]
    Identity(ports::identity::Error),
    #[error("catalog port error: {0:?}")]
    Catalog(#[from] ports::catalog::Error),
    #[error("advice port error: {0:?}")]
    Advice(ports::advice::Error),
}

impl From<Denied> for Error {
    fn from(denied: Denied) -> Self {
        match denied {
            Denied::Unauthenticated => Self::Unauthenticated,
            Denied::Forbidden(user_id) => Self::Forbidden(user_id),
        }
    }
}

/// Domain-level port errors become domain-level command errors; only adapter failures stay
/// wrapped.
impl From<ports::schedule::Error> for Error {
    fn from(err: ports::schedule::Error) -> Self {
        use ports::schedule::Error as E;

        match err {
            E::SlotConflict { slot, .. } => Self::SlotConflict { slot },
            E::SlotNotPublished(slot) => Self::SlotNotPublished(slot),
            E::AppointmentDoesNotExist(id) => Self::NotFound(Resource::Appointment(id)),
            E::AvailabilityDoesNotExist(id) => Self::NotFound(Resource::Availability(id)),
            E::InvalidTransition(err) => Self::InvalidTransition(err),
            err @ E::Adapter(_) => Self::Schedule(err),
        }
    }
}

impl From<ports::identity::Error> for Error {
    fn from(err: ports::identity::Error) -> Self {
        use ports::identity::Error as E;

        match err {
            E::UserDoesNotExist(id) => Self::NotFound(Resource::User(id)),
            E::DuplicateIdentity(email) => Self::DuplicateIdentity(email),
            E::InvalidCredentials => Self::InvalidCredentials,
            err @ E::Adapter(_) => Self::Identity(err),
        }
    }
}

impl From<ports::advice::Error> for Error {
    fn from(err: ports::advice::Error) -> Self {
        use ports::advice::Error as E;

        match err {
            E::AdviceDoesNotExist(id) => Self::NotFound(Resource::Advice(id)),
            err @ E::Adapter(_) => Self::Advice(err),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::DomainLogic;
    use crate::{
        adapters::schedule::MemorySchedule,
        domain::{Actor, Role, Slot},
        ports::{catalog::MockCatalogPort, identity::MockIdentityPort},
    };
    use chrono::{NaiveDate, NaiveTime};
    use std::sync::Arc;

    pub type TestLogic = DomainLogic<MemorySchedule, MockIdentityPort, MockCatalogPort>;

    pub fn admin() -> Actor {
        Actor::new(100, Role::Admin)
    }

    pub fn client(id: u64) -> Actor {
        Actor::new(id, Role::Client)
    }

    pub fn slot(date: &str, hour: u32) -> Slot {
        Slot::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        )
    }

    /// Catalog that knows no ritual, accepting any number of lookups
    pub fn empty_catalog() -> MockCatalogPort {
        let mut catalog = MockCatalogPort::new();
        catalog.expect_find_ritual().returning(|_| Ok(None));
        catalog
    }

    pub fn logic(schedule: MemorySchedule) -> TestLogic {
        DomainLogic::new(
            Arc::new(schedule),
            Arc::new(MockIdentityPort::new()),
            Arc::new(empty_catalog()),
        )
    }
}
