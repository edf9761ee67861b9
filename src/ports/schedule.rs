use crate::domain::{
    Appointment, AppointmentId, AppointmentStatus, Availability, AvailabilityId, InvalidTransition,
    NewAppointment, NewAvailability, Slot, SlotPolicy,
};

/// Storage for appointments and published availabilities
///
/// Implementations are the only writers of both collections. Every method is a single atomic
/// operation: in particular `book_appointment` performs the slot conflict check and the insert
/// without releasing its hold on the collection in between.
#[mockall::automock]
#[async_trait::async_trait]
pub trait SchedulePort: Send + Sync {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, Error>;
    async fn get_appointment(&self, appointment_id: AppointmentId) -> Result<Appointment, Error>;
    async fn book_appointment(
        &self,
        appointment: NewAppointment,
        policy: SlotPolicy,
    ) -> Result<Appointment, Error>;
    async fn transition_appointment(
        &self,
        appointment_id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment, Error>;

    async fn list_availabilities(&self) -> Result<Vec<Availability>, Error>;
    async fn add_availability(&self, availability: NewAvailability) -> Result<Availability, Error>;
    async fn remove_availability(
        &self,
        availability_id: AvailabilityId,
    ) -> Result<Availability, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An active appointment already holds the slot
    ///
    /// This is not transient: the slot stays taken until that appointment is cancelled.
    #[error("slot {slot} is already booked by appointment {appointment_id}")]
    SlotConflict {
        slot: Slot,
        appointment_id: AppointmentId,
    },

    /// The slot policy requires a published availability and none matches
    #[error("no availability published for slot {0}")]
    SlotNotPublished(Slot),

    #[error("appointment {0} does not exist")]
    AppointmentDoesNotExist(AppointmentId),

    #[error("availability {0} does not exist")]
    AvailabilityDoesNotExist(AvailabilityId),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as I/O, serialization, or lock poisoning.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
