use serde::{Deserialize, Serialize};

mod advice;
mod identity;
mod ids;
pub mod permissions;
mod schedule;

pub use advice::{AdviceContent, AdviceItem};
pub use identity::{Actor, Credential, Registration, Role, User};
pub use ids::{
    AdviceId, AppointmentId, AvailabilityId, IdSequence, IdsExhausted, RitualId, UserId,
};
pub use schedule::{
    Appointment, AppointmentStatus, Availability, GuestInfo, InvalidTransition, NewAppointment,
    NewAvailability, Slot, SlotPolicy,
};

/// Service offered by the business
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ritual {
    pub id: RitualId,
    pub name: String,
    /// Length of the ritual, in minutes
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
