//! Schedule storage backends
//!
//! Both backends share [`ScheduleBook`], which holds the collections and enforces the booking
//! rules. The backends only decide where the book lives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::{
    domain::{
        Appointment, AppointmentId, AppointmentStatus, Availability, AvailabilityId, IdSequence,
        NewAppointment, NewAvailability, Slot, SlotPolicy,
    },
    ports::schedule::Error,
};

pub mod file;
pub mod memory;

pub use file::FileSchedule;
pub use memory::MemorySchedule;

/// Loaded schedule data that would break the booking rules
#[derive(Debug, thiserror::Error)]
pub enum InvalidBook {
    #[error("duplicate id {id} in {collection}")]
    DuplicateId { collection: &'static str, id: u64 },
    #[error("appointments {first} and {second} are both active on slot {slot}")]
    DoubleBooked {
        slot: Slot,
        first: AppointmentId,
        second: AppointmentId,
    },
    #[error("no ids left for {0}")]
    IdsExhausted(&'static str),
}

/// Appointments and availabilities of the business
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBook {
    #[serde(default)]
    appointments: Vec<Appointment>,
    #[serde(default)]
    availabilities: Vec<Availability>,
    #[serde(default)]
    next_appointment_id: IdSequence,
    #[serde(default)]
    next_availability_id: IdSequence,
}

impl ScheduleBook {
    pub fn new(appointments: Vec<Appointment>, availabilities: Vec<Availability>) -> Self {
        Self {
            appointments,
            availabilities,
            next_appointment_id: IdSequence::default(),
            next_availability_id: IdSequence::default(),
        }
        .reseeded()
    }

    /// Make sure the id sequences are ahead of every stored record
    ///
    /// Snapshots written by hand or by older versions may carry records without matching
    /// sequences.
    pub(crate) fn reseeded(mut self) -> Self {
        self.next_appointment_id = self.next_appointment_id.max(IdSequence::starting_after(
            self.appointments.iter().map(|a| a.id.0),
        ));
        self.next_availability_id = self.next_availability_id.max(IdSequence::starting_after(
            self.availabilities.iter().map(|a| a.id.0),
        ));
        self
    }

    /// Check the invariants the booking operations rely on
    ///
    /// Records appended through [`ScheduleBook::book`] always pass. Data loaded from a seed or a
    /// snapshot may not.
    pub fn validate(&self) -> Result<(), InvalidBook> {
        unique_ids("appointments", self.appointments.iter().map(|a| a.id.0))?;
        unique_ids("availabilities", self.availabilities.iter().map(|a| a.id.0))?;
        if self.next_appointment_id.is_exhausted() {
            return Err(InvalidBook::IdsExhausted("appointments"));
        }
        if self.next_availability_id.is_exhausted() {
            return Err(InvalidBook::IdsExhausted("availabilities"));
        }

        let mut taken = HashMap::new();
        for appointment in self.appointments.iter().filter(|a| a.is_active()) {
            if let Some(first) = taken.insert(appointment.slot, appointment.id) {
                return Err(InvalidBook::DoubleBooked {
                    slot: appointment.slot,
                    first,
                    second: appointment.id,
                });
            }
        }
        Ok(())
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn availabilities(&self) -> &[Availability] {
        &self.availabilities
    }

    /// Active appointment holding `slot`, if any
    ///
    /// This is the single conflict predicate of the store. It scans the collection, which is
    /// fine for the size of one business's schedule.
    pub fn active_booking(&self, slot: &Slot) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.occupies(slot))
    }

    pub fn is_published(&self, slot: &Slot) -> bool {
        self.availabilities.iter().any(|a| a.slot == *slot)
    }

    pub fn appointment(&self, appointment_id: AppointmentId) -> Result<&Appointment, Error> {
        self.appointments
            .iter()
            .find(|a| a.id == appointment_id)
            .ok_or(Error::AppointmentDoesNotExist(appointment_id))
    }

    pub fn book(
        &mut self,
        appointment: NewAppointment,
        policy: SlotPolicy,
        now: DateTime<Utc>,
    ) -> Result<Appointment, Error> {
        if let Some(existing) = self.active_booking(&appointment.slot) {
            return Err(Error::SlotConflict {
                slot: appointment.slot,
                appointment_id: existing.id,
            });
        }
        if policy == SlotPolicy::RequirePublished && !self.is_published(&appointment.slot) {
            return Err(Error::SlotNotPublished(appointment.slot));
        }

        let id = AppointmentId(self.next_appointment_id.next_id()?);
        let appointment = appointment.into_appointment(id, now);
        self.appointments.push(appointment.clone());
        Ok(appointment)
    }

    pub fn transition(
        &mut self,
        appointment_id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment, Error> {
        let appointment = self
            .appointments
            .iter_mut()
            .find(|a| a.id == appointment_id)
            .ok_or(Error::AppointmentDoesNotExist(appointment_id))?;
        appointment.transition_to(status)?;
        Ok(appointment.clone())
    }

    pub fn add_availability(
        &mut self,
        availability: NewAvailability,
    ) -> Result<Availability, Error> {
        let id = AvailabilityId(self.next_availability_id.next_id()?);
        let availability = availability.into_availability(id);
        self.availabilities.push(availability.clone());
        Ok(availability)
    }

    pub fn remove_availability(
        &mut self,
        availability_id: AvailabilityId,
    ) -> Result<Availability, Error> {
        let index = self
            .availabilities
            .iter()
            .position(|a| a.id == availability_id)
            .ok_or(Error::AvailabilityDoesNotExist(availability_id))?;
        Ok(self.availabilities.remove(index))
    }
}

fn unique_ids(
    collection: &'static str,
    ids: impl Iterator<Item = u64>,
) -> Result<(), InvalidBook> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(InvalidBook::DuplicateId { collection, id });
        }
    }
    Ok(())
}
