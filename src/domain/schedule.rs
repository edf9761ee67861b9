use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{AppointmentId, AvailabilityId, RitualId, UserId};

/// A `(date, time)` pair that can host at most one active appointment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl Slot {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{} {}", self.date, self.time.format("%H:%M")))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn is_active(self) -> bool {
        self != AppointmentStatus::Cancelled
    }

    /// Whether the state machine allows moving from `self` to `next`
    ///
    /// Re-applying the current status is allowed and has no effect. `Cancelled` is terminal.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;

        match (self, next) {
            (current, next) if current == next => true,
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
        };
        f.pad(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("cannot move appointment from {from} to {to}")]
pub struct InvalidTransition {
    pub from: AppointmentStatus,
    pub to: AppointmentStatus,
}

/// Contact details for a booking made without an account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    /// Identity that owns the appointment
    ///
    /// Set once at creation and never changed afterwards.
    pub user_id: UserId,
    pub ritual_id: RitualId,
    #[serde(flatten)]
    pub slot: Slot,
    pub status: AppointmentStatus,
    /// Records imported without a timestamp get the Unix epoch
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    /// Owner's contact details copied onto the record by older clients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<GuestInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_info: Option<GuestInfo>,
    /// Ritual name captured at booking time, used when the catalog no longer knows the ritual
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ritual_name: Option<String>,
}

impl Appointment {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whether this appointment currently holds `slot`
    pub fn occupies(&self, slot: &Slot) -> bool {
        self.is_active() && self.slot == *slot
    }

    /// Move the appointment to `next`, returning whether the status actually changed
    pub fn transition_to(&mut self, next: AppointmentStatus) -> Result<bool, InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        let changed = self.status != next;
        self.status = next;
        Ok(changed)
    }
}

/// Appointment data validated by the command layer, waiting for an id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAppointment {
    pub user_id: UserId,
    pub ritual_id: RitualId,
    pub slot: Slot,
    pub guest_info: Option<GuestInfo>,
    pub ritual_name: Option<String>,
}

impl NewAppointment {
    pub fn into_appointment(self, id: AppointmentId, created_at: DateTime<Utc>) -> Appointment {
        Appointment {
            id,
            user_id: self.user_id,
            ritual_id: self.ritual_id,
            slot: self.slot,
            status: AppointmentStatus::Pending,
            created_at,
            user_info: None,
            guest_info: self.guest_info,
            ritual_name: self.ritual_name,
        }
    }
}

/// A slot published by the business as open for booking
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub id: AvailabilityId,
    #[serde(flatten)]
    pub slot: Slot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ritual_id: Option<RitualId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAvailability {
    pub slot: Slot,
    pub ritual_id: Option<RitualId>,
    pub note: Option<String>,
}

impl NewAvailability {
    pub fn into_availability(self, id: AvailabilityId) -> Availability {
        Availability {
            id,
            slot: self.slot,
            ritual_id: self.ritual_id,
            note: self.note,
        }
    }
}

/// How published availabilities relate to bookings
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPolicy {
    /// Availabilities are display data; any free slot can be booked
    #[default]
    Advisory,
    /// A slot can only be booked if an availability was published for it
    RequirePublished,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use speculoos::prelude::*;
    use AppointmentStatus::*;

    #[fixture]
    fn appointment() -> Appointment {
        NewAppointment {
            user_id: UserId(1),
            ritual_id: RitualId(1),
            slot: Slot::new(
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            ),
            guest_info: None,
            ritual_name: None,
        }
        .into_appointment(AppointmentId(1), Utc::now())
    }

    #[rstest]
    #[case(Pending, Pending, true)]
    #[case(Pending, Confirmed, true)]
    #[case(Pending, Cancelled, true)]
    #[case(Confirmed, Pending, false)]
    #[case(Confirmed, Confirmed, true)]
    #[case(Confirmed, Cancelled, true)]
    #[case(Cancelled, Pending, false)]
    #[case(Cancelled, Confirmed, false)]
    #[case(Cancelled, Cancelled, true)]
    fn test_can_transition_to(
        #[case] from: AppointmentStatus,
        #[case] to: AppointmentStatus,
        #[case] expected: bool,
    ) {
        assert_that!(from.can_transition_to(to)).is_equal_to(expected);
    }

    #[rstest]
    fn test_new_appointment_is_pending(appointment: Appointment) {
        assert_that!(appointment.status).is_equal_to(Pending);
        assert_that!(appointment.occupies(&appointment.slot)).is_true();
    }

    #[rstest]
    fn test_cancel_is_terminal(appointment: Appointment) {
        let mut appointment = appointment;
        assert_that!(appointment.transition_to(Cancelled)).is_ok_containing(true);
        // Cancelling again is a no-op
        assert_that!(appointment.transition_to(Cancelled)).is_ok_containing(false);
        assert_that!(appointment.transition_to(Confirmed)).is_err_containing(InvalidTransition {
            from: Cancelled,
            to: Confirmed,
        });
        assert_that!(appointment.status).is_equal_to(Cancelled);
        assert_that!(appointment.occupies(&appointment.slot)).is_false();
    }

    #[test]
    fn test_slot_display() {
        let slot = Slot::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        );
        assert_that!(slot.to_string()).is_equal_to("2024-06-01 09:30".to_string());
    }

    #[test]
    fn test_display_honours_width() {
        assert_that!(format!("{:<10}|", Pending)).is_equal_to("pending   |".to_string());
        assert_that!(format!("{:>9}", Confirmed)).is_equal_to("confirmed".to_string());
    }
}
