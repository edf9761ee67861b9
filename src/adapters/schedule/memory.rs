use crate::{
    domain::{
        Appointment, AppointmentId, AppointmentStatus, Availability, AvailabilityId,
        NewAppointment, NewAvailability, SlotPolicy,
    },
    ports::schedule::{Error, SchedulePort},
};
use chrono::Utc;
use std::sync::{Arc, Mutex};

use super::ScheduleBook;

#[derive(Clone, Debug, Default)]
pub struct MemorySchedule {
    book: Arc<Mutex<ScheduleBook>>,
}

impl MemorySchedule {
    pub fn new(book: ScheduleBook) -> Self {
        Self {
            book: Arc::new(Mutex::new(book)),
        }
    }
}

#[async_trait::async_trait]
impl SchedulePort for MemorySchedule {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, Error> {
        Ok(self.book.lock()?.appointments().to_vec())
    }

    async fn get_appointment(&self, appointment_id: AppointmentId) -> Result<Appointment, Error> {
        self.book.lock()?.appointment(appointment_id).cloned()
    }

    async fn book_appointment(
        &self,
        appointment: NewAppointment,
        policy: SlotPolicy,
    ) -> Result<Appointment, Error> {
        // Conflict check and insert happen under the same guard
        self.book.lock()?.book(appointment, policy, Utc::now())
    }

    async fn transition_appointment(
        &self,
        appointment_id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment, Error> {
        self.book.lock()?.transition(appointment_id, status)
    }

    async fn list_availabilities(&self) -> Result<Vec<Availability>, Error> {
        Ok(self.book.lock()?.availabilities().to_vec())
    }

    async fn add_availability(&self, availability: NewAvailability) -> Result<Availability, Error> {
        self.book.lock()?.add_availability(availability)
    }

    async fn remove_availability(
        &self,
        availability_id: AvailabilityId,
    ) -> Result<Availability, Error> {
        self.book.lock()?.remove_availability(availability_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RitualId, Slot, UserId};
    use chrono::{NaiveDate, NaiveTime};
    use speculoos::prelude::*;

    fn booking(user_id: u64) -> NewAppointment {
        NewAppointment {
            user_id: UserId(user_id),
            ritual_id: RitualId(2),
            slot: Slot::new(
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            ),
            guest_info: None,
            ritual_name: None,
        }
    }

    #[tokio::test]
    async fn test_book_retrieve() {
        let schedule = MemorySchedule::default();
        let res = schedule
            .book_appointment(booking(1), SlotPolicy::Advisory)
            .await;
        assert_that!(res).is_ok().matches(|appointment| {
            appointment.user_id == UserId(1) && appointment.status == AppointmentStatus::Pending
        });

        let appointment_id = res.unwrap().id;
        let res = schedule.get_appointment(appointment_id).await;
        assert_that!(res)
            .is_ok()
            .matches(|appointment| appointment.id == appointment_id);
    }

    #[tokio::test]
    async fn test_concurrent_bookings_single_winner() {
        let schedule = MemorySchedule::default();

        let handles = (0..16)
            .map(|user_id| {
                let schedule = schedule.clone();
                tokio::spawn(async move {
                    schedule
                        .book_appointment(booking(user_id), SlotPolicy::Advisory)
                        .await
                })
            })
            .collect::<Vec<_>>();

        let mut booked = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                booked += 1;
            }
        }

        assert_that!(booked).is_equal_to(1);
        let appointments = schedule.list_appointments().await.unwrap();
        assert_that!(appointments.len()).is_equal_to(1);
    }

    #[tokio::test]
    async fn test_transition_missing() {
        let schedule = MemorySchedule::default();
        let res = schedule
            .transition_appointment(AppointmentId(42), AppointmentStatus::Cancelled)
            .await;
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::AppointmentDoesNotExist(AppointmentId(42))));
    }
}
