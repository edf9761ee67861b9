use crate::{
    domain::{
        Appointment, AppointmentId, AppointmentStatus, Availability, AvailabilityId,
        NewAppointment, NewAvailability, SlotPolicy,
    },
    ports::schedule::{Error, SchedulePort},
};
use chrono::Utc;
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::debug;

use super::ScheduleBook;

/// Schedule kept in memory and written to a JSON snapshot after every change
///
/// A change is only applied in memory once its snapshot has been written, so a failed write
/// leaves the schedule as it was.
///
/// Snapshot writes use blocking `std::fs` calls while the schedule lock is held, so every change
/// blocks the executor thread for the duration of the write.
#[derive(Clone, Debug)]
pub struct FileSchedule {
    path: Arc<PathBuf>,
    book: Arc<Mutex<ScheduleBook>>,
}

impl FileSchedule {
    /// Open the snapshot at `path`, starting from `seed` if it does not exist yet
    ///
    /// A snapshot that breaks the schedule invariants is rejected.
    pub fn open(path: impl Into<PathBuf>, seed: ScheduleBook) -> Result<Self, Error> {
        let path = path.into();
        let book = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<ScheduleBook>(&bytes)
                .map_err(adapter_error)?
                .reseeded(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no schedule snapshot, starting from seed");
                write_snapshot(&path, &seed)?;
                seed
            }
            Err(err) => return Err(adapter_error(err)),
        };
        book.validate().map_err(adapter_error)?;

        Ok(Self {
            path: Arc::new(path),
            book: Arc::new(Mutex::new(book)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut ScheduleBook) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut book = self.book.lock()?;
        let mut next = book.clone();
        let value = change(&mut next)?;
        write_snapshot(&self.path, &next)?;
        *book = next;
        Ok(value)
    }
}

fn write_snapshot(path: &Path, book: &ScheduleBook) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(adapter_error)?;
    }
    let bytes = serde_json::to_vec_pretty(book).map_err(adapter_error)?;
    // Write next to the target then rename, so readers never see a partial file
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).map_err(adapter_error)?;
    fs::rename(&tmp, path).map_err(adapter_error)?;
    Ok(())
}

fn adapter_error(err: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::Adapter(Box::new(err))
}

#[async_trait::async_trait]
impl SchedulePort for FileSchedule {
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
        self.mutate(|book| book.book(appointment, policy, Utc::now()))
    }

    async fn transition_appointment(
        &self,
        appointment_id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment, Error> {
        self.mutate(|book| book.transition(appointment_id, status))
    }

    async fn list_availabilities(&self) -> Result<Vec<Availability>, Error> {
        Ok(self.book.lock()?.availabilities().to_vec())
    }

    async fn add_availability(&self, availability: NewAvailability) -> Result<Availability, Error> {
        self.mutate(|book| book.add_availability(availability))
    }

    async fn remove_availability(
        &self,
        availability_id: AvailabilityId,
    ) -> Result<Availability, Error> {
        self.mutate(|book| book.remove_availability(availability_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RitualId, Slot, UserId};
    use chrono::{NaiveDate, NaiveTime};
    use speculoos::prelude::*;

    fn slot() -> Slot {
        Slot::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");

        let schedule = FileSchedule::open(&path, ScheduleBook::default()).unwrap();
        let appointment = schedule
            .book_appointment(
                NewAppointment {
                    user_id: UserId(1),
                    ritual_id: RitualId(1),
                    slot: slot(),
                    guest_info: None,
                    ritual_name: Some("Hammam".to_string()),
                },
                SlotPolicy::Advisory,
            )
            .await
            .unwrap();
        let availability = schedule
            .add_availability(NewAvailability {
                slot: slot(),
                ritual_id: None,
                note: None,
            })
            .await
            .unwrap();
        schedule.remove_availability(availability.id).await.unwrap();
        drop(schedule);

        let reopened = FileSchedule::open(&path, ScheduleBook::default()).unwrap();
        let appointments = reopened.list_appointments().await.unwrap();
        assert_that!(appointments).is_equal_to(vec![appointment]);

        // The slot is still taken after reopening
        let res = reopened
            .book_appointment(
                NewAppointment {
                    user_id: UserId(2),
                    ritual_id: RitualId(1),
                    slot: slot(),
                    guest_info: None,
                    ritual_name: None,
                },
                SlotPolicy::Advisory,
            )
            .await;
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::SlotConflict { .. }));

        // Removed availability ids are not handed out again
        let next = reopened
            .add_availability(NewAvailability {
                slot: slot(),
                ritual_id: None,
                note: None,
            })
            .await
            .unwrap();
        assert_that!(next.id).is_not_equal_to(availability.id);
    }

    #[test]
    fn test_open_invalid_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        fs::write(&path, b"not json").unwrap();

        let res = FileSchedule::open(&path, ScheduleBook::default());
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::Adapter(_)));
    }

    #[rstest::rstest]
    #[case::double_booked(
        r#"{"appointments": [
            {"id": 1, "userId": 1, "ritualId": 1, "date": "2024-06-01", "time": "10:00:00",
             "status": "pending", "createdAt": "2024-05-20T08:00:00Z"},
            {"id": 2, "userId": 2, "ritualId": 1, "date": "2024-06-01", "time": "10:00:00",
             "status": "pending", "createdAt": "2024-05-20T08:00:00Z"}
        ]}"#
    )]
    #[case::duplicate_id(
        r#"{"availabilities": [
            {"id": 4, "date": "2024-06-01", "time": "10:00:00"},
            {"id": 4, "date": "2024-06-01", "time": "11:00:00"}
        ]}"#
    )]
    #[case::exhausted_ids(
        r#"{"availabilities": [
            {"id": 18446744073709551615, "date": "2024-06-01", "time": "10:00:00"}
        ]}"#
    )]
    fn test_open_rejects_broken_snapshot(#[case] snapshot: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        fs::write(&path, snapshot).unwrap();

        let res = FileSchedule::open(&path, ScheduleBook::default());
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::Adapter(_)));
    }
}
