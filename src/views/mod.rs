//! Read-side projections of the schedule
//!
//! Views join appointments with the identity directory and the catalog. They are recomputed on
//! every call and never write to any port.

use std::task::{Context, Poll};

use crate::{
    commands::{DomainLogic, Error, ServiceFuture},
    domain::{Actor, Appointment, Ritual, User},
    ports::{catalog::CatalogPort, identity::IdentityPort, schedule::SchedulePort},
};
use tower::Service;
use tracing::debug;

pub const UNKNOWN_CLIENT: &str = "unknown client";
pub const UNKNOWN_RITUAL: &str = "unknown ritual";
/// Duration shown for rituals the catalog does not know, in minutes
pub const DEFAULT_RITUAL_DURATION: u32 = 60;

/// Appointment with display names resolved
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnrichedAppointment {
    pub appointment: Appointment,
    pub client_name: String,
    pub ritual_name: String,
    pub ritual_duration: u32,
}

/// Join an appointment with its user and ritual
///
/// Each display field falls back, in order, from the resolved record to the data carried inline
/// on the appointment, then to a fixed placeholder. This is what keeps guest bookings readable.
pub fn enrich(
    appointment: Appointment,
    user: Option<&User>,
    ritual: Option<&Ritual>,
) -> EnrichedAppointment {
    let client_name = user
        .map(|u| u.name.clone())
        .or_else(|| appointment.user_info.as_ref().map(|i| i.name.clone()))
        .or_else(|| appointment.guest_info.as_ref().map(|g| g.name.clone()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());
    let ritual_name = ritual
        .map(|r| r.name.clone())
        .or_else(|| appointment.ritual_name.clone())
        .unwrap_or_else(|| UNKNOWN_RITUAL.to_string());
    let ritual_duration = ritual.map_or(DEFAULT_RITUAL_DURATION, |r| r.duration_minutes);

    EnrichedAppointment {
        appointment,
        client_name,
        ritual_name,
        ritual_duration,
    }
}

async fn enrich_all<I, C>(
    identity: &I,
    catalog: &C,
    appointments: Vec<Appointment>,
) -> Result<Vec<EnrichedAppointment>, Error>
where
    I: IdentityPort + ?Sized,
    C: CatalogPort + ?Sized,
{
    let mut enriched = Vec::with_capacity(appointments.len());
    for appointment in appointments {
        let user = identity.find_user(appointment.user_id).await?;
        let ritual = catalog.find_ritual(appointment.ritual_id).await?;
        enriched.push(enrich(appointment, user.as_ref(), ritual.as_ref()));
    }
    Ok(enriched)
}

/// Appointments owned by the actor; empty for anonymous callers
pub struct ListMyAppointmentsRequest {
    pub actor: Option<Actor>,
}

/// Every appointment; empty unless the actor is an admin
pub struct ListAllAppointmentsRequest {
    pub actor: Option<Actor>,
}

impl<S, I, C> Service<ListMyAppointmentsRequest> for DomainLogic<S, I, C>
where
    S: SchedulePort + ?Sized + 'static,
    I: IdentityPort + ?Sized + 'static,
    C: CatalogPort + ?Sized + 'static,
{
    type Response = Vec<EnrichedAppointment>;
    type Error = Error;
    type Future = ServiceFuture<Vec<EnrichedAppointment>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ListMyAppointmentsRequest) -> Self::Future {
        let schedule = self.schedule.clone();
        let identity = self.identity.clone();
        let catalog = self.catalog.clone();
        Box::pin(async move {
            let Some(actor) = req.actor else {
                return Ok(Vec::new());
            };

            let mine = schedule
                .list_appointments()
                .await?
                .into_iter()
                .filter(|a| a.user_id == actor.id)
                .collect();
            let enriched = enrich_all(identity.as_ref(), catalog.as_ref(), mine).await?;
            debug!(user_id = %actor.id, count = enriched.len(), "listed own appointments");

            Ok(enriched)
        })
    }
}

impl<S, I, C> Service<ListAllAppointmentsRequest> for DomainLogic<S, I, C>
where
    S: SchedulePort + ?Sized + 'static,
    I: IdentityPort + ?Sized + 'static,
    C: CatalogPort + ?Sized + 'static,
{
    type Response = Vec<EnrichedAppointment>;
    type Error = Error;
    type Future = ServiceFuture<Vec<EnrichedAppointment>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ListAllAppointmentsRequest) -> Self::Future {
        let schedule = self.schedule.clone();
        let identity = self.identity.clone();
        let catalog = self.catalog.clone();
        Box::pin(async move {
            if !req.actor.is_some_and(|actor| actor.is_admin()) {
                return Ok(Vec::new());
            }

            let appointments = schedule.list_appointments().await?;
            let enriched = enrich_all(identity.as_ref(), catalog.as_ref(), appointments).await?;
            debug!(count = enriched.len(), "listed all appointments");

            Ok(enriched)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::schedule::{MemorySchedule, ScheduleBook},
        commands::test_support::{admin, client, slot},
        domain::{
            AppointmentId, Credential, GuestInfo, NewAppointment, Role, RitualId, SlotPolicy,
            UserId,
        },
        ports::{catalog::MockCatalogPort, identity::MockIdentityPort},
    };
    use chrono::Utc;
    use mockall::predicate::*;
    use rstest::*;
    use speculoos::prelude::*;
    use std::sync::Arc;
    use tower::{BoxError, ServiceExt};

    fn appointment(user_id: u64, guest: Option<&str>, ritual_name: Option<&str>) -> Appointment {
        NewAppointment {
            user_id: UserId(user_id),
            ritual_id: RitualId(1),
            slot: slot("2024-06-01", 10),
            guest_info: guest.map(contact),
            ritual_name: ritual_name.map(str::to_string),
        }
        .into_appointment(AppointmentId(1), Utc::now())
    }

    fn user(id: u64, name: &str) -> User {
        User {
            id: UserId(id),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            credential: Credential::new("secret"),
            role: Role::Client,
            phone: String::new(),
        }
    }

    fn ritual(name: &str, duration_minutes: u32) -> Ritual {
        Ritual {
            id: RitualId(1),
            name: name.to_string(),
            duration_minutes,
            description: None,
        }
    }

    fn contact(name: &str) -> GuestInfo {
        GuestInfo {
            name: name.to_string(),
            email: None,
            phone: None,
        }
    }

    #[rstest]
    // Directory entry wins over inline data
    #[case(Some(user(1, "Alice")), Some("Inline"), Some("Guest"), "Alice")]
    // Inline user details before guest data
    #[case(None, Some("Inline"), Some("Guest"), "Inline")]
    // Guest data when nothing else names the client
    #[case(None, None, Some("Guest"), "Guest")]
    // Placeholder when none is available
    #[case(None, None, None, UNKNOWN_CLIENT)]
    fn test_enrich_client_name(
        #[case] directory_user: Option<User>,
        #[case] inline_user: Option<&str>,
        #[case] guest: Option<&str>,
        #[case] expected: &str,
    ) {
        let mut record = appointment(1, guest, None);
        record.user_info = inline_user.map(contact);
        let enriched = enrich(record, directory_user.as_ref(), None);
        assert_that!(enriched.client_name.as_str()).is_equal_to(expected);
    }

    #[rstest]
    #[case(Some(ritual("Hammam", 90)), Some("Old name"), "Hammam", 90)]
    #[case(None, Some("Old name"), "Old name", DEFAULT_RITUAL_DURATION)]
    #[case(None, None, UNKNOWN_RITUAL, DEFAULT_RITUAL_DURATION)]
    fn test_enrich_ritual(
        #[case] catalog_ritual: Option<Ritual>,
        #[case] inline_name: Option<&str>,
        #[case] expected_name: &str,
        #[case] expected_duration: u32,
    ) {
        let enriched = enrich(appointment(1, None, inline_name), None, catalog_ritual.as_ref());
        assert_that!(enriched.ritual_name.as_str()).is_equal_to(expected_name);
        assert_that!(enriched.ritual_duration).is_equal_to(expected_duration);
    }

    /// Two appointments, for users 1 and 2
    #[fixture]
    fn schedule() -> MemorySchedule {
        let mut book = ScheduleBook::default();
        for (user_id, hour) in [(1, 10), (2, 11)] {
            book.book(
                NewAppointment {
                    user_id: UserId(user_id),
                    ritual_id: RitualId(1),
                    slot: slot("2024-06-01", hour),
                    guest_info: None,
                    ritual_name: None,
                },
                SlotPolicy::Advisory,
                Utc::now(),
            )
            .unwrap();
        }
        MemorySchedule::new(book)
    }

    fn mock_identity() -> MockIdentityPort {
        let mut identity = MockIdentityPort::new();
        identity
            .expect_find_user()
            .with(eq(UserId(1)))
            .returning(|_| Ok(Some(user(1, "Alice"))));
        identity
            .expect_find_user()
            .with(eq(UserId(2)))
            .returning(|_| Ok(None));
        identity
    }

    fn mock_catalog() -> MockCatalogPort {
        let mut catalog = MockCatalogPort::new();
        catalog
            .expect_find_ritual()
            .returning(|_| Ok(Some(ritual("Hammam", 90))));
        catalog
    }

    #[rstest]
    #[tokio::test]
    async fn test_list_mine(schedule: MemorySchedule) -> Result<(), BoxError> {
        let domain = DomainLogic::new(
            Arc::new(schedule),
            Arc::new(mock_identity()),
            Arc::new(mock_catalog()),
        );

        let mine = domain
            .clone()
            .oneshot(ListMyAppointmentsRequest {
                actor: Some(client(1)),
            })
            .await?;
        assert_that!(mine.len()).is_equal_to(1);
        assert_that!(mine[0].client_name.as_str()).is_equal_to("Alice");
        assert_that!(mine[0].ritual_name.as_str()).is_equal_to("Hammam");

        let anonymous = domain
            .oneshot(ListMyAppointmentsRequest { actor: None })
            .await?;
        assert_that!(anonymous.is_empty()).is_true();

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_list_all(schedule: MemorySchedule) -> Result<(), BoxError> {
        let domain = DomainLogic::new(
            Arc::new(schedule),
            Arc::new(mock_identity()),
            Arc::new(mock_catalog()),
        );

        let all = domain
            .clone()
            .oneshot(ListAllAppointmentsRequest {
                actor: Some(admin()),
            })
            .await?;
        let names = all.iter().map(|a| a.client_name.as_str()).collect::<Vec<_>>();
        assert_that!(names).is_equal_to(vec!["Alice", UNKNOWN_CLIENT]);

        for actor in [Some(client(1)), None] {
            let res = domain
                .clone()
                .oneshot(ListAllAppointmentsRequest { actor })
                .await?;
            assert_that!(res.is_empty()).is_true();
        }

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_list_all_client_skips_ports(schedule: MemorySchedule) -> Result<(), BoxError> {
        // No expectations: a lookup for a non-admin would panic
        let domain = DomainLogic::new(
            Arc::new(schedule),
            Arc::new(MockIdentityPort::new()),
            Arc::new(MockCatalogPort::new()),
        );

        let res = domain
            .oneshot(ListAllAppointmentsRequest {
                actor: Some(client(2)),
            })
            .await?;
        assert_that!(res.is_empty()).is_true();

        Ok(())
    }
}
