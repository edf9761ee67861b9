//! Publishing and withdrawing bookable slots
//!
//! Only admins can change availabilities. Withdrawing one does not touch appointments already
//! booked on that slot.

use std::task::{Context, Poll};

use crate::{
    domain::{
        permissions::require_admin, Actor, Availability, AvailabilityId, NewAvailability,
        RitualId, Slot,
    },
    ports::{catalog::CatalogPort, identity::IdentityPort, schedule::SchedulePort},
};
use tower::Service;
use tracing::{debug, info};

use super::{DomainLogic, Error, ServiceFuture};

pub struct AddAvailabilityRequest {
    pub actor: Option<Actor>,
    pub slot: Slot,
    pub ritual_id: Option<RitualId>,
    pub note: Option<String>,
}

pub struct DeleteAvailabilityRequest {
    pub actor: Option<Actor>,
    pub availability_id: AvailabilityId,
}

/// Published availabilities are readable by anyone
pub struct ListAvailabilitiesRequest;

impl<S, I, C> Service<AddAvailabilityRequest> for DomainLogic<S, I, C>
where
    S: SchedulePort + ?Sized + 'static,
    I: IdentityPort + ?Sized + 'static,
    C: CatalogPort + ?Sized + 'static,
{
    type Response = Availability;
    type Error = Error;
    type Future = ServiceFuture<Availability>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: AddAvailabilityRequest) -> Self::Future {
        let schedule = self.schedule.clone();
        Box::pin(async move {
            require_admin(req.actor.as_ref())?;
            let availability = schedule
                .add_availability(NewAvailability {
                    slot: req.slot,
                    ritual_id: req.ritual_id,
                    note: req.note,
                })
                .await?;
            info!(availability_id = %availability.id, slot = %availability.slot, "availability added");

            Ok(availability)
        })
    }
}

impl<S, I, C> Service<DeleteAvailabilityRequest> for DomainLogic<S, I, C>
where
    S: SchedulePort + ?Sized + 'static,
    I: IdentityPort + ?Sized + 'static,
    C: CatalogPort + ?Sized + 'static,
{
    type Response = Availability;
    type Error = Error;
    type Future = ServiceFuture<Availability>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: DeleteAvailabilityRequest) -> Self::Future {
        let schedule = self.schedule.clone();
        Box::pin(async move {
            require_admin(req.actor.as_ref())?;
            let availability = schedule.remove_availability(req.availability_id).await?;
            info!(availability_id = %availability.id, "availability deleted");

            Ok(availability)
        })
    }
}

impl<S, I, C> Service<ListAvailabilitiesRequest> for DomainLogic<S, I, C>
where
    S: SchedulePort + ?Sized + 'static,
    I: IdentityPort + ?Sized + 'static,
    C: CatalogPort + ?Sized + 'static,
{
    type Response = Vec<Availability>;
    type Error = Error;
    type Future = ServiceFuture<Vec<Availability>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: ListAvailabilitiesRequest) -> Self::Future {
        let schedule = self.schedule.clone();
        Box::pin(async move {
            let mut availabilities = schedule.list_availabilities().await?;
            availabilities.sort_by_key(|a| a.slot);
            debug!(count = availabilities.len(), "listed availabilities");

            Ok(availabilities)
        })
    }
}
