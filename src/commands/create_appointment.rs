use std::task::{Context, Poll};

use crate::{
    domain::{
        permissions::{require_actor, require_admin},
        Actor, Appointment, GuestInfo, NewAppointment, RitualId, Slot, UserId,
    },
    ports::{catalog::CatalogPort, identity::IdentityPort, schedule::SchedulePort},
};
use tower::Service;
use tracing::{info, warn};

use super::{DomainLogic, Error, ServiceFuture};

pub struct CreateAppointmentRequest {
    pub actor: Option<Actor>,
    pub ritual_id: RitualId,
    pub slot: Slot,
    /// Contact details when booking for someone without an account
    pub guest_info: Option<GuestInfo>,
    /// Book for another user instead of the actor. Only admins can do this.
    pub on_behalf_of: Option<UserId>,
}

impl CreateAppointmentRequest {
    pub fn new(actor: Option<Actor>, ritual_id: RitualId, slot: Slot) -> Self {
        Self {
            actor,
            ritual_id,
            slot,
            guest_info: None,
            on_behalf_of: None,
        }
    }
}

impl<S, I, C> Service<CreateAppointmentRequest> for DomainLogic<S, I, C>
where
    S: SchedulePort + ?Sized + 'static,
    I: IdentityPort + ?Sized + 'static,
    C: CatalogPort + ?Sized + 'static,
{
    type Response = Appointment;
    type Error = Error;
    type Future = ServiceFuture<Appointment>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: CreateAppointmentRequest) -> Self::Future {
        let schedule = self.schedule.clone();
        let catalog = self.catalog.clone();
        let slot_policy = self.slot_policy;
        Box::pin(async move {
            let actor = *require_actor(req.actor.as_ref())?;
            let user_id = owner_for(&actor, req.on_behalf_of)?;

            // Keep the ritual name on the record so it stays displayable if the catalog changes
            let ritual_name = catalog.find_ritual(req.ritual_id).await?.map(|r| r.name);

            let new = NewAppointment {
                user_id,
                ritual_id: req.ritual_id,
                slot: req.slot,
                guest_info: req.guest_info,
                ritual_name,
            };
            let appointment = match schedule.book_appointment(new, slot_policy).await {
                Ok(appointment) => appointment,
                Err(err) => {
                    warn!(user_id = %user_id, slot = %req.slot, error = %err, "booking rejected");
                    return Err(err.into());
                }
            };

            info!(
                appointment_id = %appointment.id,
                user_id = %appointment.user_id,
                slot = %appointment.slot,
                "appointment created"
            );
            Ok(appointment)
        })
    }
}

/// Owner of a new appointment: the actor, or the requested user when an admin books for them
fn owner_for(actor: &Actor, on_behalf_of: Option<UserId>) -> Result<UserId, Error> {
    match on_behalf_of {
        Some(user_id) if user_id != actor.id => {
            require_admin(Some(actor))?;
            Ok(user_id)
        }
        _ => Ok(actor.id),
    }
}
