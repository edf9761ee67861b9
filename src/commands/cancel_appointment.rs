use std::task::{Context, Poll};

use crate::{
    domain::{
        permissions::{require_actor, require_owner_or_admin},
        Actor, Appointment, AppointmentId, AppointmentStatus,
    },
    ports::{catalog::CatalogPort, identity::IdentityPort, schedule::SchedulePort},
};
use tower::Service;
use tracing::{info, warn};

use super::{DomainLogic, Error, ServiceFuture};

/// Cancel an appointment as its owner or as an admin
///
/// Cancelling an appointment that is already cancelled succeeds and leaves it untouched.
pub struct CancelAppointmentRequest {
    pub actor: Option<Actor>,
    pub appointment_id: AppointmentId,
}

impl<S, I, C> Service<CancelAppointmentRequest> for DomainLogic<S, I, C>
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

    fn call(&mut self, req: CancelAppointmentRequest) -> Self::Future {
        let schedule = self.schedule.clone();
        Box::pin(async move {
            let actor = *require_actor(req.actor.as_ref())?;
            let appointment = schedule.get_appointment(req.appointment_id).await?;
            if let Err(denied) = require_owner_or_admin(&actor, appointment.user_id) {
                warn!(
                    appointment_id = %appointment.id,
                    user_id = %actor.id,
                    "cancellation denied"
                );
                return Err(denied.into());
            }

            let cancelled = schedule
                .transition_appointment(appointment.id, AppointmentStatus::Cancelled)
                .await?;
            info!(appointment_id = %cancelled.id, cancelled_by = %actor.id, "appointment cancelled");

            Ok(cancelled)
        })
    }
}
