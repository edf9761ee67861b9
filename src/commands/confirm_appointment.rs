use std::task::{Context, Poll};

use crate::{
    domain::{permissions::require_admin, Actor, Appointment, AppointmentId, AppointmentStatus},
    ports::{catalog::CatalogPort, identity::IdentityPort, schedule::SchedulePort},
};
use tower::Service;
use tracing::info;

use super::{DomainLogic, Error, ServiceFuture};

/// Admin acknowledgement of a pending appointment
pub struct ConfirmAppointmentRequest {
    pub actor: Option<Actor>,
    pub appointment_id: AppointmentId,
}

impl<S, I, C> Service<ConfirmAppointmentRequest> for DomainLogic<S, I, C>
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

    fn call(&mut self, req: ConfirmAppointmentRequest) -> Self::Future {
        let schedule = self.schedule.clone();
        Box::pin(async move {
            let actor = *require_admin(req.actor.as_ref())?;
            let confirmed = schedule
                .transition_appointment(req.appointment_id, AppointmentStatus::Confirmed)
                .await?;
            info!(appointment_id = %confirmed.id, confirmed_by = %actor.id, "appointment confirmed");

            Ok(confirmed)
        })
    }
}
