use std::task::{Context, Poll};

use crate::{
    domain::{
        permissions::{require_actor, require_owner_or_admin},
        Actor, Registration, User,
    },
    ports::{catalog::CatalogPort, identity::IdentityPort, schedule::SchedulePort},
};
use tower::Service;
use tracing::{info, warn};

use super::{DomainLogic, Error, Resource, ServiceFuture};

pub struct RegisterRequest {
    pub registration: Registration,
}

pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Replace a directory entry
///
/// Users can edit their own profile; only admins can edit someone else's or change a role.
pub struct UpdateProfileRequest {
    pub actor: Option<Actor>,
    pub user: User,
}

impl<S, I, C> Service<RegisterRequest> for DomainLogic<S, I, C>
where
    S: SchedulePort + ?Sized + 'static,
    I: IdentityPort + ?Sized + 'static,
    C: CatalogPort + ?Sized + 'static,
{
    type Response = User;
    type Error = Error;
    type Future = ServiceFuture<User>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RegisterRequest) -> Self::Future {
        let identity = self.identity.clone();
        Box::pin(async move { Ok(identity.register(req.registration).await?) })
    }
}

impl<S, I, C> Service<LoginRequest> for DomainLogic<S, I, C>
where
    S: SchedulePort + ?Sized + 'static,
    I: IdentityPort + ?Sized + 'static,
    C: CatalogPort + ?Sized + 'static,
{
    type Response = Actor;
    type Error = Error;
    type Future = ServiceFuture<Actor>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: LoginRequest) -> Self::Future {
        let identity = self.identity.clone();
        Box::pin(async move { Ok(identity.login(req.email, req.password).await?) })
    }
}

impl<S, I, C> Service<UpdateProfileRequest> for DomainLogic<S, I, C>
where
    S: SchedulePort + ?Sized + 'static,
    I: IdentityPort + ?Sized + 'static,
    C: CatalogPort + ?Sized + 'static,
{
    type Response = User;
    type Error = Error;
    type Future = ServiceFuture<User>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: UpdateProfileRequest) -> Self::Future {
        let identity = self.identity.clone();
        Box::pin(async move {
            let actor = *require_actor(req.actor.as_ref())?;
            require_owner_or_admin(&actor, req.user.id)?;

            let existing = identity
                .find_user(req.user.id)
                .await?
                .ok_or(Error::NotFound(Resource::User(req.user.id)))?;
            if existing.role != req.user.role && !actor.is_admin() {
                warn!(user_id = %actor.id, "role change denied");
                return Err(Error::Forbidden(actor.id));
            }

            let user = identity.update_user(req.user).await?;
            info!(user_id = %user.id, updated_by = %actor.id, "profile updated");
            Ok(user)
        })
    }
}
