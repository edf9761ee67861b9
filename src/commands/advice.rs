//! Advice store: tips anyone can read and only admins can edit

use std::{
    sync::Arc,
    task::{Context, Poll},
};

use crate::{
    domain::{permissions::require_admin, Actor, AdviceContent, AdviceId, AdviceItem},
    ports::advice::AdvicePort,
};
use tower::Service;
use tracing::{debug, info};

use super::{Error, ServiceFuture};

pub struct AdviceLogic<A: ?Sized> {
    advice: Arc<A>,
}

impl<A: ?Sized> AdviceLogic<A> {
    pub fn new(advice: Arc<A>) -> Self {
        Self { advice }
    }
}

impl<A: ?Sized> Clone for AdviceLogic<A> {
    fn clone(&self) -> Self {
        Self {
            advice: self.advice.clone(),
        }
    }
}

pub struct AddAdviceRequest {
    pub actor: Option<Actor>,
    pub content: AdviceContent,
}

pub struct UpdateAdviceRequest {
    pub actor: Option<Actor>,
    pub advice_id: AdviceId,
    pub content: AdviceContent,
}

pub struct DeleteAdviceRequest {
    pub actor: Option<Actor>,
    pub advice_id: AdviceId,
}

pub struct ListAdviceRequest;

impl<A> Service<AddAdviceRequest> for AdviceLogic<A>
where
    A: AdvicePort + ?Sized + 'static,
{
    type Response = AdviceItem;
    type Error = Error;
    type Future = ServiceFuture<AdviceItem>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: AddAdviceRequest) -> Self::Future {
        let advice = self.advice.clone();
        Box::pin(async move {
            require_admin(req.actor.as_ref())?;
            let item = advice.add_advice(req.content).await?;
            info!(advice_id = %item.id, "advice added");
            Ok(item)
        })
    }
}

impl<A> Service<UpdateAdviceRequest> for AdviceLogic<A>
where
    A: AdvicePort + ?Sized + 'static,
{
    type Response = AdviceItem;
    type Error = Error;
    type Future = ServiceFuture<AdviceItem>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: UpdateAdviceRequest) -> Self::Future {
        let advice = self.advice.clone();
        Box::pin(async move {
            require_admin(req.actor.as_ref())?;
            let item = advice.update_advice(req.advice_id, req.content).await?;
            info!(advice_id = %item.id, "advice updated");
            Ok(item)
        })
    }
}

impl<A> Service<DeleteAdviceRequest> for AdviceLogic<A>
where
    A: AdvicePort + ?Sized + 'static,
{
    type Response = AdviceItem;
    type Error = Error;
    type Future = ServiceFuture<AdviceItem>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: DeleteAdviceRequest) -> Self::Future {
        let advice = self.advice.clone();
        Box::pin(async move {
            require_admin(req.actor.as_ref())?;
            let item = advice.remove_advice(req.advice_id).await?;
            info!(advice_id = %item.id, "advice deleted");
            Ok(item)
        })
    }
}

impl<A> Service<ListAdviceRequest> for AdviceLogic<A>
where
    A: AdvicePort + ?Sized + 'static,
{
    type Response = Vec<AdviceItem>;
    type Error = Error;
    type Future = ServiceFuture<Vec<AdviceItem>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: ListAdviceRequest) -> Self::Future {
        let advice = self.advice.clone();
        Box::pin(async move {
            let items = advice.list_advice().await?;
            debug!(count = items.len(), "listed advice");
            Ok(items)
        })
    }
}
