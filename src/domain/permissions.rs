//! Capability checks shared by every command
//!
//! These are pure functions of the actor: they never consult shared state.

use super::{Actor, UserId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Denied {
    /// No identity was resolved for the caller
    #[error("authentication required")]
    Unauthenticated,

    /// The actor lacks the required role or ownership
    #[error("user {0} is not allowed to perform this action")]
    Forbidden(UserId),
}

pub fn require_actor(actor: Option<&Actor>) -> Result<&Actor, Denied> {
    actor.ok_or(Denied::Unauthenticated)
}

pub fn require_admin(actor: Option<&Actor>) -> Result<&Actor, Denied> {
    let actor = require_actor(actor)?;
    if !actor.is_admin() {
        return Err(Denied::Forbidden(actor.id));
    }
    Ok(actor)
}

/// Owners can act on their own records, admins on everyone's
pub fn require_owner_or_admin(actor: &Actor, owner: UserId) -> Result<(), Denied> {
    if actor.id == owner || actor.is_admin() {
        Ok(())
    } else {
        Err(Denied::Forbidden(actor.id))
    }
}
