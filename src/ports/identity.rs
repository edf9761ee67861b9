use crate::domain::{Actor, Registration, User, UserId};

/// Identity provider: user directory plus the current session
#[mockall::automock]
#[async_trait::async_trait]
pub trait IdentityPort: Send + Sync {
    /// Look up a user by id, returning `None` when the directory has no such entry
    async fn find_user(&self, user_id: UserId) -> Result<Option<User>, Error>;

    /// Actor of the current session, if someone is logged in
    async fn current_actor(&self) -> Result<Option<Actor>, Error>;

    async fn login(&self, email: String, password: String) -> Result<Actor, Error>;
    async fn logout(&self) -> Result<(), Error>;
    async fn register(&self, registration: Registration) -> Result<User, Error>;
    async fn update_user(&self, user: User) -> Result<User, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Domain-level error when a user does not exist
    #[error("user {0} does not exist")]
    UserDoesNotExist(UserId),

    /// Registration with an email that is already in the directory
    #[error("email {0} is already registered")]
    DuplicateIdentity(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
