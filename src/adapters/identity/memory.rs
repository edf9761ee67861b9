use crate::{
    domain::{Actor, Credential, IdSequence, Registration, Role, User, UserId},
    ports::identity::{Error, IdentityPort},
};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// User directory and single-session state kept in memory
///
/// The session only stores the user id: the current actor is always derived from the directory
/// entry, so updating a user is immediately visible through [`IdentityPort::current_actor`].
#[derive(Clone, Debug, Default)]
pub struct MemoryIdentity {
    directory: Arc<Mutex<Directory>>,
}

#[derive(Debug, Default)]
struct Directory {
    users: Vec<User>,
    session: Option<UserId>,
    next_user_id: IdSequence,
}

impl Directory {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .iter()
            .any(|u| Some(u.id) != except && u.email.eq_ignore_ascii_case(email))
    }
}

impl MemoryIdentity {
    pub fn new(users: Vec<User>) -> Self {
        let next_user_id = IdSequence::starting_after(users.iter().map(|u| u.id.0));
        Self {
            directory: Arc::new(Mutex::new(Directory {
                users,
                session: None,
                next_user_id,
            })),
        }
    }
}

#[async_trait::async_trait]
impl IdentityPort for MemoryIdentity {
    async fn find_user(&self, user_id: UserId) -> Result<Option<User>, Error> {
        let directory = self.directory.lock()?;
        Ok(directory.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn current_actor(&self) -> Result<Option<Actor>, Error> {
        let directory = self.directory.lock()?;
        let actor = directory.session.and_then(|user_id| {
            directory
                .users
                .iter()
                .find(|u| u.id == user_id)
                .map(User::actor)
        });
        Ok(actor)
    }

    async fn login(&self, email: String, password: String) -> Result<Actor, Error> {
        let mut directory = self.directory.lock()?;
        let actor = directory
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(&email) && u.credential.matches(&password))
            .map(User::actor);

        match actor {
            Some(actor) => {
                directory.session = Some(actor.id);
                info!(user_id = %actor.id, role = %actor.role, "user logged in");
                Ok(actor)
            }
            None => {
                warn!("rejected login attempt");
                Err(Error::InvalidCredentials)
            }
        }
    }

    async fn logout(&self) -> Result<(), Error> {
        self.directory.lock()?.session = None;
        Ok(())
    }

    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let mut directory = self.directory.lock()?;
        if directory.email_taken(&registration.email, None) {
            return Err(Error::DuplicateIdentity(registration.email));
        }

        let user = User {
            id: UserId(directory.next_user_id.next_id()?),
            name: registration.name,
            email: registration.email,
            credential: Credential::new(registration.password),
            role: Role::Client,
            phone: registration.phone.unwrap_or_default(),
        };
        directory.users.push(user.clone());
        directory.session = Some(user.id);
        info!(user_id = %user.id, "user registered");

        Ok(user)
    }

    async fn update_user(&self, user: User) -> Result<User, Error> {
        let mut directory = self.directory.lock()?;
        if directory.email_taken(&user.email, Some(user.id)) {
            return Err(Error::DuplicateIdentity(user.email));
        }

        let entry = directory
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(Error::UserDoesNotExist(user.id))?;
        *entry = user.clone();

        Ok(user)
    }
}
