use crate::domain::{Ritual, RitualId};

/// Read-only catalog of rituals offered by the business
#[mockall::automock]
#[async_trait::async_trait]
pub trait CatalogPort: Send + Sync {
    async fn find_ritual(&self, ritual_id: RitualId) -> Result<Option<Ritual>, Error>;
    async fn list_rituals(&self) -> Result<Vec<Ritual>, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Concrete adapter errors
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
