use crate::domain::{AdviceContent, AdviceId, AdviceItem};

#[mockall::automock]
#[async_trait::async_trait]
pub trait AdvicePort: Send + Sync {
    async fn list_advice(&self) -> Result<Vec<AdviceItem>, Error>;
    async fn add_advice(&self, content: AdviceContent) -> Result<AdviceItem, Error>;
    async fn update_advice(
        &self,
        advice_id: AdviceId,
        content: AdviceContent,
    ) -> Result<AdviceItem, Error>;
    async fn remove_advice(&self, advice_id: AdviceId) -> Result<AdviceItem, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("advice {0} does not exist")]
    AdviceDoesNotExist(AdviceId),

    /// Concrete adapter errors
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
