use crate::{
    domain::{Ritual, RitualId},
    ports::catalog::{CatalogPort, Error},
};
use std::sync::Arc;

/// Catalog loaded once at startup
///
/// Rituals do not change while the service runs, so no lock is needed.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    rituals: Arc<[Ritual]>,
}

impl StaticCatalog {
    pub fn new(rituals: Vec<Ritual>) -> Self {
        Self {
            rituals: rituals.into(),
        }
    }
}

#[async_trait::async_trait]
impl CatalogPort for StaticCatalog {
    async fn find_ritual(&self, ritual_id: RitualId) -> Result<Option<Ritual>, Error> {
        Ok(self.rituals.iter().find(|r| r.id == ritual_id).cloned())
    }

    async fn list_rituals(&self) -> Result<Vec<Ritual>, Error> {
        Ok(self.rituals.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    #[tokio::test]
    async fn test_find_ritual() {
        let hammam = Ritual {
            id: RitualId(1),
            name: "Hammam".to_string(),
            duration_minutes: 90,
            description: None,
        };
        let catalog = StaticCatalog::new(vec![hammam.clone()]);

        assert_that!(catalog.find_ritual(RitualId(1)).await.unwrap())
            .is_some()
            .is_equal_to(hammam);
        assert_that!(catalog.find_ritual(RitualId(2)).await.unwrap()).is_none();
        assert_that!(catalog.list_rituals().await.unwrap().len()).is_equal_to(1);
    }
}
