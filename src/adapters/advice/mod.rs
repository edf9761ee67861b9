use crate::{
    domain::{AdviceContent, AdviceId, AdviceItem, IdSequence},
    ports::advice::{AdvicePort, Error},
};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, Default)]
pub struct MemoryAdvice {
    shelf: Arc<Mutex<Shelf>>,
}

#[derive(Debug, Default)]
struct Shelf {
    items: Vec<AdviceItem>,
    next_id: IdSequence,
}

impl MemoryAdvice {
    pub fn new(items: Vec<AdviceItem>) -> Self {
        let next_id = IdSequence::starting_after(items.iter().map(|i| i.id.0));
        Self {
            shelf: Arc::new(Mutex::new(Shelf { items, next_id })),
        }
    }
}

#[async_trait::async_trait]
impl AdvicePort for MemoryAdvice {
    async fn list_advice(&self) -> Result<Vec<AdviceItem>, Error> {
        Ok(self.shelf.lock()?.items.clone())
    }

    async fn add_advice(&self, content: AdviceContent) -> Result<AdviceItem, Error> {
        let mut shelf = self.shelf.lock()?;
        let item = content.into_item(AdviceId(shelf.next_id.next_id()?));
        shelf.items.push(item.clone());
        Ok(item)
    }

    async fn update_advice(
        &self,
        advice_id: AdviceId,
        content: AdviceContent,
    ) -> Result<AdviceItem, Error> {
        let mut shelf = self.shelf.lock()?;
        let item = shelf
            .items
            .iter_mut()
            .find(|i| i.id == advice_id)
            .ok_or(Error::AdviceDoesNotExist(advice_id))?;
        item.content = content;
        Ok(item.clone())
    }

    async fn remove_advice(&self, advice_id: AdviceId) -> Result<AdviceItem, Error> {
        let mut shelf = self.shelf.lock()?;
        let index = shelf
            .items
            .iter()
            .position(|i| i.id == advice_id)
            .ok_or(Error::AdviceDoesNotExist(advice_id))?;
        Ok(shelf.items.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    fn content(title: &str) -> AdviceContent {
        AdviceContent {
            title: title.to_string(),
            body: "Drink water after a hammam.".to_string(),
            category: None,
        }
    }

    #[tokio::test]
    async fn test_add_update_remove() {
        let advice = MemoryAdvice::default();
        let item = advice.add_advice(content("Hydration")).await.unwrap();
        assert_that!(item.id).is_equal_to(AdviceId(1));

        let updated = advice
            .update_advice(item.id, content("Hydrate"))
            .await
            .unwrap();
        assert_that!(updated.content.title.as_str()).is_equal_to("Hydrate");

        advice.remove_advice(item.id).await.unwrap();
        assert_that!(advice.list_advice().await.unwrap().is_empty()).is_true();

        let res = advice.remove_advice(item.id).await;
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::AdviceDoesNotExist(_)));
    }
}
