use serde::{Deserialize, Serialize};

use super::AdviceId;

/// Tip published by the business
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceItem {
    pub id: AdviceId,
    #[serde(flatten)]
    pub content: AdviceContent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceContent {
    pub title: String,
    #[serde(rename = "content")]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl AdviceContent {
    pub fn into_item(self, id: AdviceId) -> AdviceItem {
        AdviceItem { id, content: self }
    }
}
