//! Test data builders for creating test items

use item_core::Item;

/// Builder for creating test Item entities
pub struct ItemBuilder {
    item: Item,
}

impl ItemBuilder {
    pub fn new() -> Self {
        Self {
            item: Item {
                id: None,
                name: "test_item".to_string(),
                description: Some("test description".to_string()),
                status: Some("NEW".to_string()),
                email: "test@example.com".to_string(),
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.item.id = Some(id);
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.item.name = name.to_string();
        self
    }

    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.item.description = description.map(str::to_string);
        self
    }

    pub fn with_status(mut self, status: Option<&str>) -> Self {
        self.item.status = status.map(str::to_string);
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.item.email = email.to_string();
        self
    }

    pub fn build(self) -> Item {
        self.item
    }
}

impl Default for ItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `count` items with ids `1..=count`, status `NEW`
pub fn numbered_items(count: i64) -> Vec<Item> {
    (1..=count)
        .map(|id| {
            ItemBuilder::new()
                .with_id(id)
                .with_name(&format!("Item {id}"))
                .with_email(&format!("item{id}@example.com"))
                .build()
        })
        .collect()
}
