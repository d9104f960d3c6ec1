//! Mock implementation of the item repository
//!
//! `MockItemRepository` keeps records in memory and can be told to fail,
//! panic or slow down for specific ids, which is what the batch tests need
//! to exercise partial failure.

use async_trait::async_trait;
use item_core::{Item, ItemError, ItemRepository, ItemResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
struct FaultPlan {
    fail_upsert_ids: HashSet<i64>,
    panic_upsert_ids: HashSet<i64>,
    upsert_delays: HashMap<i64, Duration>,
    fail_list_all: bool,
}

/// Mock implementation of ItemRepository for testing
#[derive(Debug, Clone)]
pub struct MockItemRepository {
    items: Arc<Mutex<HashMap<i64, Item>>>,
    next_id: Arc<Mutex<i64>>,
    faults: Arc<Mutex<FaultPlan>>,
    upsert_calls: Arc<AtomicUsize>,
}

impl MockItemRepository {
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
            faults: Arc::new(Mutex::new(FaultPlan::default())),
            upsert_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Seed the repository; items without an id get one assigned
    pub fn with_items(items: Vec<Item>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.items.lock().unwrap();
            let mut next_id = repo.next_id.lock().unwrap();

            for mut item in items {
                let id = match item.id {
                    Some(id) => id,
                    None => *next_id,
                };
                item.id = Some(id);
                *next_id = (*next_id).max(id + 1);
                map.insert(id, item);
            }
        }
        repo
    }

    /// Make `upsert` return a database error for this id
    pub fn fail_upsert_for(self, id: i64) -> Self {
        self.faults.lock().unwrap().fail_upsert_ids.insert(id);
        self
    }

    /// Make `upsert` panic for this id
    pub fn panic_upsert_for(self, id: i64) -> Self {
        self.faults.lock().unwrap().panic_upsert_ids.insert(id);
        self
    }

    /// Delay `upsert` for this id
    pub fn delay_upsert_for(self, id: i64, delay: Duration) -> Self {
        self.faults.lock().unwrap().upsert_delays.insert(id, delay);
        self
    }

    /// Make `list_all` fail
    pub fn fail_list_all(self) -> Self {
        self.faults.lock().unwrap().fail_list_all = true;
        self
    }

    pub fn count(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn get_all_items(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self.items.lock().unwrap().values().cloned().collect();
        items.sort_by_key(|item| item.id);
        items
    }
}

impl Default for MockItemRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemRepository for MockItemRepository {
    async fn list_all(&self) -> ItemResult<Vec<Item>> {
        if self.faults.lock().unwrap().fail_list_all {
            return Err(ItemError::database_error("mock list_all failure"));
        }
        Ok(self.get_all_items())
    }

    async fn get_by_id(&self, id: i64) -> ItemResult<Option<Item>> {
        Ok(self.items.lock().unwrap().get(&id).cloned())
    }

    async fn upsert(&self, item: &Item) -> ItemResult<Item> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);

        let (delay, should_fail, should_panic) = {
            let faults = self.faults.lock().unwrap();
            match item.id {
                Some(id) => (
                    faults.upsert_delays.get(&id).copied(),
                    faults.fail_upsert_ids.contains(&id),
                    faults.panic_upsert_ids.contains(&id),
                ),
                None => (None, false, false),
            }
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if should_panic {
            panic!("mock upsert panic for item {:?}", item.id);
        }
        if should_fail {
            return Err(ItemError::database_error(format!(
                "mock upsert failure for item {:?}",
                item.id
            )));
        }

        let mut items = self.items.lock().unwrap();
        let id = match item.id {
            Some(id) => id,
            None => {
                let mut next_id = self.next_id.lock().unwrap();
                let id = *next_id;
                *next_id += 1;
                id
            }
        };

        let mut saved = item.clone();
        saved.id = Some(id);
        items.insert(id, saved.clone());
        Ok(saved)
    }

    async fn delete_by_id(&self, id: i64) -> ItemResult<bool> {
        Ok(self.items.lock().unwrap().remove(&id).is_some())
    }

    async fn list_all_ids(&self) -> ItemResult<Vec<i64>> {
        let mut ids: Vec<i64> = self.items.lock().unwrap().keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
