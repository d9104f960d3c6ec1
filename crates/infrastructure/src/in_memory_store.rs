use async_trait::async_trait;
use item_core::{Item, ItemRepository, ItemResult};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// 内存Item仓储实现
///
/// 使用 `RwLock<BTreeMap>` 保存记录，适用于嵌入式部署和 `memory://` 数据库地址。
/// 进程退出后数据即丢失。
#[derive(Debug, Clone)]
pub struct InMemoryItemRepository {
    /// ID -> Item，按ID有序，保证列表输出稳定
    items: Arc<RwLock<BTreeMap<i64, Item>>>,
    /// 下一个待分配的ID
    next_id: Arc<AtomicI64>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// 当前记录数
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

impl Default for InMemoryItemRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn list_all(&self) -> ItemResult<Vec<Item>> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> ItemResult<Option<Item>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    #[instrument(skip(self, item), fields(item_id = ?item.id))]
    async fn upsert(&self, item: &Item) -> ItemResult<Item> {
        let mut items = self.items.write().await;

        let id = match item.id {
            Some(id) => {
                // 显式ID写入后，后续自动分配的ID不能与之冲突
                self.next_id.fetch_max(id.saturating_add(1), Ordering::SeqCst);
                id
            }
            None => self.next_id.fetch_add(1, Ordering::SeqCst),
        };

        let mut saved = item.clone();
        saved.id = Some(id);
        items.insert(id, saved.clone());

        debug!("保存Item成功: {}", saved.entity_description());
        Ok(saved)
    }

    async fn delete_by_id(&self, id: i64) -> ItemResult<bool> {
        Ok(self.items.write().await.remove(&id).is_some())
    }

    async fn list_all_ids(&self) -> ItemResult<Vec<i64>> {
        Ok(self.items.read().await.keys().copied().collect())
    }

    async fn exists_by_id(&self, id: i64) -> ItemResult<bool> {
        Ok(self.items.read().await.contains_key(&id))
    }
}
