use item_core::{Item, ItemRepository};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

/// 单个处理单元的失败记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitFailure {
    pub item_id: Option<i64>,
    pub reason: String,
}

impl UnitFailure {
    pub fn new(item_id: Option<i64>, reason: impl Into<String>) -> Self {
        Self {
            item_id,
            reason: reason.into(),
        }
    }
}

/// 处理单元的终态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    Succeeded(Item),
    Failed(UnitFailure),
}

impl UnitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UnitOutcome::Succeeded(_))
    }
}

/// 单次使用的完成令牌
///
/// 由处理单元持有，`complete` 消耗令牌，因此每个单元最多上报一次结果。
/// 令牌未上报就被丢弃（panic、线程池拒绝任务）时，对应的 [`UnitHandle`] 视为失败。
#[derive(Debug)]
pub struct CompletionToken {
    sender: oneshot::Sender<UnitOutcome>,
}

impl CompletionToken {
    pub fn complete(self, outcome: UnitOutcome) {
        // 接收端只会在批次被整体放弃时提前关闭
        let _ = self.sender.send(outcome);
    }
}

/// 聚合器一侧的单元句柄
#[derive(Debug)]
pub struct UnitHandle {
    pub(crate) item_id: Option<i64>,
    pub(crate) receiver: oneshot::Receiver<UnitOutcome>,
}

/// 创建一对互相关联的完成令牌和句柄
pub fn completion_pair(item_id: Option<i64>) -> (CompletionToken, UnitHandle) {
    let (sender, receiver) = oneshot::channel();
    (
        CompletionToken { sender },
        UnitHandle { item_id, receiver },
    )
}

/// 单条记录的处理单元：标记为已处理并保存
pub struct UnitOfWork {
    item: Item,
    repository: Arc<dyn ItemRepository>,
}

impl UnitOfWork {
    pub fn new(item: Item, repository: Arc<dyn ItemRepository>) -> Self {
        Self { item, repository }
    }

    /// 执行处理，错误在单元边界内转换为失败结果，不向外传播
    pub async fn execute(self) -> UnitOutcome {
        let mut item = self.item;
        let item_id = item.id;
        item.mark_processed();

        match self.repository.upsert(&item).await {
            Ok(saved) => {
                debug!("处理单元完成: {}", saved.entity_description());
                UnitOutcome::Succeeded(saved)
            }
            Err(e) => {
                debug!(item_id = ?item_id, error = %e, "处理单元写入失败");
                UnitOutcome::Failed(UnitFailure::new(item_id, e.to_string()))
            }
        }
    }

    /// 执行处理并通过令牌上报结果
    pub async fn run(self, token: CompletionToken) {
        let outcome = self.execute().await;
        token.complete(outcome);
    }
}
