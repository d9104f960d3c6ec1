use futures::future::join_all;
use item_core::Item;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::unit::{completion_pair, CompletionToken, UnitFailure, UnitHandle, UnitOutcome};

/// 批次所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchPhase {
    NotStarted,
    Dispatched,
    AllTerminal,
    Drained,
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchPhase::NotStarted => write!(f, "NOT_STARTED"),
            BatchPhase::Dispatched => write!(f, "DISPATCHED"),
            BatchPhase::AllTerminal => write!(f, "ALL_TERMINAL"),
            BatchPhase::Drained => write!(f, "DRAINED"),
        }
    }
}

/// 一次批处理的最终结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub processed: Vec<Item>,
    pub failures: Vec<UnitFailure>,
    pub dispatched: usize,
}

impl BatchOutcome {
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}

/// 结果聚合器
///
/// 每次批处理新建一个实例。`append` / `record_failure` 可被并发调用，
/// `await_all` 消耗全部单元句柄并作为屏障，`drain` 消耗聚合器本身。
pub struct ResultAggregator {
    processed: Mutex<Vec<Item>>,
    failures: Mutex<Vec<UnitFailure>>,
    registered: AtomicUsize,
    phase: Mutex<BatchPhase>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self {
            processed: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
            registered: AtomicUsize::new(0),
            phase: Mutex::new(BatchPhase::NotStarted),
        }
    }

    /// 为一条记录登记处理单元，返回交给单元的令牌和留给屏障的句柄
    pub fn register(&self, item_id: Option<i64>) -> (CompletionToken, UnitHandle) {
        self.registered.fetch_add(1, Ordering::SeqCst);
        completion_pair(item_id)
    }

    /// 全部单元提交完毕
    pub async fn mark_dispatched(&self) {
        let mut phase = self.phase.lock().await;
        if *phase == BatchPhase::NotStarted {
            *phase = BatchPhase::Dispatched;
        }
    }

    pub async fn append(&self, item: Item) {
        self.processed.lock().await.push(item);
    }

    pub async fn record_failure(&self, failure: UnitFailure) {
        warn!(
            item_id = ?failure.item_id,
            reason = %failure.reason,
            "处理单元失败"
        );
        self.failures.lock().await.push(failure);
    }

    async fn accept(&self, item_id: Option<i64>, outcome: Option<UnitOutcome>) {
        match outcome {
            Some(UnitOutcome::Succeeded(item)) => self.append(item).await,
            Some(UnitOutcome::Failed(failure)) => self.record_failure(failure).await,
            None => {
                self.record_failure(UnitFailure::new(
                    item_id,
                    "处理单元未上报结果即终止",
                ))
                .await
            }
        }
    }

    /// 等待所有单元进入终态
    ///
    /// 没有超时；某个单元永不结束时会一直等待。
    pub async fn await_all(&self, handles: Vec<UnitHandle>) {
        let total = handles.len();
        debug!(total, "等待全部处理单元完成");

        join_all(handles.into_iter().map(|handle| async move {
            let outcome = handle.receiver.await.ok();
            self.accept(handle.item_id, outcome).await;
        }))
        .await;

        *self.phase.lock().await = BatchPhase::AllTerminal;
    }

    pub async fn phase(&self) -> BatchPhase {
        *self.phase.lock().await
    }

    /// 取出全部结果，聚合器随之进入 `Drained` 并被消耗
    pub fn drain(self) -> BatchOutcome {
        let from = self.phase.into_inner();
        let dispatched = self.registered.into_inner();
        debug!(from = %from, to = %BatchPhase::Drained, dispatched, "批处理结果已取出");
        BatchOutcome {
            processed: self.processed.into_inner(),
            failures: self.failures.into_inner(),
            dispatched,
        }
    }
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}
