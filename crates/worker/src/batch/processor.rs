use item_core::{Item, ItemRepository, ItemResult};
use metrics::{counter, histogram};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

use super::aggregator::{BatchOutcome, ResultAggregator};
use super::unit::{UnitFailure, UnitOfWork};
use crate::pool::WorkerPool;

/// 带失败明细的批处理报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub dispatched: usize,
    pub processed: Vec<Item>,
    pub failed: usize,
    pub failures: Vec<UnitFailure>,
}

impl From<BatchOutcome> for BatchReport {
    fn from(outcome: BatchOutcome) -> Self {
        Self {
            dispatched: outcome.dispatched,
            failed: outcome.failures.len(),
            processed: outcome.processed,
            failures: outcome.failures,
        }
    }
}

/// 批量处理器
///
/// 读取全部记录的快照，为每条记录向线程池提交一个处理单元，
/// 等待所有单元结束后返回成功处理的记录。单元之间互不影响，
/// 单个单元失败只会让该记录缺席结果，不会让整个批次失败。
#[derive(Clone)]
pub struct BatchProcessor {
    repository: Arc<dyn ItemRepository>,
    pool: Arc<WorkerPool>,
}

impl BatchProcessor {
    pub fn new(repository: Arc<dyn ItemRepository>, pool: Arc<WorkerPool>) -> Self {
        Self { repository, pool }
    }

    /// 执行一次批处理，返回成功处理的记录（顺序不保证）
    pub async fn run_batch(&self) -> ItemResult<Vec<Item>> {
        Ok(self.execute().await?.processed)
    }

    /// 执行一次批处理，同时返回失败明细
    pub async fn run_batch_with_report(&self) -> ItemResult<BatchReport> {
        Ok(self.execute().await?.into())
    }

    #[instrument(skip(self), fields(pool_size = self.pool.size()))]
    async fn execute(&self) -> ItemResult<BatchOutcome> {
        let started = Instant::now();

        let snapshot = self.repository.list_all().await.map_err(|e| {
            error!(error = %e, "读取记录快照失败，批处理未开始");
            counter!("item_batch_runs_failed_total").increment(1);
            e
        })?;

        let total = snapshot.len();
        info!(total, "开始批处理");

        let aggregator = ResultAggregator::new();
        let mut handles = Vec::with_capacity(total);

        for item in snapshot {
            let item_id = item.id;
            let (token, handle) = aggregator.register(item_id);
            let unit = UnitOfWork::new(item, Arc::clone(&self.repository));

            match self.pool.submit(unit.run(token)).await {
                Ok(()) => handles.push(handle),
                Err(e) => {
                    // 任务连同令牌已被丢弃，直接记为失败，不再等待该句柄
                    aggregator
                        .record_failure(UnitFailure::new(item_id, e.to_string()))
                        .await;
                }
            }
        }

        aggregator.mark_dispatched().await;
        debug!(dispatched = handles.len(), "处理单元已提交");

        aggregator.await_all(handles).await;
        let outcome = aggregator.drain();

        let elapsed = started.elapsed();
        counter!("item_batch_runs_total").increment(1);
        counter!("item_batch_units_processed_total").increment(outcome.processed_count() as u64);
        counter!("item_batch_units_failed_total").increment(outcome.failed_count() as u64);
        histogram!("item_batch_duration_ms").record(elapsed.as_millis() as f64);

        info!(
            total,
            processed = outcome.processed_count(),
            failed = outcome.failed_count(),
            elapsed_ms = elapsed.as_millis() as u64,
            "批处理完成"
        );

        Ok(outcome)
    }
}
