//! 进程级工作线程池
//!
//! 固定数量的worker共享同一个任务队列（`mpsc`），每个worker同一时刻只执行一个任务，
//! 因此并发执行的任务数不会超过池大小。任务内部的panic按任务捕获，worker本身不受影响。
//!
//! 生命周期由应用持有：服务启动时创建，停止时调用 [`WorkerPool::shutdown`]。

use futures::FutureExt;
use item_core::{ItemError, ItemResult};
use metrics::counter;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// 线程池运行统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerPoolStats {
    pub size: usize,
    pub active_jobs: usize,
    pub completed_jobs: u64,
    pub panicked_jobs: u64,
}

#[derive(Debug, Default)]
struct PoolCounters {
    active: AtomicUsize,
    completed: AtomicU64,
    panicked: AtomicU64,
}

pub struct WorkerPool {
    size: usize,
    /// 关闭后置为 `None`，之后的提交全部被拒绝
    sender: RwLock<Option<mpsc::UnboundedSender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    counters: Arc<PoolCounters>,
}

impl WorkerPool {
    /// 创建并启动 `size` 个worker，必须在tokio运行时内调用
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (sender, receiver) = mpsc::unbounded_channel::<Job>();
        // 多个worker共享同一个接收端
        let receiver = Arc::new(Mutex::new(receiver));
        let counters = Arc::new(PoolCounters::default());

        let workers = (0..size)
            .map(|worker_index| {
                tokio::spawn(Self::worker_loop(
                    worker_index,
                    Arc::clone(&receiver),
                    Arc::clone(&counters),
                ))
            })
            .collect();

        info!(size, "工作线程池已启动");

        Self {
            size,
            sender: RwLock::new(Some(sender)),
            workers: Mutex::new(workers),
            counters,
        }
    }

    async fn worker_loop(
        worker_index: usize,
        receiver: Arc<Mutex<mpsc::UnboundedReceiver<Job>>>,
        counters: Arc<PoolCounters>,
    ) {
        debug!(worker_index, "worker started");

        loop {
            // 只在取任务期间持有锁，执行任务时释放
            let job = {
                let mut receiver = receiver.lock().await;
                receiver.recv().await
            };

            let Some(job) = job else {
                break;
            };

            counters.active.fetch_add(1, Ordering::SeqCst);
            let result = AssertUnwindSafe(job).catch_unwind().await;
            counters.active.fetch_sub(1, Ordering::SeqCst);

            match result {
                Ok(()) => {
                    counters.completed.fetch_add(1, Ordering::SeqCst);
                }
                Err(_) => {
                    counters.panicked.fetch_add(1, Ordering::SeqCst);
                    counter!("item_worker_pool_job_panics_total").increment(1);
                    error!(worker_index, "任务执行过程中发生panic，worker继续运行");
                }
            }
        }

        debug!(worker_index, "worker stopped");
    }

    /// 提交一个任务到队列
    ///
    /// 线程池关闭后提交会返回 [`ItemError::WorkerPool`]，任务本身被丢弃。
    pub async fn submit<F>(&self, job: F) -> ItemResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let sender = self.sender.read().await;
        match sender.as_ref() {
            Some(sender) => sender
                .send(Box::pin(job))
                .map_err(|_| ItemError::worker_pool("任务队列已关闭")),
            None => Err(ItemError::worker_pool("工作线程池已关闭")),
        }
    }

    /// 关闭线程池：停止接收新任务，等待已入队的任务执行完毕
    pub async fn shutdown(&self) {
        let sender = self.sender.write().await.take();
        if sender.is_none() {
            debug!("工作线程池已经关闭");
            return;
        }
        drop(sender);

        let workers = std::mem::take(&mut *self.workers.lock().await);
        for worker in workers {
            if let Err(e) = worker.await {
                error!("等待worker退出失败: {}", e);
            }
        }

        info!("工作线程池已关闭");
    }

    pub async fn is_shutdown(&self) -> bool {
        self.sender.read().await.is_none()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn stats(&self) -> WorkerPoolStats {
        WorkerPoolStats {
            size: self.size,
            active_jobs: self.counters.active.load(Ordering::SeqCst),
            completed_jobs: self.counters.completed.load(Ordering::SeqCst),
            panicked_jobs: self.counters.panicked.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_submit_runs_job() {
        let pool = WorkerPool::new(2);
        let (tx, rx) = oneshot::channel();

        pool.submit(async move {
            let _ = tx.send(42);
        })
        .await
        .unwrap();

        assert_eq!(rx.await.unwrap(), 42);
        pool.shutdown().await;
        assert_eq!(pool.stats().completed_jobs, 1);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded_by_size() {
        let pool = WorkerPool::new(3);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..12 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            pool.submit(async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            })
            .await
            .unwrap();
        }

        pool.shutdown().await;
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(pool.stats().completed_jobs, 12);
    }

    #[tokio::test]
    async fn test_panicking_job_does_not_kill_worker() {
        let pool = WorkerPool::new(1);

        pool.submit(async {
            panic!("boom");
        })
        .await
        .unwrap();

        let (tx, rx) = oneshot::channel();
        pool.submit(async move {
            let _ = tx.send(());
        })
        .await
        .unwrap();

        assert!(rx.await.is_ok());
        pool.shutdown().await;

        let stats = pool.stats();
        assert_eq!(stats.panicked_jobs, 1);
        assert_eq!(stats.completed_jobs, 1);
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_fails() {
        let pool = WorkerPool::new(2);
        pool.shutdown().await;
        assert!(pool.is_shutdown().await);

        let result = pool.submit(async {}).await;
        assert!(matches!(result, Err(ItemError::WorkerPool(_))));

        // 重复关闭是安全的
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_queued_jobs() {
        let pool = WorkerPool::new(1);
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let done = Arc::clone(&done);
            pool.submit(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                done.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();
        }

        pool.shutdown().await;
        assert_eq!(done.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let pool = WorkerPool::new(0);
            assert_eq!(pool.size(), 1);
            pool.shutdown().await;
        });
    }
}
