use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use item_api::{create_app, AppState};
use item_core::AppConfig;
use item_infrastructure::DatabaseManager;
use item_worker::WorkerPool;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::{net::TcpListener, sync::broadcast};
use tracing::info;

/// 主应用程序
///
/// 持有数据库连接和进程级工作线程池，二者随应用一同启动、一同关闭。
pub struct Application {
    config: AppConfig,
    db_manager: DatabaseManager,
    worker_pool: Arc<WorkerPool>,
    metrics_handle: Option<PrometheusHandle>,
}

impl Application {
    /// 创建新的应用实例，必须在tokio运行时内调用
    pub async fn new(config: AppConfig, metrics_handle: Option<PrometheusHandle>) -> Result<Self> {
        info!("初始化应用程序");

        let db_manager = DatabaseManager::from_config(&config.database)
            .await
            .with_context(|| format!("连接数据库失败: {}", config.database.url))?;

        let worker_threads = config.batch.effective_worker_threads();
        let worker_pool = Arc::new(WorkerPool::new(worker_threads));

        Ok(Self {
            config,
            db_manager,
            worker_pool,
            metrics_handle,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn worker_pool(&self) -> Arc<WorkerPool> {
        Arc::clone(&self.worker_pool)
    }

    /// 构建HTTP路由
    pub fn router(&self) -> Router {
        let mut state = AppState::new(
            self.db_manager.item_repository(),
            Arc::clone(&self.worker_pool),
        );
        if let Some(handle) = &self.metrics_handle {
            state = state.with_metrics_handle(handle.clone());
        }

        create_app(state, &self.config.api)
    }

    /// 绑定配置中的地址并运行，直到收到关闭信号
    pub async fn run(&self, shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let listener = TcpListener::bind(&self.config.api.bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {}", self.config.api.bind_address))?;

        self.serve(listener, shutdown_rx).await
    }

    /// 在给定的监听器上运行API服务器，收到关闭信号后依次停止服务器、线程池和数据库连接
    pub async fn serve(
        &self,
        listener: TcpListener,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        let local_addr = listener.local_addr().context("获取监听地址失败")?;
        info!("API服务器启动在 http://{}", local_addr);

        let result = axum::serve(listener, self.router().into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API服务器收到关闭信号");
            })
            .await
            .context("API服务器运行失败");

        self.stop().await;
        result
    }

    /// 关闭工作线程池和数据库连接
    pub async fn stop(&self) {
        self.worker_pool.shutdown().await;
        self.db_manager.close().await;
        info!("应用程序资源已释放");
    }
}
