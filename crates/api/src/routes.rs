use axum::{routing::get, Router};
use item_core::ItemRepository;
use item_worker::{BatchProcessor, WorkerPool};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

use crate::handlers::{
    health::health_check,
    items::{
        create_item, delete_item, get_item, list_items, process_items, process_items_report,
        update_item,
    },
    metrics::render_metrics,
};
use crate::middleware::batch_span;

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub item_repo: Arc<dyn ItemRepository>,
    pub batch_processor: BatchProcessor,
    pub worker_pool: Arc<WorkerPool>,
    /// 未启用指标时为 `None`
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(item_repo: Arc<dyn ItemRepository>, worker_pool: Arc<WorkerPool>) -> Self {
        let batch_processor = BatchProcessor::new(Arc::clone(&item_repo), Arc::clone(&worker_pool));
        Self {
            item_repo,
            batch_processor,
            worker_pool,
            metrics_handle: None,
        }
    }

    pub fn with_metrics_handle(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}

/// 创建API路由
///
/// 请求超时只作用于单条记录的增删改查；批处理路由会一直等到所有单元结束。
pub fn create_routes(state: AppState, request_timeout: Duration) -> Router {
    let crud_routes = Router::new()
        .route("/api/items", get(list_items).post(create_item))
        .route(
            "/api/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .layer(TimeoutLayer::new(request_timeout));

    let batch_routes = Router::new()
        .route("/api/items/process", get(process_items))
        .route("/api/items/process/report", get(process_items_report))
        .route_layer(axum::middleware::from_fn(batch_span));

    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        .route("/metrics", get(render_metrics))
        .merge(crud_routes)
        .merge(batch_routes)
        .with_state(state)
}
