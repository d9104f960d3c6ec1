//! # Item API
//!
//! Item记录管理服务的REST API模块。
//!
//! ## 概述
//!
//! 此模块基于Axum框架构建，提供：
//! - Item的增删改查
//! - 全量批处理（将所有记录标记为 `PROCESSED`）
//! - 健康检查与Prometheus指标
//!
//! ## API 端点
//!
//! - `GET /api/items` - 获取全部Item
//! - `POST /api/items` - 创建Item（201，字段错误返回 `{field: message}`）
//! - `GET /api/items/{id}` - 获取Item（不存在时404，空响应体）
//! - `PUT /api/items/{id}` - 更新Item（字段错误返回 `["field: message"]`，不存在时404 `Item not found`）
//! - `DELETE /api/items/{id}` - 删除Item（204，不存在时404）
//! - `GET /api/items/process` - 批处理，返回处理成功的记录
//! - `GET /api/items/process/report` - 批处理，返回包含失败明细的报告
//! - `GET /health` - 健康检查
//! - `GET /metrics` - Prometheus指标
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use item_api::{create_app, AppState};
//!
//! let state = AppState::new(item_repo, worker_pool);
//! let app = create_app(state, &api_config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! ## 错误处理
//!
//! 未预期的错误统一返回 500 和 `{"error": "An unexpected error occurred"}`，
//! 具体原因只写入日志。格式错误的JSON请求体返回 400。

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod validation;

use axum::Router;
use item_core::ApiConfig;
use std::time::Duration;
use tower::ServiceBuilder;

use middleware::{cors_layer, request_logging, trace_layer};

pub use error::{ApiError, ApiResult};
pub use routes::{create_routes, AppState};

/// 创建完整的API应用
pub fn create_app(state: AppState, api_config: &ApiConfig) -> Router {
    let request_timeout = Duration::from_secs(api_config.request_timeout_seconds);

    let app = create_routes(state, request_timeout).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(axum::middleware::from_fn(request_logging)),
    );

    if api_config.cors_enabled {
        app.layer(cors_layer())
    } else {
        app
    }
}
