use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use item_core::Item;
use item_worker::BatchReport;
use tracing::{debug, info};

use crate::{
    error::{ApiError, ApiResult},
    routes::AppState,
    validation::validate_item,
};

fn parse_body(payload: Result<Json<Item>, JsonRejection>) -> ApiResult<Item> {
    payload
        .map(|Json(item)| item)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// 获取全部Item
pub async fn list_items(State(state): State<AppState>) -> ApiResult<Json<Vec<Item>>> {
    let items = state.item_repo.list_all().await?;
    Ok(Json(items))
}

/// 创建Item
///
/// 请求体中的 `id` 会被忽略，由存储层分配新ID。
pub async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<Item>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let mut item = parse_body(payload)?;
    validate_item(&item).map_err(ApiError::InvalidFields)?;

    item.id = None;
    let saved = state.item_repo.upsert(&item).await?;
    info!("创建Item成功: {}", saved.entity_description());

    Ok((StatusCode::CREATED, Json(saved)))
}

/// 获取单个Item
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Item>> {
    state
        .item_repo
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// 更新Item，路径中的ID覆盖请求体中的ID
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<Item>, JsonRejection>,
) -> ApiResult<Json<Item>> {
    let mut item = parse_body(payload)?;
    validate_item(&item).map_err(ApiError::InvalidFieldList)?;

    if !state.item_repo.exists_by_id(id).await? {
        debug!(item_id = id, "更新的Item不存在");
        return Err(ApiError::ItemNotFound);
    }

    item.id = Some(id);
    let saved = state.item_repo.upsert(&item).await?;
    info!("更新Item成功: {}", saved.entity_description());

    Ok(Json(saved))
}

/// 删除Item
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if !state.item_repo.exists_by_id(id).await? {
        return Err(ApiError::NotFound);
    }

    state.item_repo.delete_by_id(id).await?;
    info!(item_id = id, "删除Item成功");

    Ok(StatusCode::NO_CONTENT)
}

/// 批量处理全部Item，返回处理成功的记录
pub async fn process_items(State(state): State<AppState>) -> ApiResult<Json<Vec<Item>>> {
    let processed = state.batch_processor.run_batch().await?;
    Ok(Json(processed))
}

/// 批量处理全部Item，返回包含失败明细的报告
pub async fn process_items_report(State(state): State<AppState>) -> ApiResult<Json<BatchReport>> {
    let report = state.batch_processor.run_batch_with_report().await?;
    Ok(Json(report))
}
