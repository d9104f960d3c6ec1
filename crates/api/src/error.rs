use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use item_core::ItemError;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::error;
use validator::ValidationErrors;

/// 对外暴露的通用错误信息，内部细节只记录日志
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// PUT 路径上记录不存在时的响应体
pub const ITEM_NOT_FOUND_MESSAGE: &str = "Item not found";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Item服务错误: {0}")]
    Item(#[from] ItemError),

    /// 字段错误，响应体为 `{field: message}`
    #[error("验证错误: {0}")]
    InvalidFields(ValidationErrors),

    /// 字段错误，响应体为 `["field: message", ...]`
    #[error("验证错误: {0}")]
    InvalidFieldList(ValidationErrors),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    /// 404，空响应体
    #[error("未找到资源")]
    NotFound,

    /// 404，响应体为 `Item not found`
    #[error("Item未找到")]
    ItemNotFound,
}

/// 按字段名排序后的 `field -> message`，每个字段取第一条消息
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, field_errors)| {
            field_errors.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                (field.to_string(), message)
            })
        })
        .collect()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::ItemNotFound => (StatusCode::NOT_FOUND, ITEM_NOT_FOUND_MESSAGE).into_response(),
            ApiError::InvalidFields(errors) => {
                (StatusCode::BAD_REQUEST, Json(field_messages(&errors))).into_response()
            }
            ApiError::InvalidFieldList(errors) => {
                let list: Vec<String> = field_messages(&errors)
                    .into_iter()
                    .map(|(field, message)| format!("{field}: {message}"))
                    .collect();
                (StatusCode::BAD_REQUEST, Json(list)).into_response()
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Item(err) => {
                error!(error = %err, "请求处理失败");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": UNEXPECTED_ERROR_MESSAGE })),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use validator::ValidationError;

    fn sample_errors() -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let mut name_error = ValidationError::new("length");
        name_error.message = Some(Cow::Borrowed("Name must be between 2 and 50 characters"));
        errors.add("name", name_error);
        let mut email_error = ValidationError::new("email");
        email_error.message = Some(Cow::Borrowed("Invalid email format"));
        errors.add("email", email_error);
        errors
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_item_error_conversion() {
        let api_error: ApiError = ItemError::worker_pool("工作线程池已关闭").into();
        assert!(matches!(api_error, ApiError::Item(ItemError::WorkerPool(_))));
    }

    #[tokio::test]
    async fn test_not_found_has_empty_body() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_item_not_found_message() {
        let response = ApiError::ItemNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "Item not found");
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = ApiError::Item(ItemError::database_error("secret connection string"))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_string(response).await;
        assert_eq!(body, r#"{"error":"An unexpected error occurred"}"#);
    }

    #[tokio::test]
    async fn test_field_map_and_list_shapes() {
        let response = ApiError::InvalidFields(sample_errors()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let map: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(map["name"], "Name must be between 2 and 50 characters");
        assert_eq!(map["email"], "Invalid email format");

        let response = ApiError::InvalidFieldList(sample_errors()).into_response();
        let list: Vec<String> = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(
            list,
            vec![
                "email: Invalid email format".to_string(),
                "name: Name must be between 2 and 50 characters".to_string(),
            ]
        );
    }
}
