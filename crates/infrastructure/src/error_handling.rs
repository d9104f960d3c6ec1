//! Error handling for item repository operations with rich context
//!
//! Every backend wraps raw `sqlx` failures through [`RepositoryErrorHelpers`] so that
//! the logged message names the operation and the entity it touched.

use chrono::{DateTime, Utc};
use item_core::ItemError;
use sqlx::Error as SqlxError;
use std::fmt;
use tracing::{debug, error, instrument};

/// Operation context for repository operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryOperation {
    Create,
    Read,
    Upsert,
    Delete,
    Query,
    Migrate,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryOperation::Create => write!(f, "创建"),
            RepositoryOperation::Read => write!(f, "查询"),
            RepositoryOperation::Upsert => write!(f, "保存"),
            RepositoryOperation::Delete => write!(f, "删除"),
            RepositoryOperation::Query => write!(f, "批量查询"),
            RepositoryOperation::Migrate => write!(f, "迁移"),
        }
    }
}

/// Context information for item repository operations
#[derive(Debug, Clone)]
pub struct ItemOperationContext {
    pub operation: RepositoryOperation,
    pub item_id: Option<i64>,
    pub item_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ItemOperationContext {
    pub fn new(operation: RepositoryOperation) -> Self {
        Self {
            operation,
            item_id: None,
            item_name: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_item_id(mut self, item_id: i64) -> Self {
        self.item_id = Some(item_id);
        self
    }

    pub fn with_item_name(mut self, item_name: String) -> Self {
        self.item_name = Some(item_name);
        self
    }

    pub fn entity_description(&self) -> String {
        match (&self.item_id, &self.item_name) {
            (Some(id), Some(name)) => format!("Item '{}' (ID: {})", name, id),
            (Some(id), None) => format!("Item (ID: {})", id),
            (None, Some(name)) => format!("Item '{}'", name),
            (None, None) => "Item".to_string(),
        }
    }
}

/// Error helpers for repository operations
pub struct RepositoryErrorHelpers;

impl RepositoryErrorHelpers {
    /// Create a database error with item context
    #[instrument(skip_all, fields(
        operation = %context.operation,
        item_id = ?context.item_id,
        item_name = ?context.item_name,
        timestamp = %context.timestamp,
    ))]
    pub fn item_database_error(context: ItemOperationContext, error: SqlxError) -> ItemError {
        let entity_desc = context.entity_description();
        let operation_desc = context.operation.to_string();

        let error_msg = match &error {
            SqlxError::Database(db_error) => match db_error.constraint() {
                Some("items_pkey") => format!(
                    "{}{}时发生主键冲突: ID {} 已存在",
                    operation_desc,
                    entity_desc,
                    context.item_id.unwrap_or(0)
                ),
                Some(constraint) => format!(
                    "{}{}时发生数据库约束冲突: {}",
                    operation_desc, entity_desc, constraint
                ),
                None => format!("{}{}时发生数据库错误: {}", operation_desc, entity_desc, db_error),
            },
            SqlxError::PoolClosed => {
                format!("{}{}时数据库连接池已关闭", operation_desc, entity_desc)
            }
            SqlxError::PoolTimedOut => {
                format!("{}{}时数据库连接池超时", operation_desc, entity_desc)
            }
            SqlxError::Io(io_error) => {
                format!("{}{}时发生I/O错误: {}", operation_desc, entity_desc, io_error)
            }
            _ => format!(
                "{}{}时发生未知数据库错误: {}",
                operation_desc, entity_desc, error
            ),
        };

        error!(error = %error, "{}", error_msg);
        ItemError::database_error(error_msg)
    }

    /// Log successful repository operation
    pub fn log_operation_success(
        context: &ItemOperationContext,
        entity_desc: &str,
        additional_info: Option<&str>,
    ) {
        let base_msg = format!("{}{}成功", context.operation, entity_desc);

        if let Some(info) = additional_info {
            debug!("{}: {}", base_msg, info);
        } else {
            debug!("{}", base_msg);
        }
    }
}

/// Macro for creating item operation context easily
#[macro_export]
macro_rules! item_context {
    ($operation:expr) => {
        $crate::error_handling::ItemOperationContext::new($operation)
    };
    ($operation:expr, item_id = $item_id:expr) => {
        $crate::error_handling::ItemOperationContext::new($operation).with_item_id($item_id)
    };
    ($operation:expr, item_name = $item_name:expr) => {
        $crate::error_handling::ItemOperationContext::new($operation)
            .with_item_name($item_name.to_string())
    };
    ($operation:expr, item_id = $item_id:expr, item_name = $item_name:expr) => {
        $crate::error_handling::ItemOperationContext::new($operation)
            .with_item_id($item_id)
            .with_item_name($item_name.to_string())
    };
}
