use thiserror::Error;

/// Item服务错误类型定义
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("工作线程池错误: {0}")]
    WorkerPool(String),
}

impl ItemError {
    pub fn database_error(message: impl Into<String>) -> Self {
        ItemError::DatabaseOperation(message.into())
    }

    pub fn worker_pool(message: impl Into<String>) -> Self {
        ItemError::WorkerPool(message.into())
    }
}

impl From<serde_json::Error> for ItemError {
    fn from(err: serde_json::Error) -> Self {
        ItemError::Serialization(err.to_string())
    }
}

/// 统一的Result类型
pub type Result<T> = std::result::Result<T, ItemError>;
