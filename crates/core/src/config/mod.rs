//! # 配置管理
//!
//! 基于 `config` crate 的分层配置：默认值 → TOML 配置文件 → `ITEM_SERVICE_` 前缀的环境变量。
//! 每个配置段都实现 [`ConfigValidator`]，加载完成后统一校验。

pub mod models;
pub mod validation;

pub use models::{
    ApiConfig, AppConfig, BatchConfig, DatabaseConfig, LogFormat, ObservabilityConfig,
};
pub use validation::{ConfigValidator, ValidationUtils};

/// Configuration error type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration error enumeration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("File error: {0}")]
    File(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<ConfigError> for crate::ItemError {
    fn from(err: ConfigError) -> Self {
        crate::ItemError::Configuration(err.to_string())
    }
}
