use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigResult, ConfigValidator};

/// 批量处理工作线程池配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BatchConfig {
    /// 工作线程数，0 表示使用硬件并行度
    pub worker_threads: usize,
}

impl BatchConfig {
    /// 实际使用的工作线程数
    pub fn effective_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            num_cpus::get().max(1)
        } else {
            self.worker_threads
        }
    }
}

impl ConfigValidator for BatchConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.worker_threads > 1024 {
            return Err(ConfigError::Validation(
                "batch.worker_threads must be less than or equal to 1024".to_string(),
            ));
        }
        Ok(())
    }
}
