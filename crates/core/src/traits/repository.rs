//! 数据仓储层接口定义
//!
//! 此模块定义了Item记录的持久化抽象 [`ItemRepository`]。
//!
//! ## 设计原则
//!
//! ### 异步设计
//! 所有数据库操作都是异步的，支持高并发访问：
//! - 返回 `ItemResult<T>` 统一错误处理
//! - 实现 `Send + Sync`，可在多个工作单元间共享
//!
//! ### 抽象解耦
//! 接口与具体实现分离，支持多种后端：
//! - SQLite 实现
//! - PostgreSQL 实现
//! - 内存实现（嵌入式/测试用）
//!
//! ### 并发写入
//! 批量处理会对不同记录并发调用 [`ItemRepository::upsert`]，
//! 单条记录的写入安全由实现方负责，调用方不额外加锁。

use async_trait::async_trait;

use crate::models::Item;
use crate::ItemResult;

/// Item仓储接口
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// 获取全部记录
    async fn list_all(&self) -> ItemResult<Vec<Item>>;

    /// 根据ID获取记录
    async fn get_by_id(&self, id: i64) -> ItemResult<Option<Item>>;

    /// 保存记录
    ///
    /// `id` 为 `None` 时插入并分配新ID；否则按ID插入或覆盖。
    /// 返回持久化后的记录。
    async fn upsert(&self, item: &Item) -> ItemResult<Item>;

    /// 根据ID删除记录，返回是否确实删除了记录
    async fn delete_by_id(&self, id: i64) -> ItemResult<bool>;

    /// 获取全部记录ID
    async fn list_all_ids(&self) -> ItemResult<Vec<i64>>;

    /// 检查记录是否存在
    async fn exists_by_id(&self, id: i64) -> ItemResult<bool> {
        Ok(self.get_by_id(id).await?.is_some())
    }
}
