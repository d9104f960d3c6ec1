//! # 数据模型
//!
//! 定义Item服务的核心数据结构。
//!
//! ## Item - 记录实体
//! 系统唯一的持久化实体，由存储层负责创建、更新与删除；
//! 批量处理任务只会改写其 `status` 字段。
//!
//! ## 数据库映射
//!
//! ### items 表
//! - `id` - 主键（首次保存时由存储层分配）
//! - `name` - 名称
//! - `description` - 描述
//! - `status` - 状态标记
//! - `email` - 联系邮箱

pub mod item;

pub use item::*;
