use serde::{Deserialize, Serialize};

/// 批量处理完成后写入的状态值
pub const ITEM_STATUS_PROCESSED: &str = "PROCESSED";

/// 新建记录的常用初始状态
pub const ITEM_STATUS_NEW: &str = "NEW";

/// Item记录
///
/// 表示系统中被管理的一条记录。
///
/// # 字段说明
///
/// - `id`: 唯一标识，首次保存前为 `None`，由存储层分配
/// - `name`: 人类可读名称，必填，长度 2..=50（在请求层校验）
/// - `description`: 自由文本描述
/// - `status`: 状态标记，批量处理会将其改写为 `"PROCESSED"`
/// - `email`: 联系邮箱，需符合基本的邮箱格式（在请求层校验）
///
/// # 使用示例
///
/// ```rust
/// use item_core::models::Item;
///
/// let item = Item::new("Alpha", "a@x.com")
///     .with_description("first item")
///     .with_status("NEW");
/// assert!(item.id.is_none());
/// assert_eq!(item.status.as_deref(), Some("NEW"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub email: String,
}

impl Item {
    /// 创建一个尚未持久化的Item
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            status: None,
            email: email.into(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// 将状态标记为已处理，其余字段保持不变
    pub fn mark_processed(&mut self) {
        self.status = Some(ITEM_STATUS_PROCESSED.to_string());
    }

    pub fn is_processed(&self) -> bool {
        self.status.as_deref() == Some(ITEM_STATUS_PROCESSED)
    }

    /// 日志中使用的实体描述
    pub fn entity_description(&self) -> String {
        match self.id {
            Some(id) => format!("Item '{}' (ID: {})", self.name, id),
            None => format!("Item '{}'", self.name),
        }
    }
}
