pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod traits;

pub use config::*;
pub use errors::*;
pub use logging::init_logging;
pub use models::{Item, ITEM_STATUS_PROCESSED};
pub use traits::ItemRepository;

/// 统一的Result类型
pub type ItemResult<T> = std::result::Result<T, ItemError>;
