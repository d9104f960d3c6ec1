pub mod sqlite_item_repository;

pub use sqlite_item_repository::SqliteItemRepository;
