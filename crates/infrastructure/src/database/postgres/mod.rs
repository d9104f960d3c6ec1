pub mod postgres_item_repository;

pub use postgres_item_repository::PostgresItemRepository;
