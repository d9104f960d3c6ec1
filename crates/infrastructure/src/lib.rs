pub mod database;
pub mod error_handling;
pub mod in_memory_store;

pub use database::*;
pub use error_handling::{ItemOperationContext, RepositoryErrorHelpers, RepositoryOperation};
pub use in_memory_store::InMemoryItemRepository;
