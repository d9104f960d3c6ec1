pub mod item;

pub use item::{validate_email, validate_item, validate_name};
