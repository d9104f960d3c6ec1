//! # Item Testing Utils
//!
//! Shared testing utilities for the item service workspace.
//!
//! ## Features
//!
//! - **Mock Repository**: In-memory `ItemRepository` with fault injection
//! - **Test Data Builders**: Utilities for creating test items
//! - **Test Helpers**: SQLite in-memory pools and tracing setup
//!
//! ## Usage
//!
//! Add this crate as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! item-testing-utils = { path = "../testing-utils" }
//! ```
//!
//! Then use the mocks in your tests:
//!
//! ```rust
//! use item_testing_utils::{ItemBuilder, MockItemRepository};
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;
