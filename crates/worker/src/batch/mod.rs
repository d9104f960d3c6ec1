//! 批量状态处理
//!
//! - [`BatchProcessor`]: 一次批处理的编排
//! - [`ResultAggregator`]: 并发收集各单元结果，并提供等待屏障
//! - [`UnitOfWork`]: 单条记录的处理单元

pub mod aggregator;
pub mod processor;
pub mod unit;

pub use aggregator::{BatchOutcome, BatchPhase, ResultAggregator};
pub use processor::{BatchProcessor, BatchReport};
pub use unit::{completion_pair, CompletionToken, UnitFailure, UnitHandle, UnitOfWork, UnitOutcome};
