pub mod batch;
pub mod pool;

pub use batch::{BatchOutcome, BatchPhase, BatchProcessor, BatchReport, ResultAggregator, UnitFailure};
pub use pool::{WorkerPool, WorkerPoolStats};
