//! 后台 Worker

pub mod dispatch_worker;

pub use dispatch_worker::{DispatchWorker, DispatchWorkerConfig};
