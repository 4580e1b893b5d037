//! 领域层
//!
//! Action Context: 动作命令、关联标识符与操作结果

pub mod action;

pub use action::{ActionCommand, CorrelationId, OperationResult};
