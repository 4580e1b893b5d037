//! 内存实现
//!
//! 关联表与响应解析器

pub mod pending_table;
pub mod resolver;

pub use pending_table::{PendingResponse, PendingTable};
pub use resolver::ResponseResolver;
