//! HTTP 基础设施
//!
//! 传输层：监听生命周期、鉴权门、请求规范化、动作处理器

pub mod auth;
pub mod handler;
pub mod normalize;
pub mod server;
pub mod state;

pub use server::{BridgeServer, ServerError};
pub use state::AppState;
