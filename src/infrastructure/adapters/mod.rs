//! 适配器
//!
//! 外部协作者的进程内替身

pub mod fake_backend;

pub use fake_backend::FakeBotBackend;
