//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `BOTBRIDGE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `BOTBRIDGE_SERVER__HOST=127.0.0.1`
/// - `BOTBRIDGE_SERVER__PORT=5700`
/// - `BOTBRIDGE_SERVER__ACCESS_TOKEN=secret`
/// - `BOTBRIDGE_DISPATCH__MAX_CONCURRENT=16`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5700)?
        .set_default("dispatch.max_concurrent", 8)?
        .set_default("dispatch.queue_capacity", 1024)?
        .set_default("dispatch.shutdown_grace_secs", 5)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: BOTBRIDGE_，层级分隔符: __ (双下划线)
    builder = builder.add_source(
        Environment::with_prefix("BOTBRIDGE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if let Some(token) = &config.server.access_token {
        if token.is_empty() {
            return Err(ConfigError::ValidationError(
                "Access token cannot be empty when configured".to_string(),
            ));
        }
    }

    if config.dispatch.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "Dispatch max_concurrent cannot be 0".to_string(),
        ));
    }

    if config.dispatch.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "Dispatch queue_capacity cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!(
        "Auth: {}",
        if config.server.access_token.is_some() {
            "bearer token configured"
        } else {
            "disabled"
        }
    );
    tracing::info!("Dispatch Max Concurrent: {}", config.dispatch.max_concurrent);
    tracing::info!("Dispatch Queue Capacity: {}", config.dispatch.queue_capacity);
    tracing::info!(
        "Shutdown Grace: {}s",
        config.dispatch.shutdown_grace_secs
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_access_token() {
        let mut config = AppConfig::default();
        config.server.access_token = Some(String::new());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_concurrency() {
        let mut config = AppConfig::default();
        config.dispatch.max_concurrent = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_queue_capacity() {
        let mut config = AppConfig::default();
        config.dispatch.queue_capacity = 0;
        assert!(validate_config(&config).is_err());
    }
}
