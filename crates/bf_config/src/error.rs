// crates/bf_config/src/error.rs

//! 配置层错误类型

use bf_foundation::BfError;

/// 配置结果类型
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(String),

    /// 无效值
    #[error("无效值 '{key}': {value} - {reason}")]
    InvalidValue {
        /// 配置键
        key: String,
        /// 配置值
        value: String,
        /// 原因
        reason: String,
    },

    /// 缺失配置
    #[error("缺失配置: {0}")]
    Missing(String),
}

impl ConfigError {
    /// 无效值
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// 缺失配置
    pub fn missing(key: impl Into<String>) -> Self {
        Self::Missing(key.into())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// 转换到 Foundation 层错误
impl From<ConfigError> for BfError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => BfError::from(e),
            ConfigError::Parse(msg) => BfError::serialization(msg),
            ConfigError::InvalidValue { key, value, reason } => {
                BfError::invalid_config(key, value, reason)
            }
            ConfigError::Missing(key) => BfError::config(format!("缺失配置: {}", key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::invalid_value("nghost", 0, "必须为正");
        assert!(err.to_string().contains("nghost"));
    }

    #[test]
    fn test_conversion_to_foundation() {
        let bf: BfError = ConfigError::missing("blocks").into();
        assert!(matches!(bf, BfError::Config { .. }));
        let bf: BfError = ConfigError::invalid_value("dimensions", 4, "2 或 3").into();
        assert!(matches!(bf, BfError::InvalidConfig { .. }));
    }
}
