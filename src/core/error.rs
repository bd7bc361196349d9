//! 错误处理模块
//!
//! 定义了引擎中使用的统一错误类型，使用 `thiserror` 提供友好的错误消息。
//!
//! 只有启动阶段（配置加载、资源解析、纹理加载、渲染后端初始化）会返回错误；
//! 场景树、Transform 和动画逻辑从不返回错误，异常情况都按空操作处理。

use std::path::PathBuf;

use thiserror::Error;

/// 引擎统一的 Result 类型
pub type Result<T> = std::result::Result<T, Scene2dError>;

/// 引擎错误类型
#[derive(Debug, Error)]
pub enum Scene2dError {
    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 资源错误
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// 渲染错误
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 初始化错误
    #[error("Initialization error: {0}")]
    Initialization(String),
}

/// 配置相关的错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件未找到
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    /// 配置文件解析失败
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// 配置项缺失
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// 配置值无效
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 资源相关的错误
#[derive(Debug, Error)]
pub enum AssetError {
    /// 文件不存在
    #[error("Asset file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// 图集描述解析失败
    #[error("Failed to parse atlas: {0}")]
    AtlasParse(#[from] serde_json::Error),

    /// 图片读取失败
    #[error("Failed to load image '{source_path}': {reason}")]
    ImageLoad { source_path: String, reason: String },

    /// 动画帧范围无效
    #[error("Invalid frame range for animation '{animation}': {reason}")]
    InvalidFrameRange { animation: String, reason: String },
}

/// 渲染相关的错误
#[derive(Debug, Error)]
pub enum RenderError {
    /// 没有可用的渲染上下文
    #[error("Rendering context is unavailable: {0}")]
    ContextUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_error_message() {
        let err: Scene2dError = ConfigError::InvalidValue {
            field: "window.width".into(),
            reason: "must be greater than 0".into(),
        }
        .into();

        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid value for 'window.width': must be greater than 0"
        );
    }

    #[test]
    fn test_atlas_error_keeps_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Scene2dError = AssetError::from(json_err).into();

        assert!(matches!(err, Scene2dError::Asset(AssetError::AtlasParse(_))));
        assert!(std::error::Error::source(&err).is_some());
    }
}
