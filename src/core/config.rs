//! 配置管理模块
//!
//! 提供引擎配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [window]
//! width = 800
//! height = 600
//! title = "Scene2D Sandbox"
//!
//! [renderer]
//! clear_color = [0, 125, 125]
//!
//! [animation]
//! frame_time_ms = 150
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = false
//! log_file = "scene2d.log"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::error::{ConfigError, Result};
use crate::math::Color;

/// 引擎配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// 窗口配置
    #[serde(default)]
    pub window: WindowConfig,

    /// 渲染配置
    #[serde(default)]
    pub renderer: RendererConfig,

    /// 动画配置
    #[serde(default)]
    pub animation: AnimationConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,

    /// 演示程序运行的帧数（仅命令行）
    #[serde(skip)]
    pub frames: Option<u32>,
}

/// 窗口配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// 窗口宽度
    #[serde(default = "default_width")]
    pub width: u32,

    /// 窗口高度
    #[serde(default = "default_height")]
    pub height: u32,

    /// 窗口标题
    #[serde(default = "default_title")]
    pub title: String,
}

/// 渲染配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendererConfig {
    /// 清屏颜色，0-255 的 RGB
    #[serde(default = "default_clear_color")]
    pub clear_color: [u8; 3],
}

/// 动画配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// 每帧持续时间（毫秒）
    #[serde(default = "default_frame_time_ms")]
    pub frame_time_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }
fn default_title() -> String { "Scene2D".to_string() }
fn default_clear_color() -> [u8; 3] { [0, 125, 125] }
fn default_frame_time_ms() -> u64 { 150 }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "scene2d.log".to_string() }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: default_clear_color(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frame_time_ms: default_frame_time_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl RendererConfig {
    /// 清屏颜色
    pub fn clear_color(&self) -> Color {
        let [r, g, b] = self.clear_color;
        Color::from_rgb_u8(r, g, b, 1.0)
    }
}

impl AnimationConfig {
    /// 每帧持续时间
    pub fn frame_time(&self) -> Duration {
        Duration::from_millis(self.frame_time_ms)
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use scene2d::core::Config;
    ///
    /// let config = Config::from_file("config.toml")?;
    /// # Ok::<(), scene2d::core::Scene2dError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str))?;

        Self::from_toml_str(&contents)
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在或无法解析则使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 从命令行参数覆盖配置
    ///
    /// 支持的参数：
    /// - `--width <value>`: 设置视口宽度
    /// - `--height <value>`: 设置视口高度
    /// - `--frames <value>`: 演示程序运行的帧数
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        let value_of = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|idx| args.get(idx + 1))
        };

        if let Some(width) = value_of("--width").and_then(|v| v.parse().ok()) {
            self.window.width = width;
        }

        if let Some(height) = value_of("--height").and_then(|v| v.parse().ok()) {
            self.window.height = height;
        }

        if let Some(frames) = value_of("--frames").and_then(|v| v.parse().ok()) {
            self.frames = Some(frames);
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window.width/height".to_string(),
                reason: "Window dimensions must be greater than 0".to_string(),
            }
            .into());
        }

        if self.animation.frame_time_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "animation.frame_time_ms".to_string(),
                reason: "Frame time must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.animation.frame_time(), Duration::from_millis(150));
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.window.width = 0;
        assert!(config.validate().is_err());

        config.window.width = 800;
        config.animation.frame_time_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [window]
            width = 1024

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.renderer.clear_color, [0, 125, 125]);
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        config.apply_args(["scene2d", "--width", "320", "--height", "abc", "--frames", "60"]);

        assert_eq!(config.window.width, 320);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.frames, Some(60));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.window.title = "Roundtrip".into();
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = Config::from_file_or_default("definitely/not/here.toml");
        assert_eq!(config, Config::default());
    }
}
