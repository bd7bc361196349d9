//! 核心功能模块
//!
//! 本模块提供了引擎的基础设施：日志系统、配置管理、错误处理、输入状态、
//! 场景描述加载以及帧驱动。
//!
//! # 模块组织
//!
//! - `log`：日志系统，提供结构化的日志记录功能
//! - `config`：配置管理，支持从配置文件加载引擎设置
//! - `error`：错误处理，定义统一的错误类型
//! - `input`：键盘输入状态
//! - `scene`：TOML 场景描述
//! - `runtime`：帧驱动

pub mod config;
pub mod error;
pub mod input;
pub mod log;
pub mod runtime;
pub mod scene;

// 重新导出常用类型，方便使用
pub use config::Config;
pub use error::{AssetError, ConfigError, RenderError, Result, Scene2dError};
pub use input::InputState;
pub use runtime::Runtime;
pub use scene::SceneConfig;
