//! 纹理句柄与加载接口
//!
//! 纹理以 `Rc<Texture>` 在精灵之间共享。像素解码和 GPU 上传由外部加载器负责，
//! 引擎只关心加载状态和像素尺寸：在纹理报告已加载之前，精灵不会生成几何数据。

use std::cell::Cell;
use std::path::Path;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::error::{AssetError, Result};

/// 纹理加载状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureState {
    /// 尚未加载完成
    Loading,
    /// 已加载，附带像素尺寸
    Loaded { width: u32, height: u32 },
    /// 加载失败
    Failed,
}

/// 纹理
#[derive(Debug)]
pub struct Texture {
    id: Uuid,
    name: String,
    source: String,
    state: Cell<TextureState>,
}

impl Texture {
    /// 创建处于加载中状态的纹理
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            source: source.into(),
            state: Cell::new(TextureState::Loading),
        }
    }

    /// 创建已知尺寸的纹理
    pub fn with_size(name: impl Into<String>, source: impl Into<String>, width: u32, height: u32) -> Self {
        let texture = Self::new(name, source);
        texture.mark_loaded(width, height);
        texture
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn state(&self) -> TextureState {
        self.state.get()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state.get(), TextureState::Loaded { .. })
    }

    /// 像素尺寸，未加载时为 `None`
    pub fn size(&self) -> Option<(u32, u32)> {
        match self.state.get() {
            TextureState::Loaded { width, height } => Some((width, height)),
            _ => None,
        }
    }

    /// 由加载器在完成时调用
    pub fn mark_loaded(&self, width: u32, height: u32) {
        self.state.set(TextureState::Loaded { width, height });
    }

    pub fn mark_failed(&self) {
        self.state.set(TextureState::Failed);
    }
}

/// 按 ID 比较
impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Texture {}

/// 外部纹理加载器
pub trait TextureLoader {
    /// 加载纹理并更新其状态
    fn load(&self, texture: &Texture) -> Result<()>;
}

/// 只读取图片头部获取尺寸的加载器
///
/// 无头运行时使用，不解码像素。
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageDimensionsLoader;

impl TextureLoader for ImageDimensionsLoader {
    fn load(&self, texture: &Texture) -> Result<()> {
        let path = Path::new(texture.source());
        if !path.exists() {
            texture.mark_failed();
            return Err(AssetError::FileNotFound(path.to_path_buf()).into());
        }

        match image::image_dimensions(path) {
            Ok((width, height)) => {
                texture.mark_loaded(width, height);
                debug!(name = texture.name(), width, height, "Texture loaded");
                Ok(())
            }
            Err(e) => {
                warn!(name = texture.name(), error = %e, "Texture failed to load");
                texture.mark_failed();
                Err(AssetError::ImageLoad {
                    source_path: texture.source().to_string(),
                    reason: e.to_string(),
                }
                .into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        let texture = Texture::new("hero", "hero.png");
        assert_eq!(texture.state(), TextureState::Loading);
        assert!(texture.size().is_none());

        texture.mark_loaded(64, 32);
        assert!(texture.is_loaded());
        assert_eq!(texture.size(), Some((64, 32)));
    }

    #[test]
    fn test_equality_is_by_id() {
        let a = Texture::new("same", "same.png");
        let b = Texture::new("same", "same.png");
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn test_dimensions_loader_reads_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        image::RgbaImage::new(3, 5).save(&path).unwrap();

        let texture = Texture::new("tiny", path.to_string_lossy());
        ImageDimensionsLoader.load(&texture).unwrap();
        assert_eq!(texture.size(), Some((3, 5)));
    }

    #[test]
    fn test_dimensions_loader_missing_file() {
        let texture = Texture::new("ghost", "no/such/file.png");
        assert!(ImageDimensionsLoader.load(&texture).is_err());
        assert_eq!(texture.state(), TextureState::Failed);
    }
}
