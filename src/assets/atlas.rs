//! TexturePacker 图集解析
//!
//! 支持 TexturePacker 导出的两种 JSON 布局：
//!
//! - array：`"frames": [{ "filename": "...", "frame": {...}, ... }]`
//! - hash：`"frames": { "name": { "frame": {...}, ... } }`，按名称排序
//!
//! 旋转存放的帧会交换宽高，使 `Frame` 的宽高对应图集中实际占用的区域。

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;

use super::Frame;
use crate::core::error::{AssetError, Result};

#[derive(Debug, Deserialize)]
struct TpRect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

#[derive(Debug, Deserialize)]
struct TpPivot {
    x: f32,
    y: f32,
}

impl Default for TpPivot {
    fn default() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

#[derive(Debug, Deserialize)]
struct TpFrame {
    #[serde(default)]
    filename: Option<String>,
    frame: TpRect,
    #[serde(default)]
    rotated: bool,
    #[serde(default)]
    pivot: TpPivot,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TpFrames {
    Array(Vec<TpFrame>),
    Hash(BTreeMap<String, TpFrame>),
}

#[derive(Debug, Deserialize)]
struct TpMeta {
    #[serde(default)]
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TpFile {
    frames: TpFrames,
    #[serde(default)]
    meta: Option<TpMeta>,
}

/// 解析后的图集
#[derive(Debug, Clone, PartialEq)]
pub struct Atlas {
    /// `meta.image` 中记录的图片文件名
    pub image: Option<String>,
    /// 图集中的所有帧
    pub frames: Vec<Frame>,
}

impl TpFrame {
    fn into_frame(self, name: String) -> Frame {
        let TpRect { x, y, w, h } = self.frame;
        let (width, height) = if self.rotated { (h, w) } else { (w, h) };

        Frame::new(name, x, y, width, height)
            .rotated(self.rotated)
            .with_pivot(self.pivot.x, self.pivot.y)
    }
}

/// 解析 TexturePacker JSON
pub fn parse_texture_packer(json: &str) -> Result<Atlas> {
    let file: TpFile = serde_json::from_str(json).map_err(AssetError::from)?;

    let frames = match file.frames {
        TpFrames::Array(frames) => frames
            .into_iter()
            .map(|f| {
                let name = f.filename.clone().unwrap_or_default();
                f.into_frame(name)
            })
            .collect(),
        TpFrames::Hash(frames) => frames
            .into_iter()
            .map(|(name, f)| f.into_frame(name))
            .collect(),
    };

    Ok(Atlas {
        image: file.meta.and_then(|m| m.image),
        frames,
    })
}

/// 从文件读取并解析
///
/// 文件不存在时返回 [`AssetError::FileNotFound`]，其他读取失败保留原始 IO 错误。
pub fn load_texture_packer<P: AsRef<Path>>(path: P) -> Result<Atlas> {
    let path = path.as_ref();
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AssetError::FileNotFound(path.to_path_buf()).into());
        }
        Err(e) => return Err(e.into()),
    };
    parse_texture_packer(&json)
}
