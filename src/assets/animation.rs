//! 帧动画

use std::ops::Range;

use super::Frame;
use crate::core::error::{AssetError, Result};

/// 命名的有序帧序列
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    name: String,
    frames: Vec<Frame>,
}

impl Animation {
    pub fn new(name: impl Into<String>, frames: Vec<Frame>) -> Self {
        Self {
            name: name.into(),
            frames,
        }
    }

    /// 从已解析的帧列表中截取一段
    ///
    /// 范围越界或为空时返回错误。
    pub fn from_frames(name: impl Into<String>, frames: &[Frame], range: Range<usize>) -> Result<Self> {
        let name = name.into();
        if range.start >= range.end || range.end > frames.len() {
            return Err(AssetError::InvalidFrameRange {
                animation: name,
                reason: format!("{:?} is outside 0..{}", range, frames.len()),
            }
            .into());
        }

        Ok(Self::new(name, frames[range].to_vec()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// 多于一帧时才需要计时
    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }
}
