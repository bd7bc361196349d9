//! 精灵帧

use crate::math::Vector2;

/// 图集中一块命名的矩形区域
///
/// 构造后不可修改。`rotated` 表示该区域在图集中以 90° 旋转存放。
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    name: String,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    rotated: bool,
    pivot: Vector2,
}

impl Frame {
    /// 创建未旋转的帧，轴心在中心
    pub fn new(name: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            width,
            height,
            rotated: false,
            pivot: Vector2::new(0.5, 0.5),
        }
    }

    /// 设置旋转标记
    pub fn rotated(mut self, rotated: bool) -> Self {
        self.rotated = rotated;
        self
    }

    /// 设置轴心（归一化坐标）
    pub fn with_pivot(mut self, x: f32, y: f32) -> Self {
        self.pivot = Vector2::new(x, y);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn is_rotated(&self) -> bool {
        self.rotated
    }

    pub fn pivot(&self) -> &Vector2 {
        &self.pivot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let frame = Frame::new("run_01", 4.0, 8.0, 16.0, 32.0)
            .rotated(true)
            .with_pivot(0.0, 1.0);

        assert_eq!(frame.name(), "run_01");
        assert_eq!((frame.x(), frame.y()), (4.0, 8.0));
        assert_eq!((frame.width(), frame.height()), (16.0, 32.0));
        assert!(frame.is_rotated());
        assert_eq!(*frame.pivot(), Vector2::new(0.0, 1.0));
    }
}
