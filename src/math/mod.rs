//! 统一的数学库模块
//!
//! 提供 2D 场景需要的数学类型和函数。
//! 基于 `nalgebra` 但提供了更友好的 API。
//!
//! # 模块组织
//!
//! - **基础类型**：Vector2, Matrix3, Color
//! - **常量**：PI, DEG_TO_RAD, RAD_TO_DEG 等
//! - **工具函数**：deg_to_rad, saturate 等
//! - **矩阵辅助函数**：identity, translation, rotation, scaling, multiply, copy
//!
//! # 约定
//!
//! 矩阵采用列向量约定：点 `p` 的变换写作 `M * p`，
//! 平移分量位于第三列 `(m[(0, 2)], m[(1, 2)])`。
//! `Matrix3::as_slice()` 按列主序给出 9 个浮点数，可直接上传到 GPU。

pub use nalgebra::{Matrix3 as Mat3, Vector2 as Vec2};

// 类型别名，使用更简洁的名称
pub type Vector2 = Vec2<f32>;
pub type Matrix3 = Mat3<f32>;

/// 颜色类型（RGBA，范围 0.0-1.0）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// 创建新的颜色
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// 创建 RGB 颜色（alpha = 1.0）
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// 从整数值创建颜色（0-255），alpha 为 0.0-1.0
    ///
    /// 超出范围的分量会被截断。
    pub fn from_rgb_u8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            utils::saturate(a),
        )
    }

    /// 转换为数组 `[r, g, b, a]`
    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    // 预定义颜色
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// 数学常量
pub mod constants {
    /// π
    pub const PI: f32 = std::f32::consts::PI;

    /// 角度转弧度的系数
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// 弧度转角度的系数
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// 数学工具函数
pub mod utils {
    use super::*;

    /// 限制值在范围内
    pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
        if value < min {
            min
        } else if value > max {
            max
        } else {
            value
        }
    }

    /// 饱和函数（限制在 0.0-1.0）
    pub fn saturate(value: f32) -> f32 {
        clamp(value, 0.0, 1.0)
    }

    /// 角度转弧度
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// 弧度转角度
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }
}

/// 矩阵辅助函数
///
/// 全部是无状态的纯函数，输入总是有限数值。
pub mod matrix {
    use super::*;

    /// 单位矩阵
    pub fn identity() -> Matrix3 {
        Matrix3::identity()
    }

    /// 创建平移矩阵
    pub fn translation(tx: f32, ty: f32) -> Matrix3 {
        Matrix3::new_translation(&Vector2::new(tx, ty))
    }

    /// 创建旋转矩阵（弧度，逆时针为正）
    pub fn rotation(radians: f32) -> Matrix3 {
        Matrix3::new_rotation(radians)
    }

    /// 创建缩放矩阵
    pub fn scaling(sx: f32, sy: f32) -> Matrix3 {
        Matrix3::new_nonuniform_scaling(&Vector2::new(sx, sy))
    }

    /// 矩阵乘法 `a · b`
    ///
    /// 不满足交换律：`multiply(parent, local)` 先应用 `local` 再应用 `parent`。
    pub fn multiply(a: &Matrix3, b: &Matrix3) -> Matrix3 {
        a * b
    }

    /// 逐元素覆盖预先分配的目标矩阵，不产生新分配
    pub fn copy(src: &Matrix3, dst: &mut Matrix3) {
        dst.copy_from(src);
    }

    /// 像素坐标到裁剪空间的投影矩阵
    ///
    /// Y 轴翻转，使 (0, 0) 位于左上角。
    pub fn projection(width: f32, height: f32) -> Matrix3 {
        Matrix3::new(
            2.0 / width, 0.0, -1.0,
            0.0, -2.0 / height, 1.0,
            0.0, 0.0, 1.0,
        )
    }

    /// 取出矩阵的平移分量
    pub fn translation_of(m: &Matrix3) -> Vector2 {
        Vector2::new(m[(0, 2)], m[(1, 2)])
    }

    /// 变换一个点（w = 1）
    pub fn transform_point(m: &Matrix3, point: &Vector2) -> Vector2 {
        let p = m * nalgebra::Vector3::new(point.x, point.y, 1.0);
        Vector2::new(p.x, p.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_color_creation() {
        let color = Color::rgb(1.0, 0.5, 0.0);
        assert_eq!(color.r, 1.0);
        assert_eq!(color.a, 1.0);
        assert_eq!(Color::default(), Color::WHITE);
    }

    #[test]
    fn test_color_from_u8() {
        let color = Color::from_rgb_u8(0, 255, 51, 3.0);
        assert_eq!(color.g, 1.0);
        assert_relative_eq!(color.b, 0.2);
        assert_eq!(color.a, 1.0);
    }

    #[test]
    fn test_matrix_translation() {
        let mat = matrix::translation(1.0, 2.0);
        let result = matrix::transform_point(&mat, &Vector2::zeros());

        assert!((result.x - 1.0).abs() < 1e-6);
        assert!((result.y - 2.0).abs() < 1e-6);
        assert_eq!(matrix::translation_of(&mat), Vector2::new(1.0, 2.0));
    }

    #[test]
    fn test_matrix_rotation_quarter_turn() {
        let mat = matrix::rotation(constants::PI / 2.0);
        let result = matrix::transform_point(&mat, &Vector2::new(1.0, 0.0));

        assert_relative_eq!(result.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(result.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_multiply_order_matters() {
        let t = matrix::translation(10.0, 0.0);
        let s = matrix::scaling(2.0, 2.0);

        let ts = matrix::multiply(&t, &s);
        let st = matrix::multiply(&s, &t);

        assert_eq!(matrix::translation_of(&ts), Vector2::new(10.0, 0.0));
        assert_eq!(matrix::translation_of(&st), Vector2::new(20.0, 0.0));
    }

    #[test]
    fn test_copy_overwrites_destination() {
        let src = matrix::scaling(3.0, 4.0);
        let mut dst = matrix::identity();
        matrix::copy(&src, &mut dst);
        assert_eq!(dst, src);
    }

    #[test]
    fn test_projection_maps_corners() {
        let proj = matrix::projection(800.0, 600.0);
        let top_left = matrix::transform_point(&proj, &Vector2::new(0.0, 0.0));
        let bottom_right = matrix::transform_point(&proj, &Vector2::new(800.0, 600.0));

        assert_relative_eq!(top_left, Vector2::new(-1.0, 1.0));
        assert_relative_eq!(bottom_right, Vector2::new(1.0, -1.0));
    }

    #[test]
    fn test_angle_conversion() {
        assert_relative_eq!(utils::deg_to_rad(180.0), constants::PI);
        assert_relative_eq!(utils::rad_to_deg(constants::PI / 2.0), 90.0, epsilon = 1e-4);
    }
}
