//! Transform 组件
//!
//! 管理实体的位置、旋转和缩放，并缓存局部矩阵和世界矩阵。
//!
//! Transform 是数据组件，本身只保存状态。修改需要经过
//! [`Scene::transform_mut`](crate::scene::Scene::transform_mut) 返回的
//! [`TransformMut`](crate::scene::TransformMut)，它会在返回前把新的世界矩阵
//! 传播到整个子树，保证：
//!
//! - 有父 Transform 时 `world_matrix == parent.world_matrix × local_matrix`
//! - 否则 `world_matrix == local_matrix`

use super::ComponentBase;
use crate::impl_data_component;
use crate::math::{matrix, utils, Matrix3, Vector2};

/// 父节点在世界空间中的位置信息
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldFrame {
    /// 父节点世界矩阵
    pub matrix: Matrix3,
    /// 父节点世界坐标
    pub position: Vector2,
}

/// Transform 组件
#[derive(Debug, Clone)]
pub struct Transform {
    base: ComponentBase,

    /// 局部位置
    position: Vector2,

    /// 缩放，默认 (1, 1)
    scale: Vector2,

    /// 旋转（度数）
    rotation: f32,

    /// 旋转（弧度），与 `rotation` 始终同步
    rads: f32,

    /// 世界坐标缓存（父节点世界坐标 + 局部位置）
    world_position: Vector2,

    /// 局部矩阵 T × R × S
    local_matrix: Matrix3,

    /// 世界矩阵
    world_matrix: Matrix3,
}

impl Transform {
    /// 创建位于原点的 Transform
    pub fn new() -> Self {
        Self {
            base: ComponentBase::new(),
            position: Vector2::zeros(),
            scale: Vector2::new(1.0, 1.0),
            rotation: 0.0,
            rads: 0.0,
            world_position: Vector2::zeros(),
            local_matrix: Matrix3::identity(),
            world_matrix: Matrix3::identity(),
        }
    }

    /// 创建带名称的 Transform
    pub fn named(name: impl Into<String>) -> Self {
        let mut transform = Self::new();
        transform.base = ComponentBase::named(name);
        transform
    }

    /// 设置初始位置（挂载前使用）
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.set_position_raw(Some(x), Some(y));
        self.refresh_detached();
        self
    }

    /// 设置初始缩放（挂载前使用）
    pub fn with_scale(mut self, x: f32, y: f32) -> Self {
        self.set_scale_raw(Some(x), Some(y));
        self.refresh_detached();
        self
    }

    /// 设置初始旋转，单位为度（挂载前使用）
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.set_rotation_raw(degrees);
        self.refresh_detached();
        self
    }

    pub fn position(&self) -> &Vector2 {
        &self.position
    }

    pub fn scale(&self) -> &Vector2 {
        &self.scale
    }

    /// 旋转（度数）
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// 旋转（弧度）
    pub fn rads(&self) -> f32 {
        self.rads
    }

    pub fn world_position(&self) -> &Vector2 {
        &self.world_position
    }

    pub fn local_matrix(&self) -> &Matrix3 {
        &self.local_matrix
    }

    pub fn world_matrix(&self) -> &Matrix3 {
        &self.world_matrix
    }

    /// 当前节点作为父节点时传给子节点的信息
    pub fn world_frame(&self) -> WorldFrame {
        WorldFrame {
            matrix: self.world_matrix,
            position: self.world_position,
        }
    }

    // ========== 仅供场景调用的原始修改 ==========

    /// 部分更新位置，`None` 保持原值
    pub(crate) fn set_position_raw(&mut self, x: Option<f32>, y: Option<f32>) {
        self.position.x = x.unwrap_or(self.position.x);
        self.position.y = y.unwrap_or(self.position.y);
    }

    /// 部分更新缩放，`None` 保持原值
    pub(crate) fn set_scale_raw(&mut self, x: Option<f32>, y: Option<f32>) {
        self.scale.x = x.unwrap_or(self.scale.x);
        self.scale.y = y.unwrap_or(self.scale.y);
    }

    pub(crate) fn set_rotation_raw(&mut self, degrees: f32) {
        self.rotation = degrees;
        self.rads = utils::deg_to_rad(degrees);
    }

    pub(crate) fn set_rads_raw(&mut self, rads: f32) {
        self.rads = rads;
        self.rotation = utils::rad_to_deg(rads);
    }

    /// 重新计算局部矩阵：平移在最外层，缩放在最内层
    pub(crate) fn recompute_local_matrix(&mut self) {
        let translation = matrix::translation(self.position.x, self.position.y);
        let rotation = matrix::rotation(self.rads);
        let scaling = matrix::scaling(self.scale.x, self.scale.y);

        let local = matrix::multiply(&matrix::multiply(&translation, &rotation), &scaling);
        matrix::copy(&local, &mut self.local_matrix);
    }

    /// 根据父节点重新计算世界矩阵和世界坐标
    pub(crate) fn apply_parent(&mut self, parent: Option<&WorldFrame>) {
        match parent {
            Some(parent) => {
                let world = matrix::multiply(&parent.matrix, &self.local_matrix);
                matrix::copy(&world, &mut self.world_matrix);
                self.world_position = parent.position + self.position;
            }
            None => {
                matrix::copy(&self.local_matrix, &mut self.world_matrix);
                self.world_position = self.position;
            }
        }
    }

    /// 未挂载时的刷新：世界空间即局部空间
    fn refresh_detached(&mut self) {
        self.recompute_local_matrix();
        self.apply_parent(None);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl_data_component!(Transform);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, ComponentKind};
    use approx::assert_relative_eq;

    #[test]
    fn test_default_transform() {
        let transform = Transform::default();
        assert_eq!(*transform.position(), Vector2::zeros());
        assert_eq!(*transform.scale(), Vector2::new(1.0, 1.0));
        assert_eq!(transform.rotation(), 0.0);
        assert_eq!(*transform.world_matrix(), Matrix3::identity());
        assert_eq!(transform.kind(), ComponentKind::Data);
    }

    #[test]
    fn test_builder_computes_matrices() {
        let transform = Transform::new().with_position(1.0, 2.0);
        let local = transform.local_matrix();

        assert!((local[(0, 2)] - 1.0).abs() < 0.001);
        assert!((local[(1, 2)] - 2.0).abs() < 0.001);
        assert_eq!(transform.world_matrix(), transform.local_matrix());
        assert_eq!(*transform.world_position(), Vector2::new(1.0, 2.0));
    }

    #[test]
    fn test_degrees_and_radians_stay_in_sync() {
        let mut transform = Transform::new();
        transform.set_rotation_raw(90.0);
        assert_relative_eq!(transform.rads(), std::f32::consts::FRAC_PI_2, epsilon = 1e-6);

        transform.set_rads_raw(std::f32::consts::PI);
        assert_relative_eq!(transform.rotation(), 180.0, epsilon = 1e-4);
    }

    #[test]
    fn test_partial_position_update_keeps_missing_axis() {
        let mut transform = Transform::new().with_position(3.0, 4.0);
        transform.set_position_raw(None, Some(9.0));
        assert_eq!(*transform.position(), Vector2::new(3.0, 9.0));

        transform.set_scale_raw(Some(-2.0), None);
        assert_eq!(*transform.scale(), Vector2::new(-2.0, 1.0));
    }

    #[test]
    fn test_local_matrix_is_translation_rotation_scale() {
        let transform = Transform::new()
            .with_position(5.0, 6.0)
            .with_rotation(30.0)
            .with_scale(2.0, 3.0);

        let expected = matrix::translation(5.0, 6.0)
            * matrix::rotation(utils::deg_to_rad(30.0))
            * matrix::scaling(2.0, 3.0);
        assert_relative_eq!(*transform.local_matrix(), expected, epsilon = 1e-5);
    }

    #[test]
    fn test_apply_parent_composes() {
        let parent = Transform::new().with_position(10.0, 0.0).with_scale(2.0, 2.0);
        let mut child = Transform::new().with_position(1.0, 1.0);

        child.apply_parent(Some(&parent.world_frame()));

        assert_relative_eq!(
            *child.world_matrix(),
            parent.world_matrix() * child.local_matrix(),
            epsilon = 1e-5
        );
        assert_eq!(*child.world_position(), Vector2::new(11.0, 1.0));
    }
}
