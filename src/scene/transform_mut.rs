//! Transform 修改句柄

use super::{EntityId, Scene};
use crate::component::Transform;
use crate::math::Matrix3;

/// 修改 Transform 的短生命周期句柄
///
/// 每个 setter 都会重新计算局部矩阵，并在返回前把世界矩阵传播到整个子树。
///
/// # 示例
/// ```
/// use scene2d::component::{Services, Transform};
/// use scene2d::scene::Scene;
///
/// let mut scene = Scene::new();
/// let mut services = Services::default();
/// let root = scene.spawn("root");
/// let child = scene.spawn("child");
/// scene.add_component(root, Transform::new(), &mut services);
/// scene.add_component(child, Transform::new().with_position(10.0, 0.0), &mut services);
/// scene.add_child(root, child);
///
/// scene.transform_mut(root).unwrap().translate(5.0, 0.0);
/// assert_eq!(scene.transform(child).unwrap().world_position().x, 15.0);
/// ```
pub struct TransformMut<'a> {
    scene: &'a mut Scene,
    entity: EntityId,
}

impl<'a> TransformMut<'a> {
    pub(super) fn new(scene: &'a mut Scene, entity: EntityId) -> Self {
        Self { scene, entity }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// 当前 Transform 状态
    pub fn get(&self) -> Option<&Transform> {
        self.scene.transform(self.entity)
    }

    /// 设置位置，`None` 的分量保持不变
    pub fn set_position(&mut self, x: Option<f32>, y: Option<f32>) -> &mut Self {
        self.modify(|t| t.set_position_raw(x, y))
    }

    /// 平移
    pub fn translate(&mut self, dx: f32, dy: f32) -> &mut Self {
        self.modify(|t| {
            let position = *t.position();
            t.set_position_raw(Some(position.x + dx), Some(position.y + dy));
        })
    }

    /// 设置缩放，`None` 的分量保持不变
    pub fn set_scale(&mut self, x: Option<f32>, y: Option<f32>) -> &mut Self {
        self.modify(|t| t.set_scale_raw(x, y))
    }

    /// 设置旋转（度数）
    pub fn set_rotation(&mut self, degrees: f32) -> &mut Self {
        self.modify(|t| t.set_rotation_raw(degrees))
    }

    /// 设置旋转（弧度）
    pub fn set_rads(&mut self, rads: f32) -> &mut Self {
        self.modify(|t| t.set_rads_raw(rads))
    }

    /// 重新计算局部矩阵并传播
    pub fn update_local_matrix(&mut self) -> &mut Self {
        self.scene.update_local_matrix(self.entity);
        self
    }

    /// 使用显式父矩阵重新计算世界矩阵并传播
    pub fn update_world_matrix(&mut self, parent_matrix: Option<Matrix3>) -> &mut Self {
        self.scene.update_world_matrix(self.entity, parent_matrix);
        self
    }

    fn modify(&mut self, f: impl FnOnce(&mut Transform)) -> &mut Self {
        if let Some(transform) = self.scene.transform_slot_mut(self.entity) {
            f(transform);
            self.scene.update_local_matrix(self.entity);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::component::{Services, Transform};
    use crate::math::{matrix, Vector2};
    use crate::scene::Scene;
    use approx::assert_relative_eq;

    fn pair() -> (Scene, crate::scene::EntityId, crate::scene::EntityId) {
        let mut scene = Scene::new();
        let mut services = Services::default();
        let parent = scene.spawn("parent");
        let child = scene.spawn("child");
        scene.add_component(parent, Transform::new(), &mut services);
        scene.add_component(child, Transform::new().with_position(10.0, 0.0), &mut services);
        scene.add_child(parent, child);
        (scene, parent, child)
    }

    #[test]
    fn test_translate_propagates_to_child() {
        let (mut scene, parent, child) = pair();

        if let Some(mut t) = scene.transform_mut(parent) {
            t.translate(5.0, 0.0);
        }

        let c = scene.transform(child).unwrap();
        assert_eq!(*c.world_position(), Vector2::new(15.0, 0.0));
        assert_relative_eq!(matrix::translation_of(c.world_matrix()), Vector2::new(15.0, 0.0));
    }

    #[test]
    fn test_rotation_propagates() {
        let (mut scene, parent, child) = pair();

        scene.transform_mut(parent).unwrap().set_rotation(90.0);

        let c = scene.transform(child).unwrap();
        let p = scene.transform(parent).unwrap();
        assert_relative_eq!(*c.world_matrix(), p.world_matrix() * c.local_matrix(), epsilon = 1e-5);
        let origin = matrix::transform_point(c.world_matrix(), &Vector2::zeros());
        assert_relative_eq!(origin, Vector2::new(0.0, 10.0), epsilon = 1e-4);
    }

    #[test]
    fn test_partial_setters() {
        let (mut scene, parent, _) = pair();
        scene
            .transform_mut(parent)
            .unwrap()
            .set_position(Some(3.0), None)
            .set_scale(None, Some(2.0));

        let p = scene.transform(parent).unwrap();
        assert_eq!(*p.position(), Vector2::new(3.0, 0.0));
        assert_eq!(*p.scale(), Vector2::new(1.0, 2.0));
    }

    #[test]
    fn test_missing_transform_yields_none() {
        let mut scene = Scene::new();
        let e = scene.spawn("bare");
        assert!(scene.transform_mut(e).is_none());
    }
}
