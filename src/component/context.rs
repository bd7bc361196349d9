//! 钩子上下文
//!
//! 行为组件的每个钩子都会收到一个 [`Context`]，
//! 它把场景、所属实体和引擎服务显式地交给组件。

use super::{ComponentId, Transform};
use crate::core::input::InputState;
use crate::renderer::{SpriteRegistry, Viewport};
use crate::scene::{EntityId, Scene, TransformMut};

/// 引擎服务
///
/// 每个运行中的引擎持有一份，启动时创建，关闭时销毁。
#[derive(Debug, Default)]
pub struct Services {
    /// 键盘输入状态
    pub input: InputState,

    /// 需要绘制的精灵
    pub sprites: SpriteRegistry,

    /// 视口尺寸
    pub viewport: Viewport,
}

impl Services {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            input: InputState::new(),
            sprites: SpriteRegistry::new(),
            viewport,
        }
    }
}

/// 传给生命周期钩子的上下文
///
/// 钩子执行期间组件本身已从实体上暂时取出，
/// 因此可以通过 `scene` 自由修改同一实体上的其他组件。
pub struct Context<'a> {
    pub scene: &'a mut Scene,
    pub services: &'a mut Services,
    entity: EntityId,
    component: ComponentId,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        scene: &'a mut Scene,
        services: &'a mut Services,
        entity: EntityId,
        component: ComponentId,
    ) -> Self {
        Self {
            scene,
            services,
            entity,
            component,
        }
    }

    /// 所属实体
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// 当前组件 ID
    pub fn component_id(&self) -> ComponentId {
        self.component
    }

    /// 输入状态
    pub fn input(&self) -> &InputState {
        &self.services.input
    }

    /// 所属实体上的 Transform
    pub fn transform(&self) -> Option<&Transform> {
        self.scene.transform(self.entity)
    }

    /// 修改所属实体上的 Transform
    pub fn transform_mut(&mut self) -> Option<TransformMut<'_>> {
        self.scene.transform_mut(self.entity)
    }

    /// 所属实体上指定类型的组件
    pub fn component<T: 'static>(&self) -> Option<&T> {
        self.scene.get_component::<T>(self.entity)
    }

    /// 所属实体上指定类型的组件（可变）
    pub fn component_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.scene.get_component_mut::<T>(self.entity)
    }
}
