//! 精灵注册表
//!
//! 记录需要绘制的精灵组件，按注册顺序绘制。
//! 精灵在 `on_awake` 时注册，在 `on_asleep` 时注销。

use crate::component::ComponentId;
use crate::scene::EntityId;

/// 需要绘制的精灵
#[derive(Debug, Default, Clone)]
pub struct SpriteRegistry {
    entries: Vec<(EntityId, ComponentId)>,
}

impl SpriteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册精灵，重复注册不做任何事
    pub fn register(&mut self, entity: EntityId, component: ComponentId) {
        if !self.contains(entity, component) {
            self.entries.push((entity, component));
        }
    }

    /// 注销精灵
    pub fn unregister(&mut self, entity: EntityId, component: ComponentId) {
        self.entries
            .retain(|(e, c)| !(*e == entity && *c == component));
    }

    /// 注销实体上的所有精灵
    pub fn unregister_entity(&mut self, entity: EntityId) {
        self.entries.retain(|(e, _)| *e != entity);
    }

    pub fn contains(&self, entity: EntityId, component: ComponentId) -> bool {
        self.entries.contains(&(entity, component))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, ComponentId)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
