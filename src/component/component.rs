//! 组件基类
//!
//! 每个组件都有唯一 ID、可选名称以及所属实体的反向引用。
//! 组件分为两类：
//!
//! - **数据组件**（[`ComponentKind::Data`]）：纯状态，没有生命周期钩子，例如 `Transform`
//! - **行为组件**（[`ComponentKind::Action`]）：响应生命周期事件，例如 `SpriteComponent`

use std::any::Any;
use std::fmt;

use uuid::Uuid;

use super::ActionComponent;
use crate::scene::EntityId;

/// 组件唯一 ID（随机 v4 UUID）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(Uuid);

impl ComponentId {
    /// 生成新的随机 ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// 使用已有的 UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 获取底层 UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component-{}", self.0)
    }
}

/// 组件类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// 数据组件
    Data,
    /// 行为组件
    Action,
}

/// 所有组件共享的身份信息
///
/// 具体组件以名为 `base` 的字段嵌入它，
/// 再用 [`impl_data_component!`](crate::impl_data_component) 或
/// [`impl_action_component!`](crate::impl_action_component) 生成 [`Component`] 实现。
#[derive(Debug, Clone)]
pub struct ComponentBase {
    /// 组件 ID，保证唯一
    id: ComponentId,

    /// 可选的友好名称，不保证唯一
    name: Option<String>,

    /// 所属实体
    entity: Option<EntityId>,

    /// 是否启用（仅对行为组件有意义）
    enabled: bool,
}

impl ComponentBase {
    /// 创建新的组件身份
    pub fn new() -> Self {
        Self::with_id(ComponentId::new())
    }

    /// 创建带名称的组件身份
    pub fn named(name: impl Into<String>) -> Self {
        let mut base = Self::new();
        base.name = Some(name.into());
        base
    }

    /// 使用指定 ID 创建
    pub fn with_id(id: ComponentId) -> Self {
        Self {
            id,
            name: None,
            entity: None,
            enabled: false,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    pub(crate) fn set_entity(&mut self, entity: Option<EntityId>) {
        self.entity = entity;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl Default for ComponentBase {
    fn default() -> Self {
        Self::new()
    }
}

/// 组件 trait
///
/// 所有可挂载到实体上的组件的基础接口。
/// 通常不需要手写实现，使用 `impl_data_component!` / `impl_action_component!` 即可。
pub trait Component: Any {
    /// 身份信息
    fn base(&self) -> &ComponentBase;

    /// 身份信息（可变）
    fn base_mut(&mut self) -> &mut ComponentBase;

    /// 组件类别
    fn kind(&self) -> ComponentKind;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// 行为能力查询：数据组件返回 `None`
    fn as_action(&self) -> Option<&dyn ActionComponent> {
        None
    }

    /// 行为能力查询（可变）
    fn as_action_mut(&mut self) -> Option<&mut dyn ActionComponent> {
        None
    }

    fn id(&self) -> ComponentId {
        self.base().id()
    }

    fn name(&self) -> Option<&str> {
        self.base().name()
    }

    /// 所属实体
    fn entity(&self) -> Option<EntityId> {
        self.base().entity()
    }
}

/// 为数据组件生成 [`Component`] 实现
///
/// 要求类型有一个 `base: ComponentBase` 字段。
#[macro_export]
macro_rules! impl_data_component {
    ($ty:ty) => {
        impl $crate::component::Component for $ty {
            fn base(&self) -> &$crate::component::ComponentBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut $crate::component::ComponentBase {
                &mut self.base
            }

            fn kind(&self) -> $crate::component::ComponentKind {
                $crate::component::ComponentKind::Data
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }
    };
}

/// 为行为组件生成 [`Component`] 实现
///
/// 要求类型有一个 `base: ComponentBase` 字段，并且实现了
/// [`ActionComponent`](crate::component::ActionComponent)。
#[macro_export]
macro_rules! impl_action_component {
    ($ty:ty) => {
        impl $crate::component::Component for $ty {
            fn base(&self) -> &$crate::component::ComponentBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut $crate::component::ComponentBase {
                &mut self.base
            }

            fn kind(&self) -> $crate::component::ComponentKind {
                $crate::component::ComponentKind::Action
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn as_action(&self) -> Option<&dyn $crate::component::ActionComponent> {
                Some(self)
            }

            fn as_action_mut(&mut self) -> Option<&mut dyn $crate::component::ActionComponent> {
                Some(self)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_ids_are_unique() {
        let a = ComponentBase::new();
        let b = ComponentBase::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_named_base() {
        let base = ComponentBase::named("hud");
        assert_eq!(base.name(), Some("hud"));
        assert!(base.entity().is_none());
        assert!(!base.is_enabled());
    }

    #[test]
    fn test_id_display() {
        let id = ComponentId::new();
        assert!(id.to_string().starts_with("component-"));
    }
}
