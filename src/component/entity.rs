//! Entity 组件容器
//!
//! 实体是场景树中的节点：一组组件加上若干子实体。
//! 实体本身存放在 [`Scene`](crate::scene::Scene) 的 arena 中，
//! 父子关系通过 [`EntityId`] 表示；需要同时修改多个实体的操作
//! （添加子节点、矩阵传播、阶段分发）都在 `Scene` 上。
//!
//! # 组件存储
//!
//! - `components`：组件 ID → 组件槽位
//! - `data_components` / `action_components`：按挂载顺序排列的两类 ID 列表
//! - `types`：`TypeId` → 组件 ID 列表，按类型查找为 O(1)
//!
//! 三者在每次添加/移除时同步更新。

use std::any::TypeId;
use std::collections::HashMap;

use super::{Component, ComponentId, ComponentKind, Transform};
use crate::scene::EntityId;

/// 组件存储槽位
///
/// 行为组件在钩子执行期间会被暂时取出，此时 `component` 为 `None`。
struct ComponentSlot {
    component: Option<Box<dyn Component>>,
    kind: ComponentKind,
    type_id: TypeId,
}

/// Entity - 场景节点
pub struct Entity {
    /// 实体 ID
    id: EntityId,

    /// 可选名称
    name: Option<String>,

    /// 组件 ID → 组件
    components: HashMap<ComponentId, ComponentSlot>,

    /// 数据组件（挂载顺序）
    data_components: Vec<ComponentId>,

    /// 行为组件（挂载顺序）
    action_components: Vec<ComponentId>,

    /// 类型注册表
    types: HashMap<TypeId, Vec<ComponentId>>,

    /// 父实体（非拥有的反向引用）
    pub(crate) parent: Option<EntityId>,

    /// 子实体（有序）
    pub(crate) children: Vec<EntityId>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, name: Option<String>) -> Self {
        Self {
            id,
            name,
            components: HashMap::new(),
            data_components: Vec::new(),
            action_components: Vec::new(),
            types: HashMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// 获取名称
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// 设置名称
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    // ========== 组件管理 ==========

    /// 添加组件
    ///
    /// 同一 ID 的组件已存在时不做任何事并返回 `None`。
    /// 只负责存储，不触发生命周期钩子；需要 `on_create` 时使用
    /// [`Scene::add_component`](crate::scene::Scene::add_component)。
    ///
    /// # 示例
    /// ```
    /// use scene2d::component::Transform;
    /// use scene2d::scene::Scene;
    ///
    /// let mut scene = Scene::new();
    /// let player = scene.spawn("player");
    /// let entity = scene.entity_mut(player).unwrap();
    /// assert!(entity.add_component(Transform::new()).is_some());
    /// ```
    pub fn add_component<C: Component>(&mut self, component: C) -> Option<ComponentId> {
        self.add_boxed_component(Box::new(component))
    }

    /// 添加已装箱的组件
    pub fn add_boxed_component(&mut self, mut component: Box<dyn Component>) -> Option<ComponentId> {
        let id = component.id();
        if self.components.contains_key(&id) {
            return None;
        }

        let kind = component.kind();
        let type_id = component.as_any().type_id();
        component.base_mut().set_entity(Some(self.id));

        match kind {
            ComponentKind::Data => self.data_components.push(id),
            ComponentKind::Action => self.action_components.push(id),
        }
        self.types.entry(type_id).or_default().push(id);
        self.components.insert(
            id,
            ComponentSlot {
                component: Some(component),
                kind,
                type_id,
            },
        );

        Some(id)
    }

    /// 按 ID 移除组件
    ///
    /// 不存在时不做任何事。返回被移除的组件，其所属实体引用已清空。
    /// 如果组件正处于钩子执行中（已被取出），返回 `None`，但槽位仍被移除。
    pub fn remove_component_by_id(&mut self, id: ComponentId) -> Option<Box<dyn Component>> {
        let slot = self.components.remove(&id)?;

        match slot.kind {
            ComponentKind::Data => self.data_components.retain(|c| *c != id),
            ComponentKind::Action => self.action_components.retain(|c| *c != id),
        }
        if let Some(ids) = self.types.get_mut(&slot.type_id) {
            ids.retain(|c| *c != id);
            if ids.is_empty() {
                self.types.remove(&slot.type_id);
            }
        }

        let mut component = slot.component?;
        component.base_mut().set_entity(None);
        Some(component)
    }

    /// 按 ID 获取组件
    pub fn get_component_by_id(&self, id: ComponentId) -> Option<&dyn Component> {
        self.components.get(&id)?.component.as_deref()
    }

    /// 按 ID 获取组件（可变）
    pub fn get_component_by_id_mut(&mut self, id: ComponentId) -> Option<&mut dyn Component> {
        match self.components.get_mut(&id)?.component.as_mut() {
            Some(component) => Some(component.as_mut()),
            None => None,
        }
    }

    /// 按名称获取第一个匹配的组件
    pub fn get_component_by_name(&self, name: &str) -> Option<&dyn Component> {
        self.data_components
            .iter()
            .chain(self.action_components.iter())
            .filter_map(|id| self.get_component_by_id(*id))
            .find(|c| c.name() == Some(name))
    }

    /// 按类型获取组件
    ///
    /// 先查数据组件，再查行为组件。
    ///
    /// # 返回
    /// 如果找到了指定类型的组件，返回 `Some(&T)`；否则返回 `None`
    pub fn get_component<T: 'static>(&self) -> Option<&T> {
        let id = self.typed_id::<T>()?;
        self.get_component_by_id(id)?.as_any().downcast_ref::<T>()
    }

    /// 按类型获取组件的可变引用
    pub fn get_component_mut<T: 'static>(&mut self) -> Option<&mut T> {
        let id = self.typed_id::<T>()?;
        self.get_component_by_id_mut(id)?.as_any_mut().downcast_mut::<T>()
    }

    /// 检查是否有指定类型的组件
    pub fn has_component<T: 'static>(&self) -> bool {
        self.typed_id::<T>().is_some()
    }

    /// 获取 Transform
    pub fn transform(&self) -> Option<&Transform> {
        self.get_component::<Transform>()
    }

    pub(crate) fn transform_mut(&mut self) -> Option<&mut Transform> {
        self.get_component_mut::<Transform>()
    }

    /// 获取组件数量
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// 数据组件 ID（挂载顺序）
    pub fn data_components(&self) -> &[ComponentId] {
        &self.data_components
    }

    /// 行为组件 ID（挂载顺序）
    pub fn action_components(&self) -> &[ComponentId] {
        &self.action_components
    }

    /// 指定类型的第一个可用组件 ID，数据组件优先
    fn typed_id<T: 'static>(&self) -> Option<ComponentId> {
        let ids = self.types.get(&TypeId::of::<T>())?;
        let first_of = |kind: ComponentKind| {
            ids.iter().copied().find(|id| {
                self.components
                    .get(id)
                    .is_some_and(|slot| slot.kind == kind && slot.component.is_some())
            })
        };

        first_of(ComponentKind::Data).or_else(|| first_of(ComponentKind::Action))
    }

    // ========== 钩子执行期间的取出/放回 ==========

    pub(crate) fn take_component(&mut self, id: ComponentId) -> Option<Box<dyn Component>> {
        self.components.get_mut(&id)?.component.take()
    }

    /// 放回之前取出的组件
    ///
    /// 槽位已被移除时返回 `false`，调用方负责丢弃组件。
    pub(crate) fn restore_component(&mut self, id: ComponentId, component: Box<dyn Component>) -> bool {
        match self.components.get_mut(&id) {
            Some(slot) if slot.component.is_none() => {
                slot.component = Some(component);
                true
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("data_components", &self.data_components.len())
            .field("action_components", &self.action_components.len())
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish()
    }
}
