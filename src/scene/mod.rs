//! 场景模块
//!
//! [`Scene`] 是实体的 arena：所有实体都存放在一个代际检查的 `SlotMap` 中，
//! 父子关系、根实体列表、组件生命周期和逐帧阶段分发都在这里实现。
//!
//! # 阶段分发
//!
//! 对某个实体分发一个阶段时，先按挂载顺序调用它自己所有行为组件上的同名钩子，
//! 再按子节点顺序递归到每个子实体（前序遍历）。
//! 帧驱动需要先对所有根实体完成一个阶段，再开始下一个阶段。
//!
//! # 矩阵传播
//!
//! 任何 Transform 修改都会立即重新计算自身和所有后代的世界矩阵，
//! 在修改调用返回前完成，不存在脏标记。

mod transform_mut;

pub use transform_mut::TransformMut;

use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace, warn};

use crate::component::{
    action, ActionComponent, Component, ComponentId, ComponentKind, Context, Entity, Phase,
    Services, Transform,
};

new_key_type! {
    /// 实体句柄（代际检查）
    pub struct EntityId;
}

/// 场景：实体 arena + 根实体列表
#[derive(Debug, Default)]
pub struct Scene {
    entities: SlotMap<EntityId, Entity>,
    roots: Vec<EntityId>,
}

impl Scene {
    /// 创建空场景
    pub fn new() -> Self {
        Self::default()
    }

    // ========== 实体管理 ==========

    /// 创建带名称的实体
    ///
    /// 新实体没有父节点，也不在根列表中；需要每帧分发时调用 [`Scene::add_root`]
    /// 或把它挂到某个已注册的实体下。
    pub fn spawn(&mut self, name: impl Into<String>) -> EntityId {
        let name = name.into();
        self.entities.insert_with_key(|id| Entity::new(id, Some(name)))
    }

    /// 创建匿名实体
    pub fn spawn_unnamed(&mut self) -> EntityId {
        self.entities.insert_with_key(|id| Entity::new(id, None))
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// 实体数量
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// 按名称查找第一个实体
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|(_, e)| e.name() == Some(name))
            .map(|(id, _)| id)
    }

    /// 注册为根实体，重复注册不做任何事
    pub fn add_root(&mut self, id: EntityId) {
        if self.contains(id) && !self.roots.contains(&id) {
            self.roots.push(id);
        }
    }

    /// 从根列表移除
    pub fn remove_root(&mut self, id: EntityId) {
        self.roots.retain(|r| *r != id);
    }

    /// 已注册的根实体（注册顺序）
    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    /// 销毁实体及其整棵子树
    ///
    /// 先从父节点和根列表中摘除，再对子树中每个行为组件调用 `on_destroy`。
    pub fn despawn(&mut self, id: EntityId, services: &mut Services) {
        if !self.contains(id) {
            return;
        }

        if let Some(parent) = self.entities[id].parent {
            if let Some(p) = self.entities.get_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }
        self.remove_root(id);

        let subtree = self.descendants(id);
        for entity in &subtree {
            let actions = self.entities[*entity].action_components().to_vec();
            for component in actions {
                self.with_action_component(*entity, component, services, |c, ctx| c.on_destroy(ctx));
            }
            services.sprites.unregister_entity(*entity);
        }
        for entity in subtree {
            self.roots.retain(|r| *r != entity);
            self.entities.remove(entity);
        }

        debug!(?id, "Entity despawned");
    }

    /// 子树中的所有实体（前序，包含自身）
    pub fn descendants(&self, id: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(entity) = self.entities.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(entity.children.iter().rev().copied());
        }
        out
    }

    /// `ancestor` 是否是 `id` 的祖先（或自身）
    pub fn is_ancestor(&self, ancestor: EntityId, id: EntityId) -> bool {
        let mut current = Some(id);
        while let Some(entity) = current {
            if entity == ancestor {
                return true;
            }
            current = self.entities.get(entity).and_then(|e| e.parent);
        }
        false
    }

    // ========== 组件管理 ==========

    /// 添加组件，行为组件会触发一次 `on_create`
    ///
    /// 实体不存在或组件 ID 重复时返回 `None`。
    /// 添加 Transform 时会立即根据父节点计算世界矩阵。
    pub fn add_component<C: Component>(
        &mut self,
        entity: EntityId,
        component: C,
        services: &mut Services,
    ) -> Option<ComponentId> {
        self.add_boxed_component(entity, Box::new(component), services)
    }

    /// 添加已装箱的组件
    pub fn add_boxed_component(
        &mut self,
        entity: EntityId,
        component: Box<dyn Component>,
        services: &mut Services,
    ) -> Option<ComponentId> {
        let is_transform = component.as_any().is::<Transform>();
        let kind = component.kind();
        let id = self.entities.get_mut(entity)?.add_boxed_component(component)?;

        if is_transform {
            self.update_local_matrix(entity);
        }
        if kind == ComponentKind::Action {
            self.with_action_component(entity, id, services, |c, ctx| c.on_create(ctx));
        }

        trace!(?entity, component = %id, ?kind, "Component attached");
        Some(id)
    }

    /// 按 ID 移除组件，不存在时不做任何事
    ///
    /// 组件同时从精灵注册表中注销。移除的是 Transform 时，
    /// 子实体的世界矩阵重新按剩下的父节点计算。
    pub fn remove_component_by_id(
        &mut self,
        entity: EntityId,
        component: ComponentId,
        services: &mut Services,
    ) -> Option<Box<dyn Component>> {
        let removed = self.entities.get_mut(entity)?.remove_component_by_id(component);
        services.sprites.unregister(entity, component);

        if removed.as_ref().is_some_and(|c| c.as_any().is::<Transform>()) {
            let children = self.entities[entity].children.clone();
            for child in children {
                self.propagate(child, None);
            }
        }

        trace!(?entity, %component, "Component detached");
        removed
    }

    /// 按类型获取组件
    pub fn get_component<T: 'static>(&self, entity: EntityId) -> Option<&T> {
        self.entities.get(entity)?.get_component::<T>()
    }

    /// 按类型获取组件（可变）
    pub fn get_component_mut<T: 'static>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.entities.get_mut(entity)?.get_component_mut::<T>()
    }

    /// 按 ID 获取组件并向下转型
    pub fn component_as<T: 'static>(&self, entity: EntityId, component: ComponentId) -> Option<&T> {
        self.entities
            .get(entity)?
            .get_component_by_id(component)?
            .as_any()
            .downcast_ref::<T>()
    }

    /// 设置行为组件的启用状态
    ///
    /// 从禁用变为启用时触发 `on_awake`；`false` 触发 `on_asleep`，重复设置 `false` 也会再次触发。
    pub fn set_enabled(
        &mut self,
        entity: EntityId,
        component: ComponentId,
        enabled: bool,
        services: &mut Services,
    ) {
        self.with_action_component(entity, component, services, |c, ctx| {
            action::set_enabled(c, enabled, ctx)
        });
    }

    /// 行为组件是否启用
    pub fn is_enabled(&self, entity: EntityId, component: ComponentId) -> bool {
        self.entities
            .get(entity)
            .and_then(|e| e.get_component_by_id(component))
            .and_then(|c| c.as_action())
            .is_some_and(|a| a.is_enabled())
    }

    /// 销毁行为组件：清除名称并触发 `on_destroy`
    ///
    /// 组件仍然挂在实体上，需要另外调用 [`Scene::remove_component_by_id`]。
    pub fn destroy_component(
        &mut self,
        entity: EntityId,
        component: ComponentId,
        services: &mut Services,
    ) {
        self.with_action_component(entity, component, services, |c, ctx| action::destroy(c, ctx));
    }

    /// 暂时取出一个行为组件并在上下文中执行闭包
    ///
    /// 闭包执行期间组件不在实体上，闭包可以自由修改场景。
    /// 如果闭包移除了该组件或销毁了实体，组件在闭包返回后被丢弃。
    /// 组件不存在、正在执行钩子或不是行为组件时返回 `None`。
    pub fn with_action_component<R>(
        &mut self,
        entity: EntityId,
        component: ComponentId,
        services: &mut Services,
        f: impl FnOnce(&mut dyn ActionComponent, &mut Context<'_>) -> R,
    ) -> Option<R> {
        let mut taken = self.entities.get_mut(entity)?.take_component(component)?;

        let result = match taken.as_action_mut() {
            Some(action) => {
                let mut ctx = Context::new(self, services, entity, component);
                Some(f(action, &mut ctx))
            }
            None => None,
        };

        let restored = self
            .entities
            .get_mut(entity)
            .is_some_and(|e| e.restore_component(component, taken));
        if !restored {
            trace!(?entity, %component, "Component detached during hook, dropping");
        }

        result
    }

    // ========== 层级 ==========

    /// 添加子实体
    ///
    /// - 已经是子节点时不做任何事
    /// - 子实体有其他父节点时先从原父节点移除
    /// - 双方都有 Transform 时立即把子树重新锚定到新父节点的空间
    /// - 子实体不再作为根实体单独分发
    ///
    /// 会形成环（`child` 是 `parent` 的祖先）时拒绝并记录警告。
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) {
        if !self.contains(parent) || !self.contains(child) {
            return;
        }
        if self.entities[parent].children.contains(&child) {
            return;
        }
        if self.is_ancestor(child, parent) {
            warn!(?parent, ?child, "add_child would create a cycle, ignored");
            return;
        }

        if let Some(old_parent) = self.entities[child].parent {
            self.remove_child(old_parent, child);
        }

        self.entities[parent].children.push(child);
        self.entities[child].parent = Some(parent);
        if self.roots.contains(&child) {
            debug!(?child, "Entity parented, removed from root list");
            self.remove_root(child);
        }

        let parent_frame = self.transform(parent).map(Transform::world_frame);
        if let Some(frame) = parent_frame {
            if self.has_transform(child) {
                self.propagate(child, Some(frame));
            }
        }
    }

    /// 移除子实体
    ///
    /// 不是子节点时不做任何事。子实体有 Transform 时重新计算局部矩阵，
    /// 其世界矩阵回落到仅由局部矩阵决定。
    pub fn remove_child(&mut self, parent: EntityId, child: EntityId) {
        let Some(p) = self.entities.get_mut(parent) else {
            return;
        };
        let Some(index) = p.children.iter().position(|c| *c == child) else {
            return;
        };
        p.children.remove(index);

        if let Some(c) = self.entities.get_mut(child) {
            c.parent = None;
        }
        if self.has_transform(child) {
            self.update_local_matrix(child);
        }
    }

    // ========== Transform ==========

    /// 获取 Transform
    pub fn transform(&self, entity: EntityId) -> Option<&Transform> {
        self.entities.get(entity)?.transform()
    }

    /// 获取可修改 Transform 的句柄，实体没有 Transform 时返回 `None`
    pub fn transform_mut(&mut self, entity: EntityId) -> Option<TransformMut<'_>> {
        if self.has_transform(entity) {
            Some(TransformMut::new(self, entity))
        } else {
            None
        }
    }

    pub fn has_transform(&self, entity: EntityId) -> bool {
        self.entities
            .get(entity)
            .is_some_and(|e| e.has_component::<Transform>())
    }

    /// 重新计算局部矩阵，并级联到世界矩阵
    pub fn update_local_matrix(&mut self, entity: EntityId) {
        let Some(transform) = self.transform_slot_mut(entity) else {
            return;
        };
        transform.recompute_local_matrix();
        self.propagate(entity, None);
    }

    /// 重新计算世界矩阵并递归到所有后代
    ///
    /// 没有显式给出父矩阵时使用父实体 Transform 的世界矩阵；
    /// 父实体没有 Transform 时世界矩阵等于局部矩阵。
    /// 代价与子树大小成正比。
    pub fn update_world_matrix(&mut self, entity: EntityId, parent_matrix: Option<crate::math::Matrix3>) {
        let frame = parent_matrix.map(|matrix| {
            let position = self
                .parent_transform(entity)
                .map(|t| *t.world_position())
                .unwrap_or_else(crate::math::Vector2::zeros);
            crate::component::WorldFrame { matrix, position }
        });
        self.propagate(entity, frame);
    }

    fn parent_transform(&self, entity: EntityId) -> Option<&Transform> {
        let parent = self.entities.get(entity)?.parent?;
        self.transform(parent)
    }

    fn transform_slot_mut(&mut self, entity: EntityId) -> Option<&mut Transform> {
        self.entities.get_mut(entity)?.transform_mut()
    }

    /// 深度优先传播世界矩阵
    ///
    /// 没有 Transform 的子实体会中断传播，其后代不经由它更新。
    pub(crate) fn propagate(&mut self, entity: EntityId, parent: Option<crate::component::WorldFrame>) {
        let parent = parent.or_else(|| self.parent_transform(entity).map(Transform::world_frame));

        let frame = {
            let Some(transform) = self.transform_slot_mut(entity) else {
                return;
            };
            transform.apply_parent(parent.as_ref());
            transform.world_frame()
        };

        let count = self.entities[entity].children.len();
        for index in 0..count {
            let child = self.entities[entity].children[index];
            if self.has_transform(child) {
                self.propagate(child, Some(frame));
            }
        }
    }

    // ========== 阶段分发 ==========

    /// 对一个实体分发阶段：先是自身的行为组件，再递归到子实体
    ///
    /// 分发过程中新加入的组件和子实体在本次分发中不会被访问。
    pub fn dispatch(&mut self, entity: EntityId, phase: Phase, dt: f32, services: &mut Services) {
        let Some(e) = self.entities.get(entity) else {
            return;
        };
        let components = e.action_components().to_vec();

        for component in components {
            self.with_action_component(entity, component, services, |c, ctx| phase.invoke(c, ctx, dt));
        }

        let children = match self.entities.get(entity) {
            Some(e) => e.children.clone(),
            None => return,
        };
        for child in children {
            self.dispatch(child, phase, dt, services);
        }
    }

    /// 对所有根实体完成一个阶段
    pub fn run_phase(&mut self, phase: Phase, dt: f32, services: &mut Services) {
        let roots = self.roots.clone();
        for root in roots {
            self.dispatch(root, phase, dt, services);
        }
    }

    pub fn pre_update(&mut self, entity: EntityId, dt: f32, services: &mut Services) {
        self.dispatch(entity, Phase::PreUpdate, dt, services);
    }

    pub fn update(&mut self, entity: EntityId, dt: f32, services: &mut Services) {
        self.dispatch(entity, Phase::Update, dt, services);
    }

    pub fn post_update(&mut self, entity: EntityId, dt: f32, services: &mut Services) {
        self.dispatch(entity, Phase::PostUpdate, dt, services);
    }

    pub fn pre_render(&mut self, entity: EntityId, dt: f32, services: &mut Services) {
        self.dispatch(entity, Phase::PreRender, dt, services);
    }

    pub fn render(&mut self, entity: EntityId, dt: f32, services: &mut Services) {
        self.dispatch(entity, Phase::Render, dt, services);
    }

    pub fn post_render(&mut self, entity: EntityId, dt: f32, services: &mut Services) {
        self.dispatch(entity, Phase::PostRender, dt, services);
    }
}
