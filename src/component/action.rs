//! 行为组件生命周期
//!
//! 行为组件可以实现十个生命周期钩子中的任意子集，
//! 未实现的钩子使用默认的空实现，分发时等同于被跳过。
//!
//! # 钩子
//!
//! | 钩子 | 触发时机 |
//! |------|----------|
//! | `on_create` | 挂载到实体时，只触发一次 |
//! | `on_destroy` | 组件被销毁时 |
//! | `on_awake` | 从禁用变为启用时 |
//! | `on_asleep` | 每次被设置为禁用（包括重复设置 `false`） |
//! | `pre_update` / `update` / `post_update` | 每帧更新阶段 |
//! | `pre_render` / `render` / `post_render` | 每帧渲染阶段 |

use super::{Component, Context};

/// 行为组件 trait
///
/// 每个钩子都通过 [`Context`] 获得场景、所属实体以及引擎服务（输入、精灵注册表），
/// 不存在全局引擎单例。
pub trait ActionComponent: Component {
    /// 挂载到实体时调用一次
    fn on_create(&mut self, _ctx: &mut Context<'_>) {}

    /// 组件被销毁时调用
    fn on_destroy(&mut self, _ctx: &mut Context<'_>) {}

    /// 从禁用变为启用时调用
    fn on_awake(&mut self, _ctx: &mut Context<'_>) {}

    /// 每次禁用时调用
    fn on_asleep(&mut self, _ctx: &mut Context<'_>) {}

    fn pre_update(&mut self, _ctx: &mut Context<'_>, _dt: f32) {}

    fn update(&mut self, _ctx: &mut Context<'_>, _dt: f32) {}

    fn post_update(&mut self, _ctx: &mut Context<'_>, _dt: f32) {}

    fn pre_render(&mut self, _ctx: &mut Context<'_>, _dt: f32) {}

    fn render(&mut self, _ctx: &mut Context<'_>, _dt: f32) {}

    fn post_render(&mut self, _ctx: &mut Context<'_>, _dt: f32) {}

    /// 是否启用
    fn is_enabled(&self) -> bool {
        self.base().is_enabled()
    }
}

/// 设置启用状态并触发对应钩子
///
/// 从禁用变为启用时触发一次 `on_awake`，已启用时再设置 `true` 不触发；
/// 设置 `false` 总是触发 `on_asleep`，即使状态没有变化。
pub(crate) fn set_enabled(component: &mut dyn ActionComponent, enabled: bool, ctx: &mut Context<'_>) {
    let was_enabled = component.base().is_enabled();
    component.base_mut().set_enabled(enabled);

    if enabled {
        if !was_enabled {
            component.on_awake(ctx);
        }
    } else {
        component.on_asleep(ctx);
    }
}

/// 销毁组件：清除名称并触发 `on_destroy`
///
/// 不会把组件从实体上移除，也不会改变启用状态。
pub(crate) fn destroy(component: &mut dyn ActionComponent, ctx: &mut Context<'_>) {
    component.base_mut().set_name(None);
    component.on_destroy(ctx);
}

/// 每帧分发阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    PreUpdate,
    Update,
    PostUpdate,
    PreRender,
    Render,
    PostRender,
}

impl Phase {
    /// 帧驱动调用六个阶段的固定顺序
    ///
    /// 渲染阶段与更新阶段交错进行。
    pub const FRAME_ORDER: [Phase; 6] = [
        Phase::PreUpdate,
        Phase::PreRender,
        Phase::Update,
        Phase::Render,
        Phase::PostUpdate,
        Phase::PostRender,
    ];

    /// 阶段名称
    pub fn name(&self) -> &'static str {
        match self {
            Phase::PreUpdate => "pre_update",
            Phase::Update => "update",
            Phase::PostUpdate => "post_update",
            Phase::PreRender => "pre_render",
            Phase::Render => "render",
            Phase::PostRender => "post_render",
        }
    }

    /// 调用组件上同名的钩子
    pub(crate) fn invoke(self, component: &mut dyn ActionComponent, ctx: &mut Context<'_>, dt: f32) {
        match self {
            Phase::PreUpdate => component.pre_update(ctx, dt),
            Phase::Update => component.update(ctx, dt),
            Phase::PostUpdate => component.post_update(ctx, dt),
            Phase::PreRender => component.pre_render(ctx, dt),
            Phase::Render => component.render(ctx, dt),
            Phase::PostRender => component.post_render(ctx, dt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_order_interleaves_render() {
        assert_eq!(Phase::FRAME_ORDER[0], Phase::PreUpdate);
        assert_eq!(Phase::FRAME_ORDER[1], Phase::PreRender);
        assert_eq!(Phase::FRAME_ORDER[3], Phase::Render);
        assert_eq!(Phase::FRAME_ORDER[5], Phase::PostRender);
    }

    #[test]
    fn test_phase_names() {
        let names: Vec<_> = Phase::FRAME_ORDER.iter().map(Phase::name).collect();
        assert_eq!(
            names,
            ["pre_update", "pre_render", "update", "render", "post_update", "post_render"]
        );
    }
}
