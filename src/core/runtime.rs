//! 帧驱动
//!
//! [`Runtime`] 持有场景、引擎服务和渲染器，每帧调用一次 [`Runtime::tick`]：
//!
//! 1. 按固定顺序对所有根实体执行六个阶段，每个阶段在整棵树上完成后才开始下一个
//! 2. 把已注册的精灵提交给渲染器
//! 3. 清除本帧的输入边沿

use tracing::{debug, trace};

use crate::component::{Component, ComponentId, Phase, Services};
use crate::core::config::Config;
use crate::renderer::{FrameStats, RenderBackend, Renderer, Viewport};
use crate::scene::{EntityId, Scene};
use crate::{engine_error, engine_info};

/// 运行中的引擎实例
#[derive(Debug)]
pub struct Runtime {
    scene: Scene,
    services: Services,
    renderer: Renderer,
    frame: u64,
    elapsed: f64,
}

impl Runtime {
    /// 创建引擎实例
    ///
    /// `backend` 为 `None` 时渲染被禁用，但帧循环照常运行。
    pub fn new(config: &Config, backend: Option<Box<dyn RenderBackend>>) -> Self {
        let viewport = Viewport::new(config.window.width as f32, config.window.height as f32);
        let renderer = Renderer::new(backend, viewport, config.renderer.clear_color());

        engine_info!(
            width = config.window.width,
            height = config.window.height,
            title = %config.window.title,
            "Runtime created"
        );

        Self {
            scene: Scene::new(),
            services: Services::new(viewport),
            renderer,
            frame: 0,
            elapsed: 0.0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut Services {
        &mut self.services
    }

    /// 同时借出场景和服务，供场景构建等需要两者的操作使用
    pub fn parts_mut(&mut self) -> (&mut Scene, &mut Services) {
        (&mut self.scene, &mut self.services)
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// 已完成的帧数
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// 累计的模拟时间（秒）
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// 注册根实体
    pub fn add_entity(&mut self, entity: EntityId) {
        self.scene.add_root(entity);
    }

    /// 添加组件并触发 `on_create`
    pub fn add_component<C: Component>(&mut self, entity: EntityId, component: C) -> Option<ComponentId> {
        self.scene.add_component(entity, component, &mut self.services)
    }

    /// 设置行为组件的启用状态
    pub fn set_enabled(&mut self, entity: EntityId, component: ComponentId, enabled: bool) {
        self.scene.set_enabled(entity, component, enabled, &mut self.services);
    }

    /// 添加组件并立即启用
    pub fn enable<C: Component>(&mut self, entity: EntityId, component: C) -> Option<ComponentId> {
        let id = self.add_component(entity, component)?;
        self.set_enabled(entity, id, true);
        Some(id)
    }

    /// 推进一帧
    ///
    /// 负的 `dt` 按 0 处理。渲染后端失败只记录日志，不中断帧循环。
    pub fn tick(&mut self, dt: f32) -> FrameStats {
        let dt = dt.max(0.0);

        for phase in Phase::FRAME_ORDER {
            trace!(phase = phase.name(), "Running phase");
            self.scene.run_phase(phase, dt, &mut self.services);
        }

        let stats = match self.renderer.render_frame(&self.scene, &self.services.sprites) {
            Ok(stats) => stats,
            Err(e) => {
                engine_error!("Frame {} failed to render: {}", self.frame, e);
                FrameStats::default()
            }
        };

        self.services.input.end_frame();
        self.frame += 1;
        self.elapsed += f64::from(dt);
        stats
    }

    /// 视口尺寸变化
    pub fn resize(&mut self, width: u32, height: u32) {
        let viewport = Viewport::new(width as f32, height as f32);
        self.services.viewport = viewport;
        self.renderer.resize(viewport);
        debug!(width, height, "Viewport resized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ActionComponent, ComponentBase, Context};
    use crate::impl_action_component;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct PhaseLog {
        base: ComponentBase,
        label: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl PhaseLog {
        fn push(&self, phase: &str) {
            self.log.borrow_mut().push(format!("{}:{}", self.label, phase));
        }
    }

    impl ActionComponent for PhaseLog {
        fn pre_update(&mut self, _ctx: &mut Context<'_>, _dt: f32) {
            self.push("pre_update");
        }

        fn update(&mut self, _ctx: &mut Context<'_>, _dt: f32) {
            self.push("update");
        }

        fn render(&mut self, _ctx: &mut Context<'_>, _dt: f32) {
            self.push("render");
        }
    }
    impl_action_component!(PhaseLog);

    #[test]
    fn test_phases_complete_tree_wide_in_order() {
        let mut runtime = Runtime::new(&Config::default(), None);
        let log = Rc::new(RefCell::new(Vec::new()));

        for label in ["a", "b"] {
            let entity = runtime.scene_mut().spawn(label);
            runtime.add_entity(entity);
            runtime.add_component(
                entity,
                PhaseLog {
                    base: ComponentBase::new(),
                    label,
                    log: Rc::clone(&log),
                },
            );
        }

        runtime.tick(0.016);

        assert_eq!(
            *log.borrow(),
            ["a:pre_update", "b:pre_update", "a:update", "b:update", "a:render", "b:render"]
        );
    }

    #[test]
    fn test_tick_counts_frames_and_clamps_dt() {
        let mut runtime = Runtime::new(&Config::default(), None);
        runtime.tick(0.5);
        runtime.tick(-1.0);

        assert_eq!(runtime.frame(), 2);
        assert!((runtime.elapsed() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_input_edges_cleared_after_tick() {
        let mut runtime = Runtime::new(&Config::default(), None);
        runtime.services_mut().input.press(winit::keyboard::KeyCode::KeyD);
        runtime.tick(0.016);

        let input = &runtime.services().input;
        assert!(input.key_down(winit::keyboard::KeyCode::KeyD));
        assert!(!input.key_pressed(winit::keyboard::KeyCode::KeyD));
    }

    #[test]
    fn test_resize_updates_viewport() {
        let mut runtime = Runtime::new(&Config::default(), None);
        runtime.resize(1024, 768);
        assert_eq!(runtime.services().viewport, Viewport::new(1024.0, 768.0));
        assert_eq!(runtime.renderer().viewport(), Viewport::new(1024.0, 768.0));
    }
}
