//! 渲染器模块
//!
//! 每帧遍历已注册的精灵，把绘制命令提交给 [`RenderBackend`]。
//! 应用程序通过 [`Renderer`] 与具体后端交互，而不需要关心后端实现。
//!
//! # 提交顺序
//!
//! 1. 用清屏颜色清屏
//! 2. 对每个精灵：着色变化时设置着色，纹理变化时绑定纹理，然后绘制
//! 3. 提交本帧
//!
//! 没有顶点或不在视口内的精灵会被跳过。

mod backend;
mod registry;

pub use backend::{CommandLog, DrawCall, RecordingBackend, RenderBackend, RenderCommand};
pub use registry::SpriteRegistry;

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::component::SpriteComponent;
use crate::core::error::{RenderError, Result};
use crate::math::{matrix, Color, Matrix3, Vector2};
use crate::scene::Scene;

/// 视口（像素）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// 点是否在 `[0, width] × [0, height]` 内
    pub fn contains(&self, point: &Vector2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
    }

    /// 视口中心
    pub fn center(&self) -> Vector2 {
        Vector2::new(self.width * 0.5, self.height * 0.5)
    }

    /// 像素坐标到裁剪空间的投影
    pub fn projection(&self) -> Matrix3 {
        matrix::projection(self.width, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// 一帧的绘制统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// 实际绘制的精灵数
    pub drawn: usize,
    /// 被跳过的精灵数（没有顶点或不可见）
    pub skipped: usize,
    /// 纹理绑定次数
    pub texture_binds: usize,
}

/// 精灵渲染器
pub struct Renderer {
    backend: Option<Box<dyn RenderBackend>>,
    viewport: Viewport,
    clear_color: Color,
    last_tint: Option<Color>,
    last_texture: Option<Uuid>,
}

impl Renderer {
    /// 创建渲染器
    ///
    /// 没有后端（没有渲染上下文）时记录一次错误，之后的渲染全部跳过。
    pub fn new(backend: Option<Box<dyn RenderBackend>>, viewport: Viewport, clear_color: Color) -> Self {
        match &backend {
            Some(b) => info!(backend = b.name(), "Renderer initialized"),
            None => error!(
                "{}",
                RenderError::ContextUnavailable("no render backend supplied, rendering disabled".into())
            ),
        }

        let mut renderer = Self {
            backend,
            viewport,
            clear_color,
            last_tint: None,
            last_texture: None,
        };
        renderer.resize(viewport);
        renderer
    }

    /// 是否有可用的渲染上下文
    pub fn has_context(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_deref().map(|b| b.name())
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// 更新视口
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some(backend) = self.backend.as_mut() {
            backend.resize(&viewport);
        }
    }

    /// 绘制一帧
    ///
    /// 没有渲染上下文时直接返回空统计。
    pub fn render_frame(&mut self, scene: &Scene, sprites: &SpriteRegistry) -> Result<FrameStats> {
        let Some(backend) = self.backend.as_mut() else {
            return Ok(FrameStats::default());
        };

        let mut stats = FrameStats::default();
        backend.clear(&self.clear_color);

        for (entity, component) in sprites.iter() {
            let Some(sprite) = scene.component_as::<SpriteComponent>(entity, component) else {
                continue;
            };
            let Some(transform) = scene.transform(entity) else {
                continue;
            };

            if sprite.vertices().is_empty()
                || !SpriteComponent::is_visible(transform.world_position(), &self.viewport)
            {
                stats.skipped += 1;
                continue;
            }

            if self.last_tint != Some(*sprite.color()) {
                backend.set_tint(sprite.color());
                self.last_tint = Some(*sprite.color());
            }

            let texture = sprite.texture();
            if self.last_texture != Some(texture.id()) {
                backend.bind_texture(texture);
                self.last_texture = Some(texture.id());
                stats.texture_binds += 1;
            }

            backend.draw(&DrawCall {
                entity,
                vertices: sprite.vertices(),
                uvs: sprite.uvs(),
                world_matrix: transform.world_matrix(),
            });
            stats.drawn += 1;
        }

        backend.present()?;
        debug!(drawn = stats.drawn, skipped = stats.skipped, "Frame submitted");
        Ok(stats)
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("backend", &self.backend_name())
            .field("viewport", &self.viewport)
            .field("clear_color", &self.clear_color)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_contains_edges() {
        let viewport = Viewport::new(100.0, 50.0);
        assert!(viewport.contains(&Vector2::new(100.0, 50.0)));
        assert!(!viewport.contains(&Vector2::new(100.1, 0.0)));
        assert_eq!(viewport.center(), Vector2::new(50.0, 25.0));
    }

    #[test]
    fn test_no_context_skips_rendering() {
        let mut renderer = Renderer::new(None, Viewport::default(), Color::BLACK);
        assert!(!renderer.has_context());

        let stats = renderer.render_frame(&Scene::new(), &SpriteRegistry::new()).unwrap();
        assert_eq!(stats, FrameStats::default());
    }

    #[test]
    fn test_empty_frame_clears_and_presents() {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut renderer = Renderer::new(Some(Box::new(backend)), Viewport::new(320.0, 240.0), Color::BLACK);

        renderer.render_frame(&Scene::new(), &SpriteRegistry::new()).unwrap();

        assert_eq!(
            *log.borrow(),
            [
                RenderCommand::Resize { width: 320.0, height: 240.0 },
                RenderCommand::Clear(Color::BLACK),
                RenderCommand::Present,
            ]
        );
    }
}
