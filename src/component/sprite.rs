//! 精灵组件
//!
//! 负责帧动画的状态机以及渲染所需的顶点/UV 数据。
//!
//! # 状态
//!
//! - 未选择动画：使用覆盖整张纹理的默认帧
//! - 静态：所选动画只有一帧
//! - 动画中：所选动画有两帧及以上，计时器累计 `dt`
//!
//! `render` 阶段同时推进计时器和重新生成几何数据。

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tracing::{error, trace};

use super::{ActionComponent, ComponentBase, Context};
use crate::assets::{Animation, Frame, Texture};
use crate::impl_action_component;
use crate::math::{Color, Vector2};
use crate::renderer::Viewport;

/// 默认每帧持续时间
pub const DEFAULT_FRAME_TIME: Duration = Duration::from_millis(150);

/// 默认帧名称
pub const DEFAULT_FRAME_NAME: &str = "DEFAULT_FRAME";

/// 每个四边形的顶点数（两个三角形）
pub const QUAD_VERTEX_COUNT: usize = 6;

/// 精灵组件
#[derive(Debug)]
pub struct SpriteComponent {
    base: ComponentBase,

    /// 纹理
    texture: Rc<Texture>,

    /// 着色
    color: Color,

    /// 顶点（每个顶点 2 个 float）
    vertices: Vec<f32>,

    /// UV，与顶点一一对应
    uvs: Vec<f32>,

    /// 帧名称 → UV
    uv_cache: HashMap<String, Vec<f32>>,

    /// UV 缓存未命中次数
    uv_cache_misses: usize,

    /// 下一次 render 需要重新生成顶点
    vert_update_scheduled: bool,

    current_frame_index: usize,

    /// 未选择动画时使用的整张纹理帧，首次需要时创建
    default_frame: Option<Frame>,

    frame_time: Duration,

    animations: HashMap<String, Rc<Animation>>,

    /// 当前动画
    animation: Option<Rc<Animation>>,

    current_frame_time: Duration,

    is_animated: bool,
}

impl SpriteComponent {
    /// 创建使用整张纹理的精灵
    pub fn new(texture: Rc<Texture>) -> Self {
        Self {
            base: ComponentBase::new(),
            texture,
            color: Color::WHITE,
            vertices: Vec::new(),
            uvs: Vec::new(),
            uv_cache: HashMap::new(),
            uv_cache_misses: 0,
            vert_update_scheduled: true,
            current_frame_index: 0,
            default_frame: None,
            frame_time: DEFAULT_FRAME_TIME,
            animations: HashMap::new(),
            animation: None,
            current_frame_time: Duration::ZERO,
            is_animated: false,
        }
    }

    /// 注册一组动画并选中第一个
    pub fn with_animations<I>(mut self, animations: I) -> Self
    where
        I: IntoIterator<Item = Animation>,
    {
        let mut first = None;
        for animation in animations {
            first.get_or_insert_with(|| animation.name().to_string());
            self.add_animation(animation);
        }

        if let Some(name) = first {
            self.set_animation(&name);
        }
        self
    }

    /// 设置着色
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// 设置每帧持续时间
    pub fn with_frame_time(mut self, frame_time: Duration) -> Self {
        self.frame_time = frame_time;
        self
    }

    /// 设置组件名称
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.base.set_name(Some(name.into()));
        self
    }

    /// 注册动画，同名动画会被替换
    pub fn add_animation(&mut self, animation: Animation) {
        self.animations
            .insert(animation.name().to_string(), Rc::new(animation));
    }

    /// 切换动画
    ///
    /// 已经是当前动画时不做任何事。名称不存在时回到未选择动画的状态。
    pub fn set_animation(&mut self, name: &str) {
        if self.animation_name() == Some(name) {
            return;
        }

        self.animation = self.animations.get(name).cloned();
        self.current_frame_index = 0;
        self.current_frame_time = Duration::ZERO;
        self.is_animated = self.animation.as_ref().is_some_and(|a| a.is_animated());
        self.vert_update_scheduled = true;

        trace!(animation = name, found = self.animation.is_some(), "Animation selected");
    }

    /// 推进帧计时器
    ///
    /// 累计时间达到帧间隔时归零并前进一帧，越过最后一帧回到第 0 帧。
    pub fn update_frames(&mut self, dt: Duration) {
        let frame_count = match &self.animation {
            Some(animation) if !animation.is_empty() => animation.len(),
            _ => return,
        };

        self.current_frame_time += dt;
        if self.current_frame_time >= self.frame_time {
            self.current_frame_time = Duration::ZERO;
            self.current_frame_index = (self.current_frame_index + 1) % frame_count;
            self.vert_update_scheduled = true;
        }
    }

    /// 每帧推进：动画计时，然后在纹理加载完成后重新生成几何数据
    pub fn advance(&mut self, dt: f32) {
        if self.is_animated {
            let dt = Duration::try_from_secs_f32(dt.max(0.0)).unwrap_or_default();
            self.update_frames(dt);
        }

        if self.vert_update_scheduled && self.texture.is_loaded() {
            self.regenerate();
            self.vert_update_scheduled = false;
        }
    }

    /// 根据当前帧重新生成顶点和 UV
    fn regenerate(&mut self) {
        let Some((tex_w, tex_h)) = self.texture.size() else {
            return;
        };

        let frame = match self.current_frame() {
            Some(frame) => frame.clone(),
            None => self
                .default_frame
                .get_or_insert_with(|| {
                    Frame::new(DEFAULT_FRAME_NAME, 0.0, 0.0, tex_w as f32, tex_h as f32)
                })
                .clone(),
        };

        self.vertices = quad_vertices(&frame).to_vec();

        let uvs = match self.uv_cache.get(frame.name()) {
            Some(uvs) => uvs.clone(),
            None => {
                let uvs = frame_uvs(&frame, tex_w as f32, tex_h as f32).to_vec();
                self.uv_cache_misses += 1;
                self.uv_cache.insert(frame.name().to_string(), uvs.clone());
                uvs
            }
        };
        self.uvs = uvs;
    }

    /// 当前帧
    pub fn current_frame(&self) -> Option<&Frame> {
        self.animation.as_ref()?.frame(self.current_frame_index)
    }

    pub fn current_frame_index(&self) -> usize {
        self.current_frame_index
    }

    /// 当前动画名称
    pub fn animation_name(&self) -> Option<&str> {
        self.animation.as_ref().map(|a| a.name())
    }

    pub fn animation(&self) -> Option<&Animation> {
        self.animation.as_deref()
    }

    pub fn is_animated(&self) -> bool {
        self.is_animated
    }

    pub fn frame_time(&self) -> Duration {
        self.frame_time
    }

    pub fn texture(&self) -> &Rc<Texture> {
        &self.texture
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn uvs(&self) -> &[f32] {
        &self.uvs
    }

    /// UV 计算次数（缓存未命中）
    pub fn uv_cache_misses(&self) -> usize {
        self.uv_cache_misses
    }

    pub fn is_vert_update_scheduled(&self) -> bool {
        self.vert_update_scheduled
    }

    /// 世界坐标是否在视口范围内
    pub fn is_visible(world_position: &Vector2, viewport: &Viewport) -> bool {
        viewport.contains(world_position)
    }
}

impl ActionComponent for SpriteComponent {
    fn on_awake(&mut self, ctx: &mut Context<'_>) {
        if ctx.transform().is_none() {
            error!(
                entity = ?ctx.entity(),
                "SpriteComponent: entity is missing a transform component"
            );
            return;
        }

        let (entity, id) = (ctx.entity(), ctx.component_id());
        ctx.services.sprites.register(entity, id);
    }

    fn on_asleep(&mut self, ctx: &mut Context<'_>) {
        let (entity, id) = (ctx.entity(), ctx.component_id());
        ctx.services.sprites.unregister(entity, id);
    }

    /// 没有 Transform 的精灵不推进动画，也不生成几何数据
    fn render(&mut self, ctx: &mut Context<'_>, dt: f32) {
        if ctx.transform().is_none() {
            return;
        }
        self.advance(dt);
    }
}

impl_action_component!(SpriteComponent);

/// 以原点为中心的四边形，两个三角形
///
/// 旋转存放的帧交换宽高。
fn quad_vertices(frame: &Frame) -> [f32; QUAD_VERTEX_COUNT * 2] {
    let (w, h) = if frame.is_rotated() {
        (frame.height(), frame.width())
    } else {
        (frame.width(), frame.height())
    };

    let x1 = -w / 2.0;
    let x2 = w / 2.0;
    let y1 = -h / 2.0;
    let y2 = h / 2.0;

    [x1, y1, x2, y1, x1, y2, x1, y2, x2, y1, x2, y2]
}

/// 帧在纹理中的归一化 UV
///
/// 旋转存放的帧把 90° 旋转放在 UV 顺序里，顶点保持不变。
fn frame_uvs(frame: &Frame, tex_w: f32, tex_h: f32) -> [f32; QUAD_VERTEX_COUNT * 2] {
    let sx = frame.x() / tex_w;
    let sy = frame.y() / tex_h;
    let ex = (frame.x() + frame.width()) / tex_w;
    let ey = (frame.y() + frame.height()) / tex_h;

    if frame.is_rotated() {
        [ex, sy, ex, ey, sx, sy, sx, sy, ex, ey, sx, ey]
    } else {
        [sx, sy, ex, sy, sx, ey, sx, ey, ex, sy, ex, ey]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn texture() -> Rc<Texture> {
        Rc::new(Texture::with_size("atlas", "atlas.png", 128, 64))
    }

    fn strip(name: &str, count: usize) -> Animation {
        let frames = (0..count)
            .map(|i| Frame::new(format!("{name}_{i}"), i as f32 * 32.0, 0.0, 32.0, 32.0))
            .collect();
        Animation::new(name, frames)
    }

    #[test]
    fn test_first_animation_is_selected() {
        let sprite = SpriteComponent::new(texture()).with_animations([strip("idle", 4), strip("walk", 2)]);
        assert_eq!(sprite.animation_name(), Some("idle"));
        assert!(sprite.is_animated());
        assert_eq!(sprite.current_frame_index(), 0);
    }

    #[test]
    fn test_frame_advance_and_wrap() {
        let mut sprite = SpriteComponent::new(texture()).with_animations([strip("run", 4)]);
        let step = Duration::from_millis(25);
        let mut seen = Vec::new();

        for tick in 1..=25 {
            sprite.update_frames(step);
            if tick % 6 == 0 {
                seen.push(sprite.current_frame_index());
            }
        }

        assert_eq!(seen, [1, 2, 3, 0]);
        assert_eq!(sprite.current_frame_index(), 0);
    }

    #[test]
    fn test_set_same_animation_is_noop() {
        let mut sprite = SpriteComponent::new(texture()).with_animations([strip("run", 4)]);
        sprite.update_frames(Duration::from_millis(150));
        assert_eq!(sprite.current_frame_index(), 1);

        sprite.set_animation("run");
        assert_eq!(sprite.current_frame_index(), 1);
    }

    #[test]
    fn test_switching_resets_timer() {
        let mut sprite = SpriteComponent::new(texture()).with_animations([strip("run", 4), strip("jump", 3)]);
        sprite.update_frames(Duration::from_millis(140));
        sprite.set_animation("jump");
        sprite.update_frames(Duration::from_millis(20));

        assert_eq!(sprite.animation_name(), Some("jump"));
        assert_eq!(sprite.current_frame_index(), 0);
    }

    #[test]
    fn test_single_frame_is_static() {
        let mut sprite = SpriteComponent::new(texture()).with_animations([strip("still", 1)]);
        assert!(!sprite.is_animated());

        sprite.advance(1.0);
        assert_eq!(sprite.current_frame_index(), 0);
    }

    #[test]
    fn test_unknown_animation_falls_back_to_default_frame() {
        let mut sprite = SpriteComponent::new(texture()).with_animations([strip("run", 2)]);
        sprite.set_animation("missing");
        assert!(sprite.animation_name().is_none());
        assert!(!sprite.is_animated());

        sprite.advance(0.0);
        assert_eq!(sprite.vertices(), &[-64.0, -32.0, 64.0, -32.0, -64.0, 32.0, -64.0, 32.0, 64.0, -32.0, 64.0, 32.0]);
        assert_eq!(sprite.uvs(), &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_geometry_waits_for_texture() {
        let pending = Rc::new(Texture::new("pending", "pending.png"));
        let mut sprite = SpriteComponent::new(Rc::clone(&pending));

        sprite.advance(0.016);
        assert!(sprite.vertices().is_empty());
        assert!(sprite.is_vert_update_scheduled());

        pending.mark_loaded(16, 16);
        sprite.advance(0.016);
        assert_eq!(sprite.vertices().len(), QUAD_VERTEX_COUNT * 2);
        assert!(!sprite.is_vert_update_scheduled());
    }

    #[test]
    fn test_uv_cache_hits_on_repeat_frames() {
        let mut sprite = SpriteComponent::new(texture()).with_animations([strip("run", 2)]);
        sprite.advance(0.0);
        assert_eq!(sprite.uv_cache_misses(), 1);

        for _ in 0..4 {
            sprite.update_frames(Duration::from_millis(150));
            sprite.advance(0.0);
        }

        assert_eq!(sprite.uv_cache_misses(), 2);
    }

    #[test]
    fn test_rotated_frame_uvs() {
        let frame = Frame::new("r", 32.0, 0.0, 64.0, 32.0).rotated(true);
        let uvs = frame_uvs(&frame, 128.0, 64.0);
        assert_relative_eq!(uvs[0], 0.75);
        assert_relative_eq!(uvs[1], 0.0);
        assert_relative_eq!(uvs[4], 0.25);
        assert_relative_eq!(uvs[11], 0.5);

        let verts = quad_vertices(&frame);
        assert_eq!(&verts[..4], &[-16.0, -32.0, 16.0, -32.0]);
    }

    #[test]
    fn test_visibility() {
        let viewport = Viewport::new(800.0, 600.0);
        assert!(SpriteComponent::is_visible(&Vector2::new(0.0, 0.0), &viewport));
        assert!(SpriteComponent::is_visible(&Vector2::new(800.0, 600.0), &viewport));
        assert!(!SpriteComponent::is_visible(&Vector2::new(-1.0, 10.0), &viewport));
        assert!(!SpriteComponent::is_visible(&Vector2::new(10.0, 601.0), &viewport));
    }
}
