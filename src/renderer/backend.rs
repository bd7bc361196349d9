//! 渲染后端的统一接口
//!
//! GPU 相关的工作（着色器、缓冲上传、绘制调用）都由实现 [`RenderBackend`]
//! 的外部后端完成。引擎只按顺序提交命令，后端不得修改提交的数据。

use std::cell::RefCell;
use std::rc::Rc;

use uuid::Uuid;

use super::Viewport;
use crate::assets::Texture;
use crate::core::error::Result;
use crate::math::{Color, Matrix3};
use crate::scene::EntityId;

/// 一次精灵绘制
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    /// 所属实体
    pub entity: EntityId,
    /// 顶点（每个顶点 2 个 float）
    pub vertices: &'a [f32],
    /// UV，与顶点一一对应
    pub uvs: &'a [f32],
    /// Transform 的世界矩阵
    pub world_matrix: &'a Matrix3,
}

impl DrawCall<'_> {
    /// 顶点数量
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 2
    }
}

/// 渲染后端
pub trait RenderBackend {
    /// 后端名称，用于日志
    fn name(&self) -> &str;

    /// 视口尺寸变化
    fn resize(&mut self, viewport: &Viewport);

    /// 用指定颜色清屏
    fn clear(&mut self, color: &Color);

    /// 设置后续绘制的着色
    fn set_tint(&mut self, color: &Color);

    /// 绑定后续绘制使用的纹理
    fn bind_texture(&mut self, texture: &Texture);

    /// 绘制一个精灵
    fn draw(&mut self, call: &DrawCall<'_>);

    /// 提交本帧
    fn present(&mut self) -> Result<()>;
}

/// 记录下来的后端命令
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    Resize { width: f32, height: f32 },
    Clear(Color),
    SetTint(Color),
    BindTexture { id: Uuid, name: String },
    Draw {
        entity: EntityId,
        vertex_count: usize,
        uvs: Vec<f32>,
        world_matrix: Matrix3,
    },
    Present,
}

/// 共享的命令记录
pub type CommandLog = Rc<RefCell<Vec<RenderCommand>>>;

/// 只记录命令的后端
///
/// 无头运行和测试使用。后端交给渲染器之后，仍然可以通过 [`RecordingBackend::log`]
/// 返回的句柄读取记录。
#[derive(Debug, Default)]
pub struct RecordingBackend {
    log: CommandLog,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 命令记录句柄
    pub fn log(&self) -> CommandLog {
        Rc::clone(&self.log)
    }

    fn push(&self, command: RenderCommand) {
        self.log.borrow_mut().push(command);
    }
}

impl RenderBackend for RecordingBackend {
    fn name(&self) -> &str {
        "Recording"
    }

    fn resize(&mut self, viewport: &Viewport) {
        self.push(RenderCommand::Resize {
            width: viewport.width,
            height: viewport.height,
        });
    }

    fn clear(&mut self, color: &Color) {
        self.push(RenderCommand::Clear(*color));
    }

    fn set_tint(&mut self, color: &Color) {
        self.push(RenderCommand::SetTint(*color));
    }

    fn bind_texture(&mut self, texture: &Texture) {
        self.push(RenderCommand::BindTexture {
            id: texture.id(),
            name: texture.name().to_string(),
        });
    }

    fn draw(&mut self, call: &DrawCall<'_>) {
        self.push(RenderCommand::Draw {
            entity: call.entity,
            vertex_count: call.vertex_count(),
            uvs: call.uvs.to_vec(),
            world_matrix: *call.world_matrix,
        });
    }

    fn present(&mut self) -> Result<()> {
        self.push(RenderCommand::Present);
        Ok(())
    }
}
