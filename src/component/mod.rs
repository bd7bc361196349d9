//! 组件系统模块
//!
//! 实体由一组组件构成。数据组件只保存状态（`Transform`），
//! 行为组件响应生命周期和逐帧阶段（`SpriteComponent` 以及用户脚本）。

pub(crate) mod action;
mod component;
mod context;
mod entity;
mod sprite;
mod transform;

pub use action::{ActionComponent, Phase};
pub use component::{Component, ComponentBase, ComponentId, ComponentKind};
pub use context::{Context, Services};
pub use entity::Entity;
pub use sprite::{SpriteComponent, DEFAULT_FRAME_NAME, DEFAULT_FRAME_TIME, QUAD_VERTEX_COUNT};
pub use transform::{Transform, WorldFrame};
