//! Scene2D - 最小化的 2D 场景引擎
//!
//! 实体组成一棵场景树，每个实体挂载若干组件：
//! 数据组件保存状态（`Transform`），行为组件响应生命周期和逐帧阶段（`SpriteComponent`）。
//! Transform 的修改会立即传播到整个子树；精灵组件推进帧动画并生成渲染用的顶点/UV。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（日志、配置、错误处理、输入、场景描述、帧驱动）
//! - `math`: 2D 向量、3x3 仿射矩阵、颜色
//! - `component`: 组件系统（Transform、SpriteComponent、行为组件生命周期）
//! - `scene`: 实体 arena、父子关系、矩阵传播、阶段分发
//! - `assets`: 帧、动画、纹理、TexturePacker 图集
//! - `renderer`: 渲染后端接口与精灵提交
//!
//! # 使用示例
//!
//! ```
//! use scene2d::component::Transform;
//! use scene2d::core::{Config, Runtime};
//!
//! let mut runtime = Runtime::new(&Config::default(), None);
//!
//! let root = runtime.scene_mut().spawn("root");
//! runtime.add_entity(root);
//! runtime.add_component(root, Transform::new());
//!
//! let child = runtime.scene_mut().spawn("child");
//! runtime.add_component(child, Transform::new().with_position(10.0, 0.0));
//! runtime.scene_mut().add_child(root, child);
//!
//! runtime.scene_mut().transform_mut(root).unwrap().translate(5.0, 0.0);
//! runtime.tick(0.016);
//!
//! let world = runtime.scene().transform(child).unwrap().world_position();
//! assert_eq!(world.x, 15.0);
//! ```

pub mod assets;
pub mod component;
pub mod core;
pub mod math;
pub mod renderer;
pub mod scene;
