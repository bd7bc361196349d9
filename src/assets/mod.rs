//! 资源模块
//!
//! 精灵动画需要的资源描述：帧、动画、纹理句柄以及 TexturePacker 图集解析。

mod animation;
mod atlas;
mod frame;
mod texture;

pub use animation::Animation;
pub use atlas::{load_texture_packer, parse_texture_packer, Atlas};
pub use frame::Frame;
pub use texture::{ImageDimensionsLoader, Texture, TextureLoader, TextureState};
