//! 场景配置模块
//!
//! 用 TOML 描述一棵实体树：名称、Transform、可选的精灵以及子实体。
//!
//! ```toml
//! [[entities]]
//! name = "SandboxScene"
//! transform = { position = [400.0, 300.0] }
//!
//! [[entities.children]]
//! name = "player"
//! transform = { scale = [2.0, 2.0] }
//! sprite = { texture = "assets/Red.png", size = [256, 64], atlas = "assets/Red.json", animations = [
//!     { name = "idle", start = 0, end = 4 },
//!     { name = "walk", start = 4, end = 8 },
//! ] }
//! ```
//!
//! 顶层实体注册为根实体。

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::assets::{load_texture_packer, Animation, Texture, TextureLoader};
use crate::component::{Services, SpriteComponent, Transform};
use crate::core::error::{ConfigError, Result, Scene2dError};
use crate::math::Color;
use crate::scene::{EntityId, Scene};

/// 2D 变换数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// 位置 (x, y)
    #[serde(default = "default_position")]
    pub position: [f32; 2],

    /// 旋转（度数）
    #[serde(default)]
    pub rotation: f32,

    /// 缩放 (x, y)
    #[serde(default = "default_scale")]
    pub scale: [f32; 2],
}

fn default_position() -> [f32; 2] {
    [0.0, 0.0]
}

fn default_scale() -> [f32; 2] {
    [1.0, 1.0]
}

fn default_true() -> bool {
    true
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            position: default_position(),
            rotation: 0.0,
            scale: default_scale(),
        }
    }
}

impl TransformConfig {
    pub fn to_transform(&self) -> Transform {
        Transform::new()
            .with_position(self.position[0], self.position[1])
            .with_rotation(self.rotation)
            .with_scale(self.scale[0], self.scale[1])
    }
}

/// 动画帧区间 `[start, end)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// 精灵配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteConfig {
    /// 纹理路径（相对于场景文件）
    pub texture: String,

    /// 已知的纹理尺寸；缺省时由纹理加载器读取
    #[serde(default)]
    pub size: Option<[u32; 2]>,

    /// TexturePacker 图集路径
    #[serde(default)]
    pub atlas: Option<String>,

    /// 从图集中截取的动画，第一个为初始动画
    #[serde(default)]
    pub animations: Vec<AnimationConfig>,

    /// 着色 RGBA (0.0-1.0)
    #[serde(default)]
    pub color: Option<[f32; 4]>,

    /// 创建后是否立即启用
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// 实体配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub name: String,

    /// 缺省时实体没有 Transform
    #[serde(default)]
    pub transform: Option<TransformConfig>,

    #[serde(default)]
    pub sprite: Option<SpriteConfig>,

    #[serde(default)]
    pub children: Vec<EntityConfig>,
}

/// 场景配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

/// 构建场景时的资源上下文
struct BuildContext<'a> {
    base_dir: &'a Path,
    loader: &'a dyn TextureLoader,
    textures: HashMap<PathBuf, Rc<Texture>>,
    /// 精灵的每帧持续时间
    frame_time: Duration,
}

impl BuildContext<'_> {
    fn resolve(&self, path: &str) -> PathBuf {
        self.base_dir.join(path)
    }

    /// 同一路径的纹理只加载一次
    fn texture(&mut self, config: &SpriteConfig) -> Result<Rc<Texture>> {
        let path = self.resolve(&config.texture);
        if let Some(texture) = self.textures.get(&path) {
            return Ok(Rc::clone(texture));
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| config.texture.clone());
        let source = path.to_string_lossy().into_owned();

        let texture = match config.size {
            Some([width, height]) => Texture::with_size(name, source, width, height),
            None => {
                let texture = Texture::new(name, source);
                self.loader.load(&texture)?;
                texture
            }
        };

        let texture = Rc::new(texture);
        self.textures.insert(path, Rc::clone(&texture));
        Ok(texture)
    }

    fn animations(&self, config: &SpriteConfig) -> Result<Vec<Animation>> {
        if config.animations.is_empty() {
            return Ok(Vec::new());
        }

        let atlas_path = config.atlas.as_deref().ok_or_else(|| {
            ConfigError::MissingField(format!("sprite '{}' has animations but no atlas", config.texture))
        })?;
        let atlas = load_texture_packer(self.resolve(atlas_path))?;

        config
            .animations
            .iter()
            .map(|a| Animation::from_frames(a.name.clone(), &atlas.frames, a.start..a.end))
            .collect()
    }
}

impl SceneConfig {
    /// 从文件加载场景配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            Scene2dError::Config(ConfigError::FileNotFound(format!(
                "Failed to read scene config file '{}': {}",
                path.display(),
                e
            )))
        })?;

        Self::from_toml_str(&contents)
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| {
            Scene2dError::Config(ConfigError::ParseError(format!(
                "Failed to parse scene config: {}",
                e
            )))
        })
    }

    /// 从文件加载，如果文件不存在则返回空场景
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if path.exists() {
            match Self::from_file(path) {
                Ok(config) => {
                    tracing::info!("Loaded scene config from: {}", path.display());
                    config
                }
                Err(e) => {
                    crate::engine_warn!("Failed to load scene config: {}, using defaults", e);
                    Self::default()
                }
            }
        } else {
            tracing::info!("Scene config not found, using defaults");
            Self::default()
        }
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self).map_err(|e| {
            Scene2dError::Config(ConfigError::ParseError(format!(
                "Failed to serialize scene config: {}",
                e
            )))
        })?;

        fs::write(path, contents)?;

        tracing::info!("Saved scene config to: {}", path.display());
        Ok(())
    }

    /// 把配置构建到场景中
    ///
    /// 相对路径基于 `base_dir` 解析，所有精灵使用 `frame_time` 作为每帧持续时间。
    /// 返回创建的根实体。
    /// 精灵在整棵树建好之后才启用，保证 `on_awake` 时 Transform 已经就位。
    pub fn build(
        &self,
        scene: &mut Scene,
        services: &mut Services,
        loader: &dyn TextureLoader,
        base_dir: &Path,
        frame_time: Duration,
    ) -> Result<Vec<EntityId>> {
        let mut ctx = BuildContext {
            base_dir,
            loader,
            textures: HashMap::new(),
            frame_time,
        };
        let mut pending = Vec::new();
        let mut roots = Vec::with_capacity(self.entities.len());

        for config in &self.entities {
            let root = build_entity(config, scene, services, &mut ctx, &mut pending)?;
            scene.add_root(root);
            roots.push(root);
        }

        for (entity, sprite) in pending {
            scene.set_enabled(entity, sprite, true, services);
        }

        tracing::info!(roots = roots.len(), entities = scene.len(), "Scene built");
        Ok(roots)
    }
}

fn build_entity(
    config: &EntityConfig,
    scene: &mut Scene,
    services: &mut Services,
    ctx: &mut BuildContext<'_>,
    pending: &mut Vec<(EntityId, crate::component::ComponentId)>,
) -> Result<EntityId> {
    let entity = scene.spawn(config.name.clone());

    if let Some(transform) = &config.transform {
        scene.add_component(entity, transform.to_transform(), services);
    }

    if let Some(sprite_config) = &config.sprite {
        let texture = ctx.texture(sprite_config)?;
        let animations = ctx.animations(sprite_config)?;

        let mut sprite = SpriteComponent::new(texture)
            .with_animations(animations)
            .with_frame_time(ctx.frame_time);
        if let Some([r, g, b, a]) = sprite_config.color {
            sprite = sprite.with_color(Color::new(r, g, b, a));
        }

        if let Some(id) = scene.add_component(entity, sprite, services) {
            if sprite_config.enabled {
                pending.push((entity, id));
            }
        }
    }

    for child_config in &config.children {
        let child = build_entity(child_config, scene, services, ctx, pending)?;
        scene.add_child(entity, child);
    }

    Ok(entity)
}
