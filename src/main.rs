//! Scene2D 沙盒
//!
//! 无头运行一个演示场景：背景、带 idle/walk 动画的玩家，以及一艘挂在玩家下面、
//! 5 秒后被移到场景根节点下的飞船。玩家由脚本化的键盘输入驱动，
//! 绘制命令交给只记录命令的后端。
//!
//! # 使用方法
//!
//! ```bash
//! # 使用内置沙盒场景
//! cargo run
//!
//! # 指定视口尺寸和帧数
//! cargo run -- --width 1280 --height 720 --frames 900
//! ```
//!
//! 工作目录下存在 `scene.toml` 时改为加载该场景。

use std::path::Path;
use std::rc::Rc;

use anyhow::{Context as _, Result};
use tracing::{debug, info};
use winit::keyboard::KeyCode;

use scene2d::assets::{parse_texture_packer, Animation, ImageDimensionsLoader, Texture};
use scene2d::component::{ActionComponent, ComponentBase, Context, SpriteComponent, Transform};
use scene2d::core::{log, Config, Runtime, SceneConfig};
use scene2d::impl_action_component;
use scene2d::renderer::{RecordingBackend, RenderCommand};
use scene2d::scene::EntityId;

/// 固定步长（60 FPS）
const FRAME_DT: f32 = 1.0 / 60.0;

/// 默认运行帧数
const DEFAULT_FRAMES: u32 = 600;

/// 飞船换父节点的时间（秒）
const SHIP_REPARENT_AT: f64 = 5.0;

/// 玩家图集：前四帧 idle，后四帧 walk
const PLAYER_ATLAS: &str = r#"{
    "frames": [
        { "filename": "idle_0", "frame": { "x": 0,   "y": 0,  "w": 32, "h": 48 }, "rotated": false, "pivot": { "x": 0.5, "y": 0.5 } },
        { "filename": "idle_1", "frame": { "x": 32,  "y": 0,  "w": 32, "h": 48 }, "rotated": false, "pivot": { "x": 0.5, "y": 0.5 } },
        { "filename": "idle_2", "frame": { "x": 64,  "y": 0,  "w": 32, "h": 48 }, "rotated": false, "pivot": { "x": 0.5, "y": 0.5 } },
        { "filename": "idle_3", "frame": { "x": 96,  "y": 0,  "w": 32, "h": 48 }, "rotated": false, "pivot": { "x": 0.5, "y": 0.5 } },
        { "filename": "walk_0", "frame": { "x": 0,   "y": 48, "w": 32, "h": 48 }, "rotated": false, "pivot": { "x": 0.5, "y": 0.5 } },
        { "filename": "walk_1", "frame": { "x": 32,  "y": 48, "w": 32, "h": 48 }, "rotated": false, "pivot": { "x": 0.5, "y": 0.5 } },
        { "filename": "walk_2", "frame": { "x": 64,  "y": 48, "w": 48, "h": 32 }, "rotated": true,  "pivot": { "x": 0.5, "y": 0.5 } },
        { "filename": "walk_3", "frame": { "x": 112, "y": 48, "w": 32, "h": 48 }, "rotated": false, "pivot": { "x": 0.5, "y": 0.5 } }
    ],
    "meta": { "image": "Red.png", "size": { "w": 144, "h": 96 } }
}"#;

/// 键盘控制玩家
///
/// - D / A：向右 / 向左行走，并水平翻转
/// - Q / E：旋转
/// - R / T：放大 / 缩小
struct PlayerMover {
    base: ComponentBase,
    speed: f32,
}

impl PlayerMover {
    fn new() -> Self {
        Self {
            base: ComponentBase::named("PlayerMover"),
            speed: 100.0,
        }
    }
}

impl ActionComponent for PlayerMover {
    fn update(&mut self, ctx: &mut Context<'_>, dt: f32) {
        let input = ctx.input();
        let (right, left) = (input.key_down(KeyCode::KeyD), input.key_down(KeyCode::KeyA));
        let (rotate_ccw, rotate_cw) = (input.key_down(KeyCode::KeyQ), input.key_down(KeyCode::KeyE));
        let (grow, shrink) = (input.key_down(KeyCode::KeyR), input.key_down(KeyCode::KeyT));

        let Some(scale_x) = ctx.transform().map(|t| t.scale().x) else {
            return;
        };

        let (animation, direction) = if right {
            ("walk", 1.0)
        } else if left {
            ("walk", -1.0)
        } else {
            ("idle", 0.0)
        };

        if let Some(sprite) = ctx.component_mut::<SpriteComponent>() {
            sprite.set_animation(animation);
        }

        let Some(mut transform) = ctx.transform_mut() else {
            return;
        };

        if direction != 0.0 {
            transform
                .set_scale(Some(direction * scale_x.abs()), None)
                .translate(direction * self.speed * dt, 0.0);
        }

        if rotate_ccw {
            let rotation = transform.get().map_or(0.0, |t| t.rotation());
            transform.set_rotation(rotation + 100.0 * dt);
        } else if rotate_cw {
            let rotation = transform.get().map_or(0.0, |t| t.rotation());
            transform.set_rotation(rotation - 100.0 * dt);
        }

        if grow {
            transform.set_scale(Some(scale_x + 10.0 * dt), None);
        } else if shrink {
            transform.set_scale(Some(scale_x - 10.0 * dt), None);
        }
    }
}

impl_action_component!(PlayerMover);

/// 内置沙盒场景中需要在运行时访问的实体
struct Sandbox {
    scene_root: EntityId,
    player: EntityId,
    ship: EntityId,
}

/// 构建内置沙盒场景
fn build_sandbox(runtime: &mut Runtime, frame_time: std::time::Duration) -> Result<Sandbox> {
    let center = runtime.services().viewport.center();

    let scene_root = runtime.scene_mut().spawn("SandboxScene");
    runtime.add_component(scene_root, Transform::new().with_position(center.x, center.y));
    runtime.add_entity(scene_root);

    // 背景
    let background = runtime.scene_mut().spawn("bg");
    runtime.add_component(background, Transform::new().with_scale(1.5, 1.5));
    let bg_texture = Rc::new(Texture::with_size("background_grass", "background_grass.png", 256, 256));
    runtime.scene_mut().add_child(scene_root, background);
    runtime.enable(background, SpriteComponent::new(bg_texture));

    // 玩家
    let atlas = parse_texture_packer(PLAYER_ATLAS).context("parsing player atlas")?;
    let idle = Animation::from_frames("idle", &atlas.frames, 0..4)?;
    let walk = Animation::from_frames("walk", &atlas.frames, 4..8)?;
    let red = Rc::new(Texture::with_size("Red", atlas.image.unwrap_or_default(), 144, 96));

    let player = runtime.scene_mut().spawn("player");
    runtime.add_component(player, Transform::new().with_scale(2.0, 2.0));
    runtime.scene_mut().add_child(scene_root, player);
    runtime.enable(
        player,
        SpriteComponent::new(red)
            .with_animations([idle, walk])
            .with_frame_time(frame_time),
    );
    runtime.enable(player, PlayerMover::new());

    // 飞船，先挂在玩家下面
    let ship = runtime.scene_mut().spawn("ship");
    runtime.add_component(ship, Transform::new().with_position(100.0, 0.0));
    let ship_texture = Rc::new(Texture::with_size("shipYellow_manned", "shipYellow_manned.png", 124, 123));
    runtime.enable(ship, SpriteComponent::new(ship_texture));
    runtime.scene_mut().add_child(player, ship);

    Ok(Sandbox {
        scene_root,
        player,
        ship,
    })
}

/// 脚本化输入：按模拟时间决定按住哪个键
fn scripted_key(elapsed: f64) -> Option<KeyCode> {
    match elapsed {
        t if t < 1.5 => Some(KeyCode::KeyD),
        t if t < 2.5 => Some(KeyCode::KeyA),
        t if t < 3.0 => Some(KeyCode::KeyQ),
        t if t < 3.5 => Some(KeyCode::KeyR),
        _ => None,
    }
}

fn main() -> Result<()> {
    // 1. 加载配置（在初始化日志之前）
    let mut config = Config::from_file_or_default("config.toml");
    config.apply_args(std::env::args());
    config.validate().context("invalid configuration")?;

    // 2. 初始化日志系统
    let log_file = config
        .logging
        .file_output
        .then_some(config.logging.log_file.as_str());
    log::init_logger(config.logging.level, config.logging.file_output, log_file);
    info!(version = env!("CARGO_PKG_VERSION"), "Scene2D sandbox starting");

    // 3. 创建引擎
    let backend = RecordingBackend::new();
    let commands = backend.log();
    let mut runtime = Runtime::new(&config, Some(Box::new(backend)));

    // 4. 构建场景
    let scene_path = Path::new("scene.toml");
    let sandbox = if scene_path.exists() {
        let scene_config = SceneConfig::from_file(scene_path)?;
        let (scene, services) = runtime.parts_mut();
        scene_config
            .build(
                scene,
                services,
                &ImageDimensionsLoader,
                Path::new("."),
                config.animation.frame_time(),
            )
            .context("building scene.toml")?;
        None
    } else {
        Some(build_sandbox(&mut runtime, config.animation.frame_time())?)
    };

    // 5. 主循环
    let frames = config.frames.unwrap_or(DEFAULT_FRAMES);
    let mut held: Option<KeyCode> = None;
    let mut ship_moved = false;

    info!(frames, "Entering main loop...");
    for _ in 0..frames {
        let wanted = scripted_key(runtime.elapsed());
        if wanted != held {
            let input = &mut runtime.services_mut().input;
            if let Some(key) = held {
                input.release(key);
            }
            if let Some(key) = wanted {
                input.press(key);
            }
            held = wanted;
        }

        if let Some(sandbox) = &sandbox {
            if !ship_moved && runtime.elapsed() >= SHIP_REPARENT_AT {
                let scene = runtime.scene_mut();
                scene.remove_child(sandbox.player, sandbox.ship);
                scene.add_child(sandbox.scene_root, sandbox.ship);
                ship_moved = true;
                info!("Ship moved from player to scene root");
            }
        }

        let stats = runtime.tick(FRAME_DT);
        debug!(frame = runtime.frame(), drawn = stats.drawn, skipped = stats.skipped, "Frame done");
    }

    // 6. 输出统计
    let draws = commands
        .borrow()
        .iter()
        .filter(|c| matches!(c, RenderCommand::Draw { .. }))
        .count();
    info!(
        frames = runtime.frame(),
        simulated_seconds = runtime.elapsed(),
        draws,
        "Sandbox finished"
    );

    if let Some(sandbox) = &sandbox {
        if let Some(player) = runtime.scene().transform(sandbox.player) {
            info!(position = ?player.world_position(), rotation = player.rotation(), "Player final state");
        }
    }

    Ok(())
}
