//! 图集驱动的帧动画

use std::rc::Rc;
use std::time::Duration;

use approx::assert_relative_eq;

use scene2d::assets::{parse_texture_packer, Animation, Frame, Texture};
use scene2d::component::{SpriteComponent, DEFAULT_FRAME_TIME, QUAD_VERTEX_COUNT};

const HERO_ATLAS: &str = r#"{
    "frames": {
        "run_0": { "frame": { "x": 0,  "y": 0, "w": 32, "h": 32 } },
        "run_1": { "frame": { "x": 32, "y": 0, "w": 32, "h": 32 } },
        "run_2": { "frame": { "x": 64, "y": 0, "w": 32, "h": 32 } },
        "run_3": { "frame": { "x": 96, "y": 0, "w": 32, "h": 32 } }
    },
    "meta": { "image": "hero.png" }
}"#;

fn hero() -> SpriteComponent {
    let atlas = parse_texture_packer(HERO_ATLAS).unwrap();
    let run = Animation::from_frames("run", &atlas.frames, 0..4).unwrap();
    let texture = Rc::new(Texture::with_size("hero", "hero.png", 128, 32));
    SpriteComponent::new(texture).with_animations([run])
}

#[test]
fn four_frame_animation_advances_every_frame_time() {
    let mut sprite = hero();
    assert_eq!(sprite.frame_time(), DEFAULT_FRAME_TIME);

    let step = Duration::from_millis(25);
    let mut elapsed = Duration::ZERO;
    let mut checkpoints = Vec::new();

    while elapsed < Duration::from_millis(625) {
        sprite.update_frames(step);
        elapsed += step;
        if elapsed.as_millis() % 150 == 0 {
            checkpoints.push((elapsed.as_millis(), sprite.current_frame_index()));
        }
    }

    assert_eq!(checkpoints, [(150, 1), (300, 2), (450, 3), (600, 0)]);
    assert_eq!(sprite.current_frame_index(), 0);
    assert_eq!(sprite.current_frame().map(Frame::name), Some("run_0"));
}

#[test]
fn geometry_follows_current_frame() {
    let mut sprite = hero();
    sprite.advance(0.0);
    let first_uvs = sprite.uvs().to_vec();
    assert_relative_eq!(first_uvs[2], 0.25);

    sprite.update_frames(Duration::from_millis(150));
    assert!(sprite.is_vert_update_scheduled());
    sprite.advance(0.0);

    assert_eq!(sprite.vertices().len(), QUAD_VERTEX_COUNT * 2);
    assert_relative_eq!(sprite.uvs()[0], 0.25);
    assert_relative_eq!(sprite.uvs()[2], 0.5);
    assert_ne!(sprite.uvs(), first_uvs.as_slice());
}

#[test]
fn shared_frame_reuses_cached_uvs_across_animations() {
    let shared = Frame::new("stand", 0.0, 0.0, 16.0, 16.0);
    let idle = Animation::new("idle", vec![shared.clone(), Frame::new("blink", 16.0, 0.0, 16.0, 16.0)]);
    let wave = Animation::new("wave", vec![shared, Frame::new("wave_1", 32.0, 0.0, 16.0, 16.0)]);
    let texture = Rc::new(Texture::with_size("npc", "npc.png", 64, 16));
    let mut sprite = SpriteComponent::new(texture).with_animations([idle, wave]);

    sprite.advance(0.0);
    let idle_uvs = sprite.uvs().to_vec();
    assert_eq!(sprite.uv_cache_misses(), 1);

    sprite.set_animation("wave");
    sprite.advance(0.0);

    assert_eq!(sprite.animation_name(), Some("wave"));
    assert_eq!(sprite.uvs(), idle_uvs.as_slice());
    assert_eq!(sprite.uv_cache_misses(), 1);
}

#[test]
fn reselecting_current_animation_keeps_progress() {
    let mut sprite = hero();
    sprite.update_frames(Duration::from_millis(300));
    sprite.update_frames(Duration::from_millis(100));
    assert_eq!(sprite.current_frame_index(), 1);

    sprite.set_animation("run");
    sprite.update_frames(Duration::from_millis(50));

    // 100 + 50 达到帧间隔，说明计时器没有被重置
    assert_eq!(sprite.current_frame_index(), 2);
}

#[test]
fn sprite_without_animation_covers_whole_texture() {
    let texture = Rc::new(Texture::with_size("bg", "bg.png", 200, 100));
    let mut sprite = SpriteComponent::new(texture);
    assert!(sprite.current_frame().is_none());

    sprite.advance(0.016);

    assert_eq!(
        sprite.vertices(),
        &[-100.0, -50.0, 100.0, -50.0, -100.0, 50.0, -100.0, 50.0, 100.0, -50.0, 100.0, 50.0]
    );
    assert_eq!(sprite.uvs(), &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0]);
}

#[test]
fn custom_frame_time_is_respected() {
    let mut sprite = hero().with_frame_time(Duration::from_millis(50));
    sprite.advance(0.03);
    assert_eq!(sprite.current_frame_index(), 0);
    sprite.advance(0.03);
    assert_eq!(sprite.current_frame_index(), 1);
}
