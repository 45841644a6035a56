use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};
use bevy_rapier3d::prelude::*;

use crate::app::state::{AppState, GameplayMode};
use crate::core::components::{GameplayEntity, MoverVelocity, Ufo};
use crate::core::config::{GameConfig, UfoConfig};
use crate::core::system::system_order::MovementSet;
use crate::gameplay::confinement::ConfinementPolicy;
use crate::gameplay::smoothing::smooth_damp_vec3;
use crate::geometry::cone::generate_beam_cone;
use crate::interaction::inputmap::{InputMap, InputSource};
use crate::physics::magnet::{BeamContacts, BeamMagnet};

/// Spring state for stick / key acceleration.
#[derive(Component, Debug, Default, Deref, DerefMut)]
pub struct VelocitySmoothing(pub Vec3);

/// Links a UFO to its beam child. `beam` is `None` when the beam failed to build.
#[derive(Component, Debug, Default)]
pub struct UfoBeam {
    pub beam: Option<Entity>,
    /// Set by `Drop`; keeps the beam off until `Beam` is pressed again.
    pub dropped: bool,
}

pub struct UfoPlugin;
impl Plugin for UfoPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::Gameplay), spawn_ufo)
            .add_systems(OnEnter(GameplayMode::Flying), lock_cursor)
            .add_systems(OnExit(GameplayMode::Flying), release_cursor)
            .add_systems(
                Update,
                (drive_ufo, toggle_beam.after(drive_ufo))
                    .in_set(MovementSet)
                    .run_if(in_state(AppState::Gameplay)),
            );
    }
}

/// Advance one mover step: pick a target velocity from the move input, ease
/// toward it (or jump to it for mouse input), integrate, pin the height and
/// confine to the island. Returns the new position.
pub fn step_mover(
    cfg: &UfoConfig,
    policy: &ConfinementPolicy,
    input: Vec2,
    source: InputSource,
    position: Vec3,
    velocity: &mut Vec3,
    smoothing: &mut Vec3,
    dt: f32,
) -> Vec3 {
    let speed = match source { InputSource::Mouse => cfg.mouse_move_speed, _ => cfg.gamepad_move_speed };
    let target = Vec3::new(input.x, 0.0, -input.y) * speed;
    if source == InputSource::Mouse {
        *velocity = target;
        *smoothing = Vec3::ZERO;
    } else {
        *velocity = smooth_damp_vec3(*velocity, target, smoothing, cfg.acceleration_time.max(0.0), dt);
    }
    let mut next = position + *velocity * dt;
    next.y = cfg.fixed_y;
    policy.apply(next)
}

fn spawn_ufo(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    cfg: Res<GameConfig>,
    policy: Res<ConfinementPolicy>,
) {
    let start = Vec3::new(policy.center().x, cfg.ufo.fixed_y, policy.center().z);
    let hull = meshes.add(Sphere::new(0.8).mesh().uv(24, 12));
    let hull_mat = materials.add(StandardMaterial { base_color: Color::srgb(0.7, 0.72, 0.78), metallic: 0.8, perceptual_roughness: 0.3, ..default() });
    let ufo = commands
        .spawn((
            Ufo,
            GameplayEntity,
            MoverVelocity::default(),
            VelocitySmoothing::default(),
            Transform::from_translation(start),
            Visibility::Visible,
            RigidBody::KinematicPositionBased,
        ))
        .with_child((Mesh3d(hull), MeshMaterial3d(hull_mat), Transform::from_scale(Vec3::new(1.0, 0.35, 1.0))))
        .id();

    let params = cfg.beam.shape_params();
    let beam = match generate_beam_cone(&params) {
        Ok(mesh) => {
            let material = materials.add(StandardMaterial {
                base_color: params.color,
                alpha_mode: AlphaMode::Blend,
                unlit: true,
                cull_mode: None,
                ..default()
            });
            let mut beam = commands.spawn((
                Name::new("TractorBeam"),
                BeamMagnet::new(cfg.magnet),
                BeamContacts::default(),
                Mesh3d(meshes.add(mesh.to_mesh())),
                MeshMaterial3d(material),
                Transform::IDENTITY,
                Visibility::Hidden,
            ));
            match mesh.to_convex_collider() {
                Some(collider) => {
                    beam.insert((collider, Sensor, ActiveEvents::COLLISION_EVENTS, ColliderDisabled));
                }
                None => warn!(target: "beam", "beam hull degenerate; beam will not collect cows"),
            }
            let id = beam.id();
            commands.entity(ufo).add_child(id);
            info!(
                target: "beam",
                "Beam built: segments={} length={} half_angle={} base_radius={:.2} pull_force={} threshold={} pull_radius={}",
                params.segments, params.length, params.half_angle_deg, params.base_radius(),
                cfg.magnet.pull_force, cfg.magnet.drop_speed_threshold, cfg.magnet.pull_radius
            );
            Some(id)
        }
        Err(e) => {
            error!(target: "beam", "Beam not built: {e}; UFO spawns without a beam");
            None
        }
    };
    commands.entity(ufo).insert(UfoBeam { beam, dropped: false });
    info!(target: "ufo", "UFO spawned at {:?}", start);
}

fn drive_ufo(
    time: Res<Time>,
    input: Res<InputMap>,
    cfg: Res<GameConfig>,
    policy: Res<ConfinementPolicy>,
    mode: Option<Res<State<GameplayMode>>>,
    mut q_ufo: Query<(&mut Transform, &mut MoverVelocity, &mut VelocitySmoothing, &UfoBeam), With<Ufo>>,
    mut q_magnets: Query<&mut BeamMagnet>,
) {
    let dt = time.delta_secs();
    let mut move_input = input.axis2("Move");
    let source = input.axis_source("Move");
    // The mouse aims the building preview while in build mode.
    let building = mode.is_some_and(|m| *m.get() == GameplayMode::Building);
    if building && source == InputSource::Mouse { move_input = Vec2::ZERO; }
    for (mut tf, mut vel, mut smoothing, beam) in &mut q_ufo {
        tf.translation = step_mover(&cfg.ufo, &policy, move_input, source, tf.translation, &mut vel.0, &mut smoothing.0, dt);
        if let Some(mut magnet) = beam.beam.and_then(|b| q_magnets.get_mut(b).ok()) {
            magnet.mover_speed = vel.length();
        }
    }
}

fn toggle_beam(
    mut commands: Commands,
    input: Res<InputMap>,
    mut q_ufo: Query<&mut UfoBeam, With<Ufo>>,
    mut q_beams: Query<(&mut BeamMagnet, &mut Visibility, Has<Collider>)>,
) {
    let beam_pressed = input.pressed("Beam");
    for mut link in &mut q_ufo {
        if input.just_pressed("Beam") { link.dropped = false; }
        if input.just_pressed("Drop") && !link.dropped {
            link.dropped = true;
            info!(target: "beam", "Beam dropped");
        }
        let Some(beam) = link.beam else { continue; };
        let Ok((mut magnet, mut visibility, has_collider)) = q_beams.get_mut(beam) else { continue; };
        let want = beam_pressed && !link.dropped;
        if magnet.active == want { continue; }
        magnet.active = want;
        *visibility = if want { Visibility::Inherited } else { Visibility::Hidden };
        if has_collider {
            if want { commands.entity(beam).remove::<ColliderDisabled>(); } else { commands.entity(beam).insert(ColliderDisabled); }
        }
    }
}

fn lock_cursor(mut q_window: Query<&mut Window, With<PrimaryWindow>>) {
    let Ok(mut window) = q_window.single_mut() else { return; };
    window.cursor_options.grab_mode = CursorGrabMode::Locked;
    window.cursor_options.visible = false;
}

fn release_cursor(mut q_window: Query<&mut Window, With<PrimaryWindow>>) {
    let Ok(mut window) = q_window.single_mut() else { return; };
    window.cursor_options.grab_mode = CursorGrabMode::None;
    window.cursor_options.visible = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::inputmap::parse::parse_input_toml;
    use crate::interaction::inputmap::types::{AnalogSource, RawBindingToken, RawInputFrame};
    use bevy::ecs::system::RunSystemOnce;
    use std::time::Duration;

    const CONTROLS: &str = r#"
        [actions.Move]
        kind = "Axis2"
        [actions.Beam]
        [actions.Drop]

        [bindings]
        Beam = ["Key:Space"]
        Drop = ["Key:F"]

        [[virtual_axes]]
        name = "Move"
        pos = "Key:D"
        neg = "Key:A"

        [[analog]]
        action = "Move"
        source = "Mouse:Motion"
        scale = 0.1
    "#;

    fn controls() -> InputMap {
        let parsed = parse_input_toml(CONTROLS);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        parsed.input_map
    }

    fn feed(app: &mut App, keys: &[KeyCode], mouse: Option<Vec2>) {
        let mut frame = RawInputFrame::default();
        for k in keys { frame.press(RawBindingToken::Key(*k)); }
        if let Some(m) = mouse { frame.set_analog(AnalogSource::MouseMotion, m); }
        app.world_mut().resource_mut::<InputMap>().apply_frame(&frame, 0.016);
    }

    /// UFO with a beam child carrying a disabled sensor, as `spawn_ufo` builds it.
    fn ufo_app() -> (App, Entity, Entity) {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(GameConfig::default());
        app.insert_resource(ConfinementPolicy::Circle { center: Vec3::ZERO, radius: 15.0 });
        app.insert_resource(controls());
        app.world_mut().resource_mut::<Time>().advance_by(Duration::from_millis(100));
        let beam = app
            .world_mut()
            .spawn((BeamMagnet::new(Default::default()), Visibility::Hidden, Collider::ball(1.0), Sensor, ColliderDisabled))
            .id();
        let ufo = app
            .world_mut()
            .spawn((
                Ufo,
                MoverVelocity::default(),
                VelocitySmoothing::default(),
                Transform::from_xyz(0.0, 2.0, 0.0),
                UfoBeam { beam: Some(beam), dropped: false },
            ))
            .id();
        (app, ufo, beam)
    }

    fn beam_on(app: &App, beam: Entity) -> bool {
        let world = app.world();
        let active = world.get::<BeamMagnet>(beam).unwrap().active;
        assert_eq!(*world.get::<Visibility>(beam).unwrap() == Visibility::Inherited, active);
        assert_eq!(world.get::<ColliderDisabled>(beam).is_none(), active);
        active
    }

    #[test]
    fn beam_follows_press_and_release() {
        let (mut app, _, beam) = ufo_app();
        feed(&mut app, &[KeyCode::Space], None);
        app.world_mut().run_system_once(toggle_beam).unwrap();
        assert!(beam_on(&app, beam));

        feed(&mut app, &[], None);
        app.world_mut().run_system_once(toggle_beam).unwrap();
        assert!(!beam_on(&app, beam));
    }

    #[test]
    fn drop_latches_beam_off_until_beam_pressed_again() {
        let (mut app, ufo, beam) = ufo_app();
        feed(&mut app, &[KeyCode::Space], None);
        app.world_mut().run_system_once(toggle_beam).unwrap();
        assert!(beam_on(&app, beam));

        feed(&mut app, &[KeyCode::Space, KeyCode::KeyF], None);
        app.world_mut().run_system_once(toggle_beam).unwrap();
        assert!(!beam_on(&app, beam));
        assert!(app.world().get::<UfoBeam>(ufo).unwrap().dropped);

        // Beam still held: stays off.
        feed(&mut app, &[KeyCode::Space], None);
        app.world_mut().run_system_once(toggle_beam).unwrap();
        assert!(!beam_on(&app, beam));

        feed(&mut app, &[], None);
        app.world_mut().run_system_once(toggle_beam).unwrap();
        feed(&mut app, &[KeyCode::Space], None);
        app.world_mut().run_system_once(toggle_beam).unwrap();
        assert!(beam_on(&app, beam));
    }

    #[test]
    fn drop_wins_when_pressed_with_beam() {
        let (mut app, ufo, beam) = ufo_app();
        feed(&mut app, &[KeyCode::Space, KeyCode::KeyF], None);
        app.world_mut().run_system_once(toggle_beam).unwrap();
        assert!(!beam_on(&app, beam));
        assert!(app.world().get::<UfoBeam>(ufo).unwrap().dropped);
    }

    #[test]
    fn drive_writes_speed_to_beam() {
        let (mut app, ufo, beam) = ufo_app();
        feed(&mut app, &[], Some(Vec2::new(5.0, 0.0)));
        app.world_mut().run_system_once(drive_ufo).unwrap();
        let world = app.world();
        let pos = world.get::<Transform>(ufo).unwrap().translation;
        assert!((pos - Vec3::new(0.5, 2.0, 0.0)).length() < 1e-4, "{pos:?}");
        let speed = world.get::<MoverVelocity>(ufo).unwrap().length();
        assert!((speed - 5.0).abs() < 1e-4);
        assert_eq!(world.get::<BeamMagnet>(beam).unwrap().mover_speed, speed);
    }

    #[test]
    fn mouse_does_not_fly_in_build_mode() {
        let (mut app, ufo, _) = ufo_app();
        app.insert_resource(State::new(GameplayMode::Building));
        feed(&mut app, &[], Some(Vec2::new(5.0, 0.0)));
        app.world_mut().run_system_once(drive_ufo).unwrap();
        assert_eq!(app.world().get::<Transform>(ufo).unwrap().translation, Vec3::new(0.0, 2.0, 0.0));

        // Keys still fly the saucer.
        feed(&mut app, &[KeyCode::KeyD], None);
        app.world_mut().run_system_once(drive_ufo).unwrap();
        assert!(app.world().get::<Transform>(ufo).unwrap().translation.x > 0.0);
    }

    fn spawn_app(cfg: GameConfig) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(cfg);
        app.init_resource::<ConfinementPolicy>();
        app.init_resource::<Assets<Mesh>>();
        app.init_resource::<Assets<StandardMaterial>>();
        app.world_mut().run_system_once(spawn_ufo).unwrap();
        app
    }

    #[test]
    fn spawn_builds_hidden_disabled_beam() {
        let mut app = spawn_app(GameConfig::default());
        let world = app.world_mut();
        let link = world.query_filtered::<&UfoBeam, With<Ufo>>().single(world).unwrap();
        let beam = link.beam.expect("beam built");
        assert!(!link.dropped);
        assert_eq!(*world.get::<Visibility>(beam).unwrap(), Visibility::Hidden);
        assert!(world.get::<Collider>(beam).is_some());
        assert!(world.get::<ColliderDisabled>(beam).is_some());
        assert!(!world.get::<BeamMagnet>(beam).unwrap().active);
    }

    #[test]
    fn invalid_beam_spawns_ufo_without_beam() {
        let mut cfg = GameConfig::default();
        cfg.beam.segments = 2;
        let mut app = spawn_app(cfg);
        let world = app.world_mut();
        let link = world.query_filtered::<&UfoBeam, With<Ufo>>().single(world).unwrap();
        assert!(link.beam.is_none());
        assert_eq!(world.query::<&BeamMagnet>().iter(world).count(), 0);
    }

    fn policy() -> ConfinementPolicy { ConfinementPolicy::Circle { center: Vec3::ZERO, radius: 15.0 } }

    #[test]
    fn mouse_input_is_immediate() {
        let cfg = UfoConfig::default();
        let (mut v, mut s) = (Vec3::ZERO, Vec3::ZERO);
        let pos = step_mover(&cfg, &policy(), Vec2::new(1.0, 0.0), InputSource::Mouse, Vec3::new(0.0, 2.0, 0.0), &mut v, &mut s, 0.1);
        assert_eq!(v, Vec3::new(10.0, 0.0, 0.0));
        assert!((pos - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn stick_input_eases_in() {
        let cfg = UfoConfig::default();
        let (mut v, mut s) = (Vec3::ZERO, Vec3::ZERO);
        step_mover(&cfg, &policy(), Vec2::new(0.0, 1.0), InputSource::Gamepad, Vec3::ZERO, &mut v, &mut s, 1.0 / 60.0);
        assert!(v.z < 0.0, "forward is -Z");
        assert!(v.length() < cfg.gamepad_move_speed);
        for _ in 0..120 { step_mover(&cfg, &policy(), Vec2::new(0.0, 1.0), InputSource::Gamepad, Vec3::ZERO, &mut v, &mut s, 1.0 / 60.0); }
        assert!((v.length() - cfg.gamepad_move_speed).abs() < 0.05);
    }

    #[test]
    fn height_pinned_and_confined() {
        let cfg = UfoConfig::default();
        let (mut v, mut s) = (Vec3::ZERO, Vec3::ZERO);
        let pos = step_mover(&cfg, &policy(), Vec2::new(1.0, 0.0), InputSource::Mouse, Vec3::new(14.9, 7.0, 0.0), &mut v, &mut s, 1.0);
        assert!((pos - Vec3::new(15.0, cfg.fixed_y, 0.0)).length() < 1e-4, "{pos:?}");
    }
}
