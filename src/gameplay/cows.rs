use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::app::state::AppState;
use crate::core::components::{Cow, GameplayEntity};
use crate::core::config::{CowSpawnConfig, GameConfig};
use crate::core::system::system_order::PostPhysicsAdjustSet;
use crate::gameplay::confinement::ConfinementPolicy;

/// Cows below this height have left the island for good.
pub const COW_FALL_LIMIT_Y: f32 = -20.0;

pub struct CowsPlugin;
impl Plugin for CowsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::Gameplay), spawn_cows).add_systems(
            Update,
            despawn_fallen_cows.in_set(PostPhysicsAdjustSet).run_if(in_state(AppState::Gameplay)),
        );
    }
}

/// Uniformly distributed points on the disc of `spawn_radius` around `center`,
/// lifted to `drop_height`. Deterministic when `seed` is set.
pub fn cow_spawn_points(cfg: &CowSpawnConfig, center: Vec3) -> Vec<Vec3> {
    let mut rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let radius = cfg.spawn_radius.max(0.0);
    (0..cfg.count)
        .map(|_| {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let dist = radius * rng.gen::<f32>().sqrt();
            Vec3::new(center.x + angle.cos() * dist, cfg.drop_height + cfg.half_size[1], center.z + angle.sin() * dist)
        })
        .collect()
}

fn spawn_cows(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    cfg: Res<GameConfig>,
    policy: Res<ConfinementPolicy>,
) {
    let [hx, hy, hz] = cfg.cows.half_size;
    let mesh = meshes.add(Cuboid::new(hx * 2.0, hy * 2.0, hz * 2.0));
    let material = materials.add(StandardMaterial { base_color: Color::srgb(0.95, 0.95, 0.92), ..default() });
    let points = cow_spawn_points(&cfg.cows, policy.center());
    for (i, p) in points.iter().enumerate() {
        commands.spawn((
            Cow,
            GameplayEntity,
            Name::new(format!("Cow{i}")),
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(*p).with_rotation(Quat::from_rotation_y(i as f32 * 1.3)),
            RigidBody::Dynamic,
            Collider::cuboid(hx, hy, hz),
            Velocity::zero(),
            Damping { linear_damping: 0.2, angular_damping: 0.5 },
            ActiveEvents::COLLISION_EVENTS,
        ));
    }
    info!(target: "cows", "Spawned {} cows within r={}", points.len(), cfg.cows.spawn_radius);
}

pub(crate) fn despawn_fallen_cows(mut commands: Commands, q: Query<(Entity, &Transform), With<Cow>>) {
    for (e, tf) in &q {
        if tf.translation.y < COW_FALL_LIMIT_Y {
            info!(target: "cows", "Cow {e} fell off the island");
            commands.entity(e).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn fallen_cows_are_removed() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        let keep = app.world_mut().spawn((Cow, Transform::from_xyz(0.0, 1.0, 0.0))).id();
        let gone = app.world_mut().spawn((Cow, Transform::from_xyz(0.0, -25.0, 0.0))).id();
        app.world_mut().run_system_once(despawn_fallen_cows).unwrap();
        assert!(app.world().get_entity(keep).is_ok());
        assert!(app.world().get_entity(gone).is_err());
    }

    #[test]
    fn seeded_spawn_is_deterministic_and_bounded() {
        let cfg = CowSpawnConfig { seed: Some(7), ..Default::default() };
        let a = cow_spawn_points(&cfg, Vec3::ZERO);
        let b = cow_spawn_points(&cfg, Vec3::ZERO);
        assert_eq!(a, b);
        assert_eq!(a.len(), cfg.count);
        for p in &a {
            assert!(Vec2::new(p.x, p.z).length() <= cfg.spawn_radius + 1e-4);
            assert_eq!(p.y, cfg.drop_height + cfg.half_size[1]);
        }
    }

    #[test]
    fn zero_count_spawns_nothing() {
        let cfg = CowSpawnConfig { count: 0, ..Default::default() };
        assert!(cow_spawn_points(&cfg, Vec3::ZERO).is_empty());
    }
}
