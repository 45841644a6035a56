use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::app::state::AppState;
use crate::core::components::{GameplayEntity, Island};
use crate::gameplay::confinement::ConfinementPolicy;
use crate::gameplay::rotator::PlaneRotator;

const ISLAND_THICKNESS: f32 = 0.5;

pub struct IslandPlugin;
impl Plugin for IslandPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::Gameplay), spawn_island);
    }
}

/// Ground slab whose footprint matches the confinement policy; its top face sits at y = 0.
fn spawn_island(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    policy: Res<ConfinementPolicy>,
) {
    let (mesh, collider) = match *policy {
        ConfinementPolicy::Circle { radius, .. } => (
            meshes.add(Cylinder::new(radius, ISLAND_THICKNESS)),
            Collider::cylinder(ISLAND_THICKNESS * 0.5, radius),
        ),
        ConfinementPolicy::Square { half_extent, .. } => (
            meshes.add(Cuboid::new(half_extent * 2.0, ISLAND_THICKNESS, half_extent * 2.0)),
            Collider::cuboid(half_extent, ISLAND_THICKNESS * 0.5, half_extent),
        ),
    };
    let center = policy.center();
    commands.spawn((
        Island,
        GameplayEntity,
        PlaneRotator::default(),
        Mesh3d(mesh),
        MeshMaterial3d(materials.add(StandardMaterial { base_color: Color::srgb(0.3, 0.6, 0.25), perceptual_roughness: 0.9, ..default() })),
        Transform::from_xyz(center.x, -ISLAND_THICKNESS * 0.5, center.z),
        RigidBody::Fixed,
        collider,
    ));
    info!(target: "island", "Island spawned: {:?}", *policy);
}
