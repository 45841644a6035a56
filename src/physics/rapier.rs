use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::core::config::GameConfig;

pub struct PhysicsSetupPlugin; // our wrapper to configure Rapier

impl Plugin for PhysicsSetupPlugin {
    fn build(&self, app: &mut App) {
        let debug_render = app
            .world()
            .get_resource::<GameConfig>()
            .map(|c| c.physics.rapier_debug)
            .unwrap_or(false);
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
            .add_systems(PostStartup, configure_gravity);
        if debug_render {
            app.add_plugins(RapierDebugRenderPlugin::default());
        }
    }
}

// RapierConfiguration is a component on the rapier context entity, spawned during Startup.
fn configure_gravity(mut q_cfg: Query<&mut RapierConfiguration>, game_cfg: Res<GameConfig>) {
    for mut rapier_cfg in &mut q_cfg {
        rapier_cfg.gravity = Vect::new(0.0, game_cfg.physics.gravity_y, 0.0);
    }
    info!(target: "physics", "Rapier gravity set to {}", game_cfg.physics.gravity_y);
}
