use bevy::prelude::*;

use crate::core::config::GameConfig;

/// Camera offset from the island centre.
pub const CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 18.0, 22.0);

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(AmbientLight { color: Color::WHITE, brightness: 300.0, ..default() })
            .add_systems(Startup, setup_camera);
    }
}

fn setup_camera(mut commands: Commands, cfg: Res<GameConfig>) {
    let center = Vec3::from_array(cfg.island.center);
    // Also renders the menu UI.
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(center + CAMERA_OFFSET).looking_at(center, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight { illuminance: 8_000.0, shadows_enabled: true, ..default() },
        Transform::from_xyz(8.0, 20.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}
