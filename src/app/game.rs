use bevy::prelude::*;

use super::menu::MenuPlugin;
use super::state::{AppState, GameplayMode};
use crate::audio::VolumePlugin;
use crate::core::config::{log_config_report, ConfigHotReloadPlugin};
use crate::core::system::system_order::{MovementSet, PostPhysicsAdjustSet, PrePhysicsSet};
use crate::debug::DebugPlugin;
use crate::gameplay::GameplayPlugin;
use crate::interaction::inputmap::InputActionsPlugin;
use crate::physics::{BeamMagnetPlugin, PhysicsSetupPlugin};
use crate::rendering::CameraPlugin;

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppState>()
            .add_sub_state::<GameplayMode>()
            .configure_sets(
                Update,
                (MovementSet, PrePhysicsSet.after(MovementSet), PostPhysicsAdjustSet.after(PrePhysicsSet)),
            )
            .add_systems(PreStartup, log_config_report)
            .add_plugins((
                InputActionsPlugin,
                CameraPlugin,
                PhysicsSetupPlugin,
                BeamMagnetPlugin,
                GameplayPlugin,
                VolumePlugin,
                MenuPlugin,
                DebugPlugin,
                ConfigHotReloadPlugin,
            ));
    }
}
