//! Debug module: feature gated state logging and physics visualization.
//! Built only when compiled with `--features debug`.

#[cfg(feature = "debug")]
pub mod keys; // pub for testing
#[cfg(feature = "debug")]
mod logging;

#[cfg(feature = "debug")]
use bevy::prelude::*;
#[cfg(feature = "debug")]
use crate::app::state::AppState;
#[cfg(feature = "debug")]
use crate::core::system::system_order::PostPhysicsAdjustSet;
#[cfg(feature = "debug")]
use crate::physics::magnet::{BeamContacts, BeamMagnet};

#[cfg(feature = "debug")]
#[derive(Resource, Debug)]
pub struct DebugState {
    pub frame_counter: u64,
    pub time_accum: f32,
    /// Seconds between state log lines.
    pub log_interval: f32,
    pub beam_gizmos: bool,
}
#[cfg(feature = "debug")]
impl Default for DebugState {
    fn default() -> Self {
        Self { frame_counter: 0, time_accum: 0.0, log_interval: 1.0, beam_gizmos: false }
    }
}

#[cfg(feature = "debug")]
pub struct DebugPlugin;
#[cfg(feature = "debug")]
impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        use keys::debug_key_input_system;
        use logging::debug_logging_system;

        fn beam_contact_gizmos(
            state: Res<DebugState>,
            q_beams: Query<(&BeamMagnet, &BeamContacts, &GlobalTransform)>,
            q_targets: Query<&GlobalTransform>,
            mut gizmos: Gizmos,
        ) {
            if !state.beam_gizmos { return; }
            for (magnet, contacts, beam_tf) in &q_beams {
                if !magnet.active { continue; }
                let origin = beam_tf.translation();
                for c in contacts.iter() {
                    if let Ok(tf) = q_targets.get(*c) {
                        gizmos.line(origin, tf.translation(), Color::srgb(1.0, 0.9, 0.2));
                    }
                }
            }
        }

        app.init_resource::<DebugState>().add_systems(
            Update,
            (debug_key_input_system, debug_logging_system, beam_contact_gizmos)
                .chain()
                .in_set(PostPhysicsAdjustSet)
                .run_if(in_state(AppState::Gameplay)),
        );
    }
}

#[cfg(not(feature = "debug"))]
pub struct DebugPlugin;
#[cfg(not(feature = "debug"))]
impl bevy::prelude::Plugin for DebugPlugin {
    fn build(&self, _app: &mut bevy::prelude::App) {}
}
