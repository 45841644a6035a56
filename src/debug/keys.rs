#[cfg(feature = "debug")]
use super::DebugState;
#[cfg(feature = "debug")]
use crate::interaction::inputmap::types::InputMap;
#[cfg(feature = "debug")]
use bevy::prelude::*;
#[cfg(feature = "debug")]
use bevy_rapier3d::render::DebugRenderContext;

/// `DebugPhysics` flips the Rapier wireframe (when the render plugin is loaded)
/// together with the beam contact gizmos.
#[cfg(feature = "debug")]
pub fn debug_key_input_system(
    input_map: Option<Res<InputMap>>,
    mut state: ResMut<DebugState>,
    ctx: Option<ResMut<DebugRenderContext>>,
) {
    let Some(input_map) = input_map else {
        return;
    };
    if !input_map.just_pressed("DebugPhysics") {
        return;
    }
    state.beam_gizmos = !state.beam_gizmos;
    if let Some(mut c) = ctx {
        c.enabled = state.beam_gizmos;
    }
    info!(
        target: "debug",
        "DEBUG_PHYSICS enabled={} frame={}",
        state.beam_gizmos, state.frame_counter
    );
}
