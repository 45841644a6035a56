#[cfg(feature = "debug")]
use bevy::prelude::*;
#[cfg(feature = "debug")]
use super::DebugState;
#[cfg(feature = "debug")]
use crate::app::state::GameplayMode;
#[cfg(feature = "debug")]
use crate::core::components::{Building, Cow, MoverVelocity, Ufo};
#[cfg(feature = "debug")]
use crate::physics::magnet::{BeamContacts, BeamMagnet};

#[cfg(feature = "debug")]
pub fn debug_logging_system(
    time: Res<Time>,
    mut state: ResMut<DebugState>,
    mode: Option<Res<State<GameplayMode>>>,
    q_ufo: Query<(&Transform, &MoverVelocity), With<Ufo>>,
    q_beams: Query<(&BeamMagnet, &BeamContacts)>,
    q_cows: Query<(), With<Cow>>,
    q_buildings: Query<(), With<Building>>,
) {
    state.frame_counter += 1;
    state.time_accum += time.delta_secs();
    if state.time_accum < state.log_interval { return; }
    state.time_accum = 0.0;
    let Ok((tf, vel)) = q_ufo.single() else { return; };
    let (active, held, mover_speed) = q_beams
        .iter()
        .next()
        .map(|(m, c)| (m.active, c.len(), m.mover_speed))
        .unwrap_or((false, 0, 0.0));
    info!(target: "ufo", "SIM frame={} t={:.3}s mode={:?} ufo=({:.2},{:.2},{:.2}) speed={:.2} beam_speed={:.2} beam={} held={} cows={} buildings={}",
        state.frame_counter,
        time.elapsed_secs(),
        mode.map(|m| *m.get()),
        tf.translation.x, tf.translation.y, tf.translation.z,
        vel.length(),
        mover_speed,
        active,
        held,
        q_cows.iter().count(),
        q_buildings.iter().count());
}
