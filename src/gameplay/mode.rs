use bevy::prelude::*;

use crate::app::state::{AppState, GameplayMode};
use crate::interaction::inputmap::InputMap;

pub struct ModePlugin;
impl Plugin for ModePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, toggle_build_mode.run_if(in_state(AppState::Gameplay)));
    }
}

pub fn next_mode(mode: GameplayMode) -> GameplayMode {
    match mode {
        GameplayMode::Flying => GameplayMode::Building,
        GameplayMode::Building => GameplayMode::Flying,
    }
}

fn toggle_build_mode(
    input: Res<InputMap>,
    mode: Res<State<GameplayMode>>,
    mut next: ResMut<NextState<GameplayMode>>,
) {
    if !input.just_pressed("Mode") { return; }
    let to = next_mode(*mode.get());
    info!(target: "building", "Mode {:?} -> {:?}", mode.get(), to);
    next.set(to);
}
