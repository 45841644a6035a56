use bevy::prelude::*;

use super::parse::parse_input_toml;
use super::systems::system_collect_inputs;
use super::types::InputMap;

pub const DEFAULT_INPUT_CONFIG_PATH: &str = "assets/config/input.toml";

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct InputActionUpdateSet;

pub struct InputActionsPlugin;
impl Plugin for InputActionsPlugin { fn build(&self, app: &mut App) { app
        .init_resource::<InputMap>()
        .configure_sets(PreUpdate, InputActionUpdateSet.after(bevy::input::InputSystem))
        .add_systems(PreStartup, load_initial_input_map)
        .add_systems(PreUpdate, system_collect_inputs.in_set(InputActionUpdateSet)); } }

fn load_initial_input_map(mut commands: Commands) {
    let path = std::env::var("INPUT_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_INPUT_CONFIG_PATH.into());
    let raw = match std::fs::read_to_string(&path) { Ok(r) => r, Err(e) => { error!(target: "input", "INPUT MAP ERROR: cannot read {path}: {e}"); String::new() } };
    let parsed = parse_input_toml(&raw);
    if !parsed.errors.is_empty() { for e in parsed.errors { error!(target: "input", "INPUT MAP ERROR: {e}"); } } else { info!(target: "input", "Input map loaded: {} actions", parsed.input_map.actions.len()); }
    commands.insert_resource(parsed.input_map); }
