use bevy::prelude::*;

/// High-level app lifecycle state.
/// MainMenu -> Gameplay, MainMenu <-> Settings
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    #[default]
    MainMenu,
    /// Music volume slider.
    Settings,
    /// Island loaded, UFO under player control.
    Gameplay,
}

/// What the player's inputs drive while in gameplay. Toggled by the `Mode` action.
#[derive(SubStates, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[source(AppState = AppState::Gameplay)]
pub enum GameplayMode {
    #[default]
    Flying,
    Building,
}
