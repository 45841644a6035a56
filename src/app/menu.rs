use bevy::prelude::*;
use bevy::ui::{AlignItems, FlexDirection, JustifyContent, Node};

use super::state::AppState;
use crate::audio::volume::{MusicVolume, SetMusicVolume};
use crate::core::config::GameConfig;

/// Navigation requests raised by menu buttons (and Escape in gameplay).
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Play,
    OpenSettings,
    BackFromSettings,
    BackToMenu,
    Quit,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
enum MenuButton {
    Action(MenuAction),
    /// Nudges the music slider by `sign * slider_step`.
    VolumeStep(f32),
}

#[derive(Component)]
struct MenuUiRoot;
#[derive(Component)]
struct SettingsUiRoot;
#[derive(Component)]
struct VolumeFill;
#[derive(Component)]
struct VolumeLabel;

const BUTTON_IDLE: Color = Color::srgb(0.15, 0.18, 0.25);
const BUTTON_HOVER: Color = Color::srgb(0.25, 0.3, 0.4);
const BUTTON_PRESSED: Color = Color::srgb(0.1, 0.55, 0.55);

pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<MenuAction>()
            .add_systems(OnEnter(AppState::MainMenu), (show_menu_instructions, spawn_menu_ui))
            .add_systems(OnExit(AppState::MainMenu), despawn_with::<MenuUiRoot>)
            .add_systems(OnEnter(AppState::Settings), spawn_settings_ui)
            .add_systems(OnExit(AppState::Settings), despawn_with::<SettingsUiRoot>)
            .add_systems(
                Update,
                (
                    menu_button_interaction,
                    menu_keyboard_shortcuts,
                    update_volume_widgets.run_if(in_state(AppState::Settings)),
                    navigate,
                )
                    .chain(),
            );
    }
}

/// State a navigation action leads to from `current`; `None` when it does not apply.
pub fn next_state_for(action: MenuAction, current: AppState) -> Option<AppState> {
    match (action, current) {
        (MenuAction::Play, AppState::MainMenu) => Some(AppState::Gameplay),
        (MenuAction::OpenSettings, AppState::MainMenu) => Some(AppState::Settings),
        (MenuAction::BackFromSettings, AppState::Settings) => Some(AppState::MainMenu),
        (MenuAction::BackToMenu, AppState::Gameplay) => Some(AppState::MainMenu),
        _ => None,
    }
}

pub(crate) fn navigate(
    mut events: EventReader<MenuAction>,
    state: Res<State<AppState>>,
    mut next_state: ResMut<NextState<AppState>>,
    mut exit: EventWriter<AppExit>,
) {
    for action in events.read() {
        if *action == MenuAction::Quit {
            info!(target: "menu", "Quit requested");
            exit.write(AppExit::Success);
            continue;
        }
        match next_state_for(*action, *state.get()) {
            Some(to) => {
                info!(target: "menu", "{:?}: {:?} -> {:?}", action, state.get(), to);
                next_state.set(to);
            }
            None => warn!(target: "menu", "{:?} ignored in {:?}", action, state.get()),
        }
    }
}

fn show_menu_instructions() {
    info!(target: "menu", "=== UDDER PLUNDER ===");
    info!(target: "menu", "Play / Settings / Quit (Enter plays, Escape quits)");
}

fn menu_button_interaction(
    mut q: Query<(&Interaction, &MenuButton, &mut BackgroundColor), Changed<Interaction>>,
    cfg: Res<GameConfig>,
    volume: Res<MusicVolume>,
    mut ev_menu: EventWriter<MenuAction>,
    mut ev_volume: EventWriter<SetMusicVolume>,
) {
    for (interaction, button, mut bg) in &mut q {
        match interaction {
            Interaction::Pressed => {
                bg.0 = BUTTON_PRESSED;
                match *button {
                    MenuButton::Action(a) => { ev_menu.write(a); }
                    MenuButton::VolumeStep(sign) => { ev_volume.write(SetMusicVolume(volume.0 + sign * cfg.audio.slider_step)); }
                }
            }
            Interaction::Hovered => bg.0 = BUTTON_HOVER,
            Interaction::None => bg.0 = BUTTON_IDLE,
        }
    }
}

fn menu_keyboard_shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<AppState>>,
    cfg: Res<GameConfig>,
    volume: Res<MusicVolume>,
    mut ev_menu: EventWriter<MenuAction>,
    mut ev_volume: EventWriter<SetMusicVolume>,
) {
    match state.get() {
        AppState::MainMenu => {
            if keys.just_pressed(KeyCode::Enter) { ev_menu.write(MenuAction::Play); }
            if keys.just_pressed(KeyCode::Escape) { ev_menu.write(MenuAction::Quit); }
        }
        AppState::Settings => {
            if keys.just_pressed(KeyCode::Escape) { ev_menu.write(MenuAction::BackFromSettings); }
            if keys.just_pressed(KeyCode::ArrowLeft) { ev_volume.write(SetMusicVolume(volume.0 - cfg.audio.slider_step)); }
            if keys.just_pressed(KeyCode::ArrowRight) { ev_volume.write(SetMusicVolume(volume.0 + cfg.audio.slider_step)); }
        }
        AppState::Gameplay => {
            if keys.just_pressed(KeyCode::Escape) { ev_menu.write(MenuAction::BackToMenu); }
        }
    }
}

fn screen_root() -> Node {
    Node {
        width: Val::Percent(100.0),
        height: Val::Percent(100.0),
        flex_direction: FlexDirection::Column,
        justify_content: JustifyContent::Center,
        align_items: AlignItems::Center,
        row_gap: Val::Px(12.0),
        ..default()
    }
}

fn button_bundle(label: &str, button: MenuButton, width: f32) -> impl Bundle {
    (
        Button,
        button,
        Node {
            width: Val::Px(width),
            height: Val::Px(48.0),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        BackgroundColor(BUTTON_IDLE),
        children![(Text::new(label), TextFont { font_size: 24.0, ..default() })],
    )
}

fn spawn_menu_ui(mut commands: Commands) {
    commands.spawn((
        MenuUiRoot,
        screen_root(),
        BackgroundColor(Color::srgba(0.02, 0.02, 0.05, 0.85)),
        children![
            (Text::new("Udder Plunder"), TextFont { font_size: 56.0, ..default() }),
            button_bundle("Play", MenuButton::Action(MenuAction::Play), 240.0),
            button_bundle("Settings", MenuButton::Action(MenuAction::OpenSettings), 240.0),
            button_bundle("Quit", MenuButton::Action(MenuAction::Quit), 240.0),
        ],
    ));
}

fn spawn_settings_ui(mut commands: Commands, volume: Res<MusicVolume>) {
    commands.spawn((
        SettingsUiRoot,
        screen_root(),
        BackgroundColor(Color::srgba(0.02, 0.02, 0.05, 0.9)),
        children![
            (Text::new("Settings"), TextFont { font_size: 44.0, ..default() }),
            (VolumeLabel, Text::new(volume_label(volume.0))),
            (
                Node { flex_direction: FlexDirection::Row, align_items: AlignItems::Center, column_gap: Val::Px(12.0), ..default() },
                children![
                    button_bundle("-", MenuButton::VolumeStep(-1.0), 48.0),
                    (
                        Node { width: Val::Px(240.0), height: Val::Px(16.0), ..default() },
                        BackgroundColor(Color::srgb(0.1, 0.1, 0.12)),
                        children![(
                            VolumeFill,
                            Node { width: Val::Percent(volume.0 * 100.0), height: Val::Percent(100.0), ..default() },
                            BackgroundColor(Color::srgb(0.0, 0.85, 0.85)),
                        )],
                    ),
                    button_bundle("+", MenuButton::VolumeStep(1.0), 48.0),
                ],
            ),
            button_bundle("Back", MenuButton::Action(MenuAction::BackFromSettings), 240.0),
        ],
    ));
}

fn volume_label(v: f32) -> String {
    format!("Music volume: {:.0}%", v * 100.0)
}

fn update_volume_widgets(
    volume: Res<MusicVolume>,
    mut q_fill: Query<&mut Node, With<VolumeFill>>,
    mut q_label: Query<&mut Text, With<VolumeLabel>>,
) {
    if !volume.is_changed() { return; }
    for mut node in &mut q_fill { node.width = Val::Percent(volume.0 * 100.0); }
    for mut text in &mut q_label { *text = Text::new(volume_label(volume.0)); }
}

fn despawn_with<T: Component>(mut commands: Commands, q_root: Query<Entity, With<T>>) {
    for e in &q_root {
        commands.entity(e).despawn();
    }
}
