use std::path::PathBuf;

use bevy::prelude::*;
use clap::Parser;

use udder_plunder::core::config::ConfigReloadSettings;
use udder_plunder::{AppState, ConfigLoadReport, GameConfig, GamePlugin, JsonFileStore, Settings};

const DEFAULT_CONFIG_LAYERS: [&str; 2] = ["assets/config/game.ron", "assets/config/game.local.ron"];

#[derive(Parser, Debug)]
#[command(about = "Udder Plunder: fly a saucer over the island and beam up the cows", version)]
struct Args {
    /// RON config layers merged in order; later files override earlier keys.
    #[arg(long = "config", value_name = "PATH")]
    config: Vec<PathBuf>,
    /// Player preferences file (overrides `audio.settings_path`).
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,
    /// Start in gameplay instead of the main menu.
    #[arg(long)]
    skip_menu: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let layers: Vec<PathBuf> = if args.config.is_empty() {
        DEFAULT_CONFIG_LAYERS.iter().map(PathBuf::from).collect()
    } else {
        args.config.clone()
    };
    let (cfg, used, mut errors) = GameConfig::load_layered(&layers);
    let warnings = cfg.validate();

    let settings_path = args.settings.clone().unwrap_or_else(|| PathBuf::from(&cfg.audio.settings_path));
    let (store, settings_err) = JsonFileStore::open_or_empty(&settings_path);
    if let Some(e) = settings_err {
        errors.push(format!("{e}; starting with empty preferences"));
    }

    let mut app = App::new();
    app.insert_resource(cfg.clone())
        .insert_resource(ConfigLoadReport { used, errors, warnings })
        .insert_resource(Settings::new(store))
        .insert_resource(ConfigReloadSettings { paths: layers, ..default() })
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: cfg.window.title.clone(),
                resolution: (cfg.window.width, cfg.window.height).into(),
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        .insert_state(if args.skip_menu { AppState::Gameplay } else { AppState::MainMenu })
        .add_plugins(GamePlugin);

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("app exited with code {code}"),
    }
}
