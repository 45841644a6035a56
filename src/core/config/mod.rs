pub mod config;
pub mod hot_reload;

pub use config::{
    log_config_report, AudioConfig, BeamConfig, ConfigLoadReport, BuildingConfig, CowSpawnConfig, GameConfig, IslandConfig,
    PhysicsConfig, RotatorConfig, UfoConfig, WindowConfig,
};
pub use hot_reload::{ConfigHotReloadPlugin, ConfigReloadSettings};
