pub mod app;
pub mod audio;
pub mod core;
pub mod debug;
pub mod gameplay;
pub mod geometry;
pub mod interaction;
pub mod physics;
pub mod rendering;

// Curated re-exports
pub use app::game::GamePlugin;
pub use app::state::{AppState, GameplayMode};
pub use core::config::{ConfigLoadReport, GameConfig, WindowConfig};
pub use core::settings::{JsonFileStore, Settings};
pub use geometry::{generate_beam_cone, BeamMesh, BeamMeshError, BeamShapeParams};
pub use physics::magnet::{pull_acceleration, MagnetParams, PullQuery};
