pub mod game;
pub mod menu;
pub mod state;

pub use game::GamePlugin;
pub use state::{AppState, GameplayMode};
