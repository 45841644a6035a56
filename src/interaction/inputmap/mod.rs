pub mod types;
pub mod parse;
pub mod plugin;
pub mod systems;

pub use plugin::{InputActionUpdateSet, InputActionsPlugin};
pub use types::{InputMap, InputSource};
