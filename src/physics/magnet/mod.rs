pub mod falloff;
pub mod plugin;

pub use falloff::{effective_force, pull_acceleration, pull_direction, MagnetParams, PullQuery};
pub use plugin::{BeamContacts, BeamMagnet, BeamMagnetPlugin};
