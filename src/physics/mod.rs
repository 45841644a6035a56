pub mod magnet;
pub mod rapier;

pub use magnet::BeamMagnetPlugin;
pub use rapier::PhysicsSetupPlugin;
