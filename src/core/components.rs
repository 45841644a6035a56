use bevy::prelude::*;

/// Player-controlled saucer (root of the beam hierarchy).
#[derive(Component)]
pub struct Ufo;

/// Abductable livestock; the beam only pulls entities carrying this marker.
#[derive(Component)]
pub struct Cow;

/// A placed building occupying one grid cell.
#[derive(Component, Debug, Clone, Copy)]
pub struct Building {
    pub cell: IVec3,
}

/// The island root the rotator spins.
#[derive(Component)]
pub struct Island;

/// Current linear velocity of a kinematically driven mover, world units/sec.
#[derive(Component, Debug, Default, Deref, DerefMut, Copy, Clone)]
pub struct MoverVelocity(pub Vec3);

/// Spawned on entering gameplay and despawned when leaving it.
#[derive(Component)]
pub struct GameplayEntity;
