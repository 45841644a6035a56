//! Central system ordering labels to make the update sequence explicit.
//! Stages (high-level, all in `Update` unless noted):
//! 0. Input actions collected (`PreUpdate`, `InputActionUpdateSet`)
//! 1. Movement (UFO integration + confinement; writes the mover speed)
//! 2. PrePhysics (beam overlap bookkeeping + magnet pull, reads the mover speed)
//! 3. Rapier step (handled by plugin in `PostUpdate`)
//! 4. PostPhysicsAdjust (lightweight corrections and presentation)
use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct MovementSet; // kinematic movers integrate and publish their speed

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct PrePhysicsSet; // forces applied before physics simulation step

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct PostPhysicsAdjustSet; // lightweight corrections after physics
