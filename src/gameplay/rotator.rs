use bevy::prelude::*;

use crate::app::state::AppState;
use crate::core::components::Island;
use crate::core::config::{GameConfig, RotatorConfig};
use crate::core::system::system_order::MovementSet;
use crate::gameplay::smoothing::smooth_damp;
use crate::interaction::inputmap::InputMap;

/// Angular speed (deg/s) of the island and its spring state.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct PlaneRotator {
    pub current_speed: f32,
    smoothing: f32,
}

impl PlaneRotator {
    /// Ease toward `input * rotation_speed` and return the yaw step in degrees.
    pub fn step(&mut self, cfg: &RotatorConfig, input: f32, dt: f32) -> f32 {
        let target = input.clamp(-1.0, 1.0) * cfg.rotation_speed;
        self.current_speed = smooth_damp(self.current_speed, target, &mut self.smoothing, cfg.rotation_smooth_time.max(0.0), dt);
        self.current_speed * dt
    }
}

pub struct RotatorPlugin;
impl Plugin for RotatorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, rotate_island.in_set(MovementSet).run_if(in_state(AppState::Gameplay)));
    }
}

fn rotate_island(
    time: Res<Time>,
    input: Res<InputMap>,
    cfg: Res<GameConfig>,
    mut q: Query<(&mut Transform, &mut PlaneRotator), With<Island>>,
) {
    let dt = time.delta_secs();
    let rotate = input.axis1("Rotate");
    for (mut tf, mut rot) in &mut q {
        let deg = rot.step(&cfg.rotator, rotate, dt);
        if deg != 0.0 { tf.rotate_y(deg.to_radians()); }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spins_up_to_configured_speed() {
        let cfg = RotatorConfig::default();
        let mut rot = PlaneRotator::default();
        let mut total = 0.0;
        for _ in 0..180 { total += rot.step(&cfg, 1.0, 1.0 / 60.0); }
        assert!((rot.current_speed - 30.0).abs() < 0.1);
        // Slower than an instant start over the same three seconds.
        assert!(total < 90.0 && total > 80.0, "{total}");
    }

    #[test]
    fn releases_back_to_rest() {
        let cfg = RotatorConfig::default();
        let mut rot = PlaneRotator { current_speed: 30.0, smoothing: 0.0 };
        for _ in 0..120 { rot.step(&cfg, 0.0, 1.0 / 60.0); }
        assert!(rot.current_speed.abs() < 0.05);
    }
}
