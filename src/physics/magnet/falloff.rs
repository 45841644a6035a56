//! Speed-attenuated pull model for the tractor beam.
//!
//! Full `pull_force` while the mover is at or below `drop_speed_threshold`;
//! above it the force fades linearly and reaches zero at twice the threshold.
use bevy::prelude::*;
use serde::Deserialize;

/// Below this squared distance the target sits on the pull point and no
/// direction exists.
pub const COINCIDENT_EPSILON_SQ: f32 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MagnetParams {
    pub pull_force: f32,
    pub drop_speed_threshold: f32,
    /// Kept for tuning and logs; overlap is decided by the beam volume.
    pub pull_radius: f32,
}

impl Default for MagnetParams {
    fn default() -> Self {
        Self {
            pull_force: 17.0,
            drop_speed_threshold: 16.0,
            pull_radius: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PullQuery {
    pub target: Vec3,
    pub pull_point: Vec3,
    pub mover_speed: f32,
}

/// Pull magnitude for a mover travelling at `speed`.
pub fn effective_force(pull_force: f32, threshold: f32, speed: f32) -> f32 {
    if speed <= threshold {
        return pull_force;
    }
    let t = ((speed - threshold) / threshold).clamp(0.0, 1.0);
    pull_force * (1.0 - t)
}

/// Unit vector from `target` toward `pull_point`, zero when they coincide.
pub fn pull_direction(target: Vec3, pull_point: Vec3) -> Vec3 {
    let delta = pull_point - target;
    if delta.length_squared() < COINCIDENT_EPSILON_SQ {
        return Vec3::ZERO;
    }
    delta.normalize_or_zero()
}

/// Acceleration to integrate into the target's velocity this step.
pub fn pull_acceleration(params: &MagnetParams, query: &PullQuery) -> Vec3 {
    let dir = pull_direction(query.target, query.pull_point);
    dir * effective_force(params.pull_force, params.drop_speed_threshold, query.mover_speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const F: f32 = 17.0;
    const T: f32 = 16.0;

    #[test]
    fn full_force_up_to_threshold() {
        assert_eq!(effective_force(F, T, 0.0), F);
        assert_eq!(effective_force(F, T, 8.0), F);
        assert_eq!(effective_force(F, T, T), F);
    }

    #[test]
    fn zero_at_and_beyond_twice_threshold() {
        assert_eq!(effective_force(F, T, 2.0 * T), 0.0);
        assert_eq!(effective_force(F, T, 3.0 * T), 0.0);
        assert_eq!(effective_force(F, T, 1000.0), 0.0);
    }

    #[test]
    fn non_increasing_in_speed() {
        let mut prev = effective_force(F, T, 0.0);
        for step in 1..=400 {
            let s = step as f32 * 0.1;
            let f = effective_force(F, T, s);
            assert!(f <= prev, "force rose at s={s}: {prev} -> {f}");
            assert!(f >= 0.0);
            prev = f;
        }
    }

    #[test]
    fn gamepad_speed_example() {
        let params = MagnetParams::default();
        let accel = pull_acceleration(&params, &PullQuery { target: Vec3::ZERO, pull_point: Vec3::new(0.0, 4.0, 0.0), mover_speed: 24.0 });
        assert!((accel - Vec3::new(0.0, 8.5, 0.0)).length() < 1e-5, "{accel:?}");
    }

    #[test]
    fn direction_points_at_pull_point() {
        assert_eq!(pull_direction(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0)), Vec3::X);
    }

    #[test]
    fn coincident_points_give_zero_pull() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        let accel = pull_acceleration(&MagnetParams::default(), &PullQuery { target: p, pull_point: p, mover_speed: 0.0 });
        assert_eq!(accel, Vec3::ZERO);
    }
}
