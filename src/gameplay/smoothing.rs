//! Critically damped spring used to ease movers toward a target value.
use bevy::prelude::*;

/// Spring frequency and the per-step decay factor (cubic approximation of `exp(-omega * dt)`).
fn spring_coefficients(smooth_time: f32, dt: f32) -> (f32, f32) {
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    (omega, 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x))
}

/// Move `current` toward `target`, reaching it in roughly `smooth_time`
/// seconds without overshoot. `velocity` is the spring state carried between
/// calls. A non-positive `smooth_time` snaps to the target.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0.0 { return current; }
    if smooth_time <= 0.0 { *velocity = 0.0; return target; }
    let (omega, decay) = spring_coefficients(smooth_time, dt);
    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = 0.0;
    }
    output
}

/// Vector form of [`smooth_damp`]; the overshoot check is along the approach direction.
pub fn smooth_damp_vec3(current: Vec3, target: Vec3, velocity: &mut Vec3, smooth_time: f32, dt: f32) -> Vec3 {
    if dt <= 0.0 { return current; }
    if smooth_time <= 0.0 { *velocity = Vec3::ZERO; return target; }
    let (omega, decay) = spring_coefficients(smooth_time, dt);
    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;
    if (target - current).dot(output - target) > 0.0 {
        output = target;
        *velocity = Vec3::ZERO;
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_input_converges_without_overshoot() {
        let (mut value, mut vel) = (0.0_f32, 0.0_f32);
        let mut prev = value;
        for _ in 0..120 {
            value = smooth_damp(value, 10.0, &mut vel, 0.2, 1.0 / 60.0);
            assert!(value >= prev, "monotonic");
            assert!(value <= 10.0, "no overshoot: {value}");
            prev = value;
        }
        assert!((10.0 - value).abs() < 1e-2, "converged: {value}");
    }

    #[test]
    fn zero_smooth_time_snaps() {
        let mut vel = 3.0;
        assert_eq!(smooth_damp(1.0, 4.0, &mut vel, 0.0, 0.016), 4.0);
        assert_eq!(vel, 0.0);
    }

    #[test]
    fn zero_dt_holds_value() {
        let mut vel = Vec3::ZERO;
        let out = smooth_damp_vec3(Vec3::X, Vec3::Z, &mut vel, 0.2, 0.0);
        assert_eq!(out, Vec3::X);
    }

    #[test]
    fn scalar_and_vector_forms_agree_on_an_axis() {
        let (mut a, mut va) = (0.0_f32, 0.0_f32);
        let (mut b, mut vb) = (Vec3::ZERO, Vec3::ZERO);
        for _ in 0..30 {
            a = smooth_damp(a, 5.0, &mut va, 0.3, 1.0 / 60.0);
            b = smooth_damp_vec3(b, Vec3::X * 5.0, &mut vb, 0.3, 1.0 / 60.0);
            assert!((a - b.x).abs() < 1e-5 && (va - vb.x).abs() < 1e-5);
        }
    }

    #[test]
    fn vector_form_reaches_target_direction() {
        let (mut v, mut s) = (Vec3::ZERO, Vec3::ZERO);
        let target = Vec3::new(3.0, 0.0, -4.0);
        for _ in 0..240 { v = smooth_damp_vec3(v, target, &mut s, 0.2, 1.0 / 60.0); }
        assert!((v - target).length() < 1e-2);
    }
}
