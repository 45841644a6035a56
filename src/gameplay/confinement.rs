use bevy::prelude::*;

use crate::core::config::IslandConfig;

/// Keeps a mover's horizontal position over the island. Height is left alone.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub enum ConfinementPolicy {
    /// XZ offset from `center` clamped to `radius`.
    Circle { center: Vec3, radius: f32 },
    /// X and Z each clamped to `center +- half_extent`.
    Square { center: Vec3, half_extent: f32 },
}

impl Default for ConfinementPolicy {
    fn default() -> Self {
        Self::from_config(&IslandConfig::default())
    }
}

impl ConfinementPolicy {
    /// Unknown policy names fall back to `Circle` (config validation reports them).
    pub fn from_config(c: &IslandConfig) -> Self {
        let center = Vec3::from_array(c.center);
        match c.policy.as_str() {
            "Square" => Self::Square { center, half_extent: c.half_extent.max(0.0) },
            _ => Self::Circle { center, radius: c.radius.max(0.0) },
        }
    }

    pub fn center(&self) -> Vec3 {
        match *self {
            Self::Circle { center, .. } | Self::Square { center, .. } => center,
        }
    }

    pub fn apply(&self, p: Vec3) -> Vec3 {
        match *self {
            Self::Circle { center, radius } => {
                let offset = Vec2::new(p.x - center.x, p.z - center.z).clamp_length_max(radius);
                Vec3::new(center.x + offset.x, p.y, center.z + offset.y)
            }
            Self::Square { center, half_extent } => Vec3::new(
                p.x.clamp(center.x - half_extent, center.x + half_extent),
                p.y,
                p.z.clamp(center.z - half_extent, center.z + half_extent),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_clamps_radially() {
        let policy = ConfinementPolicy::Circle { center: Vec3::ZERO, radius: 15.0 };
        let out = policy.apply(Vec3::new(20.0, 2.0, 0.0));
        assert!((out - Vec3::new(15.0, 2.0, 0.0)).length() < 1e-5);
        let inside = Vec3::new(3.0, 2.0, -4.0);
        assert_eq!(policy.apply(inside), inside);
    }

    #[test]
    fn square_clamps_per_axis() {
        let h = 15.0;
        let policy = ConfinementPolicy::Square { center: Vec3::ZERO, half_extent: h };
        assert_eq!(policy.apply(Vec3::new(20.0, 2.0, -30.0)), Vec3::new(h, 2.0, -h));
    }

    #[test]
    fn from_config_picks_policy() {
        let mut cfg = IslandConfig::default();
        assert!(matches!(ConfinementPolicy::from_config(&cfg), ConfinementPolicy::Circle { .. }));
        cfg.policy = "Square".into();
        cfg.center = [1.0, 0.0, 2.0];
        let policy = ConfinementPolicy::from_config(&cfg);
        assert_eq!(policy.center(), Vec3::new(1.0, 0.0, 2.0));
        assert!(matches!(policy, ConfinementPolicy::Square { .. }));
        cfg.policy = "Blob".into();
        assert!(matches!(ConfinementPolicy::from_config(&cfg), ConfinementPolicy::Circle { .. }));
    }
}
