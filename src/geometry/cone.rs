//! Beam cone mesh generation.
//!
//! The beam is an inverted cone: apex at the local origin, base ring `length`
//! units below it. Geometry is produced as plain buffers so it can feed both the
//! render mesh and the physics sensor collider.
use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy_rapier3d::prelude::Collider;
use thiserror::Error;

/// Smallest ring that still encloses a volume.
pub const MIN_BEAM_SEGMENTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BeamMeshError {
    #[error("invalid beam parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },
}

/// Shape knobs for the tractor beam. Rebuild the mesh to apply changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamShapeParams {
    pub segments: u32,
    pub length: f32,
    /// Half of the apex angle, degrees, exclusive range (0, 90).
    pub half_angle_deg: f32,
    pub color: Color,
}

impl Default for BeamShapeParams {
    fn default() -> Self {
        Self {
            segments: 20,
            length: 5.0,
            half_angle_deg: 45.0,
            color: Color::srgba(0.0, 1.0, 1.0, 0.5),
        }
    }
}

impl BeamShapeParams {
    pub fn base_radius(&self) -> f32 {
        self.length * self.half_angle_deg.to_radians().tan()
    }

    pub fn validate(&self) -> Result<(), BeamMeshError> {
        if self.segments < MIN_BEAM_SEGMENTS {
            return Err(BeamMeshError::InvalidParameter {
                name: "segments",
                value: self.segments as f32,
                reason: "at least 3 segments are required",
            });
        }
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(BeamMeshError::InvalidParameter {
                name: "length",
                value: self.length,
                reason: "must be a positive finite number",
            });
        }
        if !(self.half_angle_deg > 0.0 && self.half_angle_deg < 90.0) {
            return Err(BeamMeshError::InvalidParameter {
                name: "half_angle_deg",
                value: self.half_angle_deg,
                reason: "must lie strictly between 0 and 90 degrees",
            });
        }
        Ok(())
    }
}

/// Indexed triangle buffers for the beam cone.
///
/// Layout: `positions[0]` is the apex, `positions[1..=segments]` the base ring.
/// Triangle `i` is `(0, next, current)` with `current = i + 1` and
/// `next = (i + 1) % segments + 1`. Under Bevy's counter-clockwise front-face
/// convention that winding makes each lateral face point away from the axis.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamMesh {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub normals: Vec<[f32; 3]>,
}

impl BeamMesh {
    /// Render mesh with positions, normals and the triangle index buffer.
    pub fn to_mesh(&self) -> Mesh {
        Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, self.positions.clone())
            .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals.clone())
            .with_inserted_indices(Indices::U32(self.indices.clone()))
    }

    /// Convex collider spanning the cone. `None` if the hull computation fails.
    pub fn to_convex_collider(&self) -> Option<Collider> {
        let points: Vec<Vec3> = self.positions.iter().map(|p| Vec3::from_array(*p)).collect();
        Collider::convex_hull(&points)
    }
}

/// Build the beam cone for `params`. Fails without producing geometry when any
/// parameter is out of range.
pub fn generate_beam_cone(params: &BeamShapeParams) -> Result<BeamMesh, BeamMeshError> {
    params.validate()?;
    let n = params.segments as usize;
    let radius = params.base_radius();

    let mut positions = Vec::with_capacity(n + 1);
    positions.push([0.0, 0.0, 0.0]);
    for i in 0..n {
        let angle = (i as f32 / n as f32) * std::f32::consts::TAU;
        positions.push([angle.cos() * radius, -params.length, angle.sin() * radius]);
    }

    let mut indices = Vec::with_capacity(n * 3);
    for i in 0..n {
        let current = (i + 1) as u32;
        let next = ((i + 1) % n + 1) as u32;
        indices.extend_from_slice(&[0, next, current]);
    }

    let normals = compute_vertex_normals(&positions, &indices);
    Ok(BeamMesh { positions, indices, normals })
}

/// Area-weighted smooth normals: each vertex gets the normalized sum of the
/// face normals of every triangle that references it.
pub fn compute_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = Vec3::from_array(positions[a]);
        let pb = Vec3::from_array(positions[b]);
        let pc = Vec3::from_array(positions[c]);
        let face = (pb - pa).cross(pc - pa);
        acc[a] += face;
        acc[b] += face;
        acc[c] += face;
    }
    acc.into_iter()
        .map(|n| n.normalize_or_zero().to_array())
        .collect()
}
