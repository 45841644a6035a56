pub mod cone;

pub use cone::{generate_beam_cone, BeamMesh, BeamMeshError, BeamShapeParams};
