//! Plaque geometry
//!
//! Every plaque draws the same unit quad; its size, position and rotation
//! come from a per-plaque transform.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::scene::Surface;

/// Vertex for the plaque quad
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PlaqueVertex {
    /// Position in plaque-local space
    pub position: [f32; 3],
    /// Texture coordinates, (0, 0) top-left
    pub uv: [f32; 2],
}

impl PlaqueVertex {
    /// Size of vertex in bytes
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // uv
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Vertex and index data
pub struct PlaqueMesh {
    pub vertices: Vec<PlaqueVertex>,
    pub indices: Vec<u16>,
}

impl PlaqueMesh {
    /// 1x1 quad in local XY centered on the origin, front face toward +Z
    /// (counter-clockwise seen from +Z)
    pub fn unit_quad() -> Self {
        let vertex = |x: f32, y: f32, u: f32, v: f32| PlaqueVertex {
            position: [x, y, 0.0],
            uv: [u, v],
        };
        Self {
            vertices: vec![
                vertex(-0.5, 0.5, 0.0, 0.0),
                vertex(-0.5, -0.5, 0.0, 1.0),
                vertex(0.5, -0.5, 1.0, 1.0),
                vertex(0.5, 0.5, 1.0, 0.0),
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// Unit quad to world transform for `surface`
pub fn plaque_transform(surface: &Surface) -> Mat4 {
    surface.model_matrix()
        * Mat4::from_scale(Vec3::new(
            surface.geometry_width(),
            surface.geometry_height(),
            1.0,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::TextureHandle;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_unit_quad() {
        let mesh = PlaqueMesh::unit_quad();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.index_count(), 6);
        assert_eq!(PlaqueVertex::SIZE, 20);
    }

    #[test]
    fn test_quad_faces_positive_z() {
        let mesh = PlaqueMesh::unit_quad();
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(mesh.vertices[i as usize].position));
            let normal = (b - a).cross(c - a);
            assert!(normal.z > 0.0);
        }
    }

    #[test]
    fn test_transform_spans_plaque() {
        let surface = Surface::new(
            4.0,
            2.25,
            Vec3::new(6.0, 1.0, -3.0),
            FRAC_PI_2,
            TextureHandle(0),
            "side",
        )
        .unwrap();
        let transform = plaque_transform(&surface);

        let top_left = transform.transform_point3(Vec3::new(-0.5, 0.5, 0.0));
        // Local -X maps to world +Z after a quarter turn
        assert!(top_left.abs_diff_eq(Vec3::new(6.0, 2.125, -1.0), 1e-5));
        let center = transform.transform_point3(Vec3::ZERO);
        assert!(center.abs_diff_eq(surface.anchor(), 1e-6));
    }
}
