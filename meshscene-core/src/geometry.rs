/// Procedural primitive meshes and the flat vertex buffers they produce
use std::f32::consts::PI;

use log::debug;
use nalgebra::{Point3, Vector3};

use crate::config::{
    DEFAULT_SPHERE_SECTORS, DEFAULT_SPHERE_STACKS, MAX_SPHERE_VERTICES, MIN_SPHERE_SECTORS,
    MIN_SPHERE_STACKS, SPHERE_REALIGN_DEGREES,
};
use crate::error::MeshError;

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's winding
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }
}

/// A triangle mesh stored as flat buffers, ready for vertex/index uploads.
///
/// `positions` and `normals` hold xyz triples, `uv_coords` holds uv pairs,
/// one per vertex. `indices` is a triangle list; when it is empty the
/// positions are consumed directly, three vertices per triangle.
/// `line_indices` holds wireframe edges as vertex pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uv_coords: Vec<f32>,
    pub indices: Vec<u32>,
    pub line_indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices * 3),
            normals: Vec::with_capacity(vertices * 3),
            uv_coords: Vec::with_capacity(vertices * 2),
            indices: Vec::with_capacity(indices),
            line_indices: Vec::new(),
        }
    }

    pub fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) {
        self.positions.extend_from_slice(&position);
        self.normals.extend_from_slice(&normal);
        self.uv_coords.extend_from_slice(&uv);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        if self.is_indexed() {
            self.indices.len() / 3
        } else {
            self.vertex_count() / 3
        }
    }

    pub fn position(&self, index: usize) -> Point3<f32> {
        let p = &self.positions[index * 3..index * 3 + 3];
        Point3::new(p[0], p[1], p[2])
    }

    pub fn normal(&self, index: usize) -> Vector3<f32> {
        let n = &self.normals[index * 3..index * 3 + 3];
        Vector3::new(n[0], n[1], n[2])
    }

    pub fn uv(&self, index: usize) -> [f32; 2] {
        [self.uv_coords[index * 2], self.uv_coords[index * 2 + 1]]
    }

    pub fn vertex(&self, index: usize) -> Vertex {
        Vertex {
            position: self.position(index),
            normal: self.normal(index),
        }
    }

    /// Iterate the mesh as triangles, resolving the index buffer when present
    pub fn triangles(&self) -> Box<dyn Iterator<Item = Triangle> + '_> {
        if self.is_indexed() {
            Box::new(self.indices.chunks_exact(3).map(move |tri| {
                Triangle::new(
                    self.vertex(tri[0] as usize),
                    self.vertex(tri[1] as usize),
                    self.vertex(tri[2] as usize),
                )
            }))
        } else {
            Box::new((0..self.triangle_count()).map(move |t| {
                Triangle::new(
                    self.vertex(t * 3),
                    self.vertex(t * 3 + 1),
                    self.vertex(t * 3 + 2),
                )
            }))
        }
    }

    /// Check buffer lengths and index bounds
    pub fn validate(&self) -> bool {
        let vertex_count = self.vertex_count();
        let in_bounds = |i: &u32| (*i as usize) < vertex_count;

        self.positions.len() % 3 == 0
            && self.positions.len() == self.normals.len()
            && self.uv_coords.len() * 3 == self.positions.len() * 2
            && self.indices.len() % 3 == 0
            && self.line_indices.len() % 2 == 0
            && self.indices.iter().all(in_bounds)
            && self.line_indices.iter().all(in_bounds)
    }
}

/// A primitive kind together with its generation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshSource {
    Cube,
    Sphere { stacks: u32, sectors: u32 },
}

impl MeshSource {
    /// Build a sphere source, rejecting subdivisions the generator cannot use
    pub fn sphere(stacks: u32, sectors: u32) -> Result<Self, MeshError> {
        check_sphere_subdivisions(stacks, sectors)?;
        Ok(Self::Sphere { stacks, sectors })
    }

    /// Resolve a primitive kind name and its numeric parameters.
    ///
    /// Kind names are case-insensitive. A sphere takes either no parameters
    /// (defaults apply) or exactly `stacks, sectors`, both whole numbers.
    pub fn from_primitive(kind: &str, params: &[f32]) -> Result<Self, MeshError> {
        match kind.to_ascii_lowercase().as_str() {
            "cube" => Ok(Self::Cube),
            "sphere" => match params {
                [] => Self::sphere(DEFAULT_SPHERE_STACKS, DEFAULT_SPHERE_SECTORS),
                [stacks, sectors] => Self::sphere(
                    subdivision("numStacks", *stacks)?,
                    subdivision("numSectors", *sectors)?,
                ),
                _ => Err(MeshError::invalid_parameter(format!(
                    "sphere takes 0 or 2 parameters, got {}",
                    params.len()
                ))),
            },
            other => Err(MeshError::invalid_parameter(format!(
                "unknown primitive kind '{}'",
                other
            ))),
        }
    }

    pub fn generate(&self) -> Result<Mesh, MeshError> {
        generate(self)
    }
}

/// Generate the mesh for a primitive source
pub fn generate(source: &MeshSource) -> Result<Mesh, MeshError> {
    let mesh = match *source {
        MeshSource::Cube => cube(),
        MeshSource::Sphere { stacks, sectors } => sphere(stacks, sectors)?,
    };
    debug!(
        "Generated {:?}: {} vertices, {} triangles",
        source,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

fn subdivision(name: &str, value: f32) -> Result<u32, MeshError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f32 {
        return Err(MeshError::invalid_parameter(format!(
            "{} must be a whole number, got {}",
            name, value
        )));
    }
    Ok(value as u32)
}

fn check_sphere_subdivisions(stacks: u32, sectors: u32) -> Result<(), MeshError> {
    if stacks < MIN_SPHERE_STACKS {
        return Err(MeshError::invalid_parameter(format!(
            "numStacks must be at least {}, got {}",
            MIN_SPHERE_STACKS, stacks
        )));
    }
    if sectors < MIN_SPHERE_SECTORS {
        return Err(MeshError::invalid_parameter(format!(
            "numSectors must be at least {}, got {}",
            MIN_SPHERE_SECTORS, sectors
        )));
    }
    let vertices = (stacks as u64 + 1) * (sectors as u64 + 1);
    if vertices > MAX_SPHERE_VERTICES {
        return Err(MeshError::invalid_parameter(format!(
            "{} x {} sphere needs {} vertices, at most {} are supported",
            stacks, sectors, vertices, MAX_SPHERE_VERTICES
        )));
    }
    Ok(())
}

/// One cube face: outward normal, two triangles of corners and their atlas uvs
struct CubeFace {
    normal: [f32; 3],
    corners: [[f32; 3]; 6],
    uvs: [[f32; 2]; 6],
}

const THIRD: f32 = 1.0 / 3.0;
const TWO_THIRDS: f32 = 2.0 / 3.0;

// Atlas is two columns by three rows; each face owns one cell.
#[rustfmt::skip]
const CUBE_FACES: [CubeFace; 6] = [
    // Front (+Z)
    CubeFace {
        normal: [0.0, 0.0, 1.0],
        corners: [
            [-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0],
            [-1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0],
        ],
        uvs: [
            [0.0, TWO_THIRDS], [0.5, TWO_THIRDS], [0.5, 1.0],
            [0.0, TWO_THIRDS], [0.5, 1.0], [0.0, 1.0],
        ],
    },
    // Back (-Z)
    CubeFace {
        normal: [0.0, 0.0, -1.0],
        corners: [
            [1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0],
            [1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0],
        ],
        uvs: [
            [1.0, 0.0], [0.5, 0.0], [0.5, THIRD],
            [1.0, 0.0], [0.5, THIRD], [1.0, THIRD],
        ],
    },
    // Top (+Y)
    CubeFace {
        normal: [0.0, 1.0, 0.0],
        corners: [
            [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0],
            [-1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0],
        ],
        uvs: [
            [0.0, 0.0], [0.5, 0.0], [0.5, THIRD],
            [0.0, 0.0], [0.5, THIRD], [0.0, THIRD],
        ],
    },
    // Bottom (-Y)
    CubeFace {
        normal: [0.0, -1.0, 0.0],
        corners: [
            [-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0],
            [-1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0],
        ],
        uvs: [
            [0.5, TWO_THIRDS], [1.0, TWO_THIRDS], [1.0, 1.0],
            [0.5, TWO_THIRDS], [1.0, 1.0], [0.5, 1.0],
        ],
    },
    // Right (+X)
    CubeFace {
        normal: [1.0, 0.0, 0.0],
        corners: [
            [1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0],
            [1.0, -1.0, 1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0],
        ],
        uvs: [
            [0.0, THIRD], [0.5, THIRD], [0.5, TWO_THIRDS],
            [0.0, THIRD], [0.5, TWO_THIRDS], [0.0, TWO_THIRDS],
        ],
    },
    // Left (-X)
    CubeFace {
        normal: [-1.0, 0.0, 0.0],
        corners: [
            [-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0],
            [-1.0, -1.0, -1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0],
        ],
        uvs: [
            [0.5, TWO_THIRDS], [1.0, TWO_THIRDS], [1.0, THIRD],
            [0.5, TWO_THIRDS], [1.0, THIRD], [0.5, THIRD],
        ],
    },
];

/// Create the 36-vertex cube spanning [-1, 1] on every axis.
///
/// Faces are emitted directly, six vertices each, so the index buffer stays
/// empty.
pub fn cube() -> Mesh {
    let mut mesh = Mesh::with_capacity(36, 0);
    for face in &CUBE_FACES {
        for (corner, uv) in face.corners.iter().zip(face.uvs.iter()) {
            mesh.push_vertex(*corner, face.normal, *uv);
        }
    }
    mesh
}

/// Create a unit UV sphere with `stacks` latitude bands and `sectors`
/// longitude slices.
///
/// Each pole is a degenerate ring of `sectors + 1` coincident vertices.
/// Triangles touching a pole ring are skipped where they would have zero
/// area.
pub fn sphere(stacks: u32, sectors: u32) -> Result<Mesh, MeshError> {
    check_sphere_subdivisions(stacks, sectors)?;

    let ring = sectors as usize + 1;
    let vertex_count = (stacks as usize + 1) * ring;
    let mut mesh = Mesh::with_capacity(vertex_count, stacks as usize * sectors as usize * 6);

    let stack_step = PI / stacks as f32;
    let sector_step = 2.0 * PI / sectors as f32;

    for i in 0..=stacks {
        let stack_angle = PI / 2.0 - i as f32 * stack_step;
        let xy = stack_angle.cos();
        let z = stack_angle.sin();

        for j in 0..=sectors {
            let sector_angle = j as f32 * sector_step;
            let x = xy * sector_angle.cos();
            let y = xy * sector_angle.sin();

            // Unit radius, so the position is already the normal
            mesh.push_vertex(
                [x, y, z],
                [x, y, z],
                [j as f32 / sectors as f32, i as f32 / stacks as f32],
            );
        }
    }

    for i in 0..stacks {
        for j in 0..sectors {
            let k1 = i * (sectors + 1) + j;
            let k2 = k1 + sectors + 1;

            if i != 0 {
                mesh.indices.extend_from_slice(&[k1, k2, k1 + 1]);
            }
            if i != stacks - 1 {
                mesh.indices.extend_from_slice(&[k1 + 1, k2, k2 + 1]);
            }

            mesh.line_indices.extend_from_slice(&[k1, k2]);
            if i != 0 {
                mesh.line_indices.extend_from_slice(&[k1, k1 + 1]);
            }
        }
    }

    let theta = SPHERE_REALIGN_DEGREES.to_radians();
    realign_axis(&mut mesh.positions, theta);
    realign_axis(&mut mesh.normals, theta);

    Ok(mesh)
}

/// Re-orient a buffer of xyz triples in place by `theta` radians about X,
/// mirroring the resulting y component.
///
/// Both source components of each triple are read before either is written.
/// Lengths are preserved, so unit normals stay unit.
pub fn realign_axis(buffer: &mut [f32], theta: f32) {
    let (sin, cos) = theta.sin_cos();
    for triple in buffer.chunks_exact_mut(3) {
        let (y, z) = (triple[1], triple[2]);
        triple[1] = -(cos * y - sin * z);
        triple[2] = cos * z + sin * y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EPSILON;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cube_counts() {
        let mesh = cube();
        assert_eq!(mesh.positions.len(), 36 * 3);
        assert_eq!(mesh.normals.len(), 36 * 3);
        assert_eq!(mesh.uv_coords.len(), 36 * 2);
        assert!(mesh.indices.is_empty());
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.validate());
    }

    #[test]
    fn test_cube_normals_are_axis_directions() {
        let mesh = cube();
        let axes: [Vector3<f32>; 6] = [
            Vector3::x(),
            -Vector3::x(),
            Vector3::y(),
            -Vector3::y(),
            Vector3::z(),
            -Vector3::z(),
        ];
        for axis in &axes {
            let shared = (0..mesh.vertex_count())
                .filter(|&i| mesh.normal(i) == *axis)
                .count();
            assert_eq!(shared, 6, "axis {:?}", axis);
        }
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let mesh = cube();
        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i).coords;
            let n = mesh.normal(i);
            // Outward face: the corner sits on the plane at +1 along its normal
            assert_abs_diff_eq!(p.dot(&n), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_cube_uvs_use_six_atlas_cells() {
        let mesh = cube();
        let mut cells: Vec<(u32, u32)> = (0..mesh.vertex_count())
            .step_by(6)
            .map(|first| {
                let face: Vec<[f32; 2]> = (first..first + 6).map(|i| mesh.uv(i)).collect();
                let min_u = face.iter().map(|uv| uv[0]).fold(f32::MAX, f32::min);
                let min_v = face.iter().map(|uv| uv[1]).fold(f32::MAX, f32::min);
                ((min_u * 2.0).round() as u32, (min_v * 3.0).round() as u32)
            })
            .collect();
        cells.sort_unstable();
        cells.dedup();
        assert_eq!(cells.len(), 6);
    }

    #[test]
    fn test_sphere_buffer_lengths() {
        let (stacks, sectors) = (8, 12);
        let mesh = sphere(stacks, sectors).unwrap();
        let expected = 3 * (stacks as usize + 1) * (sectors as usize + 1);
        assert_eq!(mesh.positions.len(), expected);
        assert_eq!(mesh.normals.len(), expected);
        assert_eq!(mesh.uv_coords.len() * 3, mesh.positions.len() * 2);
        assert_eq!(mesh.indices.len() % 3, 0);
        assert!(mesh.validate());
    }

    #[test]
    fn test_sphere_triangle_and_line_counts() {
        let (stacks, sectors) = (5u32, 7u32);
        let mesh = sphere(stacks, sectors).unwrap();
        // Each pole band contributes one triangle per sector instead of two
        let triangles = (2 * stacks - 2) * sectors;
        assert_eq!(mesh.indices.len(), (triangles * 3) as usize);
        let lines = stacks * sectors + (stacks - 1) * sectors;
        assert_eq!(mesh.line_indices.len(), (lines * 2) as usize);
    }

    #[test]
    fn test_sphere_normals_are_unit() {
        let mesh = sphere(10, 16).unwrap();
        for i in 0..mesh.vertex_count() {
            assert_abs_diff_eq!(mesh.normal(i).norm(), 1.0, epsilon = EPSILON);
        }
    }

    #[test]
    fn test_sphere_indices_in_bounds() {
        for (stacks, sectors) in [(1, 3), (2, 3), (3, 4), (20, 20)] {
            let mesh = sphere(stacks, sectors).unwrap();
            let count = mesh.vertex_count() as u32;
            assert!(mesh.indices.iter().all(|&i| i < count));
            assert!(mesh.line_indices.iter().all(|&i| i < count));
        }
    }

    #[test]
    fn test_single_stack_sphere_has_no_triangles() {
        let mesh = sphere(1, 3).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert!(mesh.indices.is_empty());
        assert_eq!(mesh.line_indices.len(), 6);
    }

    #[test]
    fn test_sphere_uvs() {
        let (stacks, sectors) = (4, 8);
        let mesh = sphere(stacks, sectors).unwrap();
        let ring = sectors as usize + 1;
        assert_eq!(mesh.uv(0), [0.0, 0.0]);
        assert_eq!(mesh.uv(ring + 2), [2.0 / 8.0, 1.0 / 4.0]);
        assert_eq!(mesh.uv(mesh.vertex_count() - 1), [1.0, 1.0]);
    }

    #[test]
    fn test_sphere_rejects_bad_subdivisions() {
        assert!(matches!(sphere(0, 8), Err(MeshError::InvalidParameter { .. })));
        assert!(matches!(sphere(4, 2), Err(MeshError::InvalidParameter { .. })));
        assert!(MeshSource::sphere(0, 3).is_err());
    }

    #[test]
    fn test_sphere_rejects_oversized_subdivisions() {
        assert!(matches!(
            sphere(2, u32::MAX),
            Err(MeshError::InvalidParameter { .. })
        ));
        assert!(MeshSource::sphere(4096, 4096).is_err());
        assert!(MeshSource::from_primitive("sphere", &[2.0, 4294967296.0]).is_err());
        // Just inside the limit is still accepted as a source
        assert!(MeshSource::sphere(4095, 4095).is_ok());
    }

    #[test]
    fn test_realign_axis_reads_original_components() {
        let theta = 30f32.to_radians();
        let mut buffer = [0.0, 1.0, 2.0, 5.0, -3.0, 0.5];
        realign_axis(&mut buffer, theta);

        let (s, c) = theta.sin_cos();
        assert_abs_diff_eq!(buffer[1], -(c * 1.0 - s * 2.0), epsilon = 1e-6);
        assert_abs_diff_eq!(buffer[2], c * 2.0 + s * 1.0, epsilon = 1e-6);
        assert_eq!(buffer[3], 5.0);
        assert_abs_diff_eq!(buffer[4], -(c * -3.0 - s * 0.5), epsilon = 1e-6);
        assert_abs_diff_eq!(buffer[5], c * 0.5 + s * -3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_realign_axis_preserves_length() {
        let mut buffer = [0.3, -0.4, 0.866_025_4];
        let before = Vector3::new(buffer[0], buffer[1], buffer[2]).norm();
        realign_axis(&mut buffer, 1.2);
        let after = Vector3::new(buffer[0], buffer[1], buffer[2]).norm();
        assert_abs_diff_eq!(before, after, epsilon = 1e-6);
    }

    #[test]
    fn test_sphere_north_pole_is_realigned() {
        let mesh = sphere(6, 6).unwrap();
        let theta = SPHERE_REALIGN_DEGREES.to_radians();
        let pole = mesh.position(0);
        // Unrealigned north pole is (0, 0, 1)
        assert_abs_diff_eq!(pole.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(pole.y, theta.sin(), epsilon = 1e-6);
        assert_abs_diff_eq!(pole.z, theta.cos(), epsilon = 1e-6);
    }

    #[test]
    fn test_from_primitive() {
        assert_eq!(MeshSource::from_primitive("cube", &[]), Ok(MeshSource::Cube));
        assert_eq!(
            MeshSource::from_primitive("Sphere", &[20.0, 30.0]),
            Ok(MeshSource::Sphere {
                stacks: 20,
                sectors: 30
            })
        );
        assert_eq!(
            MeshSource::from_primitive("sphere", &[]),
            Ok(MeshSource::Sphere {
                stacks: DEFAULT_SPHERE_STACKS,
                sectors: DEFAULT_SPHERE_SECTORS
            })
        );
        assert!(MeshSource::from_primitive("sphere", &[2.5, 8.0]).is_err());
        assert!(MeshSource::from_primitive("sphere", &[-1.0, 8.0]).is_err());
        assert!(MeshSource::from_primitive("sphere", &[4.0]).is_err());
        assert!(MeshSource::from_primitive("torus", &[]).is_err());
    }

    #[test]
    fn test_generate_is_deterministic() {
        let source = MeshSource::sphere(6, 9).unwrap();
        assert_eq!(generate(&source).unwrap(), source.generate().unwrap());
        assert_eq!(generate(&MeshSource::Cube).unwrap(), cube());
    }

    #[test]
    fn test_triangles_resolve_indices() {
        let mesh = sphere(3, 4).unwrap();
        let triangles: Vec<Triangle> = mesh.triangles().collect();
        assert_eq!(triangles.len(), mesh.triangle_count());
        let first = &triangles[0];
        let k = mesh.indices[0] as usize;
        assert_eq!(first.vertices[0].position, mesh.position(k));

        assert_eq!(cube().triangles().count(), 12);
    }

    #[test]
    fn test_calculate_normal() {
        let tri = Triangle::new(
            Vertex::new(0.0, 0.0, 0.0, 0.0, 0.0, 1.0),
            Vertex::new(1.0, 0.0, 0.0, 0.0, 0.0, 1.0),
            Vertex::new(0.0, 1.0, 0.0, 0.0, 0.0, 1.0),
        );
        assert_abs_diff_eq!(tri.calculate_normal(), Vector3::<f32>::z(), epsilon = 1e-6);
    }
}
