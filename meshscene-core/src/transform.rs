/// Transform instructions and their composition into model matrices.
///
/// Matrices follow the row-vector convention: a point is transformed as
/// `v' = v · M`, and translation lives in the last row. `Matrix4` indexing
/// `(row, column)` matches that layout directly.
use log::debug;
use nalgebra::{Matrix4, Point3, RowVector4, Vector3};

/// One elementary transform authored for a scene object.
///
/// Angles are in degrees.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Translate(f32, f32, f32),
    RotateX(f32),
    RotateY(f32),
    RotateZ(f32),
    Scale(f32, f32, f32),
    /// A tag this version does not understand; contributes nothing
    Unknown(String),
}

/// Ordered instructions attached to one scene object
pub type InstructionSequence = Vec<Instruction>;

impl Instruction {
    /// Number of numeric values the tag expects, or `None` for unknown tags
    pub fn arity(tag: &str) -> Option<usize> {
        match tag {
            "T" | "S" => Some(3),
            "Rx" | "Ry" | "Rz" => Some(1),
            _ => None,
        }
    }

    /// Decode the tuple form `tag, values...`.
    ///
    /// Returns `None` when a known tag gets fewer values than it needs.
    /// Surplus values are ignored.
    pub fn from_fields(tag: &str, values: &[f32]) -> Option<Self> {
        let instruction = match (tag, values) {
            ("T", [x, y, z, ..]) => Self::Translate(*x, *y, *z),
            ("Rx", [deg, ..]) => Self::RotateX(*deg),
            ("Ry", [deg, ..]) => Self::RotateY(*deg),
            ("Rz", [deg, ..]) => Self::RotateZ(*deg),
            ("S", [sx, sy, sz, ..]) => Self::Scale(*sx, *sy, *sz),
            (tag, _) if Self::arity(tag).is_some() => return None,
            (tag, _) => Self::Unknown(tag.to_string()),
        };
        Some(instruction)
    }

    /// The elementary matrix for this instruction, `None` for unknown tags
    pub fn matrix(&self) -> Option<Matrix4<f32>> {
        match *self {
            Self::Translate(x, y, z) => Some(Transform::translation_matrix(x, y, z)),
            Self::RotateX(deg) => Some(Transform::rotation_x_matrix(deg)),
            Self::RotateY(deg) => Some(Transform::rotation_y_matrix(deg)),
            Self::RotateZ(deg) => Some(Transform::rotation_z_matrix(deg)),
            Self::Scale(sx, sy, sz) => Some(Transform::scale_matrix(sx, sy, sz)),
            Self::Unknown(_) => None,
        }
    }
}

/// Compose an instruction sequence into a single model matrix.
///
/// Instructions are consumed last-declared first, each multiplied onto the
/// right of the running product. The empty sequence yields the identity.
pub fn compose(sequence: &[Instruction]) -> Matrix4<f32> {
    let mut overall = Matrix4::identity();
    for instruction in sequence.iter().rev() {
        match instruction.matrix() {
            Some(elementary) => overall *= elementary,
            None => debug!("Skipping unrecognized transform instruction {:?}", instruction),
        }
    }
    overall
}

/// Elementary row-vector transform matrices
pub struct Transform;

impl Transform {
    /// Create a translation matrix
    #[rustfmt::skip]
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            x,   y,   z,   1.0,
        )
    }

    /// Create a rotation about X, angle in degrees
    #[rustfmt::skip]
    pub fn rotation_x_matrix(degrees: f32) -> Matrix4<f32> {
        let (s, c) = degrees.to_radians().sin_cos();
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c,   s,   0.0,
            0.0, -s,  c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Create a rotation about Y, angle in degrees
    #[rustfmt::skip]
    pub fn rotation_y_matrix(degrees: f32) -> Matrix4<f32> {
        let (s, c) = degrees.to_radians().sin_cos();
        Matrix4::new(
            c,   0.0, -s,  0.0,
            0.0, 1.0, 0.0, 0.0,
            s,   0.0, c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Create a rotation about Z, angle in degrees
    #[rustfmt::skip]
    pub fn rotation_z_matrix(degrees: f32) -> Matrix4<f32> {
        let (s, c) = degrees.to_radians().sin_cos();
        Matrix4::new(
            c,   s,   0.0, 0.0,
            -s,  c,   0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Create a non-uniform scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    /// Flatten to 16 row-major floats; translation lands at 12, 13, 14
    pub fn to_row_major(matrix: &Matrix4<f32>) -> [f32; 16] {
        let mut out = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                out[row * 4 + col] = matrix[(row, col)];
            }
        }
        out
    }
}

/// Transform a point as the row vector `(x, y, z, 1)`
pub fn transform_point(matrix: &Matrix4<f32>, point: &Point3<f32>) -> Point3<f32> {
    let v = RowVector4::new(point.x, point.y, point.z, 1.0) * matrix;
    if v.w.abs() > f32::EPSILON && v.w != 1.0 {
        Point3::new(v.x / v.w, v.y / v.w, v.z / v.w)
    } else {
        Point3::new(v.x, v.y, v.z)
    }
}

/// Transform a direction as the row vector `(x, y, z, 0)`
pub fn transform_vector(matrix: &Matrix4<f32>, vector: &Vector3<f32>) -> Vector3<f32> {
    let v = RowVector4::new(vector.x, vector.y, vector.z, 0.0) * matrix;
    Vector3::new(v.x, v.y, v.z)
}
