/// Centralized constants for mesh generation and scene loading

/// Angle of the sphere axis realignment pass, in degrees.
///
/// Converted to radians before use. The pass tilts the generated sphere about
/// the X axis so its poles line up with the texture atlas "up" direction.
pub const SPHERE_REALIGN_DEGREES: f32 = 44.05;

/// Smallest stack count a sphere accepts
pub const MIN_SPHERE_STACKS: u32 = 1;

/// Smallest sector count a sphere accepts
pub const MIN_SPHERE_SECTORS: u32 = 3;

/// Largest vertex count a generated sphere may reach.
///
/// Keeps every index within `u32` and the buffers within a sane allocation.
pub const MAX_SPHERE_VERTICES: u64 = 1 << 24;

/// Stack count used when a sphere primitive omits its subdivisions
pub const DEFAULT_SPHERE_STACKS: u32 = 20;

/// Sector count used when a sphere primitive omits its subdivisions
pub const DEFAULT_SPHERE_SECTORS: u32 = 20;

/// Tolerance for float comparisons
pub const EPSILON: f32 = 1e-5;
