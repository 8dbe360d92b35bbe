/// MeshScene Core Library - procedural meshes and transform composition
///
/// This library provides the stateless core of the scene pipeline: primitive
/// mesh generation, model matrix composition from transform instructions,
/// scene description decoding, and camera projection.

pub mod config;
pub mod description;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use description::{parse_description, Statement};
pub use error::{DescriptionError, MeshError, SceneError};
pub use geometry::{generate, Mesh, MeshSource, Triangle, Vertex};
pub use projection::{Camera, ProjectionMode};
pub use scene::{Renderable, Scene, SceneObject};
pub use transform::{compose, Instruction, InstructionSequence, Transform};
