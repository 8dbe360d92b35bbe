/// Error types for mesh generation, description decoding and scene assembly
use thiserror::Error;

/// Errors raised while generating primitive meshes
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    /// Primitive parameters outside their accepted range, or an unknown kind
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },
}

impl MeshError {
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }
}

/// Errors raised while decoding scene description text.
///
/// `statement` is the 1-based position of the offending statement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DescriptionError {
    #[error("Syntax error in statement {statement}: {message}")]
    Syntax { statement: usize, message: String },

    #[error("Unknown statement code '{code}' in statement {statement}")]
    UnknownStatement { statement: usize, code: String },

    #[error("Statement {statement} is missing field '{field}'")]
    MissingField { statement: usize, field: &'static str },

    #[error("Statement {statement} has invalid number '{value}' for field '{field}'")]
    InvalidNumber {
        statement: usize,
        field: &'static str,
        value: String,
    },
}

/// Errors raised while assembling a scene from decoded statements
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error(transparent)]
    Description(#[from] DescriptionError),

    #[error("Primitive '{primitive}': {source}")]
    Mesh {
        primitive: String,
        #[source]
        source: MeshError,
    },

    #[error("Object '{object}' references unknown primitive '{primitive}'")]
    UnknownPrimitive { object: String, primitive: String },

    #[error("Object '{object}' references unknown material '{material}'")]
    UnknownMaterial { object: String, material: String },

    #[error("Scene description declares no camera")]
    MissingCamera,
}
