/// Scene assembly: named primitives, materials and objects with their
/// transform sequences
use std::collections::HashMap;

use log::{debug, warn};
use nalgebra::Matrix4;

use crate::description::{
    parse_description, CameraStatement, LightStatement, MaterialStatement, ObjectStatement,
    Statement,
};
use crate::error::SceneError;
use crate::geometry::{Mesh, MeshSource};
use crate::transform::{compose, Instruction, InstructionSequence};

/// A named object: which primitive to draw, with which material, and how to
/// place it
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub primitive: String,
    pub material: String,
    pub instructions: InstructionSequence,
}

/// Everything a renderer needs for one object in one frame
#[derive(Debug)]
pub struct Renderable<'a> {
    pub name: &'a str,
    pub mesh: &'a Mesh,
    pub material: &'a MaterialStatement,
    pub model: Matrix4<f32>,
}

#[derive(Debug, Default)]
pub struct Scene {
    camera: Option<CameraStatement>,
    lights: Vec<LightStatement>,
    materials: HashMap<String, MaterialStatement>,
    primitives: HashMap<String, MeshSource>,
    meshes: HashMap<MeshSource, Mesh>,
    objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a textual description and load it
    pub fn from_description(input: &str) -> Result<Self, SceneError> {
        let statements = parse_description(input)?;
        Self::from_statements(statements)
    }

    /// Load decoded statements in declaration order
    pub fn from_statements(
        statements: impl IntoIterator<Item = Statement>,
    ) -> Result<Self, SceneError> {
        let mut scene = Self::new();
        for statement in statements {
            scene.apply(statement)?;
        }
        debug!(
            "Loaded scene: {} objects, {} primitives, {} unique meshes, {} materials, {} lights",
            scene.objects.len(),
            scene.primitives.len(),
            scene.meshes.len(),
            scene.materials.len(),
            scene.lights.len()
        );
        Ok(scene)
    }

    /// Apply one statement.
    ///
    /// Later primitives and materials replace earlier ones of the same name.
    /// Redeclaring an object replaces it and clears its instructions.
    pub fn apply(&mut self, statement: Statement) -> Result<(), SceneError> {
        match statement {
            Statement::Camera(camera) => self.camera = Some(camera),
            Statement::Light(light) => self.lights.push(light),
            Statement::Primitive(primitive) => {
                let source = MeshSource::from_primitive(&primitive.kind, &primitive.params)
                    .map_err(|source| SceneError::Mesh {
                        primitive: primitive.name.clone(),
                        source,
                    })?;
                if !self.meshes.contains_key(&source) {
                    let mesh = source.generate().map_err(|source| SceneError::Mesh {
                        primitive: primitive.name.clone(),
                        source,
                    })?;
                    self.meshes.insert(source, mesh);
                }
                self.primitives.insert(primitive.name, source);
            }
            Statement::Material(material) => {
                self.materials.insert(material.name.clone(), material);
            }
            Statement::Object(object) => self.add_object(object)?,
            Statement::Transform(transform) => {
                match self.objects.iter_mut().find(|o| o.name == transform.object) {
                    Some(object) => object.instructions.push(transform.instruction),
                    None => warn!(
                        "Ignoring transform {:?} for undeclared object '{}'",
                        transform.instruction, transform.object
                    ),
                }
            }
        }
        Ok(())
    }

    fn add_object(&mut self, object: ObjectStatement) -> Result<(), SceneError> {
        if !self.primitives.contains_key(&object.primitive) {
            return Err(SceneError::UnknownPrimitive {
                object: object.name,
                primitive: object.primitive,
            });
        }
        if !self.materials.contains_key(&object.material) {
            return Err(SceneError::UnknownMaterial {
                object: object.name,
                material: object.material,
            });
        }

        let entry = SceneObject {
            name: object.name,
            primitive: object.primitive,
            material: object.material,
            instructions: Vec::new(),
        };
        match self.objects.iter_mut().find(|o| o.name == entry.name) {
            Some(existing) => {
                debug!("Object '{}' redeclared, replacing", entry.name);
                *existing = entry;
            }
            None => self.objects.push(entry),
        }
        Ok(())
    }

    pub fn camera(&self) -> Option<&CameraStatement> {
        self.camera.as_ref()
    }

    pub fn require_camera(&self) -> Result<&CameraStatement, SceneError> {
        self.camera.as_ref().ok_or(SceneError::MissingCamera)
    }

    pub fn lights(&self) -> &[LightStatement] {
        &self.lights
    }

    pub fn material(&self, name: &str) -> Option<&MaterialStatement> {
        self.materials.get(name)
    }

    /// Objects in declaration order
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// The generated mesh an object draws
    pub fn mesh(&self, object: &str) -> Option<&Mesh> {
        let object = self.object(object)?;
        let source = self.primitives.get(&object.primitive)?;
        self.meshes.get(source)
    }

    /// Compose an object's instruction sequence into its model matrix
    pub fn model_matrix(&self, object: &str) -> Option<Matrix4<f32>> {
        self.object(object).map(|o| compose(&o.instructions))
    }

    /// Model matrix with `outer` instructions applied after the object's own,
    /// in world space
    pub fn model_matrix_with(&self, object: &str, outer: &[Instruction]) -> Option<Matrix4<f32>> {
        let object = self.object(object)?;
        // The first-declared instruction is the last one applied to a vertex
        let sequence: Vec<Instruction> = outer
            .iter()
            .chain(object.instructions.iter())
            .cloned()
            .collect();
        Some(compose(&sequence))
    }

    /// Resolve every object for drawing, with `outer` applied to each
    pub fn renderables(&self, outer: &[Instruction]) -> Vec<Renderable<'_>> {
        self.objects
            .iter()
            .filter_map(|object| {
                let mesh = self.mesh(&object.name)?;
                let material = self.materials.get(&object.material)?;
                let model = self.model_matrix_with(&object.name, outer)?;
                Some(Renderable {
                    name: &object.name,
                    mesh,
                    material,
                    model,
                })
            })
            .collect()
    }
}
