/// MeshScene Web - WASM bindings for mesh generation and transform composition
///
/// Exposes generated meshes as flat buffers for WebGL uploads, and model
/// matrices as 16 row-major floats.
use meshscene_core::description::{parse_description, Statement};
use meshscene_core::{compose, Mesh, MeshSource, Scene, Transform};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext, WebGlBuffer};

fn to_js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// A generated mesh as flat buffers
#[wasm_bindgen]
pub struct WebMesh {
    mesh: Mesh,
}

#[wasm_bindgen]
impl WebMesh {
    pub fn positions(&self) -> Vec<f32> {
        self.mesh.positions.clone()
    }

    pub fn normals(&self) -> Vec<f32> {
        self.mesh.normals.clone()
    }

    #[wasm_bindgen(js_name = uvCoords)]
    pub fn uv_coords(&self) -> Vec<f32> {
        self.mesh.uv_coords.clone()
    }

    pub fn indices(&self) -> Vec<u32> {
        self.mesh.indices.clone()
    }

    #[wasm_bindgen(js_name = lineIndices)]
    pub fn line_indices(&self) -> Vec<u32> {
        self.mesh.line_indices.clone()
    }

    #[wasm_bindgen(js_name = vertexCount)]
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }
}

/// Generate a primitive mesh, e.g. `generateMesh("sphere", [20, 20])`
#[wasm_bindgen(js_name = generateMesh)]
pub fn generate_mesh(kind: &str, params: Vec<f32>) -> Result<WebMesh, JsValue> {
    let source = MeshSource::from_primitive(kind, &params).map_err(to_js_error)?;
    let mesh = source.generate().map_err(to_js_error)?;
    Ok(WebMesh { mesh })
}

/// Compose the instructions of `X` statements into one row-major matrix.
///
/// Every transform statement in `description` contributes, in order,
/// regardless of the object it names.
#[wasm_bindgen(js_name = composeTransforms)]
pub fn compose_transforms(description: &str) -> Result<Vec<f32>, JsValue> {
    let instructions: Vec<_> = parse_description(description)
        .map_err(to_js_error)?
        .into_iter()
        .filter_map(|statement| match statement {
            Statement::Transform(transform) => Some(transform.instruction),
            _ => None,
        })
        .collect();
    Ok(Transform::to_row_major(&compose(&instructions)).to_vec())
}

/// A loaded scene description
#[wasm_bindgen]
pub struct WebScene {
    scene: Scene,
}

#[wasm_bindgen]
impl WebScene {
    #[wasm_bindgen(constructor)]
    pub fn new(description: &str) -> Result<WebScene, JsValue> {
        let scene = Scene::from_description(description).map_err(to_js_error)?;
        Ok(WebScene { scene })
    }

    /// Object names in declaration order
    pub fn objects(&self) -> Vec<JsValue> {
        self.scene
            .objects()
            .iter()
            .map(|o| JsValue::from_str(&o.name))
            .collect()
    }

    #[wasm_bindgen(js_name = modelMatrix)]
    pub fn model_matrix(&self, object: &str) -> Option<Vec<f32>> {
        self.scene
            .model_matrix(object)
            .map(|m| Transform::to_row_major(&m).to_vec())
    }

    pub fn mesh(&self, object: &str) -> Option<WebMesh> {
        self.scene.mesh(object).map(|mesh| WebMesh { mesh: mesh.clone() })
    }
}

/// Vertex and index buffers uploaded for one mesh
#[wasm_bindgen]
pub struct MeshBuffers {
    positions: WebGlBuffer,
    normals: WebGlBuffer,
    uv_coords: WebGlBuffer,
    indices: Option<WebGlBuffer>,
    index_count: usize,
    vertex_count: usize,
}

#[wasm_bindgen]
impl MeshBuffers {
    pub fn positions(&self) -> WebGlBuffer {
        self.positions.clone()
    }

    pub fn normals(&self) -> WebGlBuffer {
        self.normals.clone()
    }

    #[wasm_bindgen(js_name = uvCoords)]
    pub fn uv_coords(&self) -> WebGlBuffer {
        self.uv_coords.clone()
    }

    pub fn indices(&self) -> Option<WebGlBuffer> {
        self.indices.clone()
    }

    #[wasm_bindgen(js_name = indexCount)]
    pub fn index_count(&self) -> usize {
        self.index_count
    }

    #[wasm_bindgen(js_name = vertexCount)]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}

/// Owns a WebGL2 context and uploads meshes into it
#[wasm_bindgen]
pub struct WebRenderer {
    gl: Option<WebGl2RenderingContext>,
}

#[wasm_bindgen]
impl WebRenderer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebRenderer, JsValue> {
        Ok(WebRenderer { gl: None })
    }

    /// Initialize the renderer with a canvas element
    pub fn init(&mut self, canvas_id: &str) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("No document available"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("No element with id '{}'", canvas_id)))?
            .dyn_into()?;
        let gl: WebGl2RenderingContext = canvas
            .get_context("webgl2")?
            .ok_or_else(|| JsValue::from_str("WebGL2 is not supported"))?
            .dyn_into()?;
        log::info!("WebGL2 context ready on '{}'", canvas_id);
        self.gl = Some(gl);
        Ok(())
    }

    /// Upload a mesh's buffers; the index buffer is skipped for
    /// non-indexed meshes
    #[wasm_bindgen(js_name = uploadMesh)]
    pub fn upload_mesh(&self, mesh: &WebMesh) -> Result<MeshBuffers, JsValue> {
        let gl = self
            .gl
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Renderer is not initialized"))?;
        let mesh = &mesh.mesh;

        let indices = if mesh.is_indexed() {
            Some(upload(
                gl,
                WebGl2RenderingContext::ELEMENT_ARRAY_BUFFER,
                &u32_bytes(&mesh.indices),
            )?)
        } else {
            None
        };

        Ok(MeshBuffers {
            positions: upload(gl, WebGl2RenderingContext::ARRAY_BUFFER, &f32_bytes(&mesh.positions))?,
            normals: upload(gl, WebGl2RenderingContext::ARRAY_BUFFER, &f32_bytes(&mesh.normals))?,
            uv_coords: upload(gl, WebGl2RenderingContext::ARRAY_BUFFER, &f32_bytes(&mesh.uv_coords))?,
            indices,
            index_count: mesh.indices.len(),
            vertex_count: mesh.vertex_count(),
        })
    }
}

fn upload(gl: &WebGl2RenderingContext, target: u32, bytes: &[u8]) -> Result<WebGlBuffer, JsValue> {
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| JsValue::from_str("Failed to create buffer"))?;
    gl.bind_buffer(target, Some(&buffer));
    gl.buffer_data_with_u8_array(target, bytes, WebGl2RenderingContext::STATIC_DRAW);
    gl.bind_buffer(target, None);
    Ok(buffer)
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn u32_bytes(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_packing() {
        assert_eq!(f32_bytes(&[1.0]), 1.0f32.to_le_bytes().to_vec());
        assert_eq!(u32_bytes(&[1, 2]).len(), 8);
    }

    #[test]
    fn test_generate_mesh_buffers() {
        let mesh = generate_mesh("cube", Vec::new()).ok().unwrap();
        assert_eq!(mesh.positions().len(), 108);
        assert!(mesh.indices().is_empty());
        assert_eq!(mesh.vertex_count(), 36);
    }

    #[test]
    fn test_compose_transforms_row_major() {
        let matrix = compose_transforms("X,a,T,1,2,3;").ok().unwrap();
        assert_eq!(&matrix[12..15], &[1.0, 2.0, 3.0]);
    }
}
