//! Viewer state: the current mesh, texture and camera, owned in one place.

use std::path::Path;

use anyhow::{Context, Result};
use asset::{MeshBuffers, TextureData, obj};
use corelib::{
    CoreResult,
    camera::{Camera, CameraPreset},
    params::{CameraParams, ViewerParams},
};

/// Edge length of the checkerboard used until a pixel map is loaded.
const FALLBACK_TEXTURE_SIZE: u32 = 64;

pub struct Viewer {
    params: ViewerParams,
    camera: Camera,
    mesh: Option<MeshBuffers>,
    texture: TextureData,
}

impl Viewer {
    pub fn new(params: ViewerParams) -> CoreResult<Self> {
        params.validate()?;
        let camera = params.camera.camera();
        let (width, height) = params.resolution;

        let mut viewer = Self {
            params,
            camera,
            mesh: None,
            texture: TextureData::create_test_texture(FALLBACK_TEXTURE_SIZE),
        };
        viewer.resize(width, height);
        Ok(viewer)
    }

    /// Replace mesh and texture. Nothing changes unless both decode.
    pub fn load_model(&mut self, obj_text: &str, ppm: Option<&[u8]>) -> Result<()> {
        let mesh = obj::load_obj_from_str(obj_text).context("Failed to parse mesh")?;
        let texture = match ppm {
            Some(raw) => TextureData::from_ppm(raw).context("Failed to decode texture")?,
            None => TextureData::create_test_texture(FALLBACK_TEXTURE_SIZE),
        };
        self.commit(mesh, texture);
        Ok(())
    }

    /// File-backed variant of [`Viewer::load_model`].
    pub fn load_model_files(&mut self, obj_path: &Path, ppm_path: Option<&Path>) -> Result<()> {
        log::info!("Loading model from {:?}", obj_path);
        let obj_text = std::fs::read_to_string(obj_path)
            .with_context(|| format!("Failed to read OBJ file {:?}", obj_path))?;
        let ppm = ppm_path
            .map(|path| {
                log::info!("Loading texture from {:?}", path);
                std::fs::read(path).with_context(|| format!("Failed to read pixel map {:?}", path))
            })
            .transpose()?;

        self.load_model(&obj_text, ppm.as_deref())
            .with_context(|| format!("Failed to load model {:?}", obj_path))?;
        self.params.model_path = obj_path.display().to_string();
        Ok(())
    }

    fn commit(&mut self, mesh: MeshBuffers, texture: TextureData) {
        log::info!(
            "Model ready: {} vertices, texture {}x{}",
            mesh.vertex_count(),
            texture.width,
            texture.height
        );
        self.mesh = Some(mesh);
        self.texture = texture;
    }

    /// Viewport resize; the camera follows the new aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        self.params.resolution = (width, height);
        self.camera.set_aspect(self.params.viewport_aspect());
        log::debug!("Resized: {}x{}, aspect={:.3}", width, height, self.camera.aspect());
    }

    pub fn apply_preset(&mut self, preset: CameraPreset) {
        self.camera.apply_preset(preset);
        log::info!("Camera preset {:?}: eye={}", preset, self.camera.eye());
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.as_ref().map_or(0, MeshBuffers::vertex_count)
    }

    #[inline]
    pub fn mesh(&self) -> Option<&MeshBuffers> {
        self.mesh.as_ref()
    }

    #[inline]
    pub fn texture(&self) -> &TextureData {
        &self.texture
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Current parameters, with the camera section read back from the camera.
    pub fn params(&self) -> ViewerParams {
        ViewerParams {
            camera: CameraParams::from_camera(&self.camera),
            ..self.params.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::{Vec3, camera::Axis};

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn viewer() -> Viewer {
        Viewer::new(ViewerParams::default()).expect("default params are valid")
    }

    #[test]
    fn starts_empty_with_fallback_texture() {
        let v = viewer();
        assert!(!v.is_loaded());
        assert_eq!(v.vertex_count(), 0);
        assert!(v.texture().is_valid());
        assert!((v.camera().aspect() - 1280.0 / 720.0).abs() < 1e-6);
    }

    #[test]
    fn load_model_commits_mesh_and_texture() {
        let mut v = viewer();
        v.load_model(TRIANGLE, Some(b"P3\n2 1\n255\n1 2 3 4 5 6\n".as_slice()))
            .expect("load");
        assert!(v.is_loaded());
        assert_eq!(v.vertex_count(), 3);
        assert_eq!(v.texture().data, vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn failed_texture_keeps_previous_state() {
        let mut v = viewer();
        v.load_model(TRIANGLE, None).expect("load");
        let before = v.texture().clone();

        let quad = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        assert!(v.load_model(quad, Some(b"P7 nope".as_slice())).is_err());
        assert_eq!(v.vertex_count(), 3);
        assert_eq!(v.texture(), &before);
    }

    #[test]
    fn resize_updates_aspect() {
        let mut v = viewer();
        v.resize(800, 800);
        assert_eq!(v.camera().aspect(), 1.0);
        assert_eq!(v.params().resolution, (800, 800));
    }

    #[test]
    fn params_reflect_camera_moves() {
        let mut v = viewer();
        v.camera_mut().translate_along(Axis::Forward, -1.0);
        v.camera_mut().set_angle_degrees(Axis::Up, 90.0);

        let params = v.params();
        assert!(params.camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, 4.0), 1e-6));
        assert!((params.camera.rotation_deg.y - 90.0).abs() < 1e-3);
    }

    #[test]
    fn load_model_files_reads_mesh_and_pixel_map() {
        let dir = std::env::temp_dir().join(format!("meshview-viewer-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let obj_path = dir.join("triangle.obj");
        let ppm_path = dir.join("triangle.ppm");
        std::fs::write(&obj_path, TRIANGLE).expect("write obj");
        std::fs::write(&ppm_path, "P3\n1 1\n255\n9 8 7\n").expect("write ppm");

        let mut v = viewer();
        v.load_model_files(&obj_path, Some(&ppm_path)).expect("load");
        assert_eq!(v.vertex_count(), 3);
        assert_eq!(v.texture().data, vec![9, 8, 7, 255]);
        assert_eq!(v.params().model_path, obj_path.display().to_string());

        assert!(v.load_model_files(&dir.join("missing.obj"), None).is_err());
        assert_eq!(v.vertex_count(), 3);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn invalid_params_are_rejected() {
        let mut params = ViewerParams::default();
        params.camera.near = 0.0;
        assert!(Viewer::new(params).is_err());
    }
}
