//! Viewer parameters as exposed on the settings panel.

use crate::{
    CoreError, CoreResult, Vec3,
    camera::{Axis, Camera},
};

/// Camera settings in panel units (degrees for angles).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraParams {
    pub position: Vec3,
    pub rotation_deg: Vec3,
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            rotation_deg: Vec3::ZERO,
            fov_deg: 45.0,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl CameraParams {
    /// Read the panel values back from a live camera.
    pub fn from_camera(camera: &Camera) -> Self {
        let angles = camera.angles();
        Self {
            position: camera.eye(),
            rotation_deg: Vec3::new(
                angles.x.to_degrees(),
                angles.y.to_degrees(),
                angles.z.to_degrees(),
            ),
            fov_deg: camera.fov().to_degrees(),
            aspect: camera.aspect(),
            near: camera.near(),
            far: camera.far(),
        }
    }

    /// Build a camera at `position`, rotated by `rotation_deg` about right, up
    /// and forward in that order.
    pub fn camera(&self) -> Camera {
        let mut camera = Camera::new_perspective(
            self.position,
            self.fov_deg.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
        for axis in Axis::ALL {
            camera.set_angle_degrees(axis, self.rotation_deg[axis.index()]);
        }
        camera
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerParams {
    /// Viewport size in pixels.
    pub resolution: (u32, u32),
    pub camera: CameraParams,
    /// Path stem of the model; `<stem>.obj` and `<stem>.ppm` are loaded.
    pub model_path: String,
}

impl Default for ViewerParams {
    fn default() -> Self {
        Self {
            resolution: (1280, 720),
            camera: CameraParams::default(),
            model_path: String::new(),
        }
    }
}

impl ViewerParams {
    pub fn viewport_aspect(&self) -> f32 {
        let (w, h) = self.resolution;
        w as f32 / h.max(1) as f32
    }

    pub fn validate(&self) -> CoreResult<()> {
        let (w, h) = self.resolution;
        if w == 0 || h == 0 {
            return Err(CoreError::InvalidParam(format!(
                "resolution must be non-zero, got {}x{}",
                w, h
            )));
        }

        let cam = &self.camera;
        if !(cam.fov_deg > 0.0 && cam.fov_deg < 180.0) {
            return Err(CoreError::InvalidParam(format!(
                "fov must be in (0, 180) degrees, got {}",
                cam.fov_deg
            )));
        }
        if !(cam.aspect > 0.0) {
            return Err(CoreError::InvalidParam(format!(
                "aspect must be positive, got {}",
                cam.aspect
            )));
        }
        if !(cam.near > 0.0) {
            return Err(CoreError::InvalidParam(format!(
                "near plane must be positive, got {}",
                cam.near
            )));
        }
        if !(cam.far > cam.near) {
            return Err(CoreError::InvalidParam(format!(
                "far plane ({}) must lie beyond near plane ({})",
                cam.far, cam.near
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = ViewerParams::default();
        assert!(params.validate().is_ok());
        assert!((params.viewport_aspect() - 1280.0 / 720.0).abs() < 1e-6);
    }

    #[test]
    fn bad_values_are_rejected() {
        let mut params = ViewerParams::default();
        params.camera.far = 0.05;
        assert!(matches!(params.validate(), Err(CoreError::InvalidParam(_))));

        let mut params = ViewerParams::default();
        params.resolution = (0, 720);
        assert!(params.validate().is_err());

        let mut params = ViewerParams::default();
        params.camera.fov_deg = f32::NAN;
        assert!(params.validate().is_err());
    }

    #[test]
    fn camera_round_trips_panel_values() {
        let params = CameraParams {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation_deg: Vec3::new(-45.0, 10.0, 0.0),
            ..CameraParams::default()
        };
        let camera = params.camera();
        let back = CameraParams::from_camera(&camera);

        assert!(back.position.abs_diff_eq(params.position, 1e-6));
        assert!(back.rotation_deg.abs_diff_eq(params.rotation_deg, 1e-3));
        assert!((back.fov_deg - 45.0).abs() < 1e-4);
        assert_eq!((back.near, back.far), (0.1, 100.0));
    }
}
