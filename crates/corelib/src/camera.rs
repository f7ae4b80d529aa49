use std::f32::consts::{PI, TAU};

use crate::{Mat3, Mat4, Vec3, Vec4};

/// One of the camera's basis vectors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Axis {
    Right,
    Up,
    Forward,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Right, Axis::Up, Axis::Forward];

    /// Component of `Camera::angles` tracking rotation about this axis.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Axis::Right => 0,
            Axis::Up => 1,
            Axis::Forward => 2,
        }
    }
}

/// Canned viewpoints offered by the parameter panel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CameraPreset {
    Default,
    Angled,
    TopDown,
}

impl CameraPreset {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "default" => Some(CameraPreset::Default),
            "angled" => Some(CameraPreset::Angled),
            "top-down" | "topdown" | "top" => Some(CameraPreset::TopDown),
            _ => None,
        }
    }

    pub fn eye(self) -> Vec3 {
        match self {
            CameraPreset::Default => Vec3::new(0.0, 0.0, 3.0),
            CameraPreset::Angled => Vec3::new(0.0, 2.0, 2.0),
            CameraPreset::TopDown => Vec3::new(0.0, 7.0, 0.0),
        }
    }

    /// Rotation about the right axis, radians.
    pub fn tilt(self) -> f32 {
        match self {
            CameraPreset::Default => 0.0,
            CameraPreset::Angled => -PI / 4.0,
            CameraPreset::TopDown => -PI / 2.0,
        }
    }
}

/// Perspective camera kept as an eye point plus a right/up/forward basis
/// (right-handed, looking down `-forward`).
///
/// Every mutator leaves `view()` consistent with the eye and basis, so there is
/// no separate refresh step to forget.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    eye: Vec3,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
    fov_y_rad: f32,
    aspect: f32,
    z_near: f32,
    z_far: f32,
    /// Accumulated panel rotation per axis. Informational only.
    angles: Vec3,
    view: Mat4,
    orthonormalize: bool,
}

impl Camera {
    pub fn new_perspective(
        eye: Vec3,
        fov_y_rad: f32,
        aspect: f32,
        z_near: f32,
        z_far: f32,
    ) -> Self {
        let mut camera = Self {
            eye,
            right: Vec3::X,
            up: Vec3::Y,
            forward: Vec3::Z,
            fov_y_rad,
            aspect,
            z_near,
            z_far,
            angles: Vec3::ZERO,
            view: Mat4::IDENTITY,
            orthonormalize: true,
        };
        camera.update();
        camera
    }

    /// Replace the basis vectors as given, without normalizing them.
    pub fn with_basis(mut self, right: Vec3, up: Vec3, forward: Vec3) -> Self {
        self.right = right;
        self.up = up;
        self.forward = forward;
        self.update();
        self
    }

    /// Re-derive the basis after every rotation (on by default). When off, a
    /// rotation only touches the two non-pivot axes and numerical drift can
    /// accumulate.
    #[inline]
    pub fn with_orthonormalize(mut self, enabled: bool) -> Self {
        self.orthonormalize = enabled;
        self
    }

    #[inline]
    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    #[inline]
    pub fn angles(&self) -> Vec3 {
        self.angles
    }

    #[inline]
    pub fn axis(&self, axis: Axis) -> Vec3 {
        match axis {
            Axis::Right => self.right,
            Axis::Up => self.up,
            Axis::Forward => self.forward,
        }
    }

    /// `[right, up, forward]`.
    #[inline]
    pub fn basis(&self) -> [Vec3; 3] {
        [self.right, self.up, self.forward]
    }

    /// World-to-camera transform.
    #[inline]
    pub fn view(&self) -> Mat4 {
        self.view
    }

    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov_y_rad
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    #[inline]
    pub fn near(&self) -> f32 {
        self.z_near
    }

    #[inline]
    pub fn far(&self) -> f32 {
        self.z_far
    }

    #[inline]
    pub fn set_fov(&mut self, fov_y_rad: f32) {
        self.fov_y_rad = fov_y_rad;
    }

    #[inline]
    pub fn set_fov_degrees(&mut self, degrees: f32) {
        self.fov_y_rad = degrees.to_radians();
    }

    #[inline]
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    #[inline]
    pub fn set_near(&mut self, z_near: f32) {
        self.z_near = z_near;
    }

    #[inline]
    pub fn set_far(&mut self, z_far: f32) {
        self.z_far = z_far;
    }

    /// Rebuild the view transform: basis vectors as rows, translation as the
    /// negated projection of the eye onto each axis.
    pub fn update(&mut self) {
        let (r, u, f) = (self.right, self.up, self.forward);
        self.view = Mat4::from_cols(
            Vec4::new(r.x, u.x, f.x, 0.0),
            Vec4::new(r.y, u.y, f.y, 0.0),
            Vec4::new(r.z, u.z, f.z, 0.0),
            self.translation().extend(1.0),
        );
    }

    /// Move the eye along one of the camera's own axes.
    pub fn translate_along(&mut self, axis: Axis, distance: f32) {
        self.eye += self.axis(axis) * distance;
        // Orientation is unchanged; only the translation column moves.
        self.view.w_axis = self.translation().extend(1.0);
    }

    /// Place the eye at an absolute world position.
    pub fn set_eye(&mut self, eye: Vec3) {
        self.eye = eye;
        self.view.w_axis = self.translation().extend(1.0);
    }

    /// Rotate the other two basis vectors about the current value of `axis`.
    /// Returns `false` and leaves the camera untouched when `axis` is degenerate.
    pub fn rotate_around(&mut self, axis: Axis, angle: f32) -> bool {
        let Some(pivot) = self.axis(axis).try_normalize() else {
            log::warn!("Ignoring rotation about degenerate {:?} axis", axis);
            return false;
        };
        let rotation = Mat3::from_axis_angle(pivot, angle);

        match axis {
            Axis::Right => {
                self.up = rotation * self.up;
                self.forward = rotation * self.forward;
            }
            Axis::Up => {
                self.right = rotation * self.right;
                self.forward = rotation * self.forward;
            }
            Axis::Forward => {
                self.right = rotation * self.right;
                self.up = rotation * self.up;
            }
        }

        if self.orthonormalize {
            self.reorthonormalize(axis);
        }
        self.update();
        true
    }

    /// Rotate so that the accumulated angle about `axis` becomes `radians`,
    /// wrapped into `[-PI, PI)`.
    pub fn set_angle(&mut self, axis: Axis, radians: f32) {
        let i = axis.index();
        let target = wrap_angle(radians);
        let delta = target - self.angles[i];
        if delta == 0.0 || self.rotate_around(axis, delta) {
            self.angles[i] = target;
        }
    }

    #[inline]
    pub fn set_angle_degrees(&mut self, axis: Axis, degrees: f32) {
        self.set_angle(axis, degrees.to_radians());
    }

    /// Back to the identity basis with zero accumulated angles.
    pub fn reset_orientation(&mut self) {
        self.right = Vec3::X;
        self.up = Vec3::Y;
        self.forward = Vec3::Z;
        self.angles = Vec3::ZERO;
        self.update();
    }

    pub fn apply_preset(&mut self, preset: CameraPreset) {
        self.reset_orientation();
        self.set_eye(preset.eye());
        self.set_angle(Axis::Right, preset.tilt());
    }

    fn translation(&self) -> Vec3 {
        Vec3::new(
            -self.right.dot(self.eye),
            -self.up.dot(self.eye),
            -self.forward.dot(self.eye),
        )
    }

    /// Gram-Schmidt with `fixed` as the anchor, then close the frame with a
    /// cross product so that `right x up = forward`.
    fn reorthonormalize(&mut self, fixed: Axis) {
        let frame = match fixed {
            Axis::Right => self.right.try_normalize().and_then(|r| {
                let u = (self.up - r * self.up.dot(r)).try_normalize()?;
                Some((r, u, r.cross(u)))
            }),
            Axis::Up => self.up.try_normalize().and_then(|u| {
                let f = (self.forward - u * self.forward.dot(u)).try_normalize()?;
                Some((u.cross(f), u, f))
            }),
            Axis::Forward => self.forward.try_normalize().and_then(|f| {
                let r = (self.right - f * self.right.dot(f)).try_normalize()?;
                Some((r, f.cross(r), f))
            }),
        };

        match frame {
            Some((r, u, f)) => {
                self.right = r;
                self.up = u;
                self.forward = f;
            }
            None => log::warn!("Camera basis is degenerate; leaving it as is"),
        }
    }
}

/// Wrap an angle into `[-PI, PI)`.
#[inline]
pub fn wrap_angle(radians: f32) -> f32 {
    (radians + PI).rem_euclid(TAU) - PI
}
