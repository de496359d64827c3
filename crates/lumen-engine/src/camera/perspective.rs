use glam::{Mat4, Quat, Vec3};

use crate::error::ViewerError;

/// Perspective camera with a lazily rebuilt projection matrix.
///
/// Pose (`position`, `orientation`) is public: animation and control
/// collaborators move the camera freely. Projection parameters go through
/// setters so the cached matrix is invalidated whenever one changes.
///
/// Conventions: right-handed, looking down -Z with +Y up at identity
/// orientation; clip-space depth in `[0, 1]` as wgpu expects.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub orientation: Quat,

    fov_y_degrees: f32,
    aspect: f32,
    near: f32,
    far: f32,

    projection: Mat4,
    projection_stale: bool,
}

impl PerspectiveCamera {
    /// Creates a camera at the origin with aspect ratio 1.
    ///
    /// Fails if `fov_y_degrees` is outside `(0, 180)`, `near <= 0`, or
    /// `far <= near`.
    pub fn new(fov_y_degrees: f32, near: f32, far: f32) -> Result<Self, ViewerError> {
        validate_fov(fov_y_degrees)?;
        validate_planes(near, far)?;
        Ok(Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            fov_y_degrees,
            aspect: 1.0,
            near,
            far,
            projection: Mat4::IDENTITY,
            projection_stale: true,
        })
    }

    #[inline]
    pub fn fov_y_degrees(&self) -> f32 {
        self.fov_y_degrees
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    #[inline]
    pub fn near(&self) -> f32 {
        self.near
    }

    #[inline]
    pub fn far(&self) -> f32 {
        self.far
    }

    /// Sets `aspect = width / height` and marks the projection stale.
    ///
    /// A zero dimension fails with [`ViewerError::InvalidViewport`] and leaves
    /// the camera untouched.
    pub fn set_aspect_ratio(&mut self, width: u32, height: u32) -> Result<(), ViewerError> {
        if width == 0 || height == 0 {
            return Err(ViewerError::InvalidViewport { width, height });
        }
        self.aspect = width as f32 / height as f32;
        self.projection_stale = true;
        Ok(())
    }

    pub fn set_fov_degrees(&mut self, fov_y_degrees: f32) -> Result<(), ViewerError> {
        validate_fov(fov_y_degrees)?;
        self.fov_y_degrees = fov_y_degrees;
        self.projection_stale = true;
        Ok(())
    }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) -> Result<(), ViewerError> {
        validate_planes(near, far)?;
        self.near = near;
        self.far = far;
        self.projection_stale = true;
        Ok(())
    }

    #[inline]
    pub fn is_projection_stale(&self) -> bool {
        self.projection_stale
    }

    /// Returns the projection matrix, rebuilding it first if a parameter changed.
    pub fn effective_projection(&mut self) -> Mat4 {
        if self.projection_stale {
            self.projection = Mat4::perspective_rh(
                self.fov_y_degrees.to_radians(),
                self.aspect,
                self.near,
                self.far,
            );
            self.projection_stale = false;
        }
        self.projection
    }

    /// World-to-camera transform.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn view_projection(&mut self) -> Mat4 {
        self.effective_projection() * self.view_matrix()
    }

    #[inline]
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Direction the camera looks along, in world space.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// Turns the camera to face `target`, keeping +Y up.
    ///
    /// Does nothing if `target` coincides with the camera position.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = target - self.position;
        if dir.length_squared() <= f32::EPSILON {
            return;
        }
        // Looking straight up/down: +Y cannot serve as the up vector.
        let up = if dir.normalize().cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(self.position, target, up);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        self.orientation = rotation.normalize();
    }
}

fn validate_fov(fov_y_degrees: f32) -> Result<(), ViewerError> {
    if !(fov_y_degrees > 0.0 && fov_y_degrees < 180.0) {
        return Err(ViewerError::InvalidProjection {
            reason: "field of view must be within (0, 180) degrees",
        });
    }
    Ok(())
}

fn validate_planes(near: f32, far: f32) -> Result<(), ViewerError> {
    if !(near.is_finite() && near > 0.0) {
        return Err(ViewerError::InvalidProjection { reason: "near plane must be positive" });
    }
    if !(far.is_finite() && far > near) {
        return Err(ViewerError::InvalidProjection {
            reason: "far plane must lie beyond the near plane",
        });
    }
    Ok(())
}
