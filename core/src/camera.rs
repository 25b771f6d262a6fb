use glam::{Mat4, Vec2, Vec3};

pub const FOV_MIN_DEG: f32 = 43.0;
pub const FOV_MAX_DEG: f32 = 78.0;
/// Viewport width at which the field of view is widest.
pub const FOV_NARROW_WIDTH: f32 = 320.0;
/// Viewport width at which the field of view is narrowest.
pub const FOV_WIDE_WIDTH: f32 = 1920.0;
pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 3.8, 10.0);
pub const CAMERA_PITCH: f32 = -0.33;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 100.0;

/// Narrow viewports get a wider field of view so the side cards stay visible.
pub fn responsive_fov(width: f32) -> f32 {
    let t = ((width - FOV_NARROW_WIDTH) / (FOV_WIDE_WIDTH - FOV_NARROW_WIDTH)).clamp(0.0, 1.0);
    FOV_MAX_DEG + (FOV_MIN_DEG - FOV_MAX_DEG) * t
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Perspective camera looking down -Z, pitched about X.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraRig {
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub pitch: f32,
    viewport: Vec2,
}

impl CameraRig {
    pub fn new(width: f32, height: f32) -> Self {
        let mut rig = Self {
            fov_deg: FOV_MAX_DEG,
            aspect: 1.0,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            position: CAMERA_POSITION,
            pitch: CAMERA_PITCH,
            viewport: Vec2::ONE,
        };
        rig.resize(width, height);
        rig
    }

    /// Ignores degenerate sizes so a hidden container keeps the last good
    /// projection.
    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0) {
            return;
        }
        self.viewport = Vec2::new(width, height);
        self.aspect = width / height;
        self.fov_deg = responsive_fov(width);
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_rotation_x(self.pitch)
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.world_matrix().inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Distance in pixels from the eye to the projection plane.
    pub fn focal_length_px(&self) -> f32 {
        0.5 * self.viewport.y / (0.5 * self.fov_deg.to_radians()).tan()
    }

    /// Converts a pointer position relative to the viewport's top-left corner
    /// into normalized device coordinates.
    pub fn pointer_to_ndc(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(
            (x / self.viewport.x) * 2.0 - 1.0,
            -(y / self.viewport.y) * 2.0 + 1.0,
        )
    }

    pub fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray> {
        let inv = self.view_projection().inverse();
        let near = inv.project_point3(Vec3::new(ndc.x, ndc.y, -1.0));
        let far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        let direction = (far - near).normalize_or_zero();
        if direction == Vec3::ZERO || !near.is_finite() {
            return None;
        }
        Some(Ray {
            origin: near,
            direction,
        })
    }

    /// Projects a world point to viewport pixels. `None` when the point is
    /// behind the camera.
    pub fn project_to_viewport(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= 1.0e-6 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !ndc.x.is_finite() || !ndc.y.is_finite() {
            return None;
        }
        Some(Vec2::new(
            (ndc.x * 0.5 + 0.5) * self.viewport.x,
            (0.5 - ndc.y * 0.5) * self.viewport.y,
        ))
    }
}
