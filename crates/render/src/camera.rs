use glam::{Mat4, Vec3};

/// Speed factor while the boost key is held.
pub const BOOST_MULTIPLIER: f32 = 5.0;
/// Speed factor while the slow key is held.
pub const SLOW_MULTIPLIER: f32 = 0.1;

/// Free-flying camera with position, yaw, pitch and projection parameters.
/// Yaw is measured from +X towards +Z, so a yaw of 90 degrees looks down +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// World units per second.
    pub speed: f32,
    /// Radians per pixel of mouse motion.
    pub sensitivity: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -10.0),
            yaw: 90.0_f32.to_radians(),
            pitch: 0.0,
            fov: std::f32::consts::FRAC_PI_4,
            aspect: 16.0 / 9.0,
            near: 0.01,
            far: 100.0,
            speed: 3.0,
            sensitivity: 0.002,
        }
    }
}

impl FlyCamera {
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    pub fn move_forward(&mut self, dt: f32) {
        let fwd = self.forward();
        self.position += fwd * self.speed * dt;
    }

    pub fn move_backward(&mut self, dt: f32) {
        let fwd = self.forward();
        self.position -= fwd * self.speed * dt;
    }

    pub fn move_left(&mut self, dt: f32) {
        let right = self.right();
        self.position -= right * self.speed * dt;
    }

    pub fn move_right(&mut self, dt: f32) {
        let right = self.right();
        self.position += right * self.speed * dt;
    }

    pub fn move_up(&mut self, dt: f32) {
        self.position.y += self.speed * dt;
    }

    pub fn move_down(&mut self, dt: f32) {
        self.position.y -= self.speed * dt;
    }

    /// Move along local axes: `axes` is (right, up, forward), each in -1..=1.
    pub fn apply_motion(&mut self, axes: Vec3, dt: f32, multiplier: f32) {
        let step = self.speed * multiplier * dt;
        self.position += (self.right() * axes.x + Vec3::Y * axes.y + self.forward() * axes.z) * step;
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch -= dy * self.sensitivity;
        self.pitch = self.pitch.clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_for(self.aspect)
    }

    /// Projection for a specific aspect ratio, with depth mapped to 0..1.
    pub fn projection_for(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Movement speed factor for the modifier keys. Both held multiply together.
pub fn speed_multiplier(boost: bool, slow: bool) -> f32 {
    let mut m = 1.0;
    if boost {
        m *= BOOST_MULTIPLIER;
    }
    if slow {
        m *= SLOW_MULTIPLIER;
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn default_camera() {
        let cam = FlyCamera::default();
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, -10.0));
        assert!(close(cam.forward(), Vec3::Z));
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let cam = FlyCamera::default();
        let clip = cam.view_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn camera_movement() {
        let mut cam = FlyCamera::default();
        let start = cam.position;
        cam.move_forward(1.0);
        assert!(close(cam.position, start + Vec3::Z * 3.0));
        cam.move_up(1.0);
        assert!((cam.position.y - 3.0).abs() < 1e-5);
    }

    #[test]
    fn apply_motion_scales_by_multiplier() {
        let mut cam = FlyCamera::default();
        cam.apply_motion(Vec3::new(0.0, 0.0, 1.0), 1.0, speed_multiplier(true, false));
        assert!(close(cam.position, Vec3::new(0.0, 0.0, 5.0)));

        let mut cam = FlyCamera::default();
        cam.apply_motion(Vec3::new(1.0, 0.0, 0.0), 2.0, 1.0);
        assert!(close(cam.position - Vec3::new(0.0, 0.0, -10.0), cam.right() * 6.0));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = FlyCamera::default();
        cam.rotate(0.0, -1.0e6);
        assert!(cam.pitch <= 89.0_f32.to_radians() + 1e-6);
        cam.rotate(0.0, 1.0e6);
        assert!(cam.pitch >= -89.0_f32.to_radians() - 1e-6);
    }

    #[test]
    fn multipliers() {
        assert_eq!(speed_multiplier(false, false), 1.0);
        assert_eq!(speed_multiplier(true, false), 5.0);
        assert_eq!(speed_multiplier(false, true), 0.1);
        assert!((speed_multiplier(true, true) - 0.5).abs() < 1e-6);
    }
}
