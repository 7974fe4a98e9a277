// Camera projection and view matrices.
//
// Matrices are built column by column for Vulkan conventions: clip-space
// depth in [0, 1] and y pointing down. No matrix is inverted at runtime;
// the view matrix is assembled directly from the orthonormal basis.

use glam::{Mat4, Vec3, Vec4};

pub struct Camera {
    projection: Mat4,
    view: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        }
    }
}

impl Camera {
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn set_orthographic_projection(
        &mut self,
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    ) {
        self.projection = Mat4::from_cols(
            Vec4::new(2.0 / (right - left), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 / (bottom - top), 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0 / (far - near), 0.0),
            Vec4::new(
                -(right + left) / (right - left),
                -(bottom + top) / (bottom - top),
                -near / (far - near),
                1.0,
            ),
        );
    }

    /// `fovy` is the vertical field of view in radians.
    pub fn set_perspective_projection(&mut self, fovy: f32, aspect: f32, near: f32, far: f32) {
        debug_assert!(aspect.abs() > f32::EPSILON);
        let tan_half_fovy = (fovy / 2.0).tan();

        self.projection = Mat4::from_cols(
            Vec4::new(1.0 / (aspect * tan_half_fovy), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0 / tan_half_fovy, 0.0, 0.0),
            Vec4::new(0.0, 0.0, far / (far - near), 1.0),
            Vec4::new(0.0, 0.0, -(far * near) / (far - near), 0.0),
        );
    }

    /// Look along `direction` from `position`. `direction` must be nonzero.
    pub fn set_view_direction(&mut self, position: Vec3, direction: Vec3, up: Vec3) {
        debug_assert!(direction.length_squared() > f32::EPSILON);
        let w = direction.normalize();
        let u = w.cross(up).normalize();
        let v = w.cross(u);
        self.set_view_basis(position, u, v, w);
    }

    /// Look at `target` from `position`.
    pub fn set_view_target(&mut self, position: Vec3, target: Vec3, up: Vec3) {
        self.set_view_direction(position, target - position, up);
    }

    /// Build the view from a position and YXZ Euler rotation, matching the
    /// transform convention game objects use.
    pub fn set_view_yxz(&mut self, position: Vec3, rotation: Vec3) {
        let (s3, c3) = rotation.z.sin_cos();
        let (s2, c2) = rotation.x.sin_cos();
        let (s1, c1) = rotation.y.sin_cos();

        let u = Vec3::new(c1 * c3 + s1 * s2 * s3, c2 * s3, c1 * s2 * s3 - c3 * s1);
        let v = Vec3::new(c3 * s1 * s2 - c1 * s3, c2 * c3, c1 * c3 * s2 + s1 * s3);
        let w = Vec3::new(c2 * s1, -s2, c1 * c2);
        self.set_view_basis(position, u, v, w);
    }

    fn set_view_basis(&mut self, position: Vec3, u: Vec3, v: Vec3, w: Vec3) {
        self.view = Mat4::from_cols(
            Vec4::new(u.x, v.x, w.x, 0.0),
            Vec4::new(u.y, v.y, w.y, 0.0),
            Vec4::new(u.z, v.z, w.z, 0.0),
            Vec4::new(-u.dot(position), -v.dot(position), -w.dot(position), 1.0),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perspective_has_unit_w_row_on_z() {
        let mut camera = Camera::default();
        camera.set_perspective_projection(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let m = camera.projection();

        // fovy of 90 degrees with square aspect puts 1 on both focal terms.
        assert_relative_eq!(m.x_axis.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(m.y_axis.y, 1.0, epsilon = 1e-5);
        // w picks up z, not -z.
        assert_relative_eq!(m.z_axis.w, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn perspective_maps_near_and_far_to_zero_one() {
        let mut camera = Camera::default();
        camera.set_perspective_projection(1.0, 16.0 / 9.0, 0.5, 50.0);
        let m = camera.projection();

        let near = m * Vec4::new(0.0, 0.0, 0.5, 1.0);
        assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1e-5);

        let far = m * Vec4::new(0.0, 0.0, 50.0, 1.0);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn view_yxz_with_no_rotation_translates_only() {
        let mut camera = Camera::default();
        camera.set_view_yxz(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
        let m = camera.view();

        assert_relative_eq!(
            m,
            Mat4::from_translation(Vec3::new(-1.0, -2.0, -3.0)),
            epsilon = 1e-6
        );
    }

    #[test]
    fn view_target_centers_the_target() {
        let mut camera = Camera::default();
        let position = Vec3::new(0.0, -2.0, -4.0);
        let target = Vec3::new(0.0, 0.0, 2.0);
        camera.set_view_target(position, target, Vec3::new(0.0, -1.0, 0.0));

        let viewed = camera.view() * target.extend(1.0);
        assert_relative_eq!(viewed.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(viewed.y, 0.0, epsilon = 1e-5);
        assert!(viewed.z > 0.0);
    }

    #[test]
    fn orthographic_maps_volume_corners() {
        let mut camera = Camera::default();
        camera.set_orthographic_projection(-2.0, 2.0, -1.0, 1.0, 0.0, 10.0);
        let m = camera.projection();

        let corner = m * Vec4::new(2.0, 1.0, 10.0, 1.0);
        assert_relative_eq!(corner.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(corner.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(corner.z, 1.0, epsilon = 1e-6);
    }
}
