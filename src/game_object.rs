// Game objects: a unique id, an optional mesh, and a transform.

use glam::{Mat4, Vec3};
use std::f32::consts::TAU;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::model::Model;

/// Translation, scale, and Tait-Bryan YXZ rotation in radians.
#[derive(Debug, Clone, Copy)]
pub struct TransformComponent {
    pub translation: Vec3,
    pub scale: Vec3,
    pub rotation: Vec3,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
        }
    }
}

impl TransformComponent {
    /// Model matrix: translate * rotate_y * rotate_x * rotate_z * scale.
    pub fn mat4(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_z(self.rotation.z)
            * Mat4::from_scale(self.scale)
    }
}

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

pub struct GameObject {
    id: u32,
    pub model: Option<Arc<Model>>,
    pub color: Vec3,
    pub transform: TransformComponent,
}

impl GameObject {
    pub fn new() -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            model: None,
            color: Vec3::ONE,
            transform: TransformComponent::default(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

impl Default for GameObject {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame scene spin: the object at index `i` gains `0.001 * i` radians
/// of yaw, wrapped into one turn. The object at index zero stays still.
pub fn advance_rotations(objects: &mut [GameObject]) {
    for (i, object) in objects.iter_mut().enumerate() {
        object.transform.rotation.y =
            (object.transform.rotation.y + 0.001 * i as f32).rem_euclid(TAU);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec4;

    #[test]
    fn ids_are_unique() {
        let a = GameObject::new();
        let b = GameObject::new();
        let c = GameObject::new();
        assert_ne!(a.id(), b.id());
        assert_ne!(b.id(), c.id());
    }

    #[test]
    fn identity_transform_is_identity_matrix() {
        let transform = TransformComponent::default();
        let m = transform.mat4();
        assert_relative_eq!(m, Mat4::IDENTITY, epsilon = 1e-6);
    }

    #[test]
    fn translation_lands_in_last_column() {
        let transform = TransformComponent {
            translation: Vec3::new(1.0, 2.0, 3.0),
            ..Default::default()
        };
        let m = transform.mat4();
        assert_relative_eq!(m.w_axis, Vec4::new(1.0, 2.0, 3.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn scale_applies_before_rotation() {
        // Quarter turn around Y sends scaled +X to -Z.
        let transform = TransformComponent {
            scale: Vec3::splat(2.0),
            rotation: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            ..Default::default()
        };
        let moved = transform.mat4() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(moved.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(moved.z, -2.0, epsilon = 1e-6);
    }

    #[test]
    fn rotation_order_is_y_then_x_then_z() {
        let transform = TransformComponent {
            rotation: Vec3::new(0.3, 0.7, 1.1),
            ..Default::default()
        };
        let expected = Mat4::from_rotation_y(0.7)
            * Mat4::from_rotation_x(0.3)
            * Mat4::from_rotation_z(1.1);
        assert_relative_eq!(transform.mat4(), expected, epsilon = 1e-6);
    }

    #[test]
    fn first_object_never_rotates() {
        let mut objects: Vec<GameObject> = (0..3).map(|_| GameObject::new()).collect();
        for _ in 0..500 {
            advance_rotations(&mut objects);
        }
        assert_eq!(objects[0].transform.rotation.y, 0.0);
    }

    #[test]
    fn rotation_accumulates_per_index_and_wraps() {
        let mut objects: Vec<GameObject> = (0..40).map(|_| GameObject::new()).collect();
        for _ in 0..1000 {
            advance_rotations(&mut objects);
        }

        // Object 10 accumulates 0.001 * 10 * 1000 = 10 radians, wrapped.
        let expected = 10.0f32.rem_euclid(TAU);
        approx::assert_abs_diff_eq!(objects[10].transform.rotation.y, expected, epsilon = 1e-2);

        for object in &objects {
            let yaw = object.transform.rotation.y;
            assert!((0.0..TAU).contains(&yaw), "yaw {} out of range", yaw);
        }
    }
}
