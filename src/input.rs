// Keyboard state tracking and first-person movement.

use glam::Vec3;
use std::collections::HashSet;
use std::f32::consts::TAU;
use winit::event::ElementState;
use winit::keyboard::KeyCode;

use crate::game_object::GameObject;

/// Which keys are currently held, fed from winit keyboard events.
#[derive(Debug, Default)]
pub struct KeyboardState {
    pressed: HashSet<KeyCode>,
}

impl KeyboardState {
    pub fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.pressed.insert(key);
            }
            ElementState::Released => {
                self.pressed.remove(&key);
            }
        }
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }
}

/// WASD movement in the horizontal plane plus arrow-key look, applied to a
/// game object's transform.
pub struct MovementController {
    pub move_speed: f32,
    pub look_speed: f32,
}

impl Default for MovementController {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            look_speed: 1.5,
        }
    }
}

impl MovementController {
    pub fn move_in_plane_xz(&self, keys: &KeyboardState, dt: f32, object: &mut GameObject) {
        let mut rotate = Vec3::ZERO;
        if keys.is_pressed(KeyCode::ArrowRight) {
            rotate.y += 1.0;
        }
        if keys.is_pressed(KeyCode::ArrowLeft) {
            rotate.y -= 1.0;
        }
        if keys.is_pressed(KeyCode::ArrowUp) {
            rotate.x += 1.0;
        }
        if keys.is_pressed(KeyCode::ArrowDown) {
            rotate.x -= 1.0;
        }

        if rotate.length_squared() > f32::EPSILON {
            object.transform.rotation += self.look_speed * dt * rotate.normalize();
        }

        // Pitch stays short of the poles; yaw wraps.
        object.transform.rotation.x = object.transform.rotation.x.clamp(-1.5, 1.5);
        object.transform.rotation.y = object.transform.rotation.y.rem_euclid(TAU);

        let yaw = object.transform.rotation.y;
        let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
        let right = Vec3::new(forward.z, 0.0, -forward.x);
        let up = Vec3::new(0.0, -1.0, 0.0);

        let mut direction = Vec3::ZERO;
        if keys.is_pressed(KeyCode::KeyW) {
            direction += forward;
        }
        if keys.is_pressed(KeyCode::KeyS) {
            direction -= forward;
        }
        if keys.is_pressed(KeyCode::KeyD) {
            direction += right;
        }
        if keys.is_pressed(KeyCode::KeyA) {
            direction -= right;
        }
        if keys.is_pressed(KeyCode::KeyE) {
            direction += up;
        }
        if keys.is_pressed(KeyCode::KeyQ) {
            direction -= up;
        }

        if direction.length_squared() > f32::EPSILON {
            object.transform.translation += self.move_speed * dt * direction.normalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn press(keys: &mut KeyboardState, key: KeyCode) {
        keys.handle_key(key, ElementState::Pressed);
    }

    #[test]
    fn release_clears_pressed_state() {
        let mut keys = KeyboardState::default();
        press(&mut keys, KeyCode::KeyW);
        assert!(keys.is_pressed(KeyCode::KeyW));
        keys.handle_key(KeyCode::KeyW, ElementState::Released);
        assert!(!keys.is_pressed(KeyCode::KeyW));
    }

    #[test]
    fn no_keys_means_no_movement() {
        let keys = KeyboardState::default();
        let controller = MovementController::default();
        let mut object = GameObject::new();

        controller.move_in_plane_xz(&keys, 0.016, &mut object);

        assert_eq!(object.transform.translation, Vec3::ZERO);
        assert_eq!(object.transform.rotation, Vec3::ZERO);
    }

    #[test]
    fn forward_at_zero_yaw_moves_along_positive_z() {
        let mut keys = KeyboardState::default();
        press(&mut keys, KeyCode::KeyW);
        let controller = MovementController::default();
        let mut object = GameObject::new();

        controller.move_in_plane_xz(&keys, 0.5, &mut object);

        assert_relative_eq!(object.transform.translation.z, 1.5, epsilon = 1e-5);
        assert_relative_eq!(object.transform.translation.x, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn pitch_clamps_before_the_poles() {
        let mut keys = KeyboardState::default();
        press(&mut keys, KeyCode::ArrowUp);
        let controller = MovementController::default();
        let mut object = GameObject::new();

        for _ in 0..1000 {
            controller.move_in_plane_xz(&keys, 0.016, &mut object);
        }

        assert_relative_eq!(object.transform.rotation.x, 1.5, epsilon = 1e-5);
    }

    #[test]
    fn yaw_wraps_into_one_turn() {
        let mut keys = KeyboardState::default();
        press(&mut keys, KeyCode::ArrowRight);
        let controller = MovementController::default();
        let mut object = GameObject::new();

        for _ in 0..2000 {
            controller.move_in_plane_xz(&keys, 0.016, &mut object);
        }

        let yaw = object.transform.rotation.y;
        assert!((0.0..TAU).contains(&yaw));
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let mut keys = KeyboardState::default();
        press(&mut keys, KeyCode::KeyW);
        press(&mut keys, KeyCode::KeyD);
        let controller = MovementController::default();
        let mut object = GameObject::new();

        controller.move_in_plane_xz(&keys, 1.0, &mut object);

        assert_relative_eq!(
            object.transform.translation.length(),
            controller.move_speed,
            epsilon = 1e-4
        );
    }
}
