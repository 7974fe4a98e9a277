// Lantern - a small real-time Vulkan renderer.
//
// The backend module wraps the device and presentation plumbing; everything
// above it (camera, game objects, render systems) is scene-level and owns no
// raw Vulkan handles except through the backend types.

pub mod backend;
pub mod camera;
pub mod config;
pub mod error;
pub mod frame_clock;
pub mod game_object;
pub mod input;
pub mod model;
pub mod render_system;
pub mod renderer;

pub use camera::Camera;
pub use config::Config;
pub use error::RenderError;
pub use frame_clock::FrameClock;
pub use game_object::{GameObject, TransformComponent};
pub use input::{KeyboardState, MovementController};
pub use model::{Model, Vertex};
pub use render_system::SimpleRenderSystem;
pub use renderer::Renderer;
