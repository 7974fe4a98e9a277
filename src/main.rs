// Lantern - application entry point.
//
// Drives the winit event loop: owns the window, the Vulkan device, the frame
// orchestrator and the scene, and renders on every redraw request. Rendering
// stalls while the window is minimized and resumes on restore.

use anyhow::{Context, Result};
use ash::vk;
use glam::Vec3;
use std::f32::consts::PI;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use lantern::backend::VulkanDevice;
use lantern::game_object::advance_rotations;
use lantern::renderer::usable_extent;
use lantern::{
    Camera, Config, FrameClock, GameObject, KeyboardState, Model, MovementController, Renderer,
    SimpleRenderSystem, Vertex,
};

const TRIANGLE_COUNT: usize = 40;

fn scene_palette() -> Vec<Vec3> {
    let srgb = [
        Vec3::new(1.0, 0.7, 0.73),
        Vec3::new(1.0, 0.87, 0.73),
        Vec3::new(1.0, 1.0, 0.73),
        Vec3::new(0.73, 1.0, 0.8),
        Vec3::new(0.73, 0.88, 1.0),
    ];
    srgb.iter().map(|c| c.powf(2.2)).collect()
}

fn create_scene(device: Arc<VulkanDevice>) -> Result<Vec<GameObject>> {
    let vertices = [
        Vertex::new(Vec3::new(0.0, -0.5, 0.0), Vec3::new(1.0, 0.0, 0.0)),
        Vertex::new(Vec3::new(0.5, 0.5, 0.0), Vec3::new(0.0, 1.0, 0.0)),
        Vertex::new(Vec3::new(-0.5, 0.5, 0.0), Vec3::new(0.0, 0.0, 1.0)),
    ];
    let model = Arc::new(Model::new(device, &vertices)?);

    let palette = scene_palette();
    let mut objects = Vec::with_capacity(TRIANGLE_COUNT);
    for i in 0..TRIANGLE_COUNT {
        let mut triangle = GameObject::new();
        triangle.model = Some(model.clone());
        triangle.color = palette[i % palette.len()];
        triangle.transform.translation = Vec3::new(0.0, 0.0, 2.5);
        triangle.transform.scale = Vec3::splat(0.5 + i as f32 * 0.025);
        triangle.transform.rotation.y = i as f32 * PI * 0.025;
        objects.push(triangle);
    }

    Ok(objects)
}

struct EngineState {
    renderer: Renderer,
    render_system: SimpleRenderSystem,
    objects: Vec<GameObject>,
    viewer: GameObject,
    camera: Camera,
    controller: MovementController,
    keyboard: KeyboardState,
    clock: FrameClock,
    // Keeps the device alive until everything above is dropped.
    _device: Arc<VulkanDevice>,
}

struct App {
    config: Config,
    window: Option<Arc<Window>>,
    state: Option<EngineState>,
    window_resized: bool,
    exit_error: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            config,
            window: None,
            state: None,
            window_resized: false,
            exit_error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title(&self.config.window.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("Failed to create window")?,
        );

        let device = VulkanDevice::new(
            window.as_ref(),
            &self.config.window.title,
            self.config.debug.validation_layers,
        )?;

        let size = window.inner_size();
        let extent = vk::Extent2D {
            width: size.width,
            height: size.height,
        };
        let renderer = Renderer::new(
            device.clone(),
            extent,
            self.config.graphics.vsync,
            self.config.graphics.clear_color,
        )?;

        let render_system = SimpleRenderSystem::new(
            device.clone(),
            renderer.render_pass(),
            self.config.graphics.vert_shader.clone().into(),
            self.config.graphics.frag_shader.clone().into(),
        )?;

        let objects = create_scene(device.clone())?;

        let mut viewer = GameObject::new();
        viewer.transform.translation = Vec3::ZERO;

        self.window = Some(window);
        self.state = Some(EngineState {
            renderer,
            render_system,
            objects,
            viewer,
            camera: Camera::default(),
            controller: MovementController::default(),
            keyboard: KeyboardState::default(),
            clock: FrameClock::new(),
            _device: device,
        });

        log::info!("Engine initialized");
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let Some(window) = self.window.clone() else {
            return Ok(());
        };
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };

        let size = window.inner_size();
        let Some(extent) = usable_extent(size.width, size.height) else {
            return Ok(());
        };

        let dt = state.clock.tick();

        state
            .controller
            .move_in_plane_xz(&state.keyboard, dt, &mut state.viewer);
        state.camera.set_view_yxz(
            state.viewer.transform.translation,
            state.viewer.transform.rotation,
        );
        state.camera.set_perspective_projection(
            50f32.to_radians(),
            state.renderer.aspect_ratio(),
            0.1,
            100.0,
        );

        advance_rotations(&mut state.objects);

        match state.renderer.begin_frame(extent)? {
            Some(command_buffer) => {
                state.renderer.begin_swapchain_render_pass(command_buffer);
                state
                    .render_system
                    .render_game_objects(command_buffer, &state.objects, &state.camera);
                state.renderer.end_swapchain_render_pass(command_buffer);

                let recreated = state.renderer.end_frame(extent, self.window_resized)?;
                if recreated {
                    self.window_resized = false;
                    state
                        .render_system
                        .recreate_pipeline(state.renderer.render_pass())?;
                }
            }
            None => {
                // The swapchain was recreated during acquire; the pipeline
                // must follow the new render pass before the next frame.
                self.window_resized = false;
                state
                    .render_system
                    .recreate_pipeline(state.renderer.render_pass())?;
            }
        }

        if self.config.debug.show_fps {
            if let Some(fps) = state.clock.fps() {
                window.set_title(&format!("{} - {:.0} FPS", self.config.window.title, fps));
            }
        }

        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("Fatal error: {:#}", error);
        self.exit_error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(_) => {
                self.window_resized = true;
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape && key_state == ElementState::Pressed {
                    event_loop.exit();
                    return;
                }
                if let Some(state) = self.state.as_mut() {
                    state.keyboard.handle_key(code, key_state);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Continuous rendering, except while minimized: with no redraw
        // requested the loop sleeps until the next window event.
        if let Some(window) = &self.window {
            let size = window.inner_size();
            if usable_extent(size.width, size.height).is_some() {
                window.request_redraw();
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load();
    log::info!("Starting {}", config.window.title);

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop
        .run_app(&mut app)
        .context("Event loop terminated abnormally")?;

    match app.exit_error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn palette_is_gamma_corrected() {
        let palette = scene_palette();
        assert_eq!(palette.len(), 5);
        // Gamma 2.2 darkens everything below full intensity.
        assert!(palette[0].y < 0.7);
        assert_abs_diff_eq!(palette[0].x, 1.0, epsilon = 1e-6);
    }
}
