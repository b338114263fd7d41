use anyhow::Context;
use std::{path::Path, sync::Arc};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowAttributes, WindowId},
};

use crate::{
    config::SceneConfig,
    gfx::{
        camera::NoHeadset, rendering::RenderEngine, resources::FileTextureLoader, scene::Scene,
    },
    graph::ResourceDescriptor,
    input::InputEvent,
    session::SceneSession,
};

/// Installs `env_logger` with a default filter of `info` (override via
/// `RUST_LOG`). Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

// Render callback type, called once per redraw after the scene is drawn
pub type RenderCallback = Box<dyn FnMut(&Scene)>;

pub struct GraphApp {
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    title: String,
    cursor_grabbed: bool,
    session: SceneSession,
    render_callback: Option<RenderCallback>,
}

impl GraphApp {
    /// Wraps an already started session
    pub fn new(session: SceneSession) -> Self {
        Self {
            app_state: AppState {
                window: None,
                render_engine: None,
                title: "Terragraph".to_string(),
                cursor_grabbed: false,
                session,
                render_callback: None,
            },
        }
    }

    /// Loads a descriptor file and builds the scene from it, reading icons
    /// relative to the working directory. Headsets are not probed.
    pub fn from_descriptor_path(
        path: impl AsRef<Path>,
        config: &SceneConfig,
    ) -> anyhow::Result<Self> {
        // Texture failures during the build are only reported through the log
        init_logging();

        let path = path.as_ref();
        let descriptor = ResourceDescriptor::from_path(path)?;
        let loader = FileTextureLoader::new(".");

        let session = pollster::block_on(SceneSession::start(
            config,
            &descriptor,
            &loader,
            &NoHeadset,
        ))
        .with_context(|| format!("Failed to build scene from {}", path.display()))?;

        let mut app = Self::new(session);
        if let Some(stem) = path.file_stem() {
            app.app_state.title = format!("Terragraph - {}", stem.to_string_lossy());
        }
        Ok(app)
    }

    /// Set render callback
    pub fn set_render<F>(&mut self, render_fn: F)
    where
        F: FnMut(&Scene) + 'static,
    {
        self.app_state.render_callback = Some(Box::new(render_fn));
    }

    pub fn session(&self) -> &SceneSession {
        &self.app_state.session
    }

    pub fn session_mut(&mut self) -> &mut SceneSession {
        &mut self.app_state.session
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) -> anyhow::Result<()> {
        init_logging();

        let event_loop = EventLoop::new().context("Failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        log::info!(
            "Starting with {} nodes and {} arrows",
            self.app_state.session.scene.get_object_count(),
            self.app_state.session.scene.graph.arrow_count()
        );

        event_loop
            .run_app(&mut self.app_state)
            .context("Event loop terminated with an error")
    }
}

impl AppState {
    fn grab_cursor(&mut self) {
        if self.cursor_grabbed {
            return;
        }
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if self.session.controls.is_headset() {
            return;
        }

        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        match grabbed {
            Ok(()) => {
                window.set_cursor_visible(false);
                self.cursor_grabbed = true;
            }
            Err(err) => log::warn!("Could not grab cursor: {}", err),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match event_loop.create_window(
            WindowAttributes::default()
                .with_title(self.title.clone())
                .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            Ok(window) => {
                let window_handle = Arc::new(window);
                self.window = Some(window_handle.clone());

                let (width, height) = window_handle.inner_size().into();
                match pollster::block_on(RenderEngine::new(
                    window_handle,
                    width,
                    height,
                    &self.session.scene,
                )) {
                    Ok(renderer) => self.render_engine = Some(renderer),
                    Err(err) => log::error!("Rendering disabled: {:#}", err),
                }
            }
            Err(err) => {
                log::error!("Failed to create window: {}", err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match &event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.grab_cursor(),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(*width, *height);
                }
                return;
            }
            WindowEvent::RedrawRequested => {
                self.session.update_frame();
                if let Some(render_engine) = self.render_engine.as_mut() {
                    match render_engine.render_frame(&self.session.scene, self.session.selected()) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("Out of GPU memory, exiting");
                            event_loop.exit();
                            return;
                        }
                        Err(err) => log::warn!("Skipped frame: {}", err),
                    }
                }
                if let Some(render) = self.render_callback.as_mut() {
                    render(&self.session.scene);
                }
                return;
            }
            _ => (),
        }

        if let Some(input) = InputEvent::from_window_event(&event) {
            self.session.handle_input(input);
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        // Looking around only while the pointer is locked to the window
        if !self.cursor_grabbed {
            return;
        }

        if let Some(input) = InputEvent::from_device_event(&event) {
            self.session.handle_input(input);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_load_installs_logger() {
        let result = GraphApp::from_descriptor_path("definitely/not/here.json", &SceneConfig::default());

        assert!(result.is_err());
        assert_ne!(log::max_level(), log::LevelFilter::Off);
        // Repeated initialization is harmless
        init_logging();
    }
}
