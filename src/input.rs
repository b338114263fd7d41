//! Platform input reduced to the handful of events the viewer reacts to.

use winit::{
    event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PrimaryPress,
    PrimaryRelease,
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    /// Raw pointer delta, independent of cursor position
    PointerMotion { dx: f64, dy: f64 },
}

impl InputEvent {
    pub fn from_mouse_button(button: MouseButton, state: ElementState) -> Option<Self> {
        match (button, state) {
            (MouseButton::Left, ElementState::Pressed) => Some(InputEvent::PrimaryPress),
            (MouseButton::Left, ElementState::Released) => Some(InputEvent::PrimaryRelease),
            _ => None,
        }
    }

    pub fn from_key(code: KeyCode, state: ElementState) -> Self {
        match state {
            ElementState::Pressed => InputEvent::KeyDown(code),
            ElementState::Released => InputEvent::KeyUp(code),
        }
    }

    /// Translates mouse buttons and keys. Auto-repeat key presses are dropped.
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                Self::from_mouse_button(*button, *state)
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => Some(Self::from_key(*code, *state)),
            _ => None,
        }
    }

    pub fn from_device_event(event: &DeviceEvent) -> Option<Self> {
        match event {
            DeviceEvent::MouseMotion { delta: (dx, dy) } => Some(InputEvent::PointerMotion {
                dx: *dx,
                dy: *dy,
            }),
            _ => None,
        }
    }
}
