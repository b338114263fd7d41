//! Desktop and headset controls behind one per-frame `update` contract.
//!
//! Which variant runs is decided once, at session start, by asking a
//! [`HeadsetProbe`] for displays. Desktop controls keep their own
//! [`InputState`]; nothing here is global.

use std::f32::consts::FRAC_PI_2;

use cgmath::{InnerSpace, Quaternion, Rad, Rotation3, Vector3};
use futures::future::{BoxFuture, FutureExt};
use winit::keyboard::KeyCode;

use super::viewpoint::Viewpoint;
use crate::{config::SceneConfig, gfx::scene::Scene};

/// The four movement directions of the desktop controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementKey {
    Forward,
    Backward,
    Left,
    Right,
}

impl MovementKey {
    /// Arrow keys and WASD
    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::ArrowUp | KeyCode::KeyW => Some(MovementKey::Forward),
            KeyCode::ArrowLeft | KeyCode::KeyA => Some(MovementKey::Left),
            KeyCode::ArrowDown | KeyCode::KeyS => Some(MovementKey::Backward),
            KeyCode::ArrowRight | KeyCode::KeyD => Some(MovementKey::Right),
            _ => None,
        }
    }
}

/// Which movement keys are currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    pub fn set(&mut self, key: MovementKey, pressed: bool) {
        match key {
            MovementKey::Forward => self.forward = pressed,
            MovementKey::Backward => self.backward = pressed,
            MovementKey::Left => self.left = pressed,
            MovementKey::Right => self.right = pressed,
        }
    }

    /// Unit movement direction: x is right, z is forward. Zero when idle or
    /// when opposing keys cancel out.
    pub fn direction(&self) -> Vector3<f32> {
        let direction = Vector3::new(
            f32::from(u8::from(self.right)) - f32::from(u8::from(self.left)),
            0.0,
            f32::from(u8::from(self.forward)) - f32::from(u8::from(self.backward)),
        );

        // Diagonals are not faster than straight lines
        if direction.magnitude2() > 0.0 {
            direction.normalize()
        } else {
            direction
        }
    }
}

/// Pointer-lock style first-person controls.
#[derive(Debug, Clone)]
pub struct DesktopControls {
    pub input: InputState,
    yaw: f32,
    pitch: f32,
    look_sensitivity: f32,
    speed_divisor: f32,
}

impl DesktopControls {
    /// Takes yaw and pitch from the viewpoint's current orientation.
    pub fn new(config: &SceneConfig, viewpoint: &Viewpoint) -> Self {
        let forward = viewpoint.forward();
        Self {
            input: InputState::default(),
            yaw: (-forward.x).atan2(-forward.z),
            pitch: forward.y.clamp(-1.0, 1.0).asin(),
            look_sensitivity: config.look_sensitivity,
            speed_divisor: config.move_speed_divisor,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Turns the view by a pointer delta in pixels. Pitch stops at straight
    /// up and straight down.
    pub fn look(&mut self, viewpoint: &mut Viewpoint, dx: f64, dy: f64) {
        self.yaw -= dx as f32 * self.look_sensitivity;
        self.pitch = (self.pitch - dy as f32 * self.look_sensitivity).clamp(-FRAC_PI_2, FRAC_PI_2);
        viewpoint.orientation =
            Quaternion::from_angle_y(Rad(self.yaw)) * Quaternion::from_angle_x(Rad(self.pitch));
    }

    /// Moves along the horizontal projection of the view direction
    pub fn move_forward(&self, viewpoint: &mut Viewpoint, distance: f32) {
        let forward = Vector3::unit_y().cross(viewpoint.right());
        viewpoint.position += forward * distance;
    }

    pub fn move_right(&self, viewpoint: &mut Viewpoint, distance: f32) {
        viewpoint.position += viewpoint.right() * distance;
    }

    pub fn update(&mut self, viewpoint: &mut Viewpoint) {
        let step = movement_step(&self.input, self.speed_divisor);
        self.move_right(viewpoint, step.x);
        self.move_forward(viewpoint, step.z);
    }
}

/// Per-frame displacement for the held keys, in (right, _, forward) units
pub fn movement_step(input: &InputState, speed_divisor: f32) -> Vector3<f32> {
    input.direction() / speed_divisor
}

/// Head pose reported by a tracked display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadPose {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
}

/// A head-mounted display that can be polled once per frame.
pub trait HeadsetDevice: Send {
    fn name(&self) -> &str;

    /// Latest pose, or `None` when tracking is lost this frame
    fn poll_pose(&mut self) -> Option<HeadPose>;
}

/// Enumerates the headsets available to this session.
pub trait HeadsetProbe {
    fn displays(&self) -> BoxFuture<'_, Vec<Box<dyn HeadsetDevice>>>;
}

/// Probe for machines without headset support
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHeadset;

impl HeadsetProbe for NoHeadset {
    fn displays(&self) -> BoxFuture<'_, Vec<Box<dyn HeadsetDevice>>> {
        async { Vec::new() }.boxed()
    }
}

/// Tracking is entirely up to the device.
pub struct HeadsetControls {
    device: Box<dyn HeadsetDevice>,
}

impl HeadsetControls {
    pub fn new(device: Box<dyn HeadsetDevice>) -> Self {
        Self { device }
    }

    pub fn device_name(&self) -> &str {
        self.device.name()
    }

    pub fn update(&mut self, viewpoint: &mut Viewpoint) {
        if let Some(pose) = self.device.poll_pose() {
            viewpoint.position = pose.position;
            viewpoint.orientation = pose.orientation;
        }
    }
}

impl std::fmt::Debug for HeadsetControls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadsetControls")
            .field("device", &self.device.name())
            .finish()
    }
}

/// True if at least one headset display is available
pub async fn detect_capability<P: HeadsetProbe + ?Sized>(probe: &P) -> bool {
    !probe.displays().await.is_empty()
}

#[derive(Debug)]
pub enum Controls {
    Desktop(DesktopControls),
    Headset(HeadsetControls),
}

impl Controls {
    /// Picks headset controls when the probe finds a display, desktop
    /// controls otherwise. Desktop mode anchors the viewpoint in the scene.
    pub async fn initialize<P: HeadsetProbe + ?Sized>(
        probe: &P,
        scene: &mut Scene,
        config: &SceneConfig,
    ) -> Self {
        let mut displays = probe.displays().await;
        if displays.is_empty() {
            log::info!("No headset found, using desktop controls");
            scene.add_viewpoint_anchor();
            Controls::Desktop(DesktopControls::new(config, &scene.viewpoint))
        } else {
            let device = displays.swap_remove(0);
            log::info!("Using headset '{}'", device.name());
            Controls::Headset(HeadsetControls::new(device))
        }
    }

    pub fn is_headset(&self) -> bool {
        matches!(self, Controls::Headset(_))
    }

    /// Records a movement key. Returns false if the key is not a movement
    /// key or the controls are headset driven.
    pub fn key_event(&mut self, code: KeyCode, pressed: bool) -> bool {
        match (self, MovementKey::from_key_code(code)) {
            (Controls::Desktop(desktop), Some(key)) => {
                desktop.input.set(key, pressed);
                true
            }
            _ => false,
        }
    }

    pub fn look(&mut self, viewpoint: &mut Viewpoint, dx: f64, dy: f64) {
        if let Controls::Desktop(desktop) = self {
            desktop.look(viewpoint, dx, dy);
        }
    }

    /// Call once per frame in either mode
    pub fn update(&mut self, viewpoint: &mut Viewpoint) {
        match self {
            Controls::Desktop(desktop) => desktop.update(viewpoint),
            Controls::Headset(headset) => headset.update(viewpoint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    struct ScriptedHeadset {
        poses: Vec<HeadPose>,
    }

    impl HeadsetDevice for ScriptedHeadset {
        fn name(&self) -> &str {
            "scripted"
        }

        fn poll_pose(&mut self) -> Option<HeadPose> {
            self.poses.pop()
        }
    }

    struct OneHeadset;

    impl HeadsetProbe for OneHeadset {
        fn displays(&self) -> BoxFuture<'_, Vec<Box<dyn HeadsetDevice>>> {
            async {
                let pose = HeadPose {
                    position: Vector3::new(0.0, 1.6, 0.0),
                    orientation: Quaternion::from_angle_y(Rad(0.5)),
                };
                vec![Box::new(ScriptedHeadset { poses: vec![pose] }) as Box<dyn HeadsetDevice>]
            }
            .boxed()
        }
    }

    fn assert_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < 1e-5, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(MovementKey::from_key_code(KeyCode::KeyW), Some(MovementKey::Forward));
        assert_eq!(MovementKey::from_key_code(KeyCode::ArrowUp), Some(MovementKey::Forward));
        assert_eq!(MovementKey::from_key_code(KeyCode::KeyA), Some(MovementKey::Left));
        assert_eq!(MovementKey::from_key_code(KeyCode::ArrowDown), Some(MovementKey::Backward));
        assert_eq!(MovementKey::from_key_code(KeyCode::KeyD), Some(MovementKey::Right));
        assert_eq!(MovementKey::from_key_code(KeyCode::KeyQ), None);
    }

    #[test]
    fn test_diagonal_is_not_faster() {
        let mut input = InputState::default();
        input.set(MovementKey::Forward, true);
        let straight = movement_step(&input, 10.0);
        input.set(MovementKey::Right, true);
        let diagonal = movement_step(&input, 10.0);

        assert!((straight.magnitude() - 0.1).abs() < 1e-6);
        assert!((diagonal.magnitude() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_idle_and_cancelled_input_do_not_move() {
        let mut input = InputState::default();
        assert_eq!(movement_step(&input, 10.0), Vector3::new(0.0, 0.0, 0.0));

        input.set(MovementKey::Left, true);
        input.set(MovementKey::Right, true);
        assert_eq!(movement_step(&input, 10.0), Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_desktop_update_moves_along_view() {
        let config = SceneConfig::default();
        let mut viewpoint = Viewpoint::default();
        let mut controls = DesktopControls::new(&config, &viewpoint);

        controls.input.set(MovementKey::Forward, true);
        controls.update(&mut viewpoint);
        assert_close(viewpoint.position, Vector3::new(0.0, 0.0, 4.9));

        controls.input.set(MovementKey::Forward, false);
        controls.input.set(MovementKey::Right, true);
        controls.update(&mut viewpoint);
        assert_close(viewpoint.position, Vector3::new(0.1, 0.0, 4.9));
    }

    #[test]
    fn test_forward_stays_horizontal_when_looking_down() {
        let config = SceneConfig::default();
        let mut viewpoint = Viewpoint::default();
        let mut controls = DesktopControls::new(&config, &viewpoint);

        controls.look(&mut viewpoint, 0.0, 300.0);
        assert!(viewpoint.forward().y < -0.5);

        controls.move_forward(&mut viewpoint, 1.0);
        assert_close(viewpoint.position, Vector3::new(0.0, 0.0, 4.0));
    }

    #[test]
    fn test_pitch_is_clamped() {
        let config = SceneConfig::default();
        let mut viewpoint = Viewpoint::default();
        let mut controls = DesktopControls::new(&config, &viewpoint);

        controls.look(&mut viewpoint, 0.0, -1.0e6);
        assert_eq!(controls.pitch(), FRAC_PI_2);
    }

    #[test]
    fn test_initialize_without_headset_is_desktop() {
        let config = SceneConfig::default();
        let mut scene = Scene::new(&config);

        assert!(!block_on(detect_capability(&NoHeadset)));
        let mut controls = block_on(Controls::initialize(&NoHeadset, &mut scene, &config));

        assert!(!controls.is_headset());
        assert!(scene.viewpoint_anchored());
        assert!(controls.key_event(KeyCode::KeyW, true));
        assert!(!controls.key_event(KeyCode::Space, true));
    }

    #[test]
    fn test_headset_applies_pose_and_ignores_keys() {
        let config = SceneConfig::default();
        let mut scene = Scene::new(&config);

        assert!(block_on(detect_capability(&OneHeadset)));
        let mut controls = block_on(Controls::initialize(&OneHeadset, &mut scene, &config));
        assert!(controls.is_headset());
        assert!(!scene.viewpoint_anchored());
        assert!(!controls.key_event(KeyCode::KeyW, true));

        controls.update(&mut scene.viewpoint);
        assert_close(scene.viewpoint.position, Vector3::new(0.0, 1.6, 0.0));

        // Tracking lost: pose is kept
        controls.update(&mut scene.viewpoint);
        assert_close(scene.viewpoint.position, Vector3::new(0.0, 1.6, 0.0));
    }
}
