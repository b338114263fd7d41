//! # Viewpoint and Controls
//!
//! The [`Viewpoint`] is the camera: it drives rendering, is the origin of the
//! pick ray, and is the container dragged nodes ride along in. [`Controls`]
//! move it, either from the keyboard and pointer (desktop) or from a tracked
//! headset.

pub mod controls;
pub mod viewpoint;

pub use controls::{
    detect_capability, Controls, DesktopControls, HeadPose, HeadsetControls, HeadsetDevice,
    HeadsetProbe, InputState, MovementKey, NoHeadset,
};
pub use viewpoint::Viewpoint;
