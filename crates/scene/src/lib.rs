//! Camera and camera-movement logic, independent of any GPU state.

pub mod camera;
pub mod controller;

pub use camera::Camera;
pub use controller::{FirstPersonController, MoveIntent};
