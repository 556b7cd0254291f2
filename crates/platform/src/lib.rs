//! Platform layer: winit windowing, Vulkan surface creation, and input
//! state tracking.

mod input;
mod window;

pub use input::{InputState, KeyCode};
pub use window::{Surface, Window};

// Re-export winit types that users might need
pub use winit::event::WindowEvent;
pub use winit::event_loop::EventLoop;
