// Capture domain — freeze-frame state machine, compositing, and encoding.

pub mod clock;
pub mod compositor;
pub mod dummy;
pub mod encode;
pub mod error;
pub mod pipeline;
pub mod renderer;
pub mod source;
pub mod state;
pub mod types;
pub mod ui;
