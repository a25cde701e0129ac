pub mod block;
pub mod formatter;

pub use block::Renderer;
pub use formatter::{format, MAX_COURSES_PER_GROUP};
