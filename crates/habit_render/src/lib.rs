pub mod calendar;
pub mod canvas;
pub mod icons;
pub mod layout;
mod text;

pub use crate::canvas::{Canvas, DISPLAY_HEIGHT, DISPLAY_WIDTH};
pub use crate::layout::Renderer;
