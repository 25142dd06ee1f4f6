//! Askama-backed block templates.

mod renderer;
pub mod views;

pub use renderer::AskamaTemplateRenderer;
