//! The block preview pipeline.

pub mod builder;
pub mod context;
pub mod element;
pub mod error;
pub mod fallback;
pub mod models;
pub mod preview;
pub mod repos;
pub mod sanitize;
pub mod template;
