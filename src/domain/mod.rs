//! Domain layer types and invariants.

pub mod blocks;
pub mod error;
pub mod locale;
pub mod pages;
pub mod visibility;
