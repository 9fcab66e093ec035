//! Entity Component System module
//!
//! Components for the entities the generator materializes.

pub mod components;

pub use components::*;
