//! Core traits for the Aigentic agent framework

pub mod model;
pub mod tool;

pub use model::Model;
pub use tool::Tool;
