//! Level files: ASCII layouts plus optional config overrides

pub mod layout;
pub mod loader;

pub use layout::{Layout, Tile};
pub use loader::Level;
