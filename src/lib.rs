pub mod commands;
pub mod error_fmt;
pub mod geometry;
pub mod layout;
pub mod model;

// Re-export commonly used types for convenience
pub use geometry::{Diagram, DrawingOptions, GeometryError, compute_geometry};
pub use layout::{Grid, Layout, LayoutBuilder, LayoutError, RenderInput, create_layout};
pub use model::{Category, CategoryId, Member, MemberId, ModelError, Registry, RegistryBuilder};
