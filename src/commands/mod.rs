//! CLI command implementations.
//!
//! Each command is implemented in its own submodule and works against a
//! loaded DiagramContext.

mod check;
mod geometry;
mod list;
pub mod shared;
mod text;

pub use check::check;
pub use geometry::geometry;
pub use list::list;
pub use shared::DiagramContext;
pub use text::text;
