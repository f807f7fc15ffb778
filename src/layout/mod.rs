//! One-dimensional layout of members into columns.
//!
//! This module contains:
//! - `Column` - One slot with its members and the categories opening/closing there
//! - `Grid` - Ordered columns, aggregate queries and the shared `traverse`
//! - `LayoutBuilder` - Memoized walk of the registry that populates a grid
//! - `ChildOrder` - Replaceable policy for the left-to-right order of children

mod builder;
mod column;
mod grid;
mod order;

use thiserror::Error;

pub use builder::{Layout, LayoutBuilder, RenderInput, create_layout};
pub use column::{Column, ContextEntry, OpenContext};
pub use grid::{Grid, GridVisitor, Span, TextRenderer};
pub use order::{ChildOrder, DeclaredOrder, LongestChainFirst};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("cycle detected while laying out category '{0}'")]
    Cycle(String),
    #[error("column {index} is out of range for a grid of {len} columns")]
    ColumnOutOfRange { index: usize, len: usize },
    #[error("category '{category}' closes in column {column} but is not open")]
    NotInContext { category: String, column: usize },
    #[error("unknown category #{0}")]
    UnknownCategory(usize),
}
