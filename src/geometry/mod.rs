//! Conversion of a populated grid into drawable rectangles and labels.

mod calculator;
mod metrics;
pub mod options;
mod shapes;

use thiserror::Error;

use crate::layout::LayoutError;

pub use calculator::{GeometryCalculator, LabelEdge, compute_geometry};
pub use metrics::{MonospaceMetrics, TextMetrics};
pub use options::{DrawingOptions, OptionsError};
pub use shapes::{CategoryShape, Diagram, MemberLabel, Rectangle};

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("category '{category}' has no {edge} member label")]
    MissingLabel { category: String, edge: LabelEdge },

    #[error("category '{0}' is still open after the last column")]
    Unclosed(String),

    #[error("member #{0} is not in the registry")]
    UnknownMember(usize),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Options(#[from] OptionsError),
}
