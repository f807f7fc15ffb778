//! Geometry command - prints the diagram of a layout as YAML.

use tracing::info;

use crate::error_fmt::AppError;
use crate::geometry::{Diagram, MonospaceMetrics, compute_geometry};
use crate::layout::LayoutBuilder;

use super::DiagramContext;

/// Compute the diagram of `shown` (everything when empty) minus `hidden`.
pub fn diagram(ctx: &DiagramContext, shown: &[String], hidden: &[String]) -> Result<Diagram, AppError> {
    let inputs = ctx.resolve_inputs(shown, hidden)?;
    let layout = LayoutBuilder::new(ctx.registry()).inputs(inputs).build()?;
    let metrics = MonospaceMetrics::new(ctx.options().char_width);
    let diagram = compute_geometry(&layout.grid, ctx.registry(), ctx.options(), &metrics)?;

    let (width, height) = diagram.extent();
    info!(
        shapes = diagram.shapes.len(),
        labels = diagram.labels.len(),
        width,
        height,
        "geometry computed"
    );
    Ok(diagram)
}

/// The diagram serialised as YAML.
pub fn geometry(ctx: &DiagramContext, shown: &[String], hidden: &[String]) -> Result<String, AppError> {
    let diagram = diagram(ctx, shown, hidden)?;
    Ok(serde_yaml::to_string(&diagram)?)
}
