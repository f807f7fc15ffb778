//! Text command - prints the canonical text rendering of a layout.

use tracing::info;

use crate::error_fmt::AppError;
use crate::layout::LayoutBuilder;

use super::DiagramContext;

/// Render the layout of `shown` (everything when empty) minus `hidden`.
pub fn text(ctx: &DiagramContext, shown: &[String], hidden: &[String]) -> Result<String, AppError> {
    let inputs = ctx.resolve_inputs(shown, hidden)?;
    let layout = LayoutBuilder::new(ctx.registry()).inputs(inputs).build()?;
    info!(columns = layout.grid.len(), "layout rendered as text");

    let mut output = layout.grid.render_text(ctx.registry())?;
    if !output.is_empty() {
        output.push('\n');
    }
    Ok(output)
}
