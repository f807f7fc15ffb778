//! Check command - validates a catalogue and drawing options.

use tracing::info;

use crate::error_fmt::AppError;
use crate::geometry::{MonospaceMetrics, compute_geometry};
use crate::layout::LayoutBuilder;

use super::DiagramContext;

/// Lay out and measure every category once; loading already validated the
/// catalogue and options.
pub fn check(ctx: &DiagramContext) -> Result<String, AppError> {
    let registry = ctx.registry();

    if registry.is_empty() {
        return Ok(format!("No categories found in {}\n", ctx.catalog_name()));
    }

    let inputs = ctx.resolve_inputs(&[], &[])?;
    let layout = LayoutBuilder::new(registry).inputs(inputs).build()?;
    let metrics = MonospaceMetrics::new(ctx.options().char_width);
    let diagram = compute_geometry(&layout.grid, registry, ctx.options(), &metrics)?;

    info!(
        columns = layout.grid.len(),
        shapes = diagram.shapes.len(),
        "check passed"
    );

    Ok(format!(
        "ok: {} categories and {} members validated in {}\n",
        registry.len(),
        registry.members().count(),
        ctx.catalog_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DrawingOptions;
    use crate::model::{RegistryBuilder, number_registry};

    #[test]
    fn test_check_builtin_catalogue() {
        let ctx = DiagramContext::from_parts(number_registry().unwrap(), DrawingOptions::default());
        assert_eq!(
            check(&ctx).unwrap(),
            "ok: 15 categories and 23 members validated in built-in number sets\n"
        );
    }

    #[test]
    fn test_check_empty_catalogue() {
        let registry = RegistryBuilder::new().build().unwrap();
        let ctx = DiagramContext::from_parts(registry, DrawingOptions::default());
        assert!(check(&ctx).unwrap().starts_with("No categories found"));
    }
}
